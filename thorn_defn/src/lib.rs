//! The Thorn definition graph: the `Defn` variants, scopes, the
//! module/composite flat arena, and each defn's pass bitset.
//!
//! `Module` implements `thorn_types::CompositeLookup` so the type
//! system's subtyping/interface queries can be answered without this
//! crate's types leaking into `thorn_types`.

mod defn;
mod method_table;
mod module;
mod scope;
mod traits;

pub use defn::{
    AttributeInstance, CompositeData, Defn, DefnKind, FunctionDefn, ImportDefn, IndexerDefn, IntrinsicId, MacroArgDefn, MacroDefn,
    ModuleDefn, NamespaceDefn, ParameterDefn, PropertyDefn, TemplateInstanceRecord, TemplateParam, TemplateSignature, TypedefDefn, VarDefn,
};
pub use method_table::{AlreadyFrozen, MethodTable};
pub use module::Module;
pub use scope::{Scope, ScopeChain};
pub use traits::{FunctionFlags, Traits};
