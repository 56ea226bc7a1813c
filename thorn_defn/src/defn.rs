//! The `Defn` type and its twelve variants (§"Definitions").

use thorn_ir::{AstExprId, DefnId, Name, Span};
use thorn_types::{CompositeKind, Idx};

use crate::method_table::MethodTable;
use crate::scope::Scope;
use crate::traits::{FunctionFlags, Traits};

/// An opaque reference to a compiled intrinsic, resolved by `thorn_eval`'s
/// intrinsic registry. Held here only as a handle so `FunctionDefn` can
/// record "this function lowers to intrinsic N" without depending on the
/// evaluator crate.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct IntrinsicId(pub u32);

/// An attribute instance attached to a defn. The attribute's argument
/// expressions are analyzed like any other constant expression; this
/// crate only records which attribute type was applied and where.
#[derive(Clone, Debug)]
pub struct AttributeInstance {
    pub attribute_defn: DefnId,
    pub span: Span,
}

/// Fields shared by every defn variant, per the "Definitions" section.
pub struct Defn {
    pub span: Span,
    pub short_name: Name,
    fq_name_cache: Option<String>,
    linkage_name_cache: Option<Name>,
    pub owning_module: Name,
    pub source_module: Name,
    pub parent: Option<DefnId>,
    pub next_in_scope: Option<DefnId>,
    pub traits: Traits,
    pub attributes: Vec<AttributeInstance>,
    pub template_signature: Option<TemplateSignature>,
    pub template_instance: Option<TemplateInstanceRecord>,
    pub kind: DefnKind,
}

impl Defn {
    #[must_use]
    pub fn new(span: Span, short_name: Name, owning_module: Name, source_module: Name, kind: DefnKind) -> Self {
        Defn {
            span,
            short_name,
            fq_name_cache: None,
            linkage_name_cache: None,
            owning_module,
            source_module,
            parent: None,
            next_in_scope: None,
            traits: Traits::empty(),
            attributes: Vec::new(),
            template_signature: None,
            template_instance: None,
            kind,
        }
    }

    /// Returns the cached fully-qualified name, computing and caching it
    /// on first use via `build`. `build` typically walks `parent` chains
    /// through the owning module, which this crate leaves to the caller
    /// since it alone knows how to render a `Name` back to text.
    pub fn fq_name(&mut self, build: impl FnOnce() -> String) -> &str {
        self.fq_name_cache.get_or_insert_with(build)
    }

    pub fn linkage_name(&mut self, build: impl FnOnce() -> Name) -> Name {
        *self.linkage_name_cache.get_or_insert_with(build)
    }

    #[must_use]
    pub fn is_template(&self) -> bool {
        self.template_signature.is_some()
    }

    #[must_use]
    pub fn is_template_instance(&self) -> bool {
        self.template_instance.is_some()
    }
}

/// An ordered type parameter list that makes a defn a template.
#[derive(Clone, Debug)]
pub struct TemplateSignature {
    pub params: Vec<TemplateParam>,
}

#[derive(Clone, Debug)]
pub struct TemplateParam {
    pub name: Name,
    pub var: Idx,
    pub requirements: Vec<DefnId>,
}

/// Marks a defn as the instantiation of some other (template) defn,
/// under a specific binding of type arguments.
#[derive(Clone, Debug)]
pub struct TemplateInstanceRecord {
    pub template: DefnId,
    pub bound_args: Vec<Idx>,
}

pub enum DefnKind {
    Typedef(TypedefDefn),
    Namespace(NamespaceDefn),
    Var(VarDefn),
    Let(VarDefn),
    Property(PropertyDefn),
    Indexer(IndexerDefn),
    Function(FunctionDefn),
    Macro(MacroDefn),
    Parameter(ParameterDefn),
    Mod(ModuleDefn),
    ExplicitImport(ImportDefn),
    MacroArg(MacroArgDefn),
}

/// A `Typedef` names a type; when that type is a composite, `composite`
/// carries the class/struct/interface/protocol-specific data. Composite,
/// Primitive, and Enum types are identified by their owning `Typedef`
/// defn (its `DefnId`), per §3.
pub struct TypedefDefn {
    pub aliased_type: Idx,
    pub composite: Option<CompositeData>,
}

pub struct CompositeData {
    pub kind: CompositeKind,
    pub super_type: Option<DefnId>,
    pub interfaces: Vec<DefnId>,
    pub fields: Vec<DefnId>,
    pub member_scope: Scope,
    pub method_table: MethodTable,
}

pub struct NamespaceDefn {
    pub scope: Scope,
}

pub struct VarDefn {
    pub ty: Idx,
    pub initializer: Option<AstExprId>,
}

pub struct PropertyDefn {
    pub ty: Idx,
    pub getter: Option<DefnId>,
    pub setter: Option<DefnId>,
    pub backing_field: Option<DefnId>,
    pub is_final: bool,
}

pub struct IndexerDefn {
    pub element_ty: Idx,
    pub index_ty: Idx,
    pub getter: Option<DefnId>,
    pub setter: Option<DefnId>,
}

/// `FunctionDefn`'s additional fields, per the "Definitions" section.
pub struct FunctionDefn {
    pub flags: FunctionFlags,
    pub local_scopes: Vec<Scope>,
    pub parameter_scope: Scope,
    /// The unreduced AST body; `ControlFlowPass` reduces this into a
    /// typed expression tree owned by `thorn_expr`'s side table, keyed by
    /// this function's `DefnId` (kept out of this crate to avoid a
    /// dependency on the expression ADT).
    pub body: Option<AstExprId>,
    pub overridden: Vec<DefnId>,
    pub intrinsic: Option<IntrinsicId>,
    pub merged_to: Option<DefnId>,
    pub dispatch_index: Option<u32>,
    pub return_type: Option<Idx>,
    /// `Some` for non-static methods: the implicit `self` parameter's
    /// defn, inserted by the analyzer for bare instance-member
    /// references inside this function's body.
    pub self_param: Option<DefnId>,
}

pub struct MacroDefn {
    pub body: Option<AstExprId>,
}

pub struct ParameterDefn {
    pub ty: Idx,
    pub has_default: bool,
    pub default: Option<AstExprId>,
    /// Mirrors `AstParam::is_variadic`: the parameter consumes every
    /// remaining positional argument, packed into its (array) type.
    pub is_variadic: bool,
}

pub struct ModuleDefn {
    pub scope: Scope,
}

pub struct ImportDefn {
    pub target: Option<DefnId>,
}

pub struct MacroArgDefn {
    pub substitution: AstExprId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fq_name_is_computed_once() {
        let mut defn = Defn::new(Span::DUMMY, Name::EMPTY, Name::EMPTY, Name::EMPTY, DefnKind::Namespace(NamespaceDefn { scope: Scope::new() }));
        let mut calls = 0;
        defn.fq_name(|| {
            calls += 1;
            "a.b".to_string()
        });
        defn.fq_name(|| {
            calls += 1;
            "a.b".to_string()
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn template_predicate_reflects_signature_presence() {
        let mut defn = Defn::new(Span::DUMMY, Name::EMPTY, Name::EMPTY, Name::EMPTY, DefnKind::Namespace(NamespaceDefn { scope: Scope::new() }));
        assert!(!defn.is_template());
        defn.template_signature = Some(TemplateSignature { params: Vec::new() });
        assert!(defn.is_template());
    }
}
