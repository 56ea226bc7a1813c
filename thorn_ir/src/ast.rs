//! The AST contract produced by the (external) parser.
//!
//! This crate does not implement lexing or parsing — those live in a
//! hand-written recursive-descent parser outside the scope of this
//! front-end. What *is* in scope is the shape of the tree that parser
//! hands to the scope builder and expression analyzer: a flat,
//! arena-indexed, untyped syntax tree. Every node carries a [`Span`] for
//! diagnostics and nothing else — no types, no bindings, no resolved
//! names.

use smallvec::SmallVec;

use crate::{Name, Span};

/// An index into an [`ExprArena`]. Untyped AST expressions reference their
/// children by index rather than `Box`, so the arena (and the AST it backs)
/// can be dropped as one unit when its owning module is discarded.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AstExprId(pub u32);

/// Arena holding one module's untyped expression tree.
#[derive(Default)]
pub struct ExprArena {
    nodes: Vec<AstExpr>,
}

impl ExprArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: AstExpr) -> AstExprId {
        let id = AstExprId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn get(&self, id: AstExprId) -> &AstExpr {
        &self.nodes[id.0 as usize]
    }
}

/// One untyped AST expression node.
#[derive(Clone, Debug)]
pub struct AstExpr {
    pub span: Span,
    pub kind: AstExprKind,
}

/// The closed set of expression shapes the parser can produce.
///
/// This is deliberately coarser than the typed expression ADT in
/// `thorn_expr`: the parser does not know about properties vs. fields,
/// `VTableCall` vs. `FnCall`, or any implicit conversion — those
/// distinctions are introduced by the expression analyzer.
#[derive(Clone, Debug)]
pub enum AstExprKind {
    IntLiteral(i128),
    FloatLiteral(f64),
    StringLiteral(Box<str>),
    CharLiteral(char),
    BoolLiteral(bool),
    NullLiteral,
    /// A bare identifier; may resolve to a variable, a type, or an
    /// overload set once analyzed.
    Ident(Name),
    /// `base.member`
    Member { base: AstExprId, member: Name, member_span: Span },
    /// `callee(args...)`
    Call { callee: AstExprId, args: Vec<CallArg> },
    /// `base[index]`
    Index { base: AstExprId, index: AstExprId },
    Binary { op: BinaryOp, lhs: AstExprId, rhs: AstExprId },
    Unary { op: UnaryOp, operand: AstExprId },
    Assign { target: AstExprId, value: AstExprId },
    /// `new Type(args...)`
    New { ty: ParsedType, args: Vec<CallArg> },
    Tuple(Vec<AstExprId>),
    ArrayLiteral(Vec<AstExprId>),
    If { cond: AstExprId, then_branch: AstExprId, else_branch: Option<AstExprId> },
    While { cond: AstExprId, body: AstExprId },
    DoWhile { body: AstExprId, cond: AstExprId },
    For { init: Option<AstExprId>, cond: Option<AstExprId>, step: Option<AstExprId>, body: AstExprId },
    ForEach { binding: Name, iterable: AstExprId, body: AstExprId },
    Switch { scrutinee: AstExprId, arms: Vec<SwitchArm> },
    Try { body: AstExprId, catches: Vec<CatchArm>, finally: Option<AstExprId> },
    Throw(AstExprId),
    Return(Option<AstExprId>),
    Yield(AstExprId),
    Break,
    Continue,
    /// `{ stmt; stmt; expr }` — a sequence yielding the value of its last
    /// element (or `Void` if it ends in a statement form).
    Block(Vec<AstExprId>),
    /// `let name[: Type] = init;` as an expression-position binding, per
    /// the "no separate statement AST" design note.
    VarDecl { name: Name, is_mutable: bool, declared_type: Option<ParsedType>, init: Option<AstExprId> },
    /// An explicit cast written by the user, e.g. `expr as Type` or
    /// `expr as? Type` (try-cast).
    Cast { expr: AstExprId, target: ParsedType, is_try: bool },
    /// A bare type used in value position (e.g. `Foo` as a template
    /// argument list target before call-parens).
    TypeLiteral(ParsedType),
    Error,
}

#[derive(Clone, Debug)]
pub struct CallArg {
    pub label: Option<Name>,
    pub value: AstExprId,
    pub is_spread: bool,
}

#[derive(Clone, Debug)]
pub struct SwitchArm {
    pub values: SmallVec<[AstExprId; 2]>,
    pub body: AstExprId,
}

#[derive(Clone, Debug)]
pub struct CatchArm {
    pub binding: Name,
    pub declared_type: Option<ParsedType>,
    pub body: AstExprId,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    RefEq,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    Complement,
}

/// A type as written in source, before resolution against the definition
/// graph. Resolution (name lookup, template-argument binding) happens in
/// `thorn_expr`/`thorn_template` and produces a `thorn_types::QualifiedType`.
#[derive(Clone, Debug)]
pub enum ParsedType {
    Named { path: Vec<Name>, args: Vec<ParsedType>, span: Span },
    Tuple(Vec<ParsedType>),
    Union(Vec<ParsedType>),
    NativeArray { element: Box<ParsedType>, length: u64 },
    Address(Box<ParsedType>),
    FlexibleArray(Box<ParsedType>),
    Function { params: Vec<ParsedType>, ret: Box<ParsedType> },
    Qualified { inner: Box<ParsedType>, readonly: bool, mutable: bool, immutable: bool, adopted: bool, volatile: bool },
}

/// A top-level or nested declaration, as produced by the parser.
///
/// Unlike expressions, declarations are not arena-indexed: there are
/// orders of magnitude fewer of them than expression nodes, and the scope
/// builder needs stable references to hand to `thorn_defn`.
#[derive(Clone, Debug)]
pub struct AstDecl {
    pub span: Span,
    pub name: Name,
    pub doc_comment: Option<Name>,
    pub kind: AstDeclKind,
}

#[derive(Clone, Debug)]
pub enum AstDeclKind {
    Module { members: Vec<AstDecl> },
    Namespace { members: Vec<AstDecl> },
    Import { path: Vec<Name>, is_explicit: bool },
    Class(AstCompositeDecl),
    Struct(AstCompositeDecl),
    Interface(AstCompositeDecl),
    Protocol(AstCompositeDecl),
    Enum { base: Option<ParsedType>, constants: Vec<(Name, Option<AstExprId>)> },
    Function(AstFunctionDecl),
    Var { declared_type: Option<ParsedType>, init: Option<AstExprId>, is_mutable: bool },
    Let { declared_type: Option<ParsedType>, init: Option<AstExprId> },
    Property(AstPropertyDecl),
    Indexer(AstPropertyDecl),
    TypeAlias { aliased: ParsedType },
}

#[derive(Clone, Debug, Default)]
pub struct AstCompositeDecl {
    pub type_params: Vec<AstTypeParam>,
    pub super_type: Option<ParsedType>,
    pub interfaces: Vec<ParsedType>,
    pub members: Vec<AstDecl>,
}

#[derive(Clone, Debug)]
pub struct AstTypeParam {
    pub name: Name,
    pub constraint: Option<AstTypeParamConstraint>,
}

#[derive(Clone, Debug)]
pub enum AstTypeParamConstraint {
    IsSubtype(ParsedType),
    IsSupertype(ParsedType),
    IsQualifier,
    IsTypeCtor,
}

#[derive(Clone, Debug, Default)]
pub struct AstFunctionDecl {
    pub type_params: Vec<AstTypeParam>,
    pub self_param: Option<AstSelfParam>,
    pub params: Vec<AstParam>,
    pub return_type: Option<ParsedType>,
    pub body: Option<AstExprId>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_extern: bool,
    pub is_ctor: bool,
}

#[derive(Clone, Debug)]
pub struct AstSelfParam {
    pub readonly: bool,
}

#[derive(Clone, Debug)]
pub struct AstParam {
    pub name: Name,
    pub declared_type: Option<ParsedType>,
    pub default: Option<AstExprId>,
    pub is_variadic: bool,
    pub is_reference: bool,
    pub is_keyword_only: bool,
}

#[derive(Clone, Debug)]
pub struct AstPropertyDecl {
    pub declared_type: Option<ParsedType>,
    pub getter: Option<AstExprId>,
    pub setter: Option<(Name, AstExprId)>,
    pub is_final: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_allocates_increasing_ids() {
        let mut arena = ExprArena::new();
        let a = arena.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::NullLiteral });
        let b = arena.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::NullLiteral });
        assert_eq!(a.0 + 1, b.0);
    }

    #[test]
    fn arena_get_roundtrips() {
        let mut arena = ExprArena::new();
        let id = arena.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::IntLiteral(7) });
        match arena.get(id).kind {
            AstExprKind::IntLiteral(v) => assert_eq!(v, 7),
            _ => panic!("wrong kind"),
        }
    }
}
