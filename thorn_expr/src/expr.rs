//! The typed expression ADT (§4.3): a closed variant set, every node
//! carrying a [`QualifiedType`]. Produced by the analyzer's tree
//! transducer; consumed by inference, the constant evaluator, and
//! codegen handoff.

use thorn_ir::{DefnId, Span};
use thorn_types::QualifiedType;

/// Arena handle for a typed expression node, mirroring `thorn_ir::ast`'s
/// `AstExprId` pattern at the typed layer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExprId(pub u32);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug)]
pub struct SwitchArm {
    pub value: ExprId,
    pub body: ExprId,
}

#[derive(Clone, Debug)]
pub struct CatchArm {
    pub exception_ty: thorn_types::Idx,
    pub binding: Option<DefnId>,
    pub body: ExprId,
}

/// One typed expression node. Variant set mirrors §4.3 exactly.
#[derive(Clone, Debug)]
pub enum ExprKind {
    // -- constants --
    ConstInt(i128),
    ConstFloat(f64),
    ConstString(String),
    ConstNull,
    ConstObjRef(DefnId),
    ConstEmptyArray,
    ConstNArray(Vec<ExprId>),
    TypeLiteral(thorn_types::Idx),

    // -- lvalues --
    /// Variable/field/parameter reference, with an optional base
    /// expression (e.g. `base.field`; `None` for a bare local/parameter).
    LValue { defn: DefnId, base: Option<ExprId> },
    BoundMethod { defn: DefnId, base: Box<ExprId> },
    ElementRef { base: Box<ExprId>, index: Box<ExprId> },
    ScopeName { defn: DefnId },

    // -- arithmetic / logical --
    BinaryOpcode { op: BinaryOpcode, lhs: Box<ExprId>, rhs: Box<ExprId> },
    Compare { op: CompareOp, lhs: Box<ExprId>, rhs: Box<ExprId> },
    RefEq { lhs: Box<ExprId>, rhs: Box<ExprId>, negate: bool },
    Not(Box<ExprId>),
    And(Box<ExprId>, Box<ExprId>),
    Or(Box<ExprId>, Box<ExprId>),
    Complement(Box<ExprId>),

    // -- casts (§4.1) --
    Cast { operand: Box<ExprId>, cast: thorn_types::Cast, target: thorn_types::Idx },

    // -- calls --
    FnCall { callee: DefnId, args: Vec<ExprId> },
    CtorCall { ctor: DefnId, args: Vec<ExprId> },
    VTableCall { receiver: Box<ExprId>, slot: u32, args: Vec<ExprId> },
    IndirectCall { callee: Box<ExprId>, args: Vec<ExprId> },
    New { ctor: DefnId, args: Vec<ExprId> },
    TupleCtor(Vec<ExprId>),
    ArrayLiteral(Vec<ExprId>),
    ClosureEnv { captures: Vec<DefnId> },

    // -- assignments --
    Assign { target: Box<ExprId>, value: Box<ExprId> },
    PostAssign { target: Box<ExprId>, op: BinaryOpcode, value: Box<ExprId> },
    MultiAssign { targets: Vec<ExprId>, value: Box<ExprId> },
    InitVar { defn: DefnId, value: Box<ExprId> },
    ClearVar { defn: DefnId },

    // -- control --
    Seq(Vec<ExprId>),
    If { cond: Box<ExprId>, then_branch: Box<ExprId>, else_branch: Option<Box<ExprId>> },
    While { cond: Box<ExprId>, body: Box<ExprId> },
    DoWhile { body: Box<ExprId>, cond: Box<ExprId> },
    For { init: Option<Box<ExprId>>, cond: Option<Box<ExprId>>, step: Option<Box<ExprId>>, body: Box<ExprId> },
    ForEach { binding: DefnId, iterable: Box<ExprId>, body: Box<ExprId> },
    Switch { scrutinee: Box<ExprId>, arms: Vec<SwitchArm> },
    Match { scrutinee: Box<ExprId>, arms: Vec<SwitchArm> },
    Try { body: Box<ExprId>, catches: Vec<CatchArm>, finally: Option<Box<ExprId>> },
    Throw(Box<ExprId>),
    Return(Option<Box<ExprId>>),
    Yield(Box<ExprId>),
    Break,
    Continue,
    LocalProcedure { defn: DefnId, body: Box<ExprId> },
    LocalReturn(Option<Box<ExprId>>),

    // -- meta --
    NoOp,
    IRValue(u64),
    SharedValue(Box<ExprId>),
    Prog2(Box<ExprId>, Box<ExprId>),

    /// A subexpression that failed analysis; propagates without
    /// cascading further errors from its parent (§7).
    ErrorVal,
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: QualifiedType,
    pub span: Span,
}

/// Flat arena for typed expressions, owned by the module the function
/// belongs to and released when the module is dropped.
#[derive(Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn error_val(&mut self, ty: QualifiedType, span: Span) -> ExprId {
        self.alloc(Expr { kind: ExprKind::ErrorVal, ty, span })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every allocated node's id, in allocation order. Used by the
    /// finalize pass to walk a whole body after substitution.
    pub fn ids(&self) -> impl Iterator<Item = ExprId> + '_ {
        (0..self.nodes.len()).map(|i| ExprId(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_types::{Idx, Qualifiers};

    #[test]
    fn arena_allocates_increasing_ids() {
        let mut arena = ExprArena::new();
        let ty = QualifiedType::unqualified(Idx(0));
        let a = arena.alloc(Expr { kind: ExprKind::NoOp, ty, span: Span::DUMMY });
        let b = arena.alloc(Expr { kind: ExprKind::NoOp, ty, span: Span::DUMMY });
        assert_eq!(a, ExprId(0));
        assert_eq!(b, ExprId(1));
    }

    #[test]
    fn error_val_round_trips() {
        let mut arena = ExprArena::new();
        let ty = QualifiedType { ty: Idx(0), qualifiers: Qualifiers::empty() };
        let id = arena.error_val(ty, Span::DUMMY);
        assert!(matches!(arena.get(id).kind, ExprKind::ErrorVal));
    }
}
