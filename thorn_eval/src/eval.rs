//! The tree-walking constant evaluator (§4.5).

use thorn_defn::{DefnKind, FunctionDefn, FunctionFlags, Module};
use thorn_expr::{BinaryOpcode, CompareOp, ExprId, ExprKind, TypedBodies};
use thorn_ir::DefnId;
use thorn_types::{Cast, CompositeKind, Pool, PrimitiveKind, TypeKind};

use crate::error::{EvalError, EvalResult};
use crate::frame::{CallFrame, RunState};
use crate::intrinsic::IntrinsicRegistry;
use crate::value::{ThornInt, Value};

/// Ties together the typed bodies, the defn graph, the type pool, and the
/// intrinsic table — everything a tree walk over one module's constant
/// expressions needs. Borrowed for the lifetime of one evaluation; the
/// evaluator itself holds no mutable state (all mutation happens through
/// the [`CallFrame`] the caller passes in, or through a constructed
/// object's `RefCell`).
pub struct Evaluator<'a> {
    pool: &'a Pool,
    module: &'a Module,
    bodies: &'a TypedBodies,
    intrinsics: &'a IntrinsicRegistry,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub fn new(pool: &'a Pool, module: &'a Module, bodies: &'a TypedBodies, intrinsics: &'a IntrinsicRegistry) -> Self {
        Evaluator { pool, module, bodies, intrinsics }
    }

    /// Evaluates `id` to a constant value, failing if any subexpression
    /// is not constant-evaluable.
    pub fn eval(&self, id: ExprId, frame: &mut CallFrame) -> EvalResult {
        let node = self.bodies.arena().get(id);
        let int_kind = self.primitive_kind_of(node.ty.ty).unwrap_or(PrimitiveKind::I32);

        match &node.kind {
            ExprKind::ConstInt(v) => Ok(Value::Int(ThornInt::new(int_kind, *v))),
            ExprKind::ConstFloat(v) => Ok(Value::Float(*v)),
            ExprKind::ConstString(s) => Ok(Value::Str(s.clone())),
            ExprKind::ConstNull => Ok(Value::Null),
            ExprKind::ConstObjRef(defn) => Ok(Value::new_object(*defn)),
            ExprKind::ConstEmptyArray => Ok(Value::Array(Vec::new())),
            ExprKind::ConstNArray(elements) => {
                let values = elements.iter().map(|e| self.eval(*e, frame)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            ExprKind::TypeLiteral(_) => Ok(Value::Void),

            ExprKind::LValue { defn, base } => self.load_lvalue(*defn, *base, frame),
            ExprKind::BoundMethod { .. } => Err(EvalError::Unimplemented("bound method value")),
            ExprKind::ElementRef { base, index } => {
                let base_val = self.eval(**base, frame)?;
                let index_val = self.eval(**index, frame)?;
                self.index_array(&base_val, &index_val)
            }
            ExprKind::ScopeName { .. } => Err(EvalError::Unimplemented("bare scope-name value")),

            ExprKind::BinaryOpcode { op, lhs, rhs } => {
                let l = self.eval(**lhs, frame)?;
                let r = self.eval(**rhs, frame)?;
                self.eval_binary(*op, l, r)
            }
            ExprKind::Compare { op, lhs, rhs } => {
                let l = self.eval(**lhs, frame)?;
                let r = self.eval(**rhs, frame)?;
                Ok(Value::Bool(self.eval_compare(*op, &l, &r)?))
            }
            ExprKind::RefEq { lhs, rhs, negate } => {
                let l = self.eval(**lhs, frame)?;
                let r = self.eval(**rhs, frame)?;
                let equal = Value::ref_equal(&l, &r);
                Ok(Value::Bool(equal != *negate))
            }
            ExprKind::Not(operand) => {
                let v = self.eval(**operand, frame)?;
                Ok(Value::Bool(!v.is_truthy()))
            }
            // Correct short-circuit evaluation: the left operand gates
            // whether the right one runs at all, unlike a buggy
            // evaluator that re-checks the same operand twice.
            ExprKind::And(lhs, rhs) => {
                let l = self.eval(**lhs, frame)?;
                if !l.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval(**rhs, frame)?;
                Ok(Value::Bool(r.is_truthy()))
            }
            ExprKind::Or(lhs, rhs) => {
                let l = self.eval(**lhs, frame)?;
                if l.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval(**rhs, frame)?;
                Ok(Value::Bool(r.is_truthy()))
            }
            ExprKind::Complement(operand) => {
                let v = self.eval(**operand, frame)?;
                match v {
                    Value::Int(i) => Ok(Value::Int(ThornInt::new(i.kind(), !i.raw()))),
                    _ => Err(EvalError::RuntimeOnly),
                }
            }

            ExprKind::Cast { operand, cast, target } => {
                let v = self.eval(**operand, frame)?;
                let source = self.bodies.arena().get(**operand).ty.ty;
                self.eval_cast(v, *cast, *target, source)
            }

            ExprKind::FnCall { callee, args } => {
                let values = self.eval_args(args, frame)?;
                self.call_function(*callee, values, None)
            }
            ExprKind::CtorCall { ctor, args } | ExprKind::New { ctor, args } => {
                let values = self.eval_args(args, frame)?;
                self.construct(*ctor, values)
            }
            ExprKind::VTableCall { .. } => Err(EvalError::Unimplemented("virtual dispatch has no statically-known constant target")),
            ExprKind::IndirectCall { .. } => Err(EvalError::Unimplemented("indirect call through a function value")),
            ExprKind::TupleCtor(elements) => {
                let values = elements.iter().map(|e| self.eval(*e, frame)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(values))
            }
            ExprKind::ArrayLiteral(elements) => {
                let values = elements.iter().map(|e| self.eval(*e, frame)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            ExprKind::ClosureEnv { .. } => Err(EvalError::Unimplemented("closures are not constant-evaluable")),

            ExprKind::Assign { target, value } => {
                let v = self.eval(**value, frame)?;
                self.store_lvalue(**target, v, frame)
            }
            ExprKind::PostAssign { target, op, value } => {
                let old = self.eval(**target, frame)?;
                let rhs = self.eval(**value, frame)?;
                let new = self.eval_binary(*op, old, rhs)?;
                self.store_lvalue(**target, new.clone(), frame)?;
                Ok(new)
            }
            ExprKind::MultiAssign { targets, value } => {
                let v = self.eval(**value, frame)?;
                let Value::Tuple(parts) = &v else { return Err(EvalError::RuntimeOnly) };
                if parts.len() != targets.len() {
                    return Err(EvalError::RuntimeOnly);
                }
                for (target, part) in targets.iter().zip(parts.iter()) {
                    self.store_lvalue(*target, part.clone(), frame)?;
                }
                Ok(v)
            }
            ExprKind::InitVar { defn, value } => {
                let v = self.eval(**value, frame)?;
                frame.bind(*defn, v.clone());
                Ok(v)
            }
            ExprKind::ClearVar { defn } => {
                frame.clear(*defn);
                Ok(Value::Void)
            }

            ExprKind::Seq(items) => self.eval_seq(items, frame),
            ExprKind::If { cond, then_branch, else_branch } => {
                let c = self.eval(**cond, frame)?;
                if c.is_truthy() {
                    self.eval(**then_branch, frame)
                } else if let Some(else_id) = else_branch {
                    self.eval(**else_id, frame)
                } else {
                    Ok(Value::Void)
                }
            }
            ExprKind::While { cond, body } => {
                while frame.is_running() {
                    let c = self.eval(**cond, frame)?;
                    if !c.is_truthy() {
                        break;
                    }
                    self.eval(**body, frame)?;
                    if !self.settle_loop_state(frame) {
                        break;
                    }
                }
                Ok(Value::Void)
            }
            ExprKind::DoWhile { body, cond } => {
                loop {
                    self.eval(**body, frame)?;
                    if !self.settle_loop_state(frame) {
                        break;
                    }
                    let c = self.eval(**cond, frame)?;
                    if !c.is_truthy() {
                        break;
                    }
                }
                Ok(Value::Void)
            }
            ExprKind::For { init, cond, step, body } => {
                if let Some(init_id) = init {
                    self.eval(**init_id, frame)?;
                }
                while frame.is_running() {
                    if let Some(cond_id) = cond {
                        let c = self.eval(**cond_id, frame)?;
                        if !c.is_truthy() {
                            break;
                        }
                    }
                    self.eval(**body, frame)?;
                    if !self.settle_loop_state(frame) {
                        break;
                    }
                    if let Some(step_id) = step {
                        self.eval(**step_id, frame)?;
                    }
                }
                Ok(Value::Void)
            }
            ExprKind::ForEach { binding, iterable, body } => {
                let Value::Array(items) = self.eval(**iterable, frame)? else { return Err(EvalError::RuntimeOnly) };
                for item in items {
                    frame.bind(*binding, item);
                    self.eval(**body, frame)?;
                    if !self.settle_loop_state(frame) {
                        break;
                    }
                    if !frame.is_running() {
                        break;
                    }
                }
                Ok(Value::Void)
            }
            ExprKind::Switch { scrutinee, arms } | ExprKind::Match { scrutinee, arms } => {
                let s = self.eval(**scrutinee, frame)?;
                for arm in arms {
                    let arm_val = self.eval(arm.value, frame)?;
                    if arm_val == s {
                        return self.eval(arm.body, frame);
                    }
                }
                Ok(Value::Void)
            }
            ExprKind::Try { body, catches, finally } => {
                let result = self.eval(**body, frame);
                if frame.state == RunState::Throw {
                    if let Some(catch) = catches.first() {
                        frame.state = RunState::Running;
                        if let Some(binding) = catch.binding {
                            if let Some(thrown) = frame.thrown.take() {
                                frame.bind(binding, thrown);
                            }
                        }
                        let caught = self.eval(catch.body, frame);
                        if let Some(finally_id) = finally {
                            self.eval(**finally_id, frame)?;
                        }
                        return caught;
                    }
                }
                if let Some(finally_id) = finally {
                    self.eval(**finally_id, frame)?;
                }
                result
            }
            ExprKind::Throw(value) => {
                let v = self.eval(**value, frame)?;
                frame.do_throw(v);
                Ok(Value::Void)
            }
            ExprKind::Return(value) | ExprKind::LocalReturn(value) => {
                let v = match value {
                    Some(id) => self.eval(**id, frame)?,
                    None => Value::Void,
                };
                frame.do_return(v.clone());
                Ok(v)
            }
            ExprKind::Yield(_) => Err(EvalError::Unimplemented("generators are not constant-evaluable")),
            ExprKind::Break => {
                frame.state = RunState::Break;
                Ok(Value::Void)
            }
            ExprKind::Continue => {
                frame.state = RunState::Continue;
                Ok(Value::Void)
            }
            ExprKind::LocalProcedure { .. } => Err(EvalError::Unimplemented("local procedure values")),

            ExprKind::NoOp => Ok(Value::Void),
            ExprKind::IRValue(bits) => Ok(Value::Int(ThornInt::new(PrimitiveKind::U64, i128::from(*bits)))),
            ExprKind::SharedValue(inner) => self.eval(**inner, frame),
            ExprKind::Prog2(first, second) => {
                self.eval(**first, frame)?;
                self.eval(**second, frame)
            }
            ExprKind::ErrorVal => Err(EvalError::NotAConstant),
        }
    }

    /// `allowPartial` mode (§4.5): returns `Value::Null` instead of
    /// propagating an error, for inference probing whether an expression
    /// *could* be folded without committing to the result.
    #[must_use]
    pub fn eval_allow_partial(&self, id: ExprId, frame: &mut CallFrame) -> Value {
        self.eval(id, frame).unwrap_or(Value::Null)
    }

    fn eval_seq(&self, items: &[ExprId], frame: &mut CallFrame) -> EvalResult {
        let mut last = Value::Void;
        for &item in items {
            if !frame.is_running() {
                break;
            }
            last = self.eval(item, frame)?;
        }
        Ok(last)
    }

    /// After a loop body runs, resolves `Break`/`Continue` back to
    /// `Running` (they only ever affect the nearest enclosing loop) and
    /// reports whether the loop should keep iterating.
    fn settle_loop_state(&self, frame: &mut CallFrame) -> bool {
        match frame.state {
            RunState::Break => {
                frame.state = RunState::Running;
                false
            }
            RunState::Continue => {
                frame.state = RunState::Running;
                true
            }
            RunState::Return | RunState::Throw => false,
            RunState::Running => true,
        }
    }

    fn eval_args(&self, args: &[ExprId], frame: &mut CallFrame) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|id| self.eval(*id, frame)).collect()
    }

    fn load_lvalue(&self, defn: DefnId, base: Option<ExprId>, frame: &mut CallFrame) -> EvalResult {
        match base {
            Some(base_id) => {
                let base_val = self.eval(base_id, frame)?;
                match base_val {
                    Value::ObjectRef(obj) => obj.borrow().get_field(defn).cloned().ok_or(EvalError::MissingField(defn)),
                    _ => Err(EvalError::RuntimeOnly),
                }
            }
            None => frame.get(defn).cloned().ok_or(EvalError::UninitializedVariable),
        }
    }

    fn store_lvalue(&self, target: ExprId, value: Value, frame: &mut CallFrame) -> EvalResult {
        match &self.bodies.arena().get(target).kind {
            ExprKind::LValue { defn, base: None } => {
                frame.bind(*defn, value.clone());
                Ok(value)
            }
            ExprKind::LValue { defn, base: Some(base_id) } => {
                let base_id = *base_id;
                let defn = *defn;
                let base_val = self.eval(base_id, frame)?;
                match base_val {
                    Value::ObjectRef(obj) => {
                        obj.borrow_mut().set_field(defn, value.clone());
                        Ok(value)
                    }
                    _ => Err(EvalError::RuntimeOnly),
                }
            }
            ExprKind::ElementRef { .. } => Err(EvalError::Unimplemented("indexed assignment")),
            _ => Err(EvalError::RuntimeOnly),
        }
    }

    fn index_array(&self, base: &Value, index: &Value) -> EvalResult {
        let (Value::Array(items), Value::Int(i)) = (base, index) else { return Err(EvalError::RuntimeOnly) };
        let i = usize::try_from(i.raw()).map_err(|_| EvalError::RuntimeOnly)?;
        items.get(i).cloned().ok_or(EvalError::RuntimeOnly)
    }

    fn eval_binary(&self, op: BinaryOpcode, lhs: Value, rhs: Value) -> EvalResult {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => match op {
                BinaryOpcode::Add => Ok(Value::Int(a.wrapping_add(b))),
                BinaryOpcode::Sub => Ok(Value::Int(a.wrapping_sub(b))),
                BinaryOpcode::Mul => Ok(Value::Int(a.wrapping_mul(b))),
                BinaryOpcode::Div => a.checked_div(b).map(Value::Int).ok_or(EvalError::DivisionByZero),
                BinaryOpcode::Rem => a.checked_rem(b).map(Value::Int).ok_or(EvalError::ModuloByZero),
                BinaryOpcode::BitAnd => Ok(Value::Int(a.bit_and(b))),
                BinaryOpcode::BitOr => Ok(Value::Int(a.bit_or(b))),
                BinaryOpcode::BitXor => Ok(Value::Int(a.bit_xor(b))),
                BinaryOpcode::Shl => Ok(Value::Int(a.shl(u32::try_from(b.raw()).unwrap_or(0)))),
                BinaryOpcode::Shr => Ok(Value::Int(a.shr(u32::try_from(b.raw()).unwrap_or(0)))),
            },
            (Value::Float(a), Value::Float(b)) => match op {
                BinaryOpcode::Add => Ok(Value::Float(a + b)),
                BinaryOpcode::Sub => Ok(Value::Float(a - b)),
                BinaryOpcode::Mul => Ok(Value::Float(a * b)),
                BinaryOpcode::Div => Ok(Value::Float(a / b)),
                BinaryOpcode::Rem => Ok(Value::Float(a % b)),
                _ => Err(EvalError::RuntimeOnly),
            },
            _ => Err(EvalError::RuntimeOnly),
        }
    }

    fn eval_compare(&self, op: CompareOp, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
        let ordering = match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a.raw().cmp(&b.raw()),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).ok_or(EvalError::RuntimeOnly)?,
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => return Err(EvalError::RuntimeOnly),
        };
        Ok(match op {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Ne => !ordering.is_eq(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Le => ordering.is_le(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Ge => ordering.is_ge(),
        })
    }

    fn eval_cast(&self, value: Value, cast: Cast, target: thorn_types::Idx, source: thorn_types::Idx) -> EvalResult {
        match cast {
            Cast::Identity | Cast::QualCast | Cast::BitCast | Cast::UpCast => Ok(value),
            Cast::Truncate | Cast::SignExtend | Cast::ZeroExtend => {
                let Value::Int(i) = value else { return Err(EvalError::RuntimeOnly) };
                let target_kind = self.primitive_kind_of(target).ok_or(EvalError::RuntimeOnly)?;
                Ok(Value::Int(ThornInt::new(target_kind, i.raw())))
            }
            Cast::IntToFloat => {
                let Value::Int(i) = value else { return Err(EvalError::RuntimeOnly) };
                #[allow(clippy::cast_precision_loss)]
                Ok(Value::Float(i.raw() as f64))
            }
            Cast::FloatToInt => {
                let Value::Float(f) = value else { return Err(EvalError::RuntimeOnly) };
                let target_kind = self.primitive_kind_of(target).ok_or(EvalError::RuntimeOnly)?;
                #[allow(clippy::cast_possible_truncation)]
                Ok(Value::Int(ThornInt::new(target_kind, f.trunc() as i128)))
            }
            Cast::NonZeroCompare => match value {
                Value::Int(i) => Ok(Value::Bool(!i.is_zero())),
                Value::Float(f) => Ok(Value::Bool(f != 0.0)),
                _ => Err(EvalError::RuntimeOnly),
            },
            Cast::TryCast | Cast::DynamicCast => Err(EvalError::Unimplemented("runtime type checks are not constant-evaluable")),
            Cast::UnionCtorCast => {
                let tag = self.union_tag_for_member(target, &value).unwrap_or(0);
                Ok(Value::Union { tag, payload: Box::new(value) })
            }
            Cast::UnionMemberCast => match value {
                Value::Union { payload, .. } => Ok(*payload),
                _ => Err(EvalError::RuntimeOnly),
            },
            Cast::CheckedUnionMemberCast => match value {
                Value::Union { tag, payload } => {
                    if self.union_member_at_tag_is(source, tag, target) {
                        Ok(*payload)
                    } else {
                        Err(EvalError::RuntimeOnly)
                    }
                }
                _ => Err(EvalError::RuntimeOnly),
            },
        }
    }

    /// Whether `union_idx`'s member at position `tag` is `target`: the
    /// check a `CheckedUnionMemberCast` makes before unwrapping.
    fn union_member_at_tag_is(&self, union_idx: thorn_types::Idx, tag: u32, target: thorn_types::Idx) -> bool {
        let TypeKind::Union { members, .. } = self.pool.kind(self.pool.dealias(union_idx)) else { return false };
        let Ok(index) = usize::try_from(tag) else { return false };
        let Some(&member) = members.get(index) else { return false };
        self.pool.dealias(member) == self.pool.dealias(target)
    }

    /// The position of `value`'s runtime shape within the union at
    /// `union_idx`'s canonicalized member list. A `Value` carries no
    /// back-pointer to its static type, so this matches structurally
    /// (primitive kind, composite defn, aggregate shape) rather than
    /// reading a tag the value doesn't have.
    fn union_tag_for_member(&self, union_idx: thorn_types::Idx, value: &Value) -> Option<u32> {
        let TypeKind::Union { members, .. } = self.pool.kind(self.pool.dealias(union_idx)) else { return None };
        let position = members.iter().position(|&member| self.value_matches_member(value, member))?;
        u32::try_from(position).ok()
    }

    /// Whether `value`'s runtime shape could have been produced by a
    /// member typed `member`. Reference-typed members all accept `Null`;
    /// everything else needs the underlying primitive kind, composite
    /// defn, or aggregate shape to line up.
    fn value_matches_member(&self, value: &Value, member: thorn_types::Idx) -> bool {
        match (value, self.pool.kind(self.pool.dealias(member))) {
            (Value::Void, TypeKind::Primitive(PrimitiveKind::Void)) => true,
            (Value::Null, TypeKind::Primitive(PrimitiveKind::Null)) => true,
            (Value::Null, TypeKind::Composite { .. } | TypeKind::NativeArray { .. } | TypeKind::FlexibleArray(_) | TypeKind::Address(_)) => true,
            (Value::Bool(_), TypeKind::Primitive(PrimitiveKind::Bool)) => true,
            (Value::Int(i), TypeKind::Primitive(kind)) => i.kind() == *kind,
            (Value::Float(_), TypeKind::Primitive(kind)) => kind.is_float(),
            (Value::Char(_), TypeKind::Primitive(PrimitiveKind::Char)) => true,
            (Value::Str(_), TypeKind::Composite { kind: CompositeKind::Class, .. }) => true,
            (Value::ObjectRef(obj), TypeKind::Composite { defn, .. }) => obj.borrow().class == *defn,
            (Value::Array(_), TypeKind::NativeArray { .. } | TypeKind::FlexibleArray(_)) => true,
            (Value::Tuple(_), TypeKind::Tuple(_)) => true,
            _ => false,
        }
    }

    fn primitive_kind_of(&self, idx: thorn_types::Idx) -> Option<PrimitiveKind> {
        match self.pool.kind(self.pool.dealias(idx)) {
            TypeKind::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    fn call_function(&self, callee: DefnId, args: Vec<Value>, self_value: Option<Value>) -> EvalResult {
        let defn = self.module.get(callee);
        let DefnKind::Function(function) = &defn.kind else { return Err(EvalError::NotAConstant) };
        if function.flags.intersects(FunctionFlags::EXTERN | FunctionFlags::ABSTRACT | FunctionFlags::UNDEFINED) {
            return Err(EvalError::RuntimeOnly);
        }
        if let Some(intrinsic_id) = function.intrinsic {
            return self.intrinsics.call(intrinsic_id, &args).unwrap_or(Err(EvalError::UnsupportedIntrinsic));
        }
        let body = self.bodies.body_of(callee).ok_or(EvalError::NoEvaluableBody(callee))?;
        let mut frame = CallFrame::new(self_value.clone());
        // `self` is addressed through the ordinary `LValue` path, so it
        // must also live in `locals` under its own defn, not just in the
        // frame's dedicated `self_value` slot.
        if let (Some(self_defn), Some(value)) = (function.self_param, self_value) {
            frame.bind(self_defn, value);
        }
        self.bind_params(function, &args, &mut frame);
        self.eval(body, &mut frame)?;
        Ok(frame.return_value.take().unwrap_or(Value::Void))
    }

    fn bind_params(&self, function: &FunctionDefn, args: &[Value], frame: &mut CallFrame) {
        for (name, value) in function.parameter_scope.names().iter().zip(args.iter()) {
            if let Some(&param_defn) = function.parameter_scope.lookup(*name).first() {
                frame.bind(param_defn, value.clone());
            }
        }
    }

    fn construct(&self, ctor: DefnId, args: Vec<Value>) -> EvalResult {
        let ctor_defn = self.module.get(ctor);
        let class = ctor_defn.parent.ok_or(EvalError::NotAConstant)?;
        let object = Value::new_object(class);
        self.call_function(ctor, args, Some(object.clone()))?;
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_defn::{CompositeData, Defn, DefnKind as DK, FunctionDefn as FD, Scope, TypedefDefn};
    use thorn_ir::{Name, Span};
    use thorn_types::{CompositeKind, QualifiedType};

    fn i32_literal(arena: &mut thorn_expr::ExprArena, pool: &mut Pool, v: i128) -> ExprId {
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        arena.alloc(thorn_expr::Expr { kind: ExprKind::ConstInt(v), ty: QualifiedType::unqualified(i32_ty), span: Span::DUMMY })
    }

    #[test]
    fn addition_folds_two_int_literals() {
        let mut pool = Pool::new();
        let mut bodies = TypedBodies::new();
        let module = Module::new(Name::EMPTY);
        let intrinsics = IntrinsicRegistry::new();

        let a = i32_literal(bodies.arena_mut(), &mut pool, 2);
        let b = i32_literal(bodies.arena_mut(), &mut pool, 3);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let sum = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::BinaryOpcode { op: BinaryOpcode::Add, lhs: Box::new(a), rhs: Box::new(b) },
            ty: QualifiedType::unqualified(i32_ty),
            span: Span::DUMMY,
        });

        let evaluator = Evaluator::new(&pool, &module, &bodies, &intrinsics);
        let mut frame = CallFrame::new(None);
        let result = evaluator.eval(sum, &mut frame).unwrap();
        assert!(matches!(result, Value::Int(i) if i.raw() == 5));
    }

    #[test]
    fn division_by_zero_is_reported() {
        let mut pool = Pool::new();
        let mut bodies = TypedBodies::new();
        let module = Module::new(Name::EMPTY);
        let intrinsics = IntrinsicRegistry::new();

        let a = i32_literal(bodies.arena_mut(), &mut pool, 1);
        let zero = i32_literal(bodies.arena_mut(), &mut pool, 0);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let div = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::BinaryOpcode { op: BinaryOpcode::Div, lhs: Box::new(a), rhs: Box::new(zero) },
            ty: QualifiedType::unqualified(i32_ty),
            span: Span::DUMMY,
        });

        let evaluator = Evaluator::new(&pool, &module, &bodies, &intrinsics);
        let mut frame = CallFrame::new(None);
        assert_eq!(evaluator.eval(div, &mut frame), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn or_short_circuits_without_evaluating_the_right_operand() {
        let mut pool = Pool::new();
        let mut bodies = TypedBodies::new();
        let module = Module::new(Name::EMPTY);
        let intrinsics = IntrinsicRegistry::new();
        let bool_ty = pool.primitive(PrimitiveKind::Bool);

        let lhs = bodies.arena_mut().alloc(thorn_expr::Expr { kind: ExprKind::ConstInt(1), ty: QualifiedType::unqualified(bool_ty), span: Span::DUMMY });
        // The right operand would divide by zero if it were ever evaluated.
        let zero = i32_literal(bodies.arena_mut(), &mut pool, 0);
        let one = i32_literal(bodies.arena_mut(), &mut pool, 1);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let poison = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::BinaryOpcode { op: BinaryOpcode::Div, lhs: Box::new(one), rhs: Box::new(zero) },
            ty: QualifiedType::unqualified(i32_ty),
            span: Span::DUMMY,
        });
        let or_expr = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::Or(Box::new(lhs), Box::new(poison)),
            ty: QualifiedType::unqualified(bool_ty),
            span: Span::DUMMY,
        });

        let evaluator = Evaluator::new(&pool, &module, &bodies, &intrinsics);
        let mut frame = CallFrame::new(None);
        let result = evaluator.eval(or_expr, &mut frame).unwrap();
        assert!(matches!(result, Value::Bool(true)));
    }

    #[test]
    fn field_write_through_self_is_visible_after_construction() {
        let mut pool = Pool::new();
        let mut module = Module::new(Name::EMPTY);
        let mut bodies = TypedBodies::new();
        let intrinsics = IntrinsicRegistry::new();

        let field = module.alloc(Defn::new(Span::DUMMY, Name::EMPTY, Name::EMPTY, Name::EMPTY, DK::Var(thorn_defn::VarDefn { ty: pool.primitive(PrimitiveKind::I32), initializer: None })));
        let class = module.alloc(Defn::new(
            Span::DUMMY,
            Name::EMPTY,
            Name::EMPTY,
            Name::EMPTY,
            DK::Typedef(TypedefDefn {
                aliased_type: pool.primitive(PrimitiveKind::Void),
                composite: Some(CompositeData { kind: CompositeKind::Class, super_type: None, interfaces: Vec::new(), fields: vec![field], member_scope: Scope::new(), method_table: thorn_defn::MethodTable::default() }),
            }),
        ));

        let mut ctor_function = FD {
            flags: FunctionFlags::CTOR,
            local_scopes: Vec::new(),
            parameter_scope: Scope::new(),
            body: None,
            overridden: Vec::new(),
            intrinsic: None,
            merged_to: None,
            dispatch_index: None,
            return_type: None,
            self_param: None,
        };
        let self_defn = module.alloc(Defn::new(Span::DUMMY, Name::EMPTY, Name::EMPTY, Name::EMPTY, DK::Parameter(thorn_defn::ParameterDefn { ty: pool.composite_for(class, CompositeKind::Class), has_default: false, default: None, is_variadic: false })));
        ctor_function.self_param = Some(self_defn);

        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let value = bodies.arena_mut().alloc(thorn_expr::Expr { kind: ExprKind::ConstInt(7), ty: QualifiedType::unqualified(i32_ty), span: Span::DUMMY });
        let self_ref = bodies.arena_mut().alloc(thorn_expr::Expr { kind: ExprKind::LValue { defn: self_defn, base: None }, ty: QualifiedType::unqualified(pool.composite_for(class, CompositeKind::Class)), span: Span::DUMMY });
        let target = bodies
            .arena_mut()
            .alloc(thorn_expr::Expr { kind: ExprKind::LValue { defn: field, base: Some(self_ref) }, ty: QualifiedType::unqualified(i32_ty), span: Span::DUMMY });
        let body = bodies.arena_mut().alloc(thorn_expr::Expr { kind: ExprKind::Assign { target: Box::new(target), value: Box::new(value) }, ty: QualifiedType::unqualified(i32_ty), span: Span::DUMMY });

        let ctor = module.alloc(Defn::new(Span::DUMMY, Name::EMPTY, Name::EMPTY, Name::EMPTY, DK::Function(ctor_function)));
        module.get_mut(ctor).parent = Some(class);
        bodies.set_body(ctor, body);

        let evaluator = Evaluator::new(&pool, &module, &bodies, &intrinsics);
        let object = evaluator.construct(ctor, Vec::new()).unwrap();
        let Value::ObjectRef(obj) = object else { panic!("expected an object reference") };
        assert!(matches!(obj.borrow().get_field(field), Some(Value::Int(i)) if i.raw() == 7));
    }

    #[test]
    fn int_to_bool_cast_yields_a_bool_not_a_float() {
        let mut pool = Pool::new();
        let mut bodies = TypedBodies::new();
        let module = Module::new(Name::EMPTY);
        let intrinsics = IntrinsicRegistry::new();

        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let three = i32_literal(bodies.arena_mut(), &mut pool, 3);
        let cast = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::Cast { operand: Box::new(three), cast: Cast::NonZeroCompare, target: bool_ty },
            ty: QualifiedType::unqualified(bool_ty),
            span: Span::DUMMY,
        });

        let evaluator = Evaluator::new(&pool, &module, &bodies, &intrinsics);
        let mut frame = CallFrame::new(None);
        let result = evaluator.eval(cast, &mut frame).unwrap();
        assert!(matches!(result, Value::Bool(true)));
    }

    #[test]
    fn checked_union_member_cast_rejects_the_wrong_active_member() {
        let mut pool = Pool::new();
        let mut bodies = TypedBodies::new();
        let module = Module::new(Name::EMPTY);
        let intrinsics = IntrinsicRegistry::new();

        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let union_ty = pool.intern_union(vec![i32_ty, bool_ty], false);

        let seven = i32_literal(bodies.arena_mut(), &mut pool, 7);
        let wrapped = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::Cast { operand: Box::new(seven), cast: Cast::UnionCtorCast, target: union_ty },
            ty: QualifiedType::unqualified(union_ty),
            span: Span::DUMMY,
        });
        let checked_as_bool = bodies.arena_mut().alloc(thorn_expr::Expr {
            kind: ExprKind::Cast { operand: Box::new(wrapped), cast: Cast::CheckedUnionMemberCast, target: bool_ty },
            ty: QualifiedType::unqualified(bool_ty),
            span: Span::DUMMY,
        });

        let evaluator = Evaluator::new(&pool, &module, &bodies, &intrinsics);
        let mut frame = CallFrame::new(None);
        assert_eq!(evaluator.eval(checked_as_bool, &mut frame), Err(EvalError::RuntimeOnly));
    }
}
