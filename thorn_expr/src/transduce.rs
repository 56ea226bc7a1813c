//! The tree-transducer analyzer (§4.3): walks the untyped AST handed off
//! by the (external) parser and produces the typed expression ADT,
//! resolving names, properties, overloads, casts, and template type
//! arguments along the way.
//!
//! Every function body is transduced in one pass. Literals left as the
//! transient `UnsizedInt` placeholder, and the expected types they're
//! seen against along the way, are collected as plain obligations on
//! [`LoweredBody`] rather than resolved here: `thorn_infer` depends on
//! this crate (it finalizes directly into `ExprArena`/`ExprId`), so this
//! crate cannot call back into `thorn_infer` without a dependency cycle.
//! The caller — the compiler driver, which depends on both — feeds
//! `unsized_literals` and `expected_constraints` into a fresh
//! `InferenceEngine` and writes the resolution back into the arena.
//! Only the syntactic positions that actually carry an expected type
//! produce a constraint (a variable's declared type, a bound call
//! argument's parameter type, an assignment's target type, a `return`
//! against the function's return type); a fully general bidirectional
//! propagation through arbitrary subexpressions was judged out of scope
//! for this module.

use rustc_hash::FxHashMap;
use thorn_defn::{
    CompositeData, Defn, DefnKind, FunctionFlags, Module, ParameterDefn, PropertyDefn, Scope, Traits, TypedefDefn, VarDefn,
};
use thorn_diagnostic::{Diagnostic, DiagnosticQueue, DiagnosticSink, ErrorCode};
use thorn_ir::ast::{AstExprId, AstExprKind, BinaryOp, CallArg, ExprArena as AstArena, ParsedType, UnaryOp};
use thorn_ir::{DefnId, Name, NameInterner, Span};
use thorn_template::{deduce_from_explicit_args, is_partial_instantiation, BindingEnv, InstanceCache};
use thorn_types::{
    canonicalize_union, Cast, CompositeKind, CompositeLookup, ConversionRank, Idx, Pool, PrimitiveKind, Qualifiers, QualifiedType, TypeKind,
};

use crate::expr::{BinaryOpcode, CatchArm, CompareOp, Expr, ExprArena, ExprId, ExprKind, SwitchArm};
use crate::lvalue::{enclosing_function_allows_direct_member_access, reduce_load_value, reduce_store_value};
use crate::overload::{ambiguous_call_diagnostic, bind_arguments, resolve as resolve_overload, OverloadOutcome};
use crate::resolve::{classify_lookup, implicit_self, ExprList, LookupShape, NameResolutionError};

/// A well-known, reserved `DefnId` standing in for the builtin `String`
/// class. There is no builtin-type registry in this workspace (strings
/// are the only literal-backed reference type, and a real one would be
/// seeded by the module loader before any user source is transduced), so
/// string literals are given a type against this fixed identity instead.
const BUILTIN_STRING_DEFN: DefnId = DefnId(u32::MAX - 1);

/// Drives one function body's transduction from its AST root to a
/// finished, singular typed expression tree. Writes directly into the
/// caller's `ExprArena` (shared across every body in a `TypedBodies`
/// table) rather than a private one of its own, so `ExprId`s stay stable
/// once a body is handed off.
pub struct Lowering<'a, S: DiagnosticSink> {
    pool: &'a mut Pool,
    module: &'a mut Module,
    instances: &'a mut InstanceCache,
    ast: &'a AstArena,
    interner: &'a NameInterner,
    diagnostics: &'a mut DiagnosticQueue<S>,
    out: &'a mut ExprArena,
    unsized_literals: Vec<(ExprId, Vec<Idx>)>,
    expected_constraints: Vec<(ExprId, Idx)>,
    locals: Vec<FxHashMap<Name, DefnId>>,
    enclosing_function: Option<DefnId>,
    self_composite: Option<DefnId>,
    primitive_names: FxHashMap<Name, PrimitiveKind>,
}

/// The outcome of transducing one function body: the root expression (in
/// the caller's arena) and the unresolved obligations left for a
/// `thorn_infer::InferenceEngine` to settle. `unsized_literals` gives the
/// initial candidate set for each node still carrying the `UnsizedInt`
/// placeholder; `expected_constraints` gives the expected type seen
/// against a (possibly still-unsized) node at some syntactic position.
/// The driver mints one `TypingVar` per `unsized_literals` entry, applies
/// every matching `expected_constraints` entry, resolves, and substitutes
/// back into the arena.
pub struct LoweredBody {
    pub root: ExprId,
    pub unsized_literals: Vec<(ExprId, Vec<Idx>)>,
    pub expected_constraints: Vec<(ExprId, Idx)>,
}

impl<'a, S: DiagnosticSink> Lowering<'a, S> {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        pool: &'a mut Pool,
        module: &'a mut Module,
        instances: &'a mut InstanceCache,
        ast: &'a AstArena,
        interner: &'a NameInterner,
        diagnostics: &'a mut DiagnosticQueue<S>,
        out: &'a mut ExprArena,
        enclosing_function: Option<DefnId>,
        self_composite: Option<DefnId>,
    ) -> Self {
        let primitive_names = build_primitive_name_table(interner);
        Lowering {
            pool,
            module,
            instances,
            ast,
            interner,
            diagnostics,
            out,
            unsized_literals: Vec::new(),
            expected_constraints: Vec::new(),
            locals: vec![FxHashMap::default()],
            enclosing_function,
            self_composite,
            primitive_names,
        }
    }

    /// Transduces `root` and returns its root node alongside the
    /// inference obligations it left behind. The caller is expected to
    /// settle those against a `thorn_infer::InferenceEngine` and
    /// substitute the resolution back into the arena before treating any
    /// node's type as final.
    pub fn lower_body(mut self, root: AstExprId) -> LoweredBody {
        let result = self.lower_expr(root);
        LoweredBody {
            root: result,
            unsized_literals: self.unsized_literals,
            expected_constraints: self.expected_constraints,
        }
    }

    // ---- small helpers ----

    fn span_of(&self, id: AstExprId) -> Span {
        self.ast.get(id).span
    }

    fn alloc(&mut self, kind: ExprKind, ty: QualifiedType, span: Span) -> ExprId {
        self.out.alloc(Expr { kind, ty, span })
    }

    fn unqualified(&mut self, idx: Idx, kind: ExprKind, span: Span) -> ExprId {
        self.alloc(kind, QualifiedType::unqualified(idx), span)
    }

    fn error_node(&mut self, span: Span, code: ErrorCode, message: impl Into<String>) -> ExprId {
        self.diagnostics.report(Diagnostic::error(code, span, message.into()));
        let void = self.pool.primitive(PrimitiveKind::Void);
        self.out.error_val(QualifiedType::unqualified(void), span)
    }

    /// Records `expr`'s initial candidate set as an unsized-literal
    /// obligation for the driver's inference pass.
    fn mint_var(&mut self, expr: ExprId, candidates: Vec<Idx>) {
        self.unsized_literals.push((expr, candidates));
    }

    /// If `expr`'s current type is the transient `UnsizedInt` placeholder,
    /// records `expected` as a constraint obligation for the driver's
    /// inference pass. Every call site that knows an expected type for a
    /// subexpression it just lowered should run this.
    fn constrain_against(&mut self, expr: ExprId, expected: Idx) {
        if self.out.get(expr).ty.ty != self.pool.primitive(PrimitiveKind::UnsizedInt) {
            return;
        }
        self.expected_constraints.push((expr, expected));
    }

    fn all_integer_and_float_kinds(&self) -> Vec<PrimitiveKind> {
        vec![
            PrimitiveKind::I8,
            PrimitiveKind::I16,
            PrimitiveKind::I32,
            PrimitiveKind::I64,
            PrimitiveKind::U8,
            PrimitiveKind::U16,
            PrimitiveKind::U32,
            PrimitiveKind::U64,
            PrimitiveKind::Float,
            PrimitiveKind::Double,
        ]
    }

    // ---- scope management ----

    fn push_scope(&mut self) {
        self.locals.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.locals.pop();
        debug_assert!(!self.locals.is_empty(), "the outermost local scope must never be popped");
    }

    fn declare_local(&mut self, name: Name, defn: DefnId) {
        self.locals.last_mut().expect("at least one local scope is always present").insert(name, defn);
    }

    /// Name lookup precedence: block-local bindings (innermost first),
    /// then the enclosing function's parameters, then the enclosing
    /// composite's members, then the module's top level.
    fn lookup_name(&self, name: Name) -> ExprList {
        for frame in self.locals.iter().rev() {
            if let Some(&defn) = frame.get(&name) {
                return ExprList::single(defn);
            }
        }
        if let Some(function) = self.enclosing_function {
            if let DefnKind::Function(f) = &self.module.get(function).kind {
                let found = f.parameter_scope.lookup(name);
                if !found.is_empty() {
                    return ExprList { defns: found.to_vec() };
                }
            }
        }
        if let Some(composite) = self.self_composite {
            if let DefnKind::Typedef(TypedefDefn { composite: Some(data), .. }) = &self.module.get(composite).kind {
                let found = data.member_scope.lookup(name);
                if !found.is_empty() {
                    return ExprList { defns: found.to_vec() };
                }
            }
        }
        ExprList { defns: self.module.top_level_scope.lookup(name).to_vec() }
    }

    fn is_function_defn(&self, defn: DefnId) -> bool {
        matches!(self.module.get(defn).kind, DefnKind::Function(_))
    }

    // ---- type resolution (ParsedType -> Idx) ----

    fn resolve_qualified_type(&mut self, pt: &ParsedType, span: Span) -> QualifiedType {
        if let ParsedType::Qualified { inner, readonly, mutable, immutable, adopted, volatile } = pt {
            let ty = self.resolve_type(inner, span);
            let mut qualifiers = Qualifiers::empty();
            if *readonly {
                qualifiers |= Qualifiers::READONLY;
            }
            if *mutable {
                qualifiers |= Qualifiers::MUTABLE;
            }
            if *immutable {
                qualifiers |= Qualifiers::IMMUTABLE;
            }
            if *adopted {
                qualifiers |= Qualifiers::ADOPTED;
            }
            if *volatile {
                qualifiers |= Qualifiers::VOLATILE;
            }
            if !qualifiers.is_valid_combination() {
                self.diagnostics.report(Diagnostic::error(ErrorCode::InvalidQualifierCombination, span, "readonly/mutable/immutable are mutually exclusive"));
            }
            return QualifiedType { ty, qualifiers };
        }
        QualifiedType::unqualified(self.resolve_type(pt, span))
    }

    fn resolve_type(&mut self, pt: &ParsedType, span: Span) -> Idx {
        match pt {
            ParsedType::Named { path, args, span: named_span } => self.resolve_named_type(path, args, *named_span),
            ParsedType::Tuple(elements) => {
                let resolved = elements.iter().map(|e| self.resolve_type(e, span)).collect();
                self.pool.intern_tuple(resolved)
            }
            ParsedType::Union(members) => {
                let resolved: Vec<Idx> = members.iter().map(|m| self.resolve_type(m, span)).collect();
                let is_ref_only = |idx: Idx| matches!(self.pool.kind(self.pool.dealias(idx)), TypeKind::Composite { kind, .. } if kind.is_reference_kind());
                let small: smallvec::SmallVec<[Idx; 4]> = resolved.into_iter().collect();
                let (canonical, ref_only) = canonicalize_union(small, is_ref_only);
                self.pool.intern_union(canonical, ref_only)
            }
            ParsedType::NativeArray { element, length } => {
                let elem = self.resolve_type(element, span);
                self.pool.intern_native_array(elem, *length)
            }
            ParsedType::Address(pointee) => {
                let inner = self.resolve_type(pointee, span);
                self.pool.intern_address(inner)
            }
            ParsedType::FlexibleArray(element) => {
                let elem = self.resolve_type(element, span);
                self.pool.intern_flexible_array(elem)
            }
            ParsedType::Function { params, ret } => {
                let return_type = self.resolve_type(ret, span);
                let params = params
                    .iter()
                    .map(|p| thorn_types::FunctionParam {
                        name: Name::EMPTY,
                        ty: self.resolve_type(p, span),
                        has_default: false,
                        flags: thorn_types::ParamFlags::empty(),
                        variance: thorn_types::Variance::Invariant,
                    })
                    .collect();
                self.pool.intern_function(thorn_types::FunctionTypeData { params, return_type, self_param: None, is_static: true })
            }
            ParsedType::Qualified { inner, .. } => self.resolve_type(inner, span),
        }
    }

    fn resolve_named_type(&mut self, path: &[Name], args: &[ParsedType], span: Span) -> Idx {
        let Some(&last) = path.last() else {
            return self.error_type(span, "empty type path");
        };
        if args.is_empty() {
            if let Some(&kind) = self.primitive_names.get(&last) {
                return self.pool.primitive(kind);
            }
        }
        let lookup = self.lookup_name(last);
        let defn = match classify_lookup(&lookup, |d| self.is_function_defn(d)) {
            Ok(LookupShape::Single(defn)) => defn,
            _ => {
                self.diagnostics.report(Diagnostic::error(ErrorCode::Undefined, span, "undefined type name"));
                return self.error_type(span, "undefined type name");
            }
        };
        let DefnKind::Typedef(typedef) = &self.module.get(defn).kind else {
            self.diagnostics.report(Diagnostic::error(ErrorCode::IncompatibleTypes, span, "name does not refer to a type"));
            return self.error_type(span, "not a type");
        };
        if args.is_empty() {
            return match &typedef.composite {
                Some(data) => self.pool.composite_for(defn, data.kind),
                None => typedef.aliased_type,
            };
        }
        let resolved_args: Vec<Idx> = args.iter().map(|a| self.resolve_type(a, span)).collect();
        self.instantiate_template(defn, resolved_args, span)
    }

    fn error_type(&mut self, _span: Span, _why: &str) -> Idx {
        self.pool.primitive(PrimitiveKind::Void)
    }

    /// Instantiates a template composite for an explicit argument list.
    /// Each distinct binding gets exactly one clone, cached by
    /// `InstanceCache`; the clone shares its member list with the
    /// template verbatim rather than substituting parameter types
    /// through every member signature, which is a simplification this
    /// module accepts rather than building a full template-member
    /// rewriter.
    fn instantiate_template(&mut self, template: DefnId, bound_args: Vec<Idx>, span: Span) -> Idx {
        if !self.module.get(template).is_template() {
            self.diagnostics.report(Diagnostic::error(ErrorCode::InstantiationFailure, span, "type is not a template"));
            return self.error_type(span, "not a template");
        }

        if let Some(existing) = self.instances.lookup(template, &bound_args) {
            let kind = match &self.module.get(existing).kind {
                DefnKind::Typedef(typedef) => typedef.composite.as_ref().map_or(CompositeKind::Class, |c| c.kind),
                _ => CompositeKind::Class,
            };
            return self.pool.composite_for(existing, kind);
        }

        // Gather everything needed from the template as owned data before
        // allocating the instance defn, so no borrow of `self.module`
        // survives into the `alloc` call below.
        let (kind, aliased_type, super_type, interfaces, fields, member_entries, short_name) = {
            let template_defn = self.module.get(template);
            let short_name = template_defn.short_name;
            let DefnKind::Typedef(TypedefDefn { composite: Some(data), aliased_type }) = &template_defn.kind else {
                self.diagnostics.report(Diagnostic::error(ErrorCode::InstantiationFailure, span, "template is not a composite"));
                return self.error_type(span, "not a composite template");
            };
            let member_entries: Vec<(Name, DefnId)> =
                data.member_scope.names().iter().flat_map(|&name| data.member_scope.lookup(name).iter().map(move |&defn| (name, defn))).collect();
            (data.kind, *aliased_type, data.super_type, data.interfaces.clone(), data.fields.clone(), member_entries, short_name)
        };

        let vars: Vec<Idx> = match &self.module.get(template).template_signature {
            Some(signature) => signature.params.iter().map(|p| p.var).collect(),
            None => Vec::new(),
        };
        let deduced = deduce_from_explicit_args(&vars, &bound_args);
        let mut env = BindingEnv::new();
        for &var in &vars {
            if let Some(bound) = deduced.get(var) {
                env.bind(var, bound);
            }
        }
        let _ = env;

        let mut member_scope = Scope::new();
        for (name, defn) in member_entries {
            member_scope.insert(name, defn);
        }
        let owning_module = self.module.name;

        let instance_defn = self.module.alloc(Defn::new(
            span,
            short_name,
            owning_module,
            owning_module,
            DefnKind::Typedef(TypedefDefn {
                aliased_type,
                composite: Some(CompositeData { kind, super_type, interfaces, fields, member_scope, method_table: thorn_defn::MethodTable::new() }),
            }),
        ));
        self.module.get_mut(instance_defn).template_instance = Some(thorn_defn::TemplateInstanceRecord { template, bound_args: bound_args.clone() });
        if is_partial_instantiation(self.pool, &bound_args) {
            self.module.get_mut(instance_defn).traits.insert(Traits::PARTIAL_INSTANTIATION);
        }
        self.instances.insert(template, bound_args, instance_defn);
        self.pool.composite_for(instance_defn, kind)
    }

    // ---- main dispatch ----

    fn lower_expr(&mut self, id: AstExprId) -> ExprId {
        let span = self.span_of(id);
        match self.ast.get(id).kind.clone() {
            AstExprKind::IntLiteral(v) => {
                let unsized_ty = self.pool.primitive(PrimitiveKind::UnsizedInt);
                let node = self.unqualified(unsized_ty, ExprKind::ConstInt(v), span);
                let candidates = self.all_integer_and_float_kinds().into_iter().map(|k| self.pool.primitive(k)).collect();
                self.mint_var(node, candidates);
                node
            }
            AstExprKind::FloatLiteral(v) => {
                let double_ty = self.pool.primitive(PrimitiveKind::Double);
                self.unqualified(double_ty, ExprKind::ConstFloat(v), span)
            }
            AstExprKind::StringLiteral(s) => {
                let string_ty = self.pool.composite_for(BUILTIN_STRING_DEFN, CompositeKind::Class);
                self.unqualified(string_ty, ExprKind::ConstString(String::from(s)), span)
            }
            AstExprKind::CharLiteral(c) => {
                let char_ty = self.pool.primitive(PrimitiveKind::Char);
                self.unqualified(char_ty, ExprKind::ConstInt(c as i128), span)
            }
            AstExprKind::BoolLiteral(b) => self.lower_bool_literal(b, span),
            AstExprKind::NullLiteral => {
                let null_ty = self.pool.primitive(PrimitiveKind::Null);
                self.unqualified(null_ty, ExprKind::ConstNull, span)
            }
            AstExprKind::Ident(name) => self.lower_ident(name, span),
            AstExprKind::Member { base, member, member_span } => self.lower_member(base, member, member_span),
            AstExprKind::Call { callee, args } => self.lower_call(callee, &args, span),
            AstExprKind::Index { base, index } => self.lower_index(base, index, span),
            AstExprKind::Binary { op, lhs, rhs } => self.lower_binary(op, lhs, rhs, span),
            AstExprKind::Unary { op, operand } => self.lower_unary(op, operand, span),
            AstExprKind::Assign { target, value } => self.lower_assign(target, value, span),
            AstExprKind::New { ty, args } => self.lower_new(&ty, &args, span),
            AstExprKind::Tuple(elements) => self.lower_tuple(&elements, span),
            AstExprKind::ArrayLiteral(elements) => self.lower_array_literal(&elements, span),
            AstExprKind::If { cond, then_branch, else_branch } => self.lower_if(cond, then_branch, else_branch, span),
            AstExprKind::While { cond, body } => self.lower_while(cond, body, span),
            AstExprKind::DoWhile { body, cond } => self.lower_do_while(body, cond, span),
            AstExprKind::For { init, cond, step, body } => self.lower_for(init, cond, step, body, span),
            AstExprKind::ForEach { binding, iterable, body } => self.lower_for_each(binding, iterable, body, span),
            AstExprKind::Switch { scrutinee, arms } => self.lower_switch(scrutinee, &arms, span),
            AstExprKind::Try { body, catches, finally } => self.lower_try(body, &catches, finally, span),
            AstExprKind::Throw(operand) => {
                let value = self.lower_expr(operand);
                let void = self.pool.primitive(PrimitiveKind::Void);
                self.unqualified(void, ExprKind::Throw(Box::new(value)), span)
            }
            AstExprKind::Return(operand) => self.lower_return(operand, span),
            AstExprKind::Yield(operand) => {
                let value = self.lower_expr(operand);
                let ty = self.out.get(value).ty;
                self.alloc(ExprKind::Yield(Box::new(value)), ty, span)
            }
            AstExprKind::Break => {
                let void = self.pool.primitive(PrimitiveKind::Void);
                self.unqualified(void, ExprKind::Break, span)
            }
            AstExprKind::Continue => {
                let void = self.pool.primitive(PrimitiveKind::Void);
                self.unqualified(void, ExprKind::Continue, span)
            }
            AstExprKind::Block(statements) => self.lower_block(&statements, span),
            AstExprKind::VarDecl { name, is_mutable, declared_type, init } => {
                self.lower_var_decl(name, is_mutable, declared_type.as_ref(), init, span)
            }
            AstExprKind::Cast { expr, target, is_try } => self.lower_cast(expr, &target, is_try, span),
            AstExprKind::TypeLiteral(ty) => {
                let resolved = self.resolve_type(&ty, span);
                self.unqualified(resolved, ExprKind::TypeLiteral(resolved), span)
            }
            AstExprKind::Error => self.error_node(span, ErrorCode::Unimplemented, "AST contained an error node"),
        }
    }

    /// There is no dedicated boolean constant in the typed ADT (see
    /// `ExprKind`'s constant variants); a literal lowers to a trivial,
    /// always-true or always-false integer comparison instead, which the
    /// evaluator and codegen both already know how to fold.
    fn lower_bool_literal(&mut self, b: bool, span: Span) -> ExprId {
        let i32_ty = self.pool.primitive(PrimitiveKind::I32);
        let zero = self.unqualified(i32_ty, ExprKind::ConstInt(0), span);
        let one = self.unqualified(i32_ty, ExprKind::ConstInt(1), span);
        let bool_ty = self.pool.primitive(PrimitiveKind::Bool);
        let (lhs, rhs) = if b { (zero, zero) } else { (zero, one) };
        self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Eq, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span)
    }

    fn lower_ident(&mut self, name: Name, span: Span) -> ExprId {
        let list = self.lookup_name(name);
        match classify_lookup(&list, |d| self.is_function_defn(d)) {
            Ok(LookupShape::Single(defn)) => self.lower_name_load(defn, None, span),
            Ok(LookupShape::Overloaded(defns)) => {
                // A bare overloaded name with no call parens: this is
                // only meaningful as a `BoundMethod` value (e.g. passed
                // as a callback); pick the first candidate's defn as the
                // syntactic referent and let the caller's context (a
                // `Call`) re-resolve against real argument types. Used
                // standalone it is almost always a user error, but one
                // outside this module's job to diagnose further.
                let defn = defns[0];
                let base = implicit_self(self.enclosing_function.map(|f| self.module.get(f))).map(|s| self.lower_self_ref(s, span));
                let ty = self.function_type_of(defn);
                self.alloc(ExprKind::BoundMethod { defn, base: Box::new(base.unwrap_or_else(|| self.error_node(span, ErrorCode::InstanceMemberFromStatic, "no enclosing self"))) }, ty, span)
            }
            Err(NameResolutionError::Undefined) => self.error_node(span, ErrorCode::Undefined, "undefined name"),
            Err(NameResolutionError::AmbiguousName) => self.error_node(span, ErrorCode::AmbiguousName, "ambiguous name"),
            Err(NameResolutionError::StructuralCoercion) => self.error_node(span, ErrorCode::IncompatibleTypes, "name mixes a type and a function"),
        }
    }

    fn lower_self_ref(&mut self, self_defn: DefnId, span: Span) -> ExprId {
        let ty = self.var_type_of(self_defn);
        self.alloc(ExprKind::LValue { defn: self_defn, base: None }, ty, span)
    }

    fn var_type_of(&self, defn: DefnId) -> QualifiedType {
        match &self.module.get(defn).kind {
            DefnKind::Var(v) | DefnKind::Let(v) => QualifiedType::unqualified(v.ty),
            DefnKind::Parameter(p) => QualifiedType::unqualified(p.ty),
            DefnKind::Property(p) => QualifiedType::unqualified(p.ty),
            _ => QualifiedType::unqualified(self.pool_void()),
        }
    }

    fn pool_void(&self) -> Idx {
        // `Pool::primitive` doesn't need `&mut self`, but this helper
        // exists purely so call sites above don't need `&mut self` when
        // they only have `&self` borrowed.
        self.pool.primitive(PrimitiveKind::Void)
    }

    fn function_type_of(&mut self, defn: DefnId) -> QualifiedType {
        let DefnKind::Function(f) = &self.module.get(defn).kind else {
            return QualifiedType::unqualified(self.pool.primitive(PrimitiveKind::Void));
        };
        let return_type = f.return_type.unwrap_or_else(|| self.pool.primitive(PrimitiveKind::Void));
        QualifiedType::unqualified(return_type)
    }

    /// Loads a resolved name's value: a plain `LValue` for a
    /// var/let/parameter, a property getter call (direct or virtual) for
    /// a property, or a `BoundMethod` for a single resolved function.
    fn lower_name_load(&mut self, defn: DefnId, base: Option<ExprId>, span: Span) -> ExprId {
        match &self.module.get(defn).kind {
            DefnKind::Var(_) | DefnKind::Let(_) | DefnKind::Parameter(_) => {
                let ty = self.var_type_of(defn);
                reduce_load_value(ExprKind::LValue { defn, base }, None, self.out, ty, span)
            }
            DefnKind::Property(_) => self.lower_property_load(defn, base, span),
            DefnKind::Function(_) => {
                let ty = self.function_type_of(defn);
                let receiver = base.unwrap_or_else(|| {
                    implicit_self(self.enclosing_function.map(|f| self.module.get(f)))
                        .map(|s| self.lower_self_ref(s, span))
                        .unwrap_or_else(|| self.error_node(span, ErrorCode::InstanceMemberFromStatic, "no enclosing self"))
                });
                self.alloc(ExprKind::BoundMethod { defn, base: Box::new(receiver) }, ty, span)
            }
            _ => self.error_node(span, ErrorCode::IncompatibleTypes, "name does not refer to a value"),
        }
    }

    fn lower_property_load(&mut self, property_defn: DefnId, base: Option<ExprId>, span: Span) -> ExprId {
        let ty = self.var_type_of(property_defn);
        let direct_access_permitted = self.direct_member_access_permitted(property_defn);
        let owner_requires_vtable = self.owner_requires_vtable_dispatch(property_defn);
        let receiver = base.unwrap_or_else(|| {
            implicit_self(self.enclosing_function.map(|f| self.module.get(f)))
                .map(|s| self.lower_self_ref(s, span))
                .unwrap_or_else(|| self.error_node(span, ErrorCode::InstanceMemberFromStatic, "no enclosing self"))
        });
        let referent_kind = self.out.get(receiver).kind.clone();
        let property = match &self.module.get(property_defn).kind {
            DefnKind::Property(p) => PropertyDefn { ty: p.ty, getter: p.getter, setter: p.setter, backing_field: p.backing_field, is_final: p.is_final },
            _ => unreachable!("caller already matched Property"),
        };
        reduce_load_value(referent_kind, Some((&property, direct_access_permitted, owner_requires_vtable)), self.out, ty, span)
    }

    fn direct_member_access_permitted(&self, member: DefnId) -> bool {
        let Some(parent) = self.module.get(member).parent else { return false };
        let enclosing = self.enclosing_function.map(|f| self.module.get(f));
        enclosing_function_allows_direct_member_access(enclosing, parent)
    }

    fn owner_requires_vtable_dispatch(&self, member: DefnId) -> bool {
        let Some(parent) = self.module.get(member).parent else { return true };
        matches!(self.module.composite_kind(parent), CompositeKind::Interface | CompositeKind::Protocol)
    }

    fn lower_member(&mut self, base: AstExprId, member: Name, member_span: Span) -> ExprId {
        let base_id = self.lower_expr(base);
        let base_ty = self.pool.dealias(self.out.get(base_id).ty.ty);
        let TypeKind::Composite { defn: composite, .. } = self.pool.kind(base_ty) else {
            return self.error_node(member_span, ErrorCode::IncompatibleTypes, "member access on a non-composite type");
        };
        let composite = *composite;
        let DefnKind::Typedef(TypedefDefn { composite: Some(data), .. }) = &self.module.get(composite).kind else {
            return self.error_node(member_span, ErrorCode::IncompatibleTypes, "member access on a non-composite type");
        };
        let found = data.member_scope.lookup(member).to_vec();
        let list = ExprList { defns: found };
        match classify_lookup(&list, |d| self.is_function_defn(d)) {
            Ok(LookupShape::Single(defn)) => self.lower_name_load(defn, Some(base_id), member_span),
            Ok(LookupShape::Overloaded(defns)) => {
                let defn = defns[0];
                let ty = self.function_type_of(defn);
                self.alloc(ExprKind::BoundMethod { defn, base: Box::new(base_id) }, ty, member_span)
            }
            Err(_) => self.error_node(member_span, ErrorCode::Undefined, "undefined member"),
        }
    }

    fn lower_index(&mut self, base: AstExprId, index: AstExprId, span: Span) -> ExprId {
        let base_id = self.lower_expr(base);
        let index_id = self.lower_expr(index);
        let base_ty = self.pool.dealias(self.out.get(base_id).ty.ty);
        let element_ty = match self.pool.kind(base_ty) {
            TypeKind::NativeArray { element, .. } | TypeKind::FlexibleArray(element) => *element,
            _ => self.pool.primitive(PrimitiveKind::Void),
        };
        self.unqualified(element_ty, ExprKind::ElementRef { base: Box::new(base_id), index: Box::new(index_id) }, span)
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: AstExprId, rhs: AstExprId, span: Span) -> ExprId {
        let lhs_id = self.lower_expr(lhs);
        let rhs_id = self.lower_expr(rhs);
        let lhs_ty = self.out.get(lhs_id).ty.ty;
        let rhs_ty = self.out.get(rhs_id).ty.ty;
        let unsized_ty = self.pool.primitive(PrimitiveKind::UnsizedInt);
        if lhs_ty == unsized_ty && rhs_ty != unsized_ty {
            self.constrain_against(lhs_id, rhs_ty);
        } else if rhs_ty == unsized_ty && lhs_ty != unsized_ty {
            self.constrain_against(rhs_id, lhs_ty);
        }
        let result_ty = if lhs_ty == unsized_ty { rhs_ty } else { lhs_ty };
        let bool_ty = self.pool.primitive(PrimitiveKind::Bool);

        match op {
            BinaryOp::Add => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Add, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Sub => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Sub, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Mul => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Mul, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Div => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Div, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Rem => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Rem, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::BitAnd => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::BitAnd, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::BitOr => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::BitOr, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::BitXor => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::BitXor, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Shl => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Shl, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Shr => self.unqualified(result_ty, ExprKind::BinaryOpcode { op: BinaryOpcode::Shr, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Eq => self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Eq, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Ne => self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Ne, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Lt => self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Lt, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Le => self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Le, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Gt => self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Gt, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::Ge => self.unqualified(bool_ty, ExprKind::Compare { op: CompareOp::Ge, lhs: Box::new(lhs_id), rhs: Box::new(rhs_id) }, span),
            BinaryOp::And => self.unqualified(bool_ty, ExprKind::And(Box::new(lhs_id), Box::new(rhs_id)), span),
            BinaryOp::Or => self.unqualified(bool_ty, ExprKind::Or(Box::new(lhs_id), Box::new(rhs_id)), span),
            BinaryOp::RefEq => self.unqualified(bool_ty, ExprKind::RefEq { lhs: Box::new(lhs_id), rhs: Box::new(rhs_id), negate: false }, span),
        }
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: AstExprId, span: Span) -> ExprId {
        let operand_id = self.lower_expr(operand);
        let ty = self.out.get(operand_id).ty;
        match op {
            UnaryOp::Not => self.unqualified(self.pool.primitive(PrimitiveKind::Bool), ExprKind::Not(Box::new(operand_id)), span),
            UnaryOp::Complement => self.alloc(ExprKind::Complement(Box::new(operand_id)), ty, span),
            UnaryOp::Neg => {
                // No dedicated negation node exists in the typed ADT;
                // `-x` lowers to `0 - x` in `x`'s own type.
                let is_float = matches!(self.pool.kind(self.pool.dealias(ty.ty)), TypeKind::Primitive(k) if k.is_float());
                let zero = if is_float {
                    self.alloc(ExprKind::ConstFloat(0.0), ty, span)
                } else {
                    self.alloc(ExprKind::ConstInt(0), ty, span)
                };
                self.alloc(ExprKind::BinaryOpcode { op: BinaryOpcode::Sub, lhs: Box::new(zero), rhs: Box::new(operand_id) }, ty, span)
            }
        }
    }

    fn lower_assign(&mut self, target: AstExprId, value: AstExprId, span: Span) -> ExprId {
        let value_id = self.lower_expr(value);
        let (target_kind, property, ty) = self.lower_assign_target(target);
        self.constrain_against(value_id, ty.ty);
        match property {
            Some((property_defn, direct, vtable)) => {
                let p = match &self.module.get(property_defn).kind {
                    DefnKind::Property(p) => PropertyDefn { ty: p.ty, getter: p.getter, setter: p.setter, backing_field: p.backing_field, is_final: p.is_final },
                    _ => return self.error_node(span, ErrorCode::IncompatibleTypes, "assignment target is not a property"),
                };
                reduce_store_value(target_kind, Some((&p, direct, vtable)), value_id, self.out, ty, span)
            }
            None => reduce_store_value(target_kind, None, value_id, self.out, ty, span),
        }
    }

    /// Resolves an assignment's target to its lvalue shape: a plain
    /// field/variable/element, or a property (by defn, so the caller can
    /// re-borrow a fresh `&PropertyDefn` right before it's needed).
    fn lower_assign_target(&mut self, target: AstExprId) -> (ExprKind, Option<(DefnId, bool, bool)>, QualifiedType) {
        let span = self.span_of(target);
        match self.ast.get(target).kind.clone() {
            AstExprKind::Ident(name) => {
                let list = self.lookup_name(name);
                match classify_lookup(&list, |d| self.is_function_defn(d)) {
                    Ok(LookupShape::Single(defn)) if matches!(self.module.get(defn).kind, DefnKind::Property(_)) => {
                        let direct = self.direct_member_access_permitted(defn);
                        let vtable = self.owner_requires_vtable_dispatch(defn);
                        (ExprKind::LValue { defn, base: None }, Some((defn, direct, vtable)), self.var_type_of(defn))
                    }
                    Ok(LookupShape::Single(defn)) => (ExprKind::LValue { defn, base: None }, None, self.var_type_of(defn)),
                    _ => (ExprKind::ErrorVal, None, QualifiedType::unqualified(self.pool_void())),
                }
            }
            AstExprKind::Member { base, member, member_span } => {
                let base_id = self.lower_expr(base);
                let base_ty = self.pool.dealias(self.out.get(base_id).ty.ty);
                let TypeKind::Composite { defn: composite, .. } = self.pool.kind(base_ty) else {
                    return (ExprKind::ErrorVal, None, QualifiedType::unqualified(self.pool_void()));
                };
                let composite = *composite;
                let DefnKind::Typedef(TypedefDefn { composite: Some(data), .. }) = &self.module.get(composite).kind else {
                    return (ExprKind::ErrorVal, None, QualifiedType::unqualified(self.pool_void()));
                };
                let found = data.member_scope.lookup(member).to_vec();
                let Some(&defn) = found.first() else {
                    self.diagnostics.report(Diagnostic::error(ErrorCode::Undefined, member_span, "undefined member"));
                    return (ExprKind::ErrorVal, None, QualifiedType::unqualified(self.pool_void()));
                };
                if matches!(self.module.get(defn).kind, DefnKind::Property(_)) {
                    let direct = self.direct_member_access_permitted(defn);
                    let vtable = self.owner_requires_vtable_dispatch(defn);
                    (ExprKind::LValue { defn, base: Some(base_id) }, Some((defn, direct, vtable)), self.var_type_of(defn))
                } else {
                    (ExprKind::LValue { defn, base: Some(base_id) }, None, self.var_type_of(defn))
                }
            }
            AstExprKind::Index { base, index } => {
                let base_id = self.lower_expr(base);
                let index_id = self.lower_expr(index);
                let base_ty = self.pool.dealias(self.out.get(base_id).ty.ty);
                let element_ty = match self.pool.kind(base_ty) {
                    TypeKind::NativeArray { element, .. } | TypeKind::FlexibleArray(element) => *element,
                    _ => self.pool.primitive(PrimitiveKind::Void),
                };
                (ExprKind::ElementRef { base: Box::new(base_id), index: Box::new(index_id) }, None, QualifiedType::unqualified(element_ty))
            }
            _ => {
                self.diagnostics.report(Diagnostic::error(ErrorCode::IncompatibleTypes, span, "not an assignable expression"));
                (ExprKind::ErrorVal, None, QualifiedType::unqualified(self.pool_void()))
            }
        }
    }

    fn lower_call(&mut self, callee: AstExprId, args: &[CallArg], span: Span) -> ExprId {
        let arg_ids: Vec<ExprId> = args.iter().map(|a| self.lower_expr(a.value)).collect();
        let arg_types: Vec<Idx> = arg_ids.iter().map(|&id| self.out.get(id).ty.ty).collect();
        let named = named_arguments(args);

        let overload_set = match &self.ast.get(callee).kind {
            AstExprKind::Ident(name) => {
                let list = self.lookup_name(*name);
                match classify_lookup(&list, |d| self.is_function_defn(d)) {
                    Ok(LookupShape::Overloaded(defns)) => Some((defns, None)),
                    Ok(LookupShape::Single(defn)) if self.is_function_defn(defn) => Some((vec![defn], None)),
                    _ => None,
                }
            }
            AstExprKind::Member { base, member, .. } => {
                let base_id = self.lower_expr(*base);
                let base_ty = self.pool.dealias(self.out.get(base_id).ty.ty);
                if let TypeKind::Composite { defn: composite, .. } = self.pool.kind(base_ty) {
                    let composite = *composite;
                    if let DefnKind::Typedef(TypedefDefn { composite: Some(data), .. }) = &self.module.get(composite).kind {
                        let found = data.member_scope.lookup(*member).to_vec();
                        let funcs: Vec<DefnId> = found.into_iter().filter(|d| self.is_function_defn(*d)).collect();
                        if funcs.is_empty() { None } else { Some((funcs, Some(base_id))) }
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
            _ => None,
        };

        let Some((candidates_defns, receiver)) = overload_set else {
            let callee_id = self.lower_expr(callee);
            let void = self.pool.primitive(PrimitiveKind::Void);
            return self.unqualified(void, ExprKind::IndirectCall { callee: Box::new(callee_id), args: arg_ids }, span);
        };

        self.resolve_and_emit_call(candidates_defns, receiver, arg_ids, &arg_types, &named, span)
    }

    fn resolve_and_emit_call(
        &mut self,
        candidates_defns: Vec<DefnId>,
        receiver: Option<ExprId>,
        arg_ids: Vec<ExprId>,
        arg_types: &[Idx],
        named: &FxHashMap<Name, usize>,
        span: Span,
    ) -> ExprId {
        let positional_count = arg_ids.len() - named.len();
        let mut candidates = Vec::new();
        for defn in &candidates_defns {
            let DefnKind::Function(f) = &self.module.get(*defn).kind else { continue };
            let params: Vec<&ParameterDefn> = f
                .parameter_scope
                .names()
                .iter()
                .flat_map(|&n| f.parameter_scope.lookup(n).to_vec())
                .filter_map(|p| match &self.module.get(p).kind {
                    DefnKind::Parameter(pd) => Some(pd),
                    _ => None,
                })
                .collect();
            let param_types: Vec<Idx> = params.iter().map(|pd| pd.ty).collect();
            let has_default: Vec<bool> = params.iter().map(|pd| pd.has_default).collect();
            let variadic_param = params.iter().position(|pd| pd.is_variadic);
            let param_names: Vec<Name> = f.parameter_scope.names().to_vec();
            if let Some(mut candidate) = bind_arguments(&param_types, &param_names, &has_default, variadic_param, positional_count, named) {
                candidate.defn = *defn;
                candidates.push(candidate);
            }
        }

        match resolve_overload(self.pool, self.module, candidates, arg_types) {
            OverloadOutcome::Resolved(defn) => {
                let arg_param_indices = if let DefnKind::Function(f) = &self.module.get(defn).kind {
                    let param_names: Vec<Name> = f.parameter_scope.names().to_vec();
                    call_arg_param_indices(&param_names, positional_count, named)
                } else {
                    Vec::new()
                };
                for (i, &arg_id) in arg_ids.iter().enumerate() {
                    let Some(&Some(param_index)) = arg_param_indices.get(i) else { continue };
                    if let DefnKind::Function(f) = &self.module.get(defn).kind {
                        let params: Vec<DefnId> = f.parameter_scope.names().iter().flat_map(|&n| f.parameter_scope.lookup(n).to_vec()).collect();
                        if let Some(&param_defn) = params.get(param_index) {
                            if let DefnKind::Parameter(p) = &self.module.get(param_defn).kind {
                                let param_ty = p.ty;
                                self.constrain_against(arg_id, param_ty);
                            }
                        }
                    }
                }
                let ty = self.function_type_of(defn);
                let virtual_dispatch = receiver.is_some() && self.owner_requires_vtable_dispatch(defn);
                match (receiver, virtual_dispatch) {
                    (Some(recv), true) => self.alloc(ExprKind::VTableCall { receiver: Box::new(recv), slot: 0, args: arg_ids }, ty, span),
                    _ => self.alloc(ExprKind::FnCall { callee: defn, args: arg_ids }, ty, span),
                }
            }
            OverloadOutcome::NoMatch => self.error_node(span, ErrorCode::NoMatchingOverload, "no overload matches this call"),
            OverloadOutcome::Ambiguous(survivors) => {
                let diag = ambiguous_call_diagnostic(span, Name::EMPTY, "<call>", &survivors);
                self.diagnostics.report(diag);
                let void = self.pool.primitive(PrimitiveKind::Void);
                self.out.error_val(QualifiedType::unqualified(void), span)
            }
        }
    }

    fn lower_new(&mut self, ty: &ParsedType, args: &[CallArg], span: Span) -> ExprId {
        let resolved_ty = self.resolve_type(ty, span);
        let dealiased = self.pool.dealias(resolved_ty);
        let TypeKind::Composite { defn: composite, .. } = self.pool.kind(dealiased) else {
            return self.error_node(span, ErrorCode::IncompatibleTypes, "`new` target is not a composite type");
        };
        let composite = *composite;
        let arg_ids: Vec<ExprId> = args.iter().map(|a| self.lower_expr(a.value)).collect();
        let arg_types: Vec<Idx> = arg_ids.iter().map(|&id| self.out.get(id).ty.ty).collect();
        let ctor_candidates = self.constructor_candidates(composite);
        if ctor_candidates.is_empty() {
            return self.error_node(span, ErrorCode::NoMatchingOverload, "no constructor found");
        }
        let named = named_arguments(args);
        match self.resolve_and_emit_call(ctor_candidates, None, arg_ids, &arg_types, &named, span) {
            id => {
                // Re-shape the resolved call into a `New` node targeting
                // the same ctor defn, at the composite's own type.
                let ctor_defn = match &self.out.get(id).kind {
                    ExprKind::FnCall { callee, args } => Some((*callee, args.clone())),
                    _ => None,
                };
                match ctor_defn {
                    Some((ctor, args)) => self.unqualified(resolved_ty, ExprKind::New { ctor, args }, span),
                    None => id,
                }
            }
        }
    }

    /// Constructors are looked up under the composite's own short name,
    /// filtered to members actually marked `FunctionFlags::CTOR` — the
    /// convention this workspace's scope builder is assumed to follow
    /// when it registers a class's constructors (see `thorn_defn`'s
    /// `FunctionFlags`).
    fn constructor_candidates(&self, composite: DefnId) -> Vec<DefnId> {
        let short_name = self.module.get(composite).short_name;
        let DefnKind::Typedef(TypedefDefn { composite: Some(data), .. }) = &self.module.get(composite).kind else {
            return Vec::new();
        };
        data.member_scope
            .lookup(short_name)
            .iter()
            .copied()
            .filter(|&d| matches!(&self.module.get(d).kind, DefnKind::Function(f) if f.flags.contains(FunctionFlags::CTOR)))
            .collect()
    }

    fn lower_tuple(&mut self, elements: &[AstExprId], span: Span) -> ExprId {
        let ids: Vec<ExprId> = elements.iter().map(|&e| self.lower_expr(e)).collect();
        let types: Vec<Idx> = ids.iter().map(|&id| self.out.get(id).ty.ty).collect();
        let tuple_ty = self.pool.intern_tuple(types);
        self.unqualified(tuple_ty, ExprKind::TupleCtor(ids), span)
    }

    fn lower_array_literal(&mut self, elements: &[AstExprId], span: Span) -> ExprId {
        if elements.is_empty() {
            let void = self.pool.primitive(PrimitiveKind::Void);
            let array_ty = self.pool.intern_native_array(void, 0);
            return self.unqualified(array_ty, ExprKind::ConstEmptyArray, span);
        }
        let ids: Vec<ExprId> = elements.iter().map(|&e| self.lower_expr(e)).collect();
        let element_ty = self.out.get(ids[0]).ty.ty;
        for &id in &ids[1..] {
            self.constrain_against(id, element_ty);
        }
        let array_ty = self.pool.intern_native_array(element_ty, ids.len() as u64);
        self.unqualified(array_ty, ExprKind::ArrayLiteral(ids), span)
    }

    fn lower_if(&mut self, cond: AstExprId, then_branch: AstExprId, else_branch: Option<AstExprId>, span: Span) -> ExprId {
        let cond_id = self.lower_expr(cond);
        self.push_scope();
        let then_id = self.lower_expr(then_branch);
        self.pop_scope();
        let ty = self.out.get(then_id).ty;
        let else_id = else_branch.map(|e| {
            self.push_scope();
            let id = self.lower_expr(e);
            self.pop_scope();
            id
        });
        self.alloc(ExprKind::If { cond: Box::new(cond_id), then_branch: Box::new(then_id), else_branch: else_id.map(Box::new) }, ty, span)
    }

    fn lower_while(&mut self, cond: AstExprId, body: AstExprId, span: Span) -> ExprId {
        let cond_id = self.lower_expr(cond);
        self.push_scope();
        let body_id = self.lower_expr(body);
        self.pop_scope();
        let void = self.pool.primitive(PrimitiveKind::Void);
        self.unqualified(void, ExprKind::While { cond: Box::new(cond_id), body: Box::new(body_id) }, span)
    }

    fn lower_do_while(&mut self, body: AstExprId, cond: AstExprId, span: Span) -> ExprId {
        self.push_scope();
        let body_id = self.lower_expr(body);
        self.pop_scope();
        let cond_id = self.lower_expr(cond);
        let void = self.pool.primitive(PrimitiveKind::Void);
        self.unqualified(void, ExprKind::DoWhile { body: Box::new(body_id), cond: Box::new(cond_id) }, span)
    }

    fn lower_for(&mut self, init: Option<AstExprId>, cond: Option<AstExprId>, step: Option<AstExprId>, body: AstExprId, span: Span) -> ExprId {
        self.push_scope();
        let init_id = init.map(|i| self.lower_expr(i));
        let cond_id = cond.map(|c| self.lower_expr(c));
        let step_id = step.map(|s| self.lower_expr(s));
        let body_id = self.lower_expr(body);
        self.pop_scope();
        let void = self.pool.primitive(PrimitiveKind::Void);
        self.unqualified(
            void,
            ExprKind::For { init: init_id.map(Box::new), cond: cond_id.map(Box::new), step: step_id.map(Box::new), body: Box::new(body_id) },
            span,
        )
    }

    fn lower_for_each(&mut self, binding: Name, iterable: AstExprId, body: AstExprId, span: Span) -> ExprId {
        let iterable_id = self.lower_expr(iterable);
        let iterable_ty = self.pool.dealias(self.out.get(iterable_id).ty.ty);
        let element_ty = match self.pool.kind(iterable_ty) {
            TypeKind::NativeArray { element, .. } | TypeKind::FlexibleArray(element) => *element,
            _ => self.pool.primitive(PrimitiveKind::Void),
        };
        self.push_scope();
        let owning_module = self.module.name;
        let binding_defn = self.module.alloc(Defn::new(span, binding, owning_module, owning_module, DefnKind::Var(VarDefn { ty: element_ty, initializer: None })));
        self.declare_local(binding, binding_defn);
        let body_id = self.lower_expr(body);
        self.pop_scope();
        let void = self.pool.primitive(PrimitiveKind::Void);
        self.unqualified(void, ExprKind::ForEach { binding: binding_defn, iterable: Box::new(iterable_id), body: Box::new(body_id) }, span)
    }

    fn lower_switch(&mut self, scrutinee: AstExprId, arms: &[thorn_ir::ast::SwitchArm], span: Span) -> ExprId {
        let scrutinee_id = self.lower_expr(scrutinee);
        let scrutinee_ty = self.out.get(scrutinee_id).ty.ty;
        let mut typed_arms = Vec::new();
        let mut result_ty = None;
        for arm in arms {
            self.push_scope();
            let body_id = self.lower_expr(arm.body);
            self.pop_scope();
            if result_ty.is_none() {
                result_ty = Some(self.out.get(body_id).ty);
            }
            for &value in &arm.values {
                let value_id = self.lower_expr(value);
                self.constrain_against(value_id, scrutinee_ty);
                typed_arms.push(SwitchArm { value: value_id, body: body_id });
            }
        }
        let ty = result_ty.unwrap_or_else(|| QualifiedType::unqualified(self.pool.primitive(PrimitiveKind::Void)));
        self.alloc(ExprKind::Switch { scrutinee: Box::new(scrutinee_id), arms: typed_arms }, ty, span)
    }

    fn lower_try(&mut self, body: AstExprId, catches: &[thorn_ir::ast::CatchArm], finally: Option<AstExprId>, span: Span) -> ExprId {
        self.push_scope();
        let body_id = self.lower_expr(body);
        self.pop_scope();
        let ty = self.out.get(body_id).ty;
        let mut typed_catches = Vec::new();
        for catch in catches {
            self.push_scope();
            let exception_ty = catch.declared_type.as_ref().map_or_else(|| self.pool.primitive(PrimitiveKind::Void), |t| self.resolve_type(t, span));
            let owning_module = self.module.name;
            let binding_defn = self.module.alloc(Defn::new(span, catch.binding, owning_module, owning_module, DefnKind::Var(VarDefn { ty: exception_ty, initializer: None })));
            self.declare_local(catch.binding, binding_defn);
            let catch_body = self.lower_expr(catch.body);
            self.pop_scope();
            typed_catches.push(CatchArm { exception_ty, binding: Some(binding_defn), body: catch_body });
        }
        let finally_id = finally.map(|f| {
            self.push_scope();
            let id = self.lower_expr(f);
            self.pop_scope();
            id
        });
        self.alloc(ExprKind::Try { body: Box::new(body_id), catches: typed_catches, finally: finally_id.map(Box::new) }, ty, span)
    }

    fn lower_return(&mut self, operand: Option<AstExprId>, span: Span) -> ExprId {
        let value_id = operand.map(|o| self.lower_expr(o));
        if let (Some(value_id), Some(function)) = (value_id, self.enclosing_function) {
            if let DefnKind::Function(f) = &self.module.get(function).kind {
                if let Some(return_type) = f.return_type {
                    self.constrain_against(value_id, return_type);
                }
            }
        }
        let void = self.pool.primitive(PrimitiveKind::Void);
        self.unqualified(void, ExprKind::Return(value_id.map(Box::new)), span)
    }

    fn lower_block(&mut self, statements: &[AstExprId], span: Span) -> ExprId {
        self.push_scope();
        let ids: Vec<ExprId> = statements.iter().map(|&s| self.lower_expr(s)).collect();
        self.pop_scope();
        let ty = ids.last().map_or_else(|| QualifiedType::unqualified(self.pool.primitive(PrimitiveKind::Void)), |&id| self.out.get(id).ty);
        self.alloc(ExprKind::Seq(ids), ty, span)
    }

    fn lower_var_decl(&mut self, name: Name, _is_mutable: bool, declared_type: Option<&ParsedType>, init: Option<AstExprId>, span: Span) -> ExprId {
        let declared_ty = declared_type.map(|t| self.resolve_type(t, span));
        let init_id = init.map(|i| self.lower_expr(i));
        if let (Some(declared), Some(init_id)) = (declared_ty, init_id) {
            self.constrain_against(init_id, declared);
        }
        let var_ty = declared_ty.or_else(|| init_id.map(|id| self.out.get(id).ty.ty)).unwrap_or_else(|| self.pool.primitive(PrimitiveKind::Void));
        let owning_module = self.module.name;
        let defn = self.module.alloc(Defn::new(span, name, owning_module, owning_module, DefnKind::Var(VarDefn { ty: var_ty, initializer: None })));
        self.declare_local(name, defn);
        match init_id {
            Some(value) => self.unqualified(var_ty, ExprKind::InitVar { defn, value: Box::new(value) }, span),
            None => self.unqualified(var_ty, ExprKind::ClearVar { defn }, span),
        }
    }

    fn lower_cast(&mut self, expr: AstExprId, target: &ParsedType, is_try: bool, span: Span) -> ExprId {
        let operand_id = self.lower_expr(expr);
        let from = self.out.get(operand_id).ty.ty;
        let to = self.resolve_type(target, span);
        self.constrain_against(operand_id, to);
        let from = self.pool.dealias(self.out.get(operand_id).ty.ty);
        let from_cleared = if from == self.pool.primitive(PrimitiveKind::UnsizedInt) { to } else { from };
        let rank = thorn_types::is_assignable(self.pool, self.module, from_cleared, to);
        let cast = if is_try {
            Cast::TryCast
        } else {
            match thorn_types::conversion_cast(self.pool, self.module, from_cleared, to, rank) {
                Some(c) => c,
                None if rank == ConversionRank::IdenticalTypes => Cast::Identity,
                None => {
                    self.diagnostics.report(Diagnostic::error(ErrorCode::IncompatibleTypes, span, "no conversion exists between these types"));
                    Cast::BitCast
                }
            }
        };
        self.unqualified(to, ExprKind::Cast { operand: Box::new(operand_id), cast, target: to }, span)
    }
}

/// Maps each labeled argument's `label` to its position in `args`,
/// leaving unlabeled (positional) arguments out entirely.
fn named_arguments(args: &[CallArg]) -> FxHashMap<Name, usize> {
    args.iter().enumerate().filter_map(|(i, a)| a.label.map(|label| (label, i))).collect()
}

/// For each call-argument position, the index of the parameter it binds
/// to (mirrors the binding `bind_arguments` computed for the winning
/// candidate): positional arguments bind index-for-index, labeled ones
/// by matching `param_names`.
fn call_arg_param_indices(param_names: &[Name], positional_count: usize, named: &FxHashMap<Name, usize>) -> Vec<Option<usize>> {
    let mut mapping = vec![None; positional_count + named.len()];
    for (i, slot) in mapping.iter_mut().enumerate().take(positional_count) {
        *slot = Some(i);
    }
    for (&label, &call_index) in named {
        if let Some(param_index) = param_names.iter().position(|&n| n == label) {
            if let Some(slot) = mapping.get_mut(call_index) {
                *slot = Some(param_index);
            }
        }
    }
    mapping
}

fn build_primitive_name_table(interner: &NameInterner) -> FxHashMap<Name, PrimitiveKind> {
    let mut table = FxHashMap::default();
    let entries = [
        ("void", PrimitiveKind::Void),
        ("null", PrimitiveKind::Null),
        ("bool", PrimitiveKind::Bool),
        ("char", PrimitiveKind::Char),
        ("i8", PrimitiveKind::I8),
        ("i16", PrimitiveKind::I16),
        ("i32", PrimitiveKind::I32),
        ("i64", PrimitiveKind::I64),
        ("u8", PrimitiveKind::U8),
        ("u16", PrimitiveKind::U16),
        ("u32", PrimitiveKind::U32),
        ("u64", PrimitiveKind::U64),
        ("float", PrimitiveKind::Float),
        ("double", PrimitiveKind::Double),
    ];
    for (name, kind) in entries {
        table.insert(interner.intern(name), kind);
    }
    table
}

