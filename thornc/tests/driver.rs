//! End-to-end coverage of the driver's `ControlFlowPass`: hand-built
//! `AstExprId` trees are transduced, the unsized literals they leave
//! behind are resolved against an `InferenceEngine`, and the finished
//! bodies are run through `thorn_eval` to check the observable result.
//! There is no parser in this workspace, so every test stands up its
//! `Module`/`ExprArena` directly rather than compiling source text.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use thorn_defn::{Defn, DefnKind, FunctionDefn, FunctionFlags, Module, ParameterDefn, Scope, Traits};
use thorn_diagnostic::BufferSink;
use thorn_eval::{CallFrame, Evaluator, IntrinsicRegistry, Value};
use thorn_expr::TypedBodies;
use thorn_ir::ast::{AstExpr, AstExprKind, BinaryOp, ExprArena as AstArena};
use thorn_ir::{NameInterner, Span};
use thorn_types::PrimitiveKind;
use thornc::context::CompilationContext;
use thornc::driver;

/// `f(x: i32) -> i32 { return x + 1; }`, called with `x = 2`.
///
/// Covers the full `ControlFlowPass` round trip: the literal `1` is
/// transduced with the transient `UnsizedInt` placeholder, `lower_binary`
/// constrains it against `x`'s type, `lower_return` constrains the whole
/// expression against the function's declared return type, and the
/// driver's `InferenceEngine` resolves and substitutes both before the
/// body is handed to the evaluator.
#[test]
fn arithmetic_return_resolves_unsized_literal_and_evaluates() {
    let interner = NameInterner::new();
    let mut ctx = CompilationContext::new(BufferSink::default());
    let i32_ty = ctx.pool.primitive(PrimitiveKind::I32);

    let mut ast = AstArena::new();
    let x_name = interner.intern("x");
    let ident_x = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Ident(x_name) });
    let one = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::IntLiteral(1) });
    let sum = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Binary { op: BinaryOp::Add, lhs: ident_x, rhs: one } });
    let body = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Return(Some(sum)) });

    let module_name = interner.intern("test");
    let mut module = Module::new(module_name);

    let param = module.alloc(Defn::new(Span::DUMMY, x_name, module_name, module_name, DefnKind::Parameter(ParameterDefn { ty: i32_ty, has_default: false, default: None, is_variadic: false })));
    let mut parameter_scope = Scope::new();
    parameter_scope.insert(x_name, param);

    let f_name = interner.intern("f");
    let function_defn = FunctionDefn {
        flags: FunctionFlags::empty(),
        local_scopes: Vec::new(),
        parameter_scope,
        body: Some(body),
        overridden: Vec::new(),
        intrinsic: None,
        merged_to: None,
        dispatch_index: None,
        return_type: Some(i32_ty),
        self_param: None,
    };
    let function = module.alloc(Defn::new(Span::DUMMY, f_name, module_name, module_name, DefnKind::Function(function_defn)));

    let mut bodies = TypedBodies::new();
    driver::analyze_functions(&mut ctx, &mut module, &ast, &interner, &mut bodies, &[function]);

    assert_eq!(ctx.diagnostics.error_count(), 0, "unexpected diagnostics: {:?}", ctx.diagnostics.diagnostics());
    assert!(module.get(function).traits.contains(Traits::SINGULAR));

    let typed_body = bodies.body_of(function).expect("ControlFlowPass records a body for every analyzed function");
    let intrinsics = IntrinsicRegistry::new();
    let evaluator = Evaluator::new(&ctx.pool, &module, &bodies, &intrinsics);
    let mut frame = CallFrame::new(None);
    frame.bind(param, Value::Int(thorn_eval::ThornInt::new(PrimitiveKind::I32, 2)));
    evaluator.eval(typed_body, &mut frame).unwrap();

    assert!(matches!(frame.return_value, Some(Value::Int(i)) if i.raw() == 3));
}

/// `g() -> i32 { var y: i32 = 10; return y + 5; }`, no arguments.
///
/// Covers `lower_block`'s scope push/pop, `lower_var_decl`'s declared-type
/// constraint on its initializer, and a second, independent unsized
/// literal (`5`) resolved against the local it's added to.
#[test]
fn local_var_decl_feeds_the_return_expression() {
    let interner = NameInterner::new();
    let mut ctx = CompilationContext::new(BufferSink::default());
    let i32_ty = ctx.pool.primitive(PrimitiveKind::I32);
    let i32_named = thorn_ir::ast::ParsedType::Named { path: vec![interner.intern("i32")], args: Vec::new(), span: Span::DUMMY };

    let mut ast = AstArena::new();
    let y_name = interner.intern("y");
    let ten = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::IntLiteral(10) });
    let var_decl = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::VarDecl { name: y_name, is_mutable: false, declared_type: Some(i32_named), init: Some(ten) } });
    let ident_y = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Ident(y_name) });
    let five = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::IntLiteral(5) });
    let sum = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Binary { op: BinaryOp::Add, lhs: ident_y, rhs: five } });
    let ret = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Return(Some(sum)) });
    let body = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Block(vec![var_decl, ret]) });

    let module_name = interner.intern("test");
    let mut module = Module::new(module_name);
    let g_name = interner.intern("g");
    let function_defn = FunctionDefn {
        flags: FunctionFlags::empty(),
        local_scopes: Vec::new(),
        parameter_scope: Scope::new(),
        body: Some(body),
        overridden: Vec::new(),
        intrinsic: None,
        merged_to: None,
        dispatch_index: None,
        return_type: Some(i32_ty),
        self_param: None,
    };
    let function = module.alloc(Defn::new(Span::DUMMY, g_name, module_name, module_name, DefnKind::Function(function_defn)));

    let mut bodies = TypedBodies::new();
    driver::analyze_functions(&mut ctx, &mut module, &ast, &interner, &mut bodies, &[function]);

    assert_eq!(ctx.diagnostics.error_count(), 0, "unexpected diagnostics: {:?}", ctx.diagnostics.diagnostics());
    assert!(module.get(function).traits.contains(Traits::SINGULAR));

    let typed_body = bodies.body_of(function).expect("ControlFlowPass records a body for every analyzed function");
    let intrinsics = IntrinsicRegistry::new();
    let evaluator = Evaluator::new(&ctx.pool, &module, &bodies, &intrinsics);
    let mut frame = CallFrame::new(None);
    evaluator.eval(typed_body, &mut frame).unwrap();

    assert!(matches!(frame.return_value, Some(Value::Int(i)) if i.raw() == 15));
}

/// A body transduced under `ControlFlowPass` twice (once directly, once
/// through a second `analyze_functions` call) only runs the transducer
/// once: the pass manager's per-defn memo short-circuits the repeat.
#[test]
fn reanalyzing_a_function_is_a_no_op() {
    let interner = NameInterner::new();
    let mut ctx = CompilationContext::new(BufferSink::default());
    let i32_ty = ctx.pool.primitive(PrimitiveKind::I32);

    let mut ast = AstArena::new();
    let seven = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::IntLiteral(7) });
    let body = ast.alloc(AstExpr { span: Span::DUMMY, kind: AstExprKind::Return(Some(seven)) });

    let module_name = interner.intern("test");
    let mut module = Module::new(module_name);
    let h_name = interner.intern("h");
    let function_defn = FunctionDefn {
        flags: FunctionFlags::empty(),
        local_scopes: Vec::new(),
        parameter_scope: Scope::new(),
        body: Some(body),
        overridden: Vec::new(),
        intrinsic: None,
        merged_to: None,
        dispatch_index: None,
        return_type: Some(i32_ty),
        self_param: None,
    };
    let function = module.alloc(Defn::new(Span::DUMMY, h_name, module_name, module_name, DefnKind::Function(function_defn)));

    let mut bodies = TypedBodies::new();
    driver::analyze_functions(&mut ctx, &mut module, &ast, &interner, &mut bodies, &[function]);
    let first_body = bodies.body_of(function).unwrap();

    driver::analyze_functions(&mut ctx, &mut module, &ast, &interner, &mut bodies, &[function]);
    let second_body = bodies.body_of(function).unwrap();

    assert_eq!(first_body, second_body, "re-running ControlFlowPass on an already-analyzed function must not re-lower its body");
}
