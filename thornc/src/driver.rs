//! Wires the expression analyzer, inference engine, and constant evaluator
//! together over a module whose defn graph is already built (§9's "Global
//! mutable state" design: every entry point below takes its
//! `CompilationContext` and the `Module`/`TypedBodies`/AST it works over
//! explicitly, nothing reached for through a global).
//!
//! Declaration-level resolution (imports, base types, fields, overload
//! grouping — `Pass::ResolveImport` through `Pass::ModifierPass`) is the
//! module loader's job; per §10.4 that loader is a stub in this build
//! (there is no lexer or parser crate here to drive it from source text).
//! What this module drives for real is `ControlFlowPass` — transducing
//! each function body and resolving the literals/overloads it left
//! unsized — and the completion check that follows it.

use rustc_hash::FxHashMap;
use thorn_defn::{DefnKind, Module, Traits};
use thorn_diagnostic::{Diagnostic, DiagnosticQueue, DiagnosticSink, ErrorCode};
use thorn_expr::{Lowering, TypedBodies};
use thorn_infer::{InferenceEngine, TypingVar};
use thorn_ir::ast::ExprArena as AstArena;
use thorn_ir::{DefnId, NameInterner};
use thorn_pass::{Pass, PassManager};
use crate::context::CompilationContext;

/// Transduces and resolves one function's body, under `Pass::ControlFlowPass`.
/// No-op (returns immediately) if the pass already ran, if the function
/// has no body (abstract/extern/interface methods), or if it isn't a
/// `Function` defn at all.
pub fn analyze_function_body<S: DiagnosticSink>(
    ctx: &mut CompilationContext<S>,
    module: &mut Module,
    ast: &AstArena,
    interner: &NameInterner,
    bodies: &mut TypedBodies,
    manager: &mut PassManager,
    function: DefnId,
) {
    let Some(root) = (match &module.get(function).kind {
        DefnKind::Function(f) => f.body,
        _ => return,
    }) else {
        return;
    };

    let self_composite = module.get(function).parent;
    let run = |module: &mut Module, _manager: &mut PassManager| {
        let lowered = {
            let lowering = Lowering::new(
                &mut ctx.pool,
                module,
                &mut ctx.instances,
                ast,
                interner,
                &mut ctx.diagnostics,
                bodies.arena_mut(),
                Some(function),
                self_composite,
            );
            lowering.lower_body(root)
        };

        let mut var_to_expr = FxHashMap::default();
        let mut engine = InferenceEngine::new();
        for (index, (expr, candidates)) in lowered.unsized_literals.iter().enumerate() {
            let var = TypingVar(index as u32);
            engine.record_candidates(var, candidates.clone());
            var_to_expr.insert(var, *expr);
        }
        for (expr, expected) in &lowered.expected_constraints {
            if let Some((&var, _)) = var_to_expr.iter().find(|(_, &e)| e == *expr) {
                engine.constrain_expected(&ctx.pool, module, var, *expected);
            }
        }

        match engine.resolve(&ctx.pool, module) {
            Ok(resolution) => {
                thorn_infer::substitute(bodies.arena_mut(), &resolution, &var_to_expr);
                if let Err(non_singular) = thorn_infer::verify_singular(&ctx.pool, bodies.arena()) {
                    let span = bodies.arena().get(non_singular.0).span;
                    ctx.diagnostics.report(Diagnostic::error(ErrorCode::NonSingular, span, "expression type could not be resolved"));
                }
            }
            Err(_) => {
                let span = bodies.arena().get(lowered.root).span;
                ctx.diagnostics.report(Diagnostic::error(ErrorCode::NonSingular, span, "inference could not resolve every literal or overload in this body"));
            }
        }

        bodies.set_body(function, lowered.root);
    };

    let _ = manager.analyze_defn(module, function, Pass::ControlFlowPass, run);
}

/// Runs `ControlFlowPass` over every function in `functions`, then marks
/// `Pass::CompletionPass` finished and sets `Traits::SINGULAR` on each
/// whose body (if any) came out with no outstanding error.
pub fn analyze_functions<S: DiagnosticSink>(
    ctx: &mut CompilationContext<S>,
    module: &mut Module,
    ast: &AstArena,
    interner: &NameInterner,
    bodies: &mut TypedBodies,
    functions: &[DefnId],
) {
    let mut manager = PassManager::new();
    let errors_before = ctx.diagnostics.error_count();
    for &function in functions {
        analyze_function_body(ctx, module, ast, interner, bodies, &mut manager, function);
    }
    if ctx.diagnostics.error_count() == errors_before {
        for &function in functions {
            let _ = manager.analyze_defn(module, function, Pass::CompletionPass, |module, _| {
                module.get_mut(function).traits.insert(Traits::SINGULAR);
            });
        }
    }
}
