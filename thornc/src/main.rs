use std::process::ExitCode;

use clap::Parser;
use thornc::cli::Cli;
use thornc::context::CompilationContext;
use thornc::error::DriverError;
use thornc::loader;
use thornc::sink::StderrSink;

fn main() -> ExitCode {
    thornc::tracing_setup::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("thornc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, DriverError> {
    let mut ctx = CompilationContext::new(StderrSink);

    for file in &cli.files {
        let resolved = loader::resolve_against(&cli.search_path, cli.source_path.as_deref(), file);
        let text = loader::read_source(&resolved)?;
        match loader::parse_source(&resolved, &text) {
            Ok(decl) => {
                let module_name = ctx.interner.intern(&resolved.display().to_string());
                let mut module = thorn_defn::Module::new(module_name);
                loader::load_declarations(&mut module, &mut ctx.interner, &decl);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(ExitCode::from(u8::try_from(ctx.diagnostics.exit_code()).unwrap_or(1)))
}
