//! The Driver CLI surface (§6).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "thornc", about = "The Thorn front-end: analyze source modules and hand off to a backend")]
pub struct Cli {
    /// Module search path root. Repeatable.
    #[arg(short = 'i', value_name = "DIR")]
    pub search_path: Vec<PathBuf>,

    /// Input directory for positional files given as relative paths.
    #[arg(long = "sourcepath", value_name = "DIR")]
    pub source_path: Option<PathBuf>,

    /// Source files to compile.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
