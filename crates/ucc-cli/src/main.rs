//! uC compiler front-end/middle-end CLI.
//!
//! Provides the `ucc` binary's `compile` subcommand: reads a decorated-AST
//! JSON document produced by the parser collaborator (§6.1), runs semantic
//! analysis, and, if no diagnostic fired, lowers and optimizes it to IR,
//! printing the textual surface (§6) to stdout.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ucc_ast::Program;

/// uC compiler front-end/middle-end.
#[derive(Parser)]
#[command(name = "ucc", about = "uC compiler front-end/middle-end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compile an AST to optimized IR.
    Compile {
        /// Path to a JSON AST document (the parser collaborator's output).
        #[arg(long)]
        ast: PathBuf,

        /// Skip the optimizer passes, emitting only the lowered IR.
        #[arg(long)]
        no_optimize: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { ast, no_optimize } => {
            let exit_code = run_compile(&ast, no_optimize);
            process::exit(exit_code);
        }
    }
}

/// Execute the compile subcommand.
///
/// Returns exit code: 0 = success, 1 = semantic diagnostics reported,
/// 2 = malformed AST input, 3 = I/O or JSON-parsing error.
fn run_compile(ast_path: &PathBuf, no_optimize: bool) -> i32 {
    let text = match fs::read_to_string(ast_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", ast_path.display(), e);
            return 3;
        }
    };

    let program: Program = match serde_json::from_str(&text) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: failed to parse AST from '{}': {}", ast_path.display(), e);
            return 3;
        }
    };

    let sema = ucc_sema::analyze(&program);
    if sema.has_errors() {
        eprintln!("Semantic analysis reported {} diagnostic(s):", sema.diagnostics.len());
        for diagnostic in sema.diagnostics.iter() {
            eprintln!("  {}", diagnostic);
        }
        return 1;
    }

    let module = if no_optimize {
        match ucc_ir::lower_program(&program, &sema) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 2;
            }
        }
    } else {
        match ucc_ir::compile(&program, &sema) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 2;
            }
        }
    };

    print!("{}", ucc_ir::print_module(&module));
    0
}
