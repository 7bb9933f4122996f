//! The Reef compiler CLI.
//!
//! `reefc <file>` runs the front-end pipeline (lex, parse, analyze) over
//! a source file and reports diagnostics. With no file, an interactive
//! REPL starts.
//!
//! Options:
//! - `--emit tokens` - dump the token stream instead of compiling
//! - `--emit ast` - dump the reconstructed AST after a clean parse
//! - `--json` - machine-readable token output (with `--emit tokens`)

mod repl;

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use reef_common::diag::{render, Diagnostic};
use reef_lexer::Lexer;
use reef_parser::reconstruct::Reconstructor;
use reef_sema::Analyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
}

#[derive(Parser)]
#[command(name = "reefc", version, about = "The Reef compiler front-end")]
struct Cli {
    /// Source file to compile; omit to start the REPL.
    file: Option<PathBuf>,

    /// Emit an intermediate artifact instead of compiling.
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Emit machine-readable JSON (tokens only).
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let Some(file) = cli.file else {
        if let Err(e) = repl::run() {
            eprintln!("error: {e}");
            process::exit(1);
        }
        return;
    };

    let source = match std::fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: failed to read '{}': {e}", file.display());
            process::exit(1);
        }
    };

    match cli.emit {
        Some(Emit::Tokens) => emit_tokens(&source, cli.json),
        Some(Emit::Ast) => emit_ast(&source),
        None => compile(&source),
    }
}

/// Run the full front-end and print labeled diagnostics to stderr.
fn compile(source: &str) {
    let parse = reef_parser::parse(source);
    if !parse.ok() {
        report(&parse.diagnostics, source);
        process::exit(1);
    }

    let diagnostics = Analyzer::new().analyze(&parse.program);
    if !diagnostics.is_empty() {
        report(&diagnostics, source);
        process::exit(1);
    }
}

fn report(diagnostics: &[Diagnostic], source: &str) {
    for diagnostic in diagnostics {
        eprintln!("{}", render(diagnostic, source));
    }
}

fn emit_tokens(source: &str, json: bool) {
    let tokens = Lexer::tokenize(source);
    if json {
        let out = serde_json::to_string_pretty(&tokens).expect("tokens serialize cleanly");
        println!("{out}");
    } else {
        for token in &tokens {
            println!(
                "{} {:?} [Ln {}, Col {}]",
                token.kind.name(),
                token.text,
                token.line,
                token.column
            );
        }
    }
}

fn emit_ast(source: &str) {
    let parse = reef_parser::parse(source);
    if !parse.ok() {
        report(&parse.diagnostics, source);
        process::exit(1);
    }
    let reconstructor = Reconstructor::new(false);
    println!("{}", reconstructor.program(&parse.program));
}
