//! Interactive REPL.
//!
//! Reads logical lines (a trailing `\` continues onto the next physical
//! line), runs the front-end pipeline, and prints either the
//! reconstructed AST or the diagnostic list. Semantic bindings persist
//! across inputs; `exit` on its own line quits.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use reef_parser::reconstruct::Reconstructor;
use reef_sema::Analyzer;

const WELCOME: &str = "Reef REPL -- enter statements, `exit` to leave.";
const PROMPT: &str = "reef> ";
const CONTINUATION: &str = "  ... ";

/// Run the REPL loop until `exit` or end of input.
pub fn run() -> Result<(), String> {
    let mut editor = DefaultEditor::new().map_err(|e| e.to_string())?;
    let mut analyzer = Analyzer::new();
    let reconstructor = Reconstructor::new(false);

    println!("{WELCOME}");
    loop {
        let line = match read_logical_line(&mut editor) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(e),
        };

        if line.trim() == "exit" {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        let parse = reef_parser::parse(&line);
        if !parse.ok() {
            for diagnostic in &parse.diagnostics {
                eprintln!("{diagnostic}");
            }
            continue;
        }

        let diagnostics = analyzer.analyze(&parse.program);
        if diagnostics.is_empty() {
            println!("{}", reconstructor.program(&parse.program));
        } else {
            for diagnostic in &diagnostics {
                eprintln!("{diagnostic}");
            }
        }
    }

    Ok(())
}

/// Read one logical line, concatenating `\`-continued physical lines.
///
/// Returns `Ok(None)` on end of input or interrupt.
fn read_logical_line(editor: &mut DefaultEditor) -> Result<Option<String>, String> {
    let mut logical = String::new();
    let mut prompt = PROMPT;

    loop {
        match editor.readline(prompt) {
            Ok(line) => {
                if let Some(stripped) = line.strip_suffix('\\') {
                    logical.push_str(stripped);
                    logical.push('\n');
                    prompt = CONTINUATION;
                    continue;
                }
                logical.push_str(&line);
                return Ok(Some(logical));
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => return Ok(None),
            Err(e) => return Err(e.to_string()),
        }
    }
}
