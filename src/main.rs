// ABOUTME: CLI entry point for the Lango interpreter (script mode and REPL)
// Dispatches on argument count to reproduce the exact usage contract exit codes.

use clap::Parser as ClapParser;
use lango::config;
use lango::error::ParseError;
use lango::interpreter::Interpreter;
use lango::parser::Parser;
use lango::scanner::Scanner;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

/// A tree-walking interpreter for Lango.
///
/// Run with no arguments to start an interactive REPL, or pass a single `.lango` script file
/// to execute it and exit. `trailing_var_arg` lets extra positional arguments through clap's
/// own validation so the too-many-arguments case can be reported with this program's own exit
/// code (64) and message rather than clap's.
#[derive(ClapParser, Debug)]
#[command(name = "lango", version = config::VERSION, about = "A tree-walking interpreter for Lango")]
struct Cli {
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.args.as_slice() {
        [] => {
            run_prompt();
            ExitCode::SUCCESS
        }
        [script] => run_file(script),
        _ => {
            println!("Usage: lango [script.lango]");
            ExitCode::from(64)
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    if Path::new(path).extension().and_then(|e| e.to_str()) != Some("lango") {
        println!("Error: Script must have '.lango' extension");
        return ExitCode::from(1);
    }

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            println!("Error reading file: {err}");
            return ExitCode::from(1);
        }
    };

    let interpreter = Interpreter::new_stdout();
    run(&interpreter, &source);

    // A runtime error is reported to stdout and aborts only its own statement; it does not by
    // itself change the process exit code (the program this was distilled from tracks
    // `hadRuntimeError` but never acts on it).
    ExitCode::SUCCESS
}

fn run_prompt() {
    tracing::info!("starting REPL");
    let mut editor = DefaultEditor::new().expect("failed to initialize line editor");
    let _ = editor.load_history(config::REPL_HISTORY_FILE);

    // One interpreter for the whole session: global variables persist across lines, matching
    // the single long-lived `interpreter` in the program this was distilled from.
    let interpreter = Interpreter::new_stdout();

    loop {
        match editor.readline(config::REPL_PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "q" || trimmed == "quit" {
                    println!("{}", config::REPL_QUIT_MESSAGE);
                    break;
                }
                let _ = editor.add_history_entry(&line);
                run(&interpreter, &line);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = editor.save_history(config::REPL_HISTORY_FILE);
}

/// Scans, parses, and runs one unit of source (a whole script, or one REPL line). A scan error
/// is reported inline but does not stop the pipeline — the resulting token stream (bad
/// characters simply dropped) is still handed to the parser, same as the program this was
/// distilled from. A parse error is reported and aborts this unit entirely; a runtime error
/// aborts only the top-level statement in which it occurred (`Interpreter::run` handles that
/// distinction).
fn run<W: Write>(interpreter: &Interpreter<W>, source: &str) {
    let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
    for err in &scan_errors {
        report_scan_error(err);
    }

    match Parser::new(tokens).parse() {
        Ok(statements) => interpreter.run(&statements),
        Err(err) => report_parse_error(&err),
    }
}

fn report_scan_error(err: &lango::error::ScanError) {
    tracing::debug!(line = err.line, message = %err.message, "scan error");
    println!("{err}");
}

fn report_parse_error(err: &ParseError) {
    tracing::debug!(line = err.line, message = %err.message, "parse error");
    println!("{err}");
}
