mod ast;
mod builtins;
mod config;
mod driver;
mod env;
mod error;
mod eval;
mod function;
mod guard;
mod highlighter;
mod lexer;
mod lower;
mod parser;
mod span;
mod value;

use clap::Parser;
use env::Environment;
use highlighter::LispHelper;
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::process::ExitCode;

/// A small Lisp interpreter with a guard-checked builtin dispatcher and a numeric tower.
#[derive(Parser, Debug)]
#[command(name = "aalisp")]
#[command(version = config::VERSION)]
#[command(about = "A small Lisp interpreter")]
struct CliArgs {
    /// REPL prompt string
    #[arg(short = 'p', long = "prompt", default_value = config::DEFAULT_PROMPT)]
    prompt: String,

    /// Run FILE through the evaluator then exit
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse();
    let env = Environment::new();
    builtins::register_all(&env);

    if let Some(path) = args.file {
        return run_file(&env, &path);
    }

    run_repl(&env, &args.prompt);
    ExitCode::SUCCESS
}

fn run_file(env: &std::rc::Rc<Environment>, path: &str) -> ExitCode {
    debug!("evaluating file: {path}");
    match driver::eval_file(env, path) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) if e.cause().code == error::ErrorCode::EnoentFile => {
            eprintln!("{}", e.render());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e.render());
            ExitCode::SUCCESS
        }
    }
}

fn run_repl(env: &std::rc::Rc<Environment>, prompt: &str) {
    println!("{} v{}", config::WELCOME_MESSAGE, config::VERSION);
    println!("{}", config::WELCOME_SUBTITLE);

    let mut rl: Editor<LispHelper, rustyline::history::DefaultHistory> =
        Editor::new().expect("failed to initialize line editor");
    rl.set_helper(Some(LispHelper::new()));

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if trimmed == "quit" {
                    break;
                }
                match driver::eval_repl_line(env, trimmed) {
                    Ok(value) => println!("{value}"),
                    Err(e) => print_error(trimmed, &e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                debug!("REPL interrupted, releasing root environment");
                break;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                warn!("readline error: {e}");
                break;
            }
        }
    }
}

fn print_error(source: &str, err: &error::LispError) {
    eprintln!("{}", err.render());
    if let Some(span) = err.cause().location {
        let line = source.lines().nth((span.line.saturating_sub(1)) as usize).unwrap_or(source);
        eprintln!("{}", driver::format_marker(line, span.col, 0));
    }
}
