// ABOUTME: Composes lex -> parse -> lower -> eval and renders error markers

use crate::config;
use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::eval::eval_result;
use crate::lexer::Lexer;
use crate::lower::lower;
use crate::parser::{first_error, Parser};
use crate::value::Value;
use std::cell::Cell;
use std::fs;
use std::rc::Rc;

thread_local! {
    static LOAD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct LoadDepthGuard;

impl LoadDepthGuard {
    fn enter() -> Result<Self, LispError> {
        let depth = LOAD_DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });
        if depth > config::MAX_LOAD_DEPTH {
            return Err(LispError::new(ErrorCode::TooDeep, "load recursion exceeded the maximum depth"));
        }
        Ok(LoadDepthGuard)
    }
}

impl Drop for LoadDepthGuard {
    fn drop(&mut self) {
        LOAD_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Lexes, parses, lowers, and evaluates `source` in `env`. A lex or parse
/// failure surfaces as the first `Ast::Err` node encountered, wrapped with
/// an `Ast`-stage message; a successful parse is lowered and evaluated.
pub fn eval_str(env: &Rc<Environment>, source: &str) -> Result<Value, LispError> {
    let tokens = Lexer::new(source).tokenize();
    let ast = Parser::new(tokens).parse_program();
    if let Some((msg, span)) = first_error(&ast) {
        return Err(LispError::with_location(ErrorCode::Ast, msg.to_string(), Some(span)));
    }
    let value = lower(&ast);
    eval_result(env, &value)
}

/// Like `eval_str`, but accepts a bare expression without outer parentheses
/// (`+ 1 2` as well as `(+ 1 2)`), the way the REPL does.
pub fn eval_repl_line(env: &Rc<Environment>, source: &str) -> Result<Value, LispError> {
    let tokens = Lexer::new(source).tokenize();
    let ast = Parser::new(tokens).parse_surrounding();
    if let Some((msg, span)) = first_error(&ast) {
        return Err(LispError::with_location(ErrorCode::Ast, msg.to_string(), Some(span)));
    }
    let value = lower(&ast);
    eval_result(env, &value)
}

/// Evaluates the contents of `path` in `env`, bumping the load-recursion
/// depth counter for the duration. File handles close when `contents`
/// (read eagerly, nothing kept open) goes out of scope.
pub fn eval_file(env: &Rc<Environment>, path: &str) -> Result<Value, LispError> {
    let _guard = LoadDepthGuard::enter()?;
    let contents = fs::read_to_string(path)
        .map_err(|_| LispError::new(ErrorCode::EnoentFile, format!("file `{path}` not found")))?;
    eval_str(env, &contents)
}

/// `spaces_prefix` spaces, then `(col-1)` more spaces, then a caret,
/// pointing beneath the offending column of `line` as printed after the
/// caller's prompt.
pub fn format_marker(line: &str, col: u32, spaces_prefix: usize) -> String {
    let mut marker = String::with_capacity(spaces_prefix + col as usize);
    marker.push_str(&" ".repeat(spaces_prefix));
    marker.push_str(&" ".repeat((col.saturating_sub(1)) as usize));
    marker.push('^');
    format!("{line}\n{marker}")
}
