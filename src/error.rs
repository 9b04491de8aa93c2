// ABOUTME: Error chain for lexing, parsing and evaluation failures

use crate::span::Span;
use thiserror::Error;

/// The taxonomy of error kinds a [`LispError`] can carry.
///
/// `DeadRef` signals an internal invariant violation (a builtin definition
/// missing both an accumulator and a function pointer); every other variant
/// corresponds to a user-observable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    DeadRef,
    Ast,
    Eval,
    DivZero,
    BadSymbol,
    BadOperand,
    TooManyArgs,
    TooFewArgs,
    EnoentFile,
    LispUser,
    TooDeep,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::DeadRef => "DeadRef",
            ErrorCode::Ast => "Ast",
            ErrorCode::Eval => "Eval",
            ErrorCode::DivZero => "DivZero",
            ErrorCode::BadSymbol => "BadSymbol",
            ErrorCode::BadOperand => "BadOperand",
            ErrorCode::TooManyArgs => "TooManyArgs",
            ErrorCode::TooFewArgs => "TooFewArgs",
            ErrorCode::EnoentFile => "EnoentFile",
            ErrorCode::LispUser => "LispUser",
            ErrorCode::TooDeep => "TooDeep",
        };
        write!(f, "{name}")
    }
}

/// Bound applied to every formatted error message, matching the source's
/// fixed 80-byte message buffer.
const MESSAGE_LIMIT: usize = 80;

fn bound_message(message: impl Into<String>) -> String {
    let mut message = message.into();
    if message.len() > MESSAGE_LIMIT {
        message.truncate(MESSAGE_LIMIT);
    }
    message
}

/// A single error record. Errors form a chain: `inner` points at the record
/// this one wraps (e.g. a driver stage attaching "parsing error:" context to
/// whatever the parser produced).
#[derive(Error, Debug, Clone)]
#[error("{code}: {message}")]
pub struct LispError {
    pub code: ErrorCode,
    pub message: String,
    pub location: Option<Span>,
    pub inner: Option<Box<LispError>>,
}

impl LispError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        LispError {
            code,
            message: bound_message(message),
            location: None,
            inner: None,
        }
    }

    pub fn with_location(code: ErrorCode, message: impl Into<String>, location: Option<Span>) -> Self {
        LispError {
            code,
            message: bound_message(message),
            location,
            inner: None,
        }
    }

    /// Sets the location unless one is already present.
    pub fn at(mut self, location: Span) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }

    /// Wraps `self` under a new outer record carrying stage context, e.g.
    /// `"lexing error"`.
    pub fn wrap(self, stage_message: impl Into<String>) -> Self {
        let code = self.code;
        let location = self.location;
        LispError {
            code,
            message: bound_message(stage_message),
            location,
            inner: Some(Box::new(self)),
        }
    }

    /// The innermost record in the chain.
    pub fn cause(&self) -> &LispError {
        match &self.inner {
            Some(inner) => inner.cause(),
            None => self,
        }
    }

    /// Full chain joined by `": "`, outermost first, matching the wrapping
    /// order errors are constructed in.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(self);
        while let Some(e) = cur {
            parts.push(e.message.clone());
            cur = e.inner.as_deref();
        }
        format!("Error #{}: {}", self.cause().code, parts.join(": "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_returns_innermost() {
        let leaf = LispError::new(ErrorCode::DivZero, "divisor must not be 0");
        let wrapped = leaf.clone().wrap("eval error");
        assert_eq!(wrapped.cause().code, ErrorCode::DivZero);
        assert_eq!(wrapped.cause().message, leaf.message);
    }

    #[test]
    fn render_joins_layers() {
        let leaf = LispError::new(ErrorCode::BadSymbol, "unknown symbol 'x'");
        let wrapped = leaf.wrap("eval error");
        assert_eq!(wrapped.render(), "Error #BadSymbol: eval error: unknown symbol 'x'");
    }

    #[test]
    fn message_is_bounded() {
        let long = "x".repeat(200);
        let err = LispError::new(ErrorCode::Eval, long);
        assert_eq!(err.message.len(), MESSAGE_LIMIT);
    }

    #[test]
    fn at_only_sets_missing_location() {
        let err = LispError::new(ErrorCode::Eval, "oops").at(Span::new(1, 1));
        assert_eq!(err.location, Some(Span::new(1, 1)));
        let untouched = err.at(Span::new(2, 2));
        assert_eq!(untouched.location, Some(Span::new(1, 1)));
    }
}
