// ABOUTME: Configuration and constants for the Lisp interpreter

pub const VERSION: &str = "1.0.0";
pub const DEFAULT_PROMPT: &str = "> ";

pub const WELCOME_MESSAGE: &str = "aalisp";
pub const WELCOME_SUBTITLE: &str = "Type an expression, or quit to exit.";

/// Maximum nesting depth for `load`, counted as files currently being
/// evaluated on the call stack. Past this, `load` surfaces `TooDeep`.
pub const MAX_LOAD_DEPTH: usize = 256;
