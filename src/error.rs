// ABOUTME: Error taxonomy for the three pipeline phases (scan, parse, runtime)
// Each phase gets its own thiserror enum so a `Result<_, ParseError>` cannot smuggle a scan
// error past the point where scanning is supposed to be finished.

use thiserror::Error;

/// A scan-time failure: unknown character or unterminated string. Reported inline; scanning
/// continues after emitting one.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// A parse-time failure: token mismatch or an invalid assignment target. Aborts the parse of
/// the whole program.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    /// `None` when the failing token was EOF ("Error at end").
    pub lexeme: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.lexeme {
            Some(lexeme) => write!(
                f,
                "[line {}] Error at '{}': {}",
                self.line, lexeme, self.message
            ),
            None => write!(f, "[line {}] Error at end: {}", self.line, self.message),
        }
    }
}

/// A runtime failure: type mismatch, division/modulo by zero, undefined variable. Aborts the
/// current top-level statement only; execution resumes at the next one.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Runtime error at '{lexeme}': {message}")]
pub struct RuntimeError {
    pub lexeme: String,
    pub message: String,
}

impl RuntimeError {
    pub fn new(lexeme: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError {
            lexeme: lexeme.into(),
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: &str, line: usize) -> Self {
        RuntimeError::new(name, format!("undefined variable '{name}' at line {line}"))
    }
}
