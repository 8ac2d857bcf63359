//! Errors raised while turning script text into commands.
//!
//! Both kinds are fatal to the script that produced them and to nothing
//! else: the script library converts them into a `Diagnostic` and keeps
//! going.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unrecognized token '{ch}' at line {line}, column {column}")]
    UnrecognizedToken { ch: char, line: usize, column: usize },

    #[error("unterminated string at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("number too large at line {line}, column {column}")]
    NumberTooLarge { line: usize, column: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnrecognizedToken { line, .. } => *line,
            LexError::UnterminatedString { line, .. } => *line,
            LexError::NumberTooLarge { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected token '{token}' at line {line}, column {column}")]
    UnexpectedToken {
        token: String,
        line: usize,
        column: usize,
    },

    #[error("token expected at end of line {line}")]
    TokenExpected { line: usize },

    #[error("unknown command '{keyword}' at line {line}, column {column}")]
    UnknownCommand {
        keyword: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. } => *line,
            ParseError::TokenExpected { line } => *line,
            ParseError::UnknownCommand { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ScriptError {
    /// 1-based source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Lex(e) => e.line(),
            ScriptError::Parse(e) => e.line(),
        }
    }
}
