use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Parse failures are fatal to the current parse; no recovery is attempted.
/// Every variant carries the offending token, which knows its own line,
/// column and source file.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("Unexpected token: {0}")]
    UnexpectedToken(Token),

    #[error("Expected {expected}, found: {found}")]
    ExpectedToken { expected: TokenKind, found: Token },

    #[error("Expected identifier, found: {0}")]
    ExpectedIdent(Token),

    #[error("Expected string literal, found: {0}")]
    ExpectedString(Token),

    #[error("Expected integer literal, found: {0}")]
    ExpectedInteger(Token),

    #[error("Expected expression, found: {0}")]
    ExpectedPrimary(Token),

    #[error("Expected assignment operator, found: {0}")]
    ExpectedAssignment(Token),

    #[error("Invalid integer literal: {0}")]
    InvalidInteger(Token),

    #[error("Invalid float literal: {0}")]
    InvalidFloat(Token),

    #[error("Illegal token: {0}")]
    IllegalToken(Token),

    #[error("Unexpected end of file")]
    UnexpectedEof(Token),
}

impl ParseError {
    /// The token the parse tripped over.
    pub fn token(&self) -> &Token {
        match self {
            ParseError::UnexpectedToken(t)
            | ParseError::ExpectedIdent(t)
            | ParseError::ExpectedString(t)
            | ParseError::ExpectedInteger(t)
            | ParseError::ExpectedPrimary(t)
            | ParseError::ExpectedAssignment(t)
            | ParseError::InvalidInteger(t)
            | ParseError::InvalidFloat(t)
            | ParseError::IllegalToken(t)
            | ParseError::UnexpectedEof(t) => t,
            ParseError::ExpectedToken { found, .. } => found,
        }
    }
}
