use std::path::PathBuf;

use thiserror::Error;

use crate::parse::ParseError;
use crate::token::Token;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("include file `{name}` not found on the include path")]
    IncludeNotFound { name: String, token: Token },

    #[error("no snippet named `{name}`")]
    UndefinedSnippet { name: String, token: Token },

    #[error("include cycle through {}", path.display())]
    IncludeCycle { path: PathBuf, token: Token },

    #[error("failed to parse snippet `{name}`")]
    SnippetParse {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// The token anchoring the error in the including source, when there
    /// is one.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ResolveError::IncludeNotFound { token, .. }
            | ResolveError::UndefinedSnippet { token, .. }
            | ResolveError::IncludeCycle { token, .. } => Some(token),
            ResolveError::SnippetParse { source, .. } => Some(source.token()),
            ResolveError::Parse(inner) => Some(inner.token()),
            ResolveError::Io { .. } => None,
        }
    }
}
