//! Abstract syntax tree for the VCL surface language.
//!
//! Every node owns a [`Meta`] record carrying its anchoring token, nesting
//! depth, blank-line count and comment trivia, so a formatter can round-trip
//! source text from the tree.

pub mod decl;
pub mod expr;
pub mod meta;
pub mod stmt;

pub use decl::*;
pub use expr::*;
pub use meta::{Comment, CommentDelimiter, Meta};
pub use stmt::*;

/// A parsed source file: declarations interleaved with the few statements
/// that are legal at the top level (`include`, `import`).
#[derive(Debug, Clone)]
pub enum TopLevel {
    Declaration(Declaration),
    Statement(Statement),
}

impl TopLevel {
    pub fn meta(&self) -> &Meta {
        match self {
            TopLevel::Declaration(d) => d.meta(),
            TopLevel::Statement(s) => s.meta(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<TopLevel>,
}

impl Program {
    pub fn subroutines(&self) -> impl Iterator<Item = &SubroutineDeclaration> {
        self.body.iter().filter_map(|item| match item {
            TopLevel::Declaration(Declaration::Subroutine(sub)) => Some(sub),
            _ => None,
        })
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.body.iter().filter_map(|item| match item {
            TopLevel::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}
