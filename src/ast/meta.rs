use std::fmt::{Display, Formatter};

use crate::token::{Token, TokenKind};

/// Delimiter form a comment was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDelimiter {
    /// `# …`
    Hash,
    /// `// …`
    Slash,
    /// `/* … */`
    Block,
}

/// A source comment captured as trivia.
///
/// The token literal holds the inner text without delimiters; the original
/// delimiter is recovered from the token's offset field. `prefixed_lf`
/// records whether a line feed separated this comment from the code before
/// it, which the formatter needs to lay comments back out.
#[derive(Debug, Clone)]
pub struct Comment {
    pub token: Token,
    pub prefixed_lf: bool,
}

impl Comment {
    pub fn text(&self) -> &str {
        &self.token.literal
    }

    pub fn delimiter(&self) -> CommentDelimiter {
        match self.token.offset {
            1 => CommentDelimiter::Hash,
            2 => CommentDelimiter::Slash,
            _ => CommentDelimiter::Block,
        }
    }
}

impl Display for Comment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.delimiter() {
            CommentDelimiter::Hash => write!(f, "#{}", self.text()),
            CommentDelimiter::Slash => write!(f, "//{}", self.text()),
            CommentDelimiter::Block => write!(f, "/*{}*/", self.text()),
        }
    }
}

/// Trivia record owned by every AST node.
#[derive(Debug, Clone)]
pub struct Meta {
    /// The token that anchors the node (its first significant token).
    pub token: Token,
    /// Brace nesting depth the node was parsed at.
    pub nest_level: usize,
    /// Number of blank lines between the previous node and this one.
    pub previous_empty_lines: usize,
    pub leading: Vec<Comment>,
    pub infix: Vec<Comment>,
    pub trailing: Vec<Comment>,
    pub end_line: usize,
    pub end_position: usize,
}

impl Meta {
    pub fn new(token: Token, nest_level: usize) -> Self {
        let end_line = token.line;
        let end_position = token.position;
        Meta {
            token,
            nest_level,
            previous_empty_lines: 0,
            leading: Vec::new(),
            infix: Vec::new(),
            trailing: Vec::new(),
            end_line,
            end_position,
        }
    }

    /// Meta for nodes that were not produced from source text, e.g. trees
    /// coming back out of the binary codec.
    pub fn detached() -> Self {
        Meta::new(Token::new(TokenKind::Eof, "", 0, 0), 0)
    }
}
