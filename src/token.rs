use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Token kinds for the VCL surface syntax.
///
/// `Ident`, literals and `Comment` carry their lexeme in [`Token::literal`];
/// the kind itself is a pure tag so it stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    String,
    Integer,
    Float,
    Rtime,
    Comment,
    Lf,
    Eof,
    Illegal,

    // Keywords
    Acl,
    Backend,
    Director,
    Table,
    Sub,
    Penaltybox,
    Ratecounter,
    Add,
    Break,
    Call,
    Case,
    Declare,
    Default,
    Error,
    Esi,
    Fallthrough,
    Goto,
    If,
    Else,
    ElseIf,
    Elsif,
    Import,
    Include,
    Log,
    Remove,
    Restart,
    Return,
    Set,
    Switch,
    Synthetic,
    SyntheticBase64,
    Unset,
    True,
    False,

    // Operators
    Assign,
    Addition,
    AdditionAssign,
    Subtraction,
    SubtractionAssign,
    MultiplicationAssign,
    DivisionAssign,
    RemainderAssign,
    BitwiseOrAssign,
    BitwiseAndAssign,
    BitwiseXorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    Equal,
    NotEqual,
    Match,
    NotMatch,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
    And,
    Or,
    Not,
    Percent,
    Slash,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Colon,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Ident => "IDENT",
            TokenKind::String => "STRING",
            TokenKind::Integer => "INTEGER",
            TokenKind::Float => "FLOAT",
            TokenKind::Rtime => "RTIME",
            TokenKind::Comment => "COMMENT",
            TokenKind::Lf => "LF",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Acl => "acl",
            TokenKind::Backend => "backend",
            TokenKind::Director => "director",
            TokenKind::Table => "table",
            TokenKind::Sub => "sub",
            TokenKind::Penaltybox => "penaltybox",
            TokenKind::Ratecounter => "ratecounter",
            TokenKind::Add => "add",
            TokenKind::Break => "break",
            TokenKind::Call => "call",
            TokenKind::Case => "case",
            TokenKind::Declare => "declare",
            TokenKind::Default => "default",
            TokenKind::Error => "error",
            TokenKind::Esi => "esi",
            TokenKind::Fallthrough => "fallthrough",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::ElseIf => "elseif",
            TokenKind::Elsif => "elsif",
            TokenKind::Import => "import",
            TokenKind::Include => "include",
            TokenKind::Log => "log",
            TokenKind::Remove => "remove",
            TokenKind::Restart => "restart",
            TokenKind::Return => "return",
            TokenKind::Set => "set",
            TokenKind::Switch => "switch",
            TokenKind::Synthetic => "synthetic",
            TokenKind::SyntheticBase64 => "synthetic.base64",
            TokenKind::Unset => "unset",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Assign => "=",
            TokenKind::Addition => "+",
            TokenKind::AdditionAssign => "+=",
            TokenKind::Subtraction => "-",
            TokenKind::SubtractionAssign => "-=",
            TokenKind::MultiplicationAssign => "*=",
            TokenKind::DivisionAssign => "/=",
            TokenKind::RemainderAssign => "%=",
            TokenKind::BitwiseOrAssign => "|=",
            TokenKind::BitwiseAndAssign => "&=",
            TokenKind::BitwiseXorAssign => "^=",
            TokenKind::LeftShiftAssign => "<<=",
            TokenKind::RightShiftAssign => ">>=",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Match => "~",
            TokenKind::NotMatch => "!~",
            TokenKind::GreaterThan => ">",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::LessThanEqual => "<=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Not => "!",
            TokenKind::Percent => "%",
            TokenKind::Slash => "/",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::AdditionAssign
                | TokenKind::SubtractionAssign
                | TokenKind::MultiplicationAssign
                | TokenKind::DivisionAssign
                | TokenKind::RemainderAssign
                | TokenKind::BitwiseOrAssign
                | TokenKind::BitwiseAndAssign
                | TokenKind::BitwiseXorAssign
                | TokenKind::LeftShiftAssign
                | TokenKind::RightShiftAssign
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rewrites an identifier lexeme into its keyword kind, if it is one.
pub fn lookup_keyword(ident: &str) -> TokenKind {
    match ident {
        "acl" => TokenKind::Acl,
        "backend" => TokenKind::Backend,
        "director" => TokenKind::Director,
        "table" => TokenKind::Table,
        "sub" => TokenKind::Sub,
        "penaltybox" => TokenKind::Penaltybox,
        "ratecounter" => TokenKind::Ratecounter,
        "add" => TokenKind::Add,
        "break" => TokenKind::Break,
        "call" => TokenKind::Call,
        "case" => TokenKind::Case,
        "declare" => TokenKind::Declare,
        "default" => TokenKind::Default,
        "error" => TokenKind::Error,
        "esi" => TokenKind::Esi,
        "fallthrough" => TokenKind::Fallthrough,
        "goto" => TokenKind::Goto,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "elseif" => TokenKind::ElseIf,
        "elsif" => TokenKind::Elsif,
        "import" => TokenKind::Import,
        "include" => TokenKind::Include,
        "log" => TokenKind::Log,
        "remove" => TokenKind::Remove,
        "restart" => TokenKind::Restart,
        "return" => TokenKind::Return,
        "set" => TokenKind::Set,
        "switch" => TokenKind::Switch,
        "synthetic" => TokenKind::Synthetic,
        "synthetic.base64" => TokenKind::SyntheticBase64,
        "unset" => TokenKind::Unset,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Ident,
    }
}

/// A lexed token with its source position.
///
/// `line` and `position` are 1-based. `offset` counts extra delimiter
/// characters consumed beyond the literal itself: 2 for `"…"` strings, 4 for
/// `{"…"}` strings, and 1/2/4 for `#`, `//` and `/* */` comments, so the
/// original spelling can be reconstructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub position: usize,
    pub offset: usize,
    pub file: Rc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, position: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            line,
            position,
            offset: 0,
            file: Rc::from(""),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Ident
            | TokenKind::String
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Rtime
            | TokenKind::Comment
            | TokenKind::Illegal => write!(f, "{}({})", self.kind.as_str(), self.literal),
            _ => write!(f, "{}", self.kind.as_str()),
        }
    }
}

#[cfg(test)]
#[path = "tests/t_token.rs"]
mod tests;
