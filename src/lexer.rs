use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use crate::token::{lookup_keyword, Token, TokenKind};

/// Single-pass lexer with one character of lookahead.
///
/// Whitespace is skipped, but line-feeds and comments are emitted as tokens
/// so the parser can reconstruct blank-line runs and trivia. The lexer never
/// fails: unrecognised bytes come back as `ILLEGAL` tokens and the parser
/// decides what to do with them.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    file: Rc<str>,
    lines: Option<Vec<&'a str>>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_file(source, "")
    }

    pub fn with_file(source: &'a str, file: &str) -> Self {
        Lexer {
            source,
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            file: Rc::from(file),
            lines: None,
            at_eof: false,
        }
    }

    pub fn file(&self) -> Rc<str> {
        Rc::clone(&self.file)
    }

    /// Returns the raw text of a 1-based source line, for error context
    /// rendering. The line table is built on first use.
    pub fn line_text(&mut self, line: usize) -> Option<&str> {
        let source = self.source;
        let lines = self.lines.get_or_insert_with(|| source.lines().collect());
        lines.get(line.wrapping_sub(1)).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    fn token(&self, kind: TokenKind, literal: impl Into<String>, line: usize, col: usize) -> Token {
        Token {
            kind,
            literal: literal.into(),
            line,
            position: col,
            offset: 0,
            file: Rc::clone(&self.file),
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() && ch != '\n' {
                self.advance();
            } else {
                break;
            }
        }
    }

    // A leading dot is accepted so backend property keys (`.host`) lex as a
    // single identifier token.
    fn is_ident_start(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_' || ch == '.'
    }

    fn is_ident_part(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')
    }

    fn lex_ident(&mut self, line: usize, col: usize) -> Token {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if Self::is_ident_part(ch) {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        let kind = lookup_keyword(&ident);
        self.token(kind, ident, line, col)
    }

    fn lex_number(&mut self, line: usize, col: usize) -> Token {
        let mut digits = String::new();
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else if ch == '.' && !is_float && matches!(self.peek2(), Some(d) if d.is_ascii_digit())
            {
                is_float = true;
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // A trailing duration unit turns the numeric literal into an RTIME.
        if matches!(self.peek(), Some(ch) if ch.is_ascii_alphabetic()) {
            let mut unit = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_alphabetic() {
                    unit.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            let literal = format!("{}{}", digits, unit);
            return match unit.as_str() {
                "ms" | "s" | "m" | "h" | "d" | "y" => {
                    self.token(TokenKind::Rtime, literal, line, col)
                }
                _ => self.token(TokenKind::Illegal, literal, line, col),
            };
        }

        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        self.token(kind, digits, line, col)
    }

    fn lex_string(&mut self, line: usize, col: usize) -> Token {
        self.advance(); // opening quote
        let mut buf = String::new();
        loop {
            match self.advance() {
                Some('"') => {
                    let mut token = self.token(TokenKind::String, buf, line, col);
                    token.offset = 2;
                    return token;
                }
                Some(ch) => buf.push(ch),
                None => return self.token(TokenKind::Illegal, buf, line, col),
            }
        }
    }

    // Brace-quoted strings allow any content, including newlines and bare
    // quotes, until the closing `"}`.
    fn lex_brace_string(&mut self, line: usize, col: usize) -> Token {
        self.advance(); // {
        self.advance(); // "
        let mut buf = String::new();
        loop {
            match self.advance() {
                Some('"') if self.peek() == Some('}') => {
                    self.advance();
                    let mut token = self.token(TokenKind::String, buf, line, col);
                    token.offset = 4;
                    return token;
                }
                Some(ch) => buf.push(ch),
                None => return self.token(TokenKind::Illegal, buf, line, col),
            }
        }
    }

    fn lex_line_comment(&mut self, line: usize, col: usize, offset: usize) -> Token {
        let mut buf = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            buf.push(ch);
            self.advance();
        }
        let mut token = self.token(TokenKind::Comment, buf, line, col);
        token.offset = offset;
        token
    }

    fn lex_block_comment(&mut self, line: usize, col: usize) -> Token {
        self.advance(); // *
        let mut buf = String::new();
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    let mut token = self.token(TokenKind::Comment, buf, line, col);
                    token.offset = 4;
                    return token;
                }
                Some(ch) => buf.push(ch),
                None => return self.token(TokenKind::Illegal, buf, line, col),
            }
        }
    }

    fn two(&mut self, kind: TokenKind, lit: &str, line: usize, col: usize) -> Token {
        self.advance();
        self.token(kind, lit, line, col)
    }

    fn lex_operator(&mut self, ch: char, line: usize, col: usize) -> Token {
        self.advance();
        let followed_by_eq = self.peek() == Some('=');
        match ch {
            '=' => {
                if followed_by_eq {
                    self.two(TokenKind::Equal, "==", line, col)
                } else {
                    self.token(TokenKind::Assign, "=", line, col)
                }
            }
            '+' => {
                if followed_by_eq {
                    self.two(TokenKind::AdditionAssign, "+=", line, col)
                } else {
                    self.token(TokenKind::Addition, "+", line, col)
                }
            }
            '-' => {
                if followed_by_eq {
                    self.two(TokenKind::SubtractionAssign, "-=", line, col)
                } else {
                    self.token(TokenKind::Subtraction, "-", line, col)
                }
            }
            '*' => {
                if followed_by_eq {
                    self.two(TokenKind::MultiplicationAssign, "*=", line, col)
                } else {
                    self.token(TokenKind::Illegal, "*", line, col)
                }
            }
            '/' => {
                if followed_by_eq {
                    self.two(TokenKind::DivisionAssign, "/=", line, col)
                } else {
                    self.token(TokenKind::Slash, "/", line, col)
                }
            }
            '%' => {
                if followed_by_eq {
                    self.two(TokenKind::RemainderAssign, "%=", line, col)
                } else {
                    self.token(TokenKind::Percent, "%", line, col)
                }
            }
            '|' => {
                if followed_by_eq {
                    self.two(TokenKind::BitwiseOrAssign, "|=", line, col)
                } else if self.peek() == Some('|') {
                    self.two(TokenKind::Or, "||", line, col)
                } else {
                    self.token(TokenKind::Illegal, "|", line, col)
                }
            }
            '&' => {
                if followed_by_eq {
                    self.two(TokenKind::BitwiseAndAssign, "&=", line, col)
                } else if self.peek() == Some('&') {
                    self.two(TokenKind::And, "&&", line, col)
                } else {
                    self.token(TokenKind::Illegal, "&", line, col)
                }
            }
            '^' => {
                if followed_by_eq {
                    self.two(TokenKind::BitwiseXorAssign, "^=", line, col)
                } else {
                    self.token(TokenKind::Illegal, "^", line, col)
                }
            }
            '!' => {
                if followed_by_eq {
                    self.two(TokenKind::NotEqual, "!=", line, col)
                } else if self.peek() == Some('~') {
                    self.two(TokenKind::NotMatch, "!~", line, col)
                } else {
                    self.token(TokenKind::Not, "!", line, col)
                }
            }
            '~' => self.token(TokenKind::Match, "~", line, col),
            '>' => {
                if followed_by_eq {
                    self.two(TokenKind::GreaterThanEqual, ">=", line, col)
                } else if self.peek() == Some('>') && self.peek2() == Some('=') {
                    self.advance();
                    self.two(TokenKind::RightShiftAssign, ">>=", line, col)
                } else {
                    self.token(TokenKind::GreaterThan, ">", line, col)
                }
            }
            '<' => {
                if followed_by_eq {
                    self.two(TokenKind::LessThanEqual, "<=", line, col)
                } else if self.peek() == Some('<') && self.peek2() == Some('=') {
                    self.advance();
                    self.two(TokenKind::LeftShiftAssign, "<<=", line, col)
                } else {
                    self.token(TokenKind::LessThan, "<", line, col)
                }
            }
            _ => self.token(TokenKind::Illegal, ch.to_string(), line, col),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_blanks();

        let line = self.line;
        let col = self.column;

        let Some(ch) = self.peek() else {
            self.at_eof = true;
            return self.token(TokenKind::Eof, "", line, col);
        };

        match ch {
            '\n' => {
                self.advance();
                self.token(TokenKind::Lf, "\n", line, col)
            }
            '#' => {
                self.advance();
                self.lex_line_comment(line, col, 1)
            }
            '/' if self.peek2() == Some('/') => {
                self.advance();
                self.advance();
                self.lex_line_comment(line, col, 2)
            }
            '/' if self.peek2() == Some('*') => {
                self.advance();
                self.lex_block_comment(line, col)
            }
            '"' => self.lex_string(line, col),
            '{' if self.peek2() == Some('"') => self.lex_brace_string(line, col),
            '{' => {
                self.advance();
                self.token(TokenKind::LeftBrace, "{", line, col)
            }
            '}' => {
                self.advance();
                self.token(TokenKind::RightBrace, "}", line, col)
            }
            '(' => {
                self.advance();
                self.token(TokenKind::LeftParen, "(", line, col)
            }
            ')' => {
                self.advance();
                self.token(TokenKind::RightParen, ")", line, col)
            }
            ',' => {
                self.advance();
                self.token(TokenKind::Comma, ",", line, col)
            }
            ';' => {
                self.advance();
                self.token(TokenKind::Semicolon, ";", line, col)
            }
            ':' => {
                self.advance();
                self.token(TokenKind::Colon, ":", line, col)
            }
            _ if Self::is_ident_start(ch) => self.lex_ident(line, col),
            _ if ch.is_ascii_digit() => self.lex_number(line, col),
            '=' | '+' | '-' | '*' | '/' | '%' | '|' | '&' | '^' | '!' | '~' | '>' | '<' => {
                self.lex_operator(ch, line, col)
            }
            _ => {
                self.advance();
                self.token(TokenKind::Illegal, ch.to_string(), line, col)
            }
        }
    }

    pub fn tokenize(self) -> impl Iterator<Item = Token> + 'a {
        self
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at_eof {
            return None;
        }
        Some(self.next_token())
    }
}

#[cfg(test)]
#[path = "tests/t_lexer.rs"]
mod tests;
