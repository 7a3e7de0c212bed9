use crate::ast::{Comment, Expression, Ident, IntegerLiteral, Meta, Program, StringLiteral};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, TokenKind as TK};

mod decl;
mod errors;
mod expr;
mod stmt;

pub use errors::ParseError;

/// Operator precedence, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Or,
    And,
    Equality,
    Comparison,
    Additive,
    Prefix,
    Postfix,
    Call,
}

pub(crate) fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TK::Or => Precedence::Or,
        TK::And => Precedence::And,
        TK::Equal | TK::NotEqual | TK::Match | TK::NotMatch => Precedence::Equality,
        TK::GreaterThan | TK::LessThan | TK::GreaterThanEqual | TK::LessThanEqual => {
            Precedence::Comparison
        }
        TK::Addition => Precedence::Additive,
        TK::Percent => Precedence::Postfix,
        TK::LeftParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Token stream between lexer and grammar.
///
/// The cursor owns all trivia handling: `COMMENT` and `LF` tokens never reach
/// grammar code. Pending comments and blank-line counts accumulate here and
/// are handed out when a node opens (leading), when a node closes on the same
/// line (trailing), or when a block closes with comments still unclaimed
/// (infix).
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    pending: Vec<Comment>,
    empty_lines: usize,
    lf_run: usize,
    filled: bool,
    last_end: (usize, usize),
}

fn token_end(token: &Token) -> (usize, usize) {
    let newlines = token.literal.matches('\n').count();
    if newlines == 0 {
        (
            token.line,
            token.position + token.literal.chars().count() + token.offset,
        )
    } else {
        // Multi-line literal (brace string or block comment): the end column
        // is the length of the last literal line plus the closing delimiter.
        let last = token.literal.rsplit('\n').next().unwrap_or("");
        (
            token.line + newlines,
            last.chars().count() + 1 + token.offset / 2,
        )
    }
}

impl Cursor {
    fn new(lexer: Lexer<'_>) -> Self {
        let tokens: Vec<Token> = lexer.tokenize().collect();
        Cursor {
            tokens,
            pos: 0,
            pending: Vec::new(),
            empty_lines: 0,
            lf_run: 0,
            filled: false,
            last_end: (1, 1),
        }
    }

    /// Advances over trivia tokens, buffering comments and counting blank
    /// lines, until the cursor rests on a significant token.
    fn fill(&mut self) {
        if self.filled {
            return;
        }
        while self.pos < self.tokens.len() {
            match self.tokens[self.pos].kind {
                TK::Lf => {
                    self.lf_run += 1;
                    self.pos += 1;
                }
                TK::Comment => {
                    self.empty_lines += self.lf_run.saturating_sub(1);
                    let prefixed_lf = self.lf_run > 0;
                    self.pending.push(Comment {
                        token: self.tokens[self.pos].clone(),
                        prefixed_lf,
                    });
                    self.lf_run = 0;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.empty_lines += self.lf_run.saturating_sub(1);
        self.lf_run = 0;
        self.filled = true;
    }

    fn current(&mut self) -> &Token {
        self.fill();
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The next significant token after the current one.
    fn peek(&mut self) -> &Token {
        self.fill();
        let mut idx = self.pos + 1;
        while idx < self.tokens.len() {
            match self.tokens[idx].kind {
                TK::Lf | TK::Comment => idx += 1,
                _ => break,
            }
        }
        &self.tokens[idx.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        self.fill();
        if self.pos < self.tokens.len() {
            self.last_end = token_end(&self.tokens[self.pos]);
            if self.tokens[self.pos].kind != TK::Eof {
                self.pos += 1;
                self.filled = false;
            }
        }
    }

    /// Drains buffered comments and the blank-line count for a node that is
    /// about to open.
    fn take_leading(&mut self) -> (Vec<Comment>, usize) {
        self.fill();
        let comments = std::mem::take(&mut self.pending);
        let empty_lines = std::mem::replace(&mut self.empty_lines, 0);
        (comments, empty_lines)
    }

    /// Drains buffered comments that sit on the given line, for trailing
    /// attachment to the node that just closed there.
    fn take_trailing(&mut self, line: usize) -> Vec<Comment> {
        self.fill();
        let mut trailing = Vec::new();
        let mut kept = Vec::new();
        for comment in self.pending.drain(..) {
            if comment.token.line == line && !comment.prefixed_lf {
                trailing.push(comment);
            } else {
                kept.push(comment);
            }
        }
        self.pending = kept;
        trailing
    }

    fn last_end(&self) -> (usize, usize) {
        self.last_end
    }
}

pub struct Parser {
    pub(crate) cursor: Cursor,
    pub(crate) nest: usize,
}

impl Parser {
    pub fn new(lexer: Lexer<'_>) -> Self {
        Parser {
            cursor: Cursor::new(lexer),
            nest: 0,
        }
    }

    /// Parses a complete source file: declarations plus top-level `include`
    /// and `import` statements.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        loop {
            let token = self.cursor.current().clone();
            match token.kind {
                TK::Eof => break,
                TK::Acl
                | TK::Backend
                | TK::Director
                | TK::Table
                | TK::Sub
                | TK::Penaltybox
                | TK::Ratecounter => {
                    let decl = self.parse_declaration()?;
                    program.body.push(crate::ast::TopLevel::Declaration(decl));
                }
                TK::Include | TK::Import => {
                    let stmt = self.parse_statement()?;
                    program.body.push(crate::ast::TopLevel::Statement(stmt));
                }
                TK::Illegal => return Err(ParseError::IllegalToken(token)),
                _ => return Err(ParseError::UnexpectedToken(token)),
            }
        }
        Ok(program)
    }

    /// Parses a bare statement sequence, used when splicing remote snippets
    /// into a lifecycle subroutine scope.
    pub fn parse_statements(mut self) -> Result<Vec<crate::ast::Statement>, ParseError> {
        let mut statements = Vec::new();
        while self.cursor.current().kind != TK::Eof {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // -- Cursor helpers shared by the grammar submodules --

    pub(crate) fn current(&mut self) -> &Token {
        self.cursor.current()
    }

    pub(crate) fn current_kind(&mut self) -> TokenKind {
        self.cursor.current().kind
    }

    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.cursor.peek().kind
    }

    pub(crate) fn advance(&mut self) {
        self.cursor.advance();
    }

    /// Opens a node anchored at the current token, claiming pending leading
    /// trivia.
    pub(crate) fn open(&mut self) -> Meta {
        let (leading, empty_lines) = self.cursor.take_leading();
        let token = self.cursor.current().clone();
        let mut meta = Meta::new(token, self.nest);
        meta.leading = leading;
        meta.previous_empty_lines = empty_lines;
        meta
    }

    /// Closes a statement- or declaration-level node: records its end
    /// position and claims trailing comments on the closing line.
    pub(crate) fn close(&mut self, meta: &mut Meta) {
        let (line, position) = self.cursor.last_end();
        meta.end_line = line;
        meta.end_position = position;
        meta.trailing = self.cursor.take_trailing(line);
    }

    /// Closes an expression node: end position only, no trailing claim.
    pub(crate) fn close_expr(&mut self, meta: &mut Meta) {
        let (line, position) = self.cursor.last_end();
        meta.end_line = line;
        meta.end_position = position;
    }

    pub(crate) fn consume(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let token = self.cursor.current().clone();
        if token.kind == expected {
            self.advance();
            Ok(token)
        } else if token.kind == TK::Eof {
            Err(ParseError::UnexpectedEof(token))
        } else {
            Err(ParseError::ExpectedToken {
                expected,
                found: token,
            })
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.cursor.current().clone();
        if token.kind != TK::Ident {
            return Err(ParseError::ExpectedIdent(token));
        }
        let meta = self.open();
        self.advance();
        let mut ident = Ident {
            meta,
            value: token.literal.clone(),
        };
        self.close_expr(&mut ident.meta);
        Ok(ident)
    }

    pub(crate) fn parse_string(&mut self) -> Result<StringLiteral, ParseError> {
        let token = self.cursor.current().clone();
        if token.kind != TK::String {
            return Err(ParseError::ExpectedString(token));
        }
        let meta = self.open();
        self.advance();
        let mut lit = StringLiteral {
            meta,
            value: token.literal.clone(),
        };
        self.close_expr(&mut lit.meta);
        Ok(lit)
    }

    pub(crate) fn parse_integer(&mut self) -> Result<IntegerLiteral, ParseError> {
        let token = self.cursor.current().clone();
        if token.kind != TK::Integer {
            return Err(ParseError::ExpectedInteger(token));
        }
        let value = token
            .literal
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidInteger(token.clone()))?;
        let meta = self.open();
        self.advance();
        let mut lit = IntegerLiteral { meta, value };
        self.close_expr(&mut lit.meta);
        Ok(lit)
    }

    /// Claims any comments still pending inside a block, right before its
    /// closing brace, as infix trivia of the enclosing node.
    pub(crate) fn take_infix(&mut self) -> Vec<Comment> {
        let (comments, _) = self.cursor.take_leading();
        comments
    }
}

/// Convenience entry point: lex and parse a full program.
pub fn parse(source: &str, file: &str) -> Result<Program, ParseError> {
    Parser::new(Lexer::with_file(source, file)).parse_program()
}

/// Convenience entry point: lex and parse a statement sequence.
pub fn parse_snippet(source: &str, file: &str) -> Result<Vec<crate::ast::Statement>, ParseError> {
    Parser::new(Lexer::with_file(source, file)).parse_statements()
}

#[cfg(test)]
#[path = "../tests/t_parse.rs"]
mod tests;
