use super::*;
use crate::ast::{
    AddStatement, BlockStatement, BreakStatement, CallStatement, CaseLabel, CaseStatement,
    DeclareStatement, ElseIfStatement, ElseStatement, ErrorStatement, EsiStatement,
    FallthroughStatement, FunctionCallStatement, GotoDestinationStatement, GotoStatement,
    IfStatement, ImportStatement, IncludeStatement, LogStatement, Operator, RemoveStatement,
    RestartStatement, ReturnStatement, SetStatement, Statement, SwitchStatement,
    SyntheticBase64Statement, SyntheticStatement, UnsetStatement,
};

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TK::Set => self.parse_set(),
            TK::Add => self.parse_add(),
            TK::Unset => self.parse_unset(),
            TK::Remove => self.parse_remove(),
            TK::Declare => self.parse_declare(),
            TK::Call => self.parse_call(),
            TK::Error => self.parse_error_statement(),
            TK::Esi => self.parse_esi(),
            TK::Log => self.parse_log(),
            TK::Restart => self.parse_restart(),
            TK::Return => self.parse_return(),
            TK::Synthetic => self.parse_synthetic(),
            TK::SyntheticBase64 => self.parse_synthetic_base64(),
            TK::If => self.parse_if(),
            TK::Switch => self.parse_switch(),
            TK::Goto => self.parse_goto(),
            TK::Include => self.parse_include(),
            TK::Import => self.parse_import(),
            TK::Break => {
                let meta = self.open();
                self.advance();
                self.consume(TK::Semicolon)?;
                let mut stmt = BreakStatement { meta };
                self.close(&mut stmt.meta);
                Ok(Statement::Break(stmt))
            }
            TK::Fallthrough => {
                let meta = self.open();
                self.advance();
                self.consume(TK::Semicolon)?;
                let mut stmt = FallthroughStatement { meta };
                self.close(&mut stmt.meta);
                Ok(Statement::Fallthrough(stmt))
            }
            TK::LeftBrace => {
                let block = self.parse_block()?;
                Ok(Statement::Block(block))
            }
            // `NAME:` goto destination; `func(...)` function call statement.
            TK::Ident => {
                if self.peek_kind() == TK::Colon {
                    self.parse_goto_destination()
                } else if self.peek_kind() == TK::LeftParen {
                    self.parse_function_call_statement()
                } else {
                    Err(ParseError::UnexpectedToken(token))
                }
            }
            TK::Eof => Err(ParseError::UnexpectedEof(token)),
            TK::Illegal => Err(ParseError::IllegalToken(token)),
            _ => Err(ParseError::UnexpectedToken(token)),
        }
    }

    /// `{ ... }`, attaching comments that no child claimed as infix trivia.
    pub(crate) fn parse_block(&mut self) -> Result<BlockStatement, ParseError> {
        let meta = self.open();
        self.consume(TK::LeftBrace)?;
        self.nest += 1;

        let mut block = BlockStatement {
            meta,
            statements: Vec::new(),
        };
        while !matches!(self.current_kind(), TK::RightBrace | TK::Eof) {
            block.statements.push(self.parse_statement()?);
        }

        block.meta.infix = self.take_infix();
        self.nest -= 1;
        self.consume(TK::RightBrace)?;
        self.close(&mut block.meta);
        Ok(block)
    }

    fn parse_assignment_operator(&mut self) -> Result<Operator, ParseError> {
        let token = self.current().clone();
        if !token.kind.is_assignment() {
            return Err(ParseError::ExpectedAssignment(token));
        }
        self.advance();
        Ok(Operator::from_token_kind(token.kind).unwrap())
    }

    fn parse_set(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let ident = self.parse_ident()?;
        let operator = self.parse_assignment_operator()?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::Semicolon)?;
        let mut stmt = SetStatement {
            meta,
            ident,
            operator,
            value,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::Set(stmt))
    }

    fn parse_add(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let ident = self.parse_ident()?;
        let operator = self.parse_assignment_operator()?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::Semicolon)?;
        let mut stmt = AddStatement {
            meta,
            ident,
            operator,
            value,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::Add(stmt))
    }

    fn parse_unset(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let ident = self.parse_ident()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = UnsetStatement { meta, ident };
        self.close(&mut stmt.meta);
        Ok(Statement::Unset(stmt))
    }

    fn parse_remove(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let ident = self.parse_ident()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = RemoveStatement { meta, ident };
        self.close(&mut stmt.meta);
        Ok(Statement::Remove(stmt))
    }

    /// `declare local var.NAME TYPE;`
    fn parse_declare(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let local = self.parse_ident()?;
        if local.value != "local" {
            return Err(ParseError::UnexpectedToken(local.meta.token));
        }
        let name = self.parse_ident()?;
        let value_type = self.parse_ident()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = DeclareStatement {
            meta,
            name,
            value_type,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::Declare(stmt))
    }

    fn parse_call(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let subroutine = self.parse_ident()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = CallStatement { meta, subroutine };
        self.close(&mut stmt.meta);
        Ok(Statement::Call(stmt))
    }

    /// `error;`, `error CODE;` or `error CODE ARGUMENT;`
    fn parse_error_statement(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let mut code = None;
        let mut argument = None;
        if self.current_kind() != TK::Semicolon {
            code = Some(self.parse_expression(Precedence::Lowest)?);
            if self.current_kind() != TK::Semicolon {
                argument = Some(self.parse_expression(Precedence::Lowest)?);
            }
        }
        self.consume(TK::Semicolon)?;
        let mut stmt = ErrorStatement {
            meta,
            code,
            argument,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::Error(stmt))
    }

    fn parse_esi(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        self.consume(TK::Semicolon)?;
        let mut stmt = EsiStatement { meta };
        self.close(&mut stmt.meta);
        Ok(Statement::Esi(stmt))
    }

    fn parse_log(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::Semicolon)?;
        let mut stmt = LogStatement { meta, value };
        self.close(&mut stmt.meta);
        Ok(Statement::Log(stmt))
    }

    fn parse_restart(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        self.consume(TK::Semicolon)?;
        let mut stmt = RestartStatement { meta };
        self.close(&mut stmt.meta);
        Ok(Statement::Restart(stmt))
    }

    /// `return;`, `return EXPR;` and `return(EXPR);` all parse; the
    /// parenthesised form is recorded so the formatter can reproduce it.
    fn parse_return(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let mut expression = None;
        let mut has_parenthesis = false;
        match self.current_kind() {
            TK::Semicolon => {}
            TK::LeftParen => {
                has_parenthesis = true;
                self.advance();
                expression = Some(self.parse_expression(Precedence::Lowest)?);
                self.consume(TK::RightParen)?;
            }
            _ => {
                expression = Some(self.parse_expression(Precedence::Lowest)?);
            }
        }
        self.consume(TK::Semicolon)?;
        let mut stmt = ReturnStatement {
            meta,
            expression,
            has_parenthesis,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::Return(stmt))
    }

    fn parse_synthetic(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::Semicolon)?;
        let mut stmt = SyntheticStatement { meta, value };
        self.close(&mut stmt.meta);
        Ok(Statement::Synthetic(stmt))
    }

    fn parse_synthetic_base64(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::Semicolon)?;
        let mut stmt = SyntheticBase64Statement { meta, value };
        self.close(&mut stmt.meta);
        Ok(Statement::SyntheticBase64(stmt))
    }

    fn parse_goto(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let destination = self.parse_ident()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = GotoStatement { meta, destination };
        self.close(&mut stmt.meta);
        Ok(Statement::Goto(stmt))
    }

    fn parse_goto_destination(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        let name = self.parse_ident()?;
        self.consume(TK::Colon)?;
        let mut stmt = GotoDestinationStatement { meta, name };
        self.close(&mut stmt.meta);
        Ok(Statement::GotoDestination(stmt))
    }

    pub(crate) fn parse_include(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let module = self.parse_string()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = IncludeStatement { meta, module };
        self.close(&mut stmt.meta);
        Ok(Statement::Include(stmt))
    }

    pub(crate) fn parse_import(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        self.consume(TK::Semicolon)?;
        let mut stmt = ImportStatement { meta, name };
        self.close(&mut stmt.meta);
        Ok(Statement::Import(stmt))
    }

    fn parse_function_call_statement(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        let ident = self.parse_ident()?;
        let call = match self.parse_function_call(Expression::Ident(ident))? {
            Expression::FunctionCall(call) => *call,
            _ => unreachable!("function call parser returns a function call"),
        };
        self.consume(TK::Semicolon)?;
        let mut stmt = FunctionCallStatement { meta, call };
        self.close(&mut stmt.meta);
        Ok(Statement::FunctionCall(stmt))
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        self.consume(TK::LeftParen)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::RightParen)?;
        let consequence = self.parse_block()?;

        let mut another = Vec::new();
        let mut alternative = None;

        loop {
            match self.current_kind() {
                // `else if` / `else { ... }`
                TK::Else => {
                    if self.peek_kind() == TK::If {
                        let branch_meta = self.open();
                        self.advance();
                        self.advance();
                        another.push(self.parse_else_if(branch_meta, "else if")?);
                    } else {
                        let else_meta = self.open();
                        self.advance();
                        let consequence = self.parse_block()?;
                        let mut stmt = ElseStatement {
                            meta: else_meta,
                            consequence,
                        };
                        self.close(&mut stmt.meta);
                        alternative = Some(stmt);
                        break;
                    }
                }
                // `elseif` / `elsif` single-token spellings
                TK::ElseIf => {
                    let branch_meta = self.open();
                    self.advance();
                    another.push(self.parse_else_if(branch_meta, "elseif")?);
                }
                TK::Elsif => {
                    let branch_meta = self.open();
                    self.advance();
                    another.push(self.parse_else_if(branch_meta, "elsif")?);
                }
                _ => break,
            }
        }

        let mut stmt = IfStatement {
            meta,
            condition,
            consequence,
            another,
            alternative,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::If(stmt))
    }

    fn parse_else_if(
        &mut self,
        meta: Meta,
        keyword: &str,
    ) -> Result<ElseIfStatement, ParseError> {
        self.consume(TK::LeftParen)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::RightParen)?;
        let consequence = self.parse_block()?;
        let mut stmt = ElseIfStatement {
            meta,
            keyword: keyword.to_string(),
            condition,
            consequence,
        };
        self.close(&mut stmt.meta);
        Ok(stmt)
    }

    fn parse_switch(&mut self) -> Result<Statement, ParseError> {
        let meta = self.open();
        self.advance();
        self.consume(TK::LeftParen)?;
        let control = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::RightParen)?;
        self.consume(TK::LeftBrace)?;
        self.nest += 1;

        let mut cases = Vec::new();
        let mut default_index: i64 = -1;

        loop {
            match self.current_kind() {
                TK::Case => {
                    cases.push(self.parse_case(false)?);
                }
                TK::Default => {
                    let token = self.current().clone();
                    if default_index >= 0 {
                        return Err(ParseError::UnexpectedToken(token));
                    }
                    default_index = cases.len() as i64;
                    cases.push(self.parse_case(true)?);
                }
                TK::RightBrace => break,
                _ => return Err(ParseError::UnexpectedToken(self.current().clone())),
            }
        }

        self.nest -= 1;
        self.consume(TK::RightBrace)?;
        let mut stmt = SwitchStatement {
            meta,
            control,
            cases,
            default_index,
        };
        self.close(&mut stmt.meta);
        Ok(Statement::Switch(stmt))
    }

    /// `case EXPR:` compares with `==`; `case ~EXPR:` matches as a regex.
    /// The case body runs until `break;`, `fallthrough;` or the next label.
    fn parse_case(&mut self, is_default: bool) -> Result<CaseStatement, ParseError> {
        let meta = self.open();
        self.advance(); // case | default

        let label = if is_default {
            None
        } else {
            let operator = if self.current_kind() == TK::Match {
                self.advance();
                Operator::Match
            } else {
                Operator::Equal
            };
            let value = self.parse_expression(Precedence::Lowest)?;
            Some(CaseLabel { operator, value })
        };
        self.consume(TK::Colon)?;

        let mut statements = Vec::new();
        let mut fallthrough = false;
        loop {
            match self.current_kind() {
                TK::Break => {
                    self.advance();
                    self.consume(TK::Semicolon)?;
                    break;
                }
                TK::Fallthrough => {
                    self.advance();
                    self.consume(TK::Semicolon)?;
                    fallthrough = true;
                    break;
                }
                TK::Case | TK::Default | TK::RightBrace => break,
                _ => statements.push(self.parse_statement()?),
            }
        }

        let mut stmt = CaseStatement {
            meta,
            label,
            statements,
            fallthrough,
        };
        self.close(&mut stmt.meta);
        Ok(stmt)
    }
}
