use std::io::Read;

use crate::ast::{
    AclDeclaration, AclEntry, AddStatement, BackendDeclaration, BackendProperty, BackendValue,
    BlockStatement, BooleanLiteral, BreakStatement, CallStatement, CaseLabel, CaseStatement,
    Declaration, DeclareStatement, DirectorBackend, DirectorDeclaration, DirectorProperty,
    DirectorPropertyEntry, ElseIfStatement, ElseStatement, ErrorStatement, EsiStatement,
    Expression, FallthroughStatement, FloatLiteral, FunctionCallExpression, FunctionCallStatement,
    GotoDestinationStatement, GotoStatement, GroupedExpression, Ident, IfExpression, IfStatement,
    ImportStatement, IncludeStatement, InfixExpression, IntegerLiteral, IpLiteral, LogStatement,
    Meta, Operator, PenaltyboxDeclaration, PostfixExpression, PrefixExpression, Program,
    RatecounterDeclaration, RemoveStatement, RestartStatement, ReturnStatement, RtimeLiteral,
    SetStatement, Statement, StringLiteral, SubroutineDeclaration, SwitchStatement,
    SyntheticBase64Statement, SyntheticStatement, TableDeclaration, TableEntry, TopLevel,
    UnsetStatement,
};
use crate::codec::{Codec, CodecError, Frame, FrameReader, Tag};

fn utf8(frame: Frame, what: &'static str) -> Result<String, CodecError> {
    String::from_utf8(frame.payload).map_err(|_| CodecError::InvalidUtf8(what))
}

impl Codec {
    /// Decodes a whole stream of top-level nodes until a clean end of
    /// stream.
    pub fn decode_program<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<Program, CodecError> {
        let mut body = Vec::new();
        while let Some(item) = self.decode_top_level(reader)? {
            body.push(item);
        }
        Ok(Program { body })
    }

    /// Decodes one top-level node; `None` at a clean end of stream.
    pub fn decode_top_level<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<Option<TopLevel>, CodecError> {
        let Some(tag) = reader.peek_tag()? else {
            return Ok(None);
        };
        if tag == Tag::Fin {
            return Err(CodecError::UnexpectedFin);
        }
        if tag.is_declaration() {
            return Ok(Some(TopLevel::Declaration(
                self.decode_declaration(reader)?,
            )));
        }
        if tag.is_statement() {
            return Ok(Some(TopLevel::Statement(self.decode_statement(reader)?)));
        }
        Err(CodecError::TagMismatch {
            expected: "a declaration or statement",
            found: tag.name(),
        })
    }

    pub fn decode_declaration<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<Declaration, CodecError> {
        let frame = reader.next_frame()?.ok_or(CodecError::UnexpectedEof)?;
        match frame.tag {
            Tag::Acl => {
                let name = self.decode_ident(reader)?;
                let mut entries = Vec::new();
                while reader.peek_tag()? == Some(Tag::AclEntry) {
                    reader.expect(Tag::AclEntry)?;
                    let inverse = self.decode_bool(reader)?;
                    let ip = self.decode_string(reader)?;
                    let mask = if reader.peek_tag()? == Some(Tag::Integer) {
                        Some(self.decode_integer(reader)?)
                    } else {
                        None
                    };
                    reader.expect_end()?;
                    entries.push(AclEntry {
                        meta: Meta::detached(),
                        ip,
                        mask,
                        inverse,
                    });
                }
                reader.expect_end()?;
                Ok(Declaration::Acl(AclDeclaration {
                    meta: Meta::detached(),
                    name,
                    entries,
                }))
            }
            Tag::Backend => {
                let name = self.decode_ident(reader)?;
                let mut properties = Vec::new();
                while reader.peek_tag()? == Some(Tag::BackendProperty) {
                    properties.push(self.decode_backend_property(reader)?);
                }
                reader.expect_end()?;
                Ok(Declaration::Backend(BackendDeclaration {
                    meta: Meta::detached(),
                    name,
                    properties,
                }))
            }
            Tag::Director => {
                let name = self.decode_ident(reader)?;
                let director_type = self.decode_ident(reader)?;
                let mut properties = Vec::new();
                loop {
                    match reader.peek_tag()? {
                        Some(Tag::DirectorProperty) => {
                            properties.push(DirectorProperty::Property(
                                self.decode_director_entry(reader)?,
                            ));
                        }
                        Some(Tag::DirectorBackend) => {
                            reader.expect(Tag::DirectorBackend)?;
                            let mut member = Vec::new();
                            while reader.peek_tag()? == Some(Tag::DirectorProperty) {
                                member.push(self.decode_director_entry(reader)?);
                            }
                            reader.expect_end()?;
                            properties.push(DirectorProperty::Backend(DirectorBackend {
                                meta: Meta::detached(),
                                properties: member,
                            }));
                        }
                        _ => break,
                    }
                }
                reader.expect_end()?;
                Ok(Declaration::Director(DirectorDeclaration {
                    meta: Meta::detached(),
                    name,
                    director_type,
                    properties,
                }))
            }
            Tag::Table => {
                let name = self.decode_ident(reader)?;
                let value_type = if reader.peek_tag()? == Some(Tag::Ident) {
                    Some(self.decode_ident(reader)?)
                } else {
                    None
                };
                let mut entries = Vec::new();
                while reader.peek_tag()? == Some(Tag::TableEntry) {
                    reader.expect(Tag::TableEntry)?;
                    let key = self.decode_string(reader)?;
                    let value = self.decode_expression(reader)?;
                    reader.expect_end()?;
                    entries.push(TableEntry {
                        meta: Meta::detached(),
                        key,
                        value,
                    });
                }
                reader.expect_end()?;
                Ok(Declaration::Table(TableDeclaration {
                    meta: Meta::detached(),
                    name,
                    value_type,
                    entries,
                }))
            }
            Tag::Subroutine => {
                let name = self.decode_ident(reader)?;
                let return_type = if reader.peek_tag()? == Some(Tag::Ident) {
                    Some(self.decode_ident(reader)?)
                } else {
                    None
                };
                let block = self.decode_block(reader)?;
                reader.expect_end()?;
                Ok(Declaration::Subroutine(SubroutineDeclaration {
                    meta: Meta::detached(),
                    name,
                    return_type,
                    block,
                }))
            }
            Tag::Penaltybox => {
                let name = self.decode_ident(reader)?;
                let block = self.decode_block(reader)?;
                reader.expect_end()?;
                Ok(Declaration::Penaltybox(PenaltyboxDeclaration {
                    meta: Meta::detached(),
                    name,
                    block,
                }))
            }
            Tag::Ratecounter => {
                let name = self.decode_ident(reader)?;
                let block = self.decode_block(reader)?;
                reader.expect_end()?;
                Ok(Declaration::Ratecounter(RatecounterDeclaration {
                    meta: Meta::detached(),
                    name,
                    block,
                }))
            }
            Tag::Fin => Err(CodecError::UnexpectedFin),
            other => Err(CodecError::TagMismatch {
                expected: "a declaration",
                found: other.name(),
            }),
        }
    }

    fn decode_backend_property<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<BackendProperty, CodecError> {
        reader.expect(Tag::BackendProperty)?;
        let key = self.decode_ident(reader)?;
        let value = if reader.peek_tag()? == Some(Tag::BackendObject) {
            reader.expect(Tag::BackendObject)?;
            let mut nested = Vec::new();
            while reader.peek_tag()? == Some(Tag::BackendProperty) {
                nested.push(self.decode_backend_property(reader)?);
            }
            reader.expect_end()?;
            BackendValue::Object(nested)
        } else {
            BackendValue::Expression(self.decode_expression(reader)?)
        };
        reader.expect_end()?;
        Ok(BackendProperty {
            meta: Meta::detached(),
            key,
            value,
        })
    }

    fn decode_director_entry<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<DirectorPropertyEntry, CodecError> {
        reader.expect(Tag::DirectorProperty)?;
        let key = self.decode_ident(reader)?;
        let value = self.decode_expression(reader)?;
        reader.expect_end()?;
        Ok(DirectorPropertyEntry {
            meta: Meta::detached(),
            key,
            value,
        })
    }

    pub fn decode_statement<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<Statement, CodecError> {
        let frame = reader.next_frame()?.ok_or(CodecError::UnexpectedEof)?;
        let meta = Meta::detached;
        match frame.tag {
            Tag::Add => {
                let ident = self.decode_ident(reader)?;
                let operator = self.decode_operator(reader)?;
                let value = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Statement::Add(AddStatement {
                    meta: meta(),
                    ident,
                    operator,
                    value,
                }))
            }
            Tag::Set => {
                let ident = self.decode_ident(reader)?;
                let operator = self.decode_operator(reader)?;
                let value = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Statement::Set(SetStatement {
                    meta: meta(),
                    ident,
                    operator,
                    value,
                }))
            }
            Tag::Break => {
                reader.expect_end()?;
                Ok(Statement::Break(BreakStatement { meta: meta() }))
            }
            Tag::Esi => {
                reader.expect_end()?;
                Ok(Statement::Esi(EsiStatement { meta: meta() }))
            }
            Tag::Fallthrough => {
                reader.expect_end()?;
                Ok(Statement::Fallthrough(FallthroughStatement { meta: meta() }))
            }
            Tag::Restart => {
                reader.expect_end()?;
                Ok(Statement::Restart(RestartStatement { meta: meta() }))
            }
            Tag::Call => {
                let subroutine = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::Call(CallStatement {
                    meta: meta(),
                    subroutine,
                }))
            }
            Tag::Declare => {
                let name = self.decode_ident(reader)?;
                let value_type = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::Declare(DeclareStatement {
                    meta: meta(),
                    name,
                    value_type,
                }))
            }
            Tag::Error => {
                let code = if reader.peek_tag()? != Some(Tag::End) {
                    Some(self.decode_expression(reader)?)
                } else {
                    None
                };
                let argument = if reader.peek_tag()? != Some(Tag::End) {
                    Some(self.decode_expression(reader)?)
                } else {
                    None
                };
                reader.expect_end()?;
                Ok(Statement::Error(ErrorStatement {
                    meta: meta(),
                    code,
                    argument,
                }))
            }
            Tag::FunctionCallStatement => {
                let call = self.decode_function_call(reader)?;
                reader.expect_end()?;
                Ok(Statement::FunctionCall(FunctionCallStatement {
                    meta: meta(),
                    call,
                }))
            }
            Tag::Goto => {
                let destination = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::Goto(GotoStatement {
                    meta: meta(),
                    destination,
                }))
            }
            Tag::GotoDestination => {
                let name = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::GotoDestination(GotoDestinationStatement {
                    meta: meta(),
                    name,
                }))
            }
            Tag::If => {
                let condition = self.decode_expression(reader)?;
                let consequence = self.decode_block(reader)?;
                let mut another = Vec::new();
                while reader.peek_tag()? == Some(Tag::ElseIf) {
                    reader.expect(Tag::ElseIf)?;
                    let keyword = utf8(reader.expect(Tag::String)?, "else-if keyword")?;
                    let condition = self.decode_expression(reader)?;
                    let consequence = self.decode_block(reader)?;
                    reader.expect_end()?;
                    another.push(ElseIfStatement {
                        meta: meta(),
                        keyword,
                        condition,
                        consequence,
                    });
                }
                let alternative = if reader.peek_tag()? == Some(Tag::Else) {
                    reader.expect(Tag::Else)?;
                    let consequence = self.decode_block(reader)?;
                    reader.expect_end()?;
                    Some(ElseStatement {
                        meta: meta(),
                        consequence,
                    })
                } else {
                    None
                };
                reader.expect_end()?;
                Ok(Statement::If(IfStatement {
                    meta: meta(),
                    condition,
                    consequence,
                    another,
                    alternative,
                }))
            }
            Tag::Import => {
                let name = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::Import(ImportStatement { meta: meta(), name }))
            }
            Tag::Include => {
                let module = self.decode_string(reader)?;
                reader.expect_end()?;
                Ok(Statement::Include(IncludeStatement {
                    meta: meta(),
                    module,
                }))
            }
            Tag::Log => {
                let value = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Statement::Log(LogStatement { meta: meta(), value }))
            }
            Tag::Synthetic => {
                let value = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Statement::Synthetic(SyntheticStatement {
                    meta: meta(),
                    value,
                }))
            }
            Tag::SyntheticBase64 => {
                let value = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Statement::SyntheticBase64(SyntheticBase64Statement {
                    meta: meta(),
                    value,
                }))
            }
            Tag::Remove => {
                let ident = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::Remove(RemoveStatement {
                    meta: meta(),
                    ident,
                }))
            }
            Tag::Unset => {
                let ident = self.decode_ident(reader)?;
                reader.expect_end()?;
                Ok(Statement::Unset(UnsetStatement {
                    meta: meta(),
                    ident,
                }))
            }
            Tag::Return => {
                let has_parenthesis = self.decode_bool(reader)?;
                let expression = if reader.peek_tag()? != Some(Tag::End) {
                    Some(self.decode_expression(reader)?)
                } else {
                    None
                };
                reader.expect_end()?;
                Ok(Statement::Return(ReturnStatement {
                    meta: meta(),
                    expression,
                    has_parenthesis,
                }))
            }
            Tag::Switch => {
                let control = self.decode_expression(reader)?;
                let default_index = self.decode_integer(reader)?.value;
                let mut cases = Vec::new();
                while reader.peek_tag()? == Some(Tag::Case) {
                    cases.push(self.decode_case(reader)?);
                }
                reader.expect_end()?;
                Ok(Statement::Switch(SwitchStatement {
                    meta: meta(),
                    control,
                    cases,
                    default_index,
                }))
            }
            Tag::Block => {
                let mut statements = Vec::new();
                while reader.peek_tag()? != Some(Tag::End) {
                    statements.push(self.decode_statement(reader)?);
                }
                reader.expect_end()?;
                Ok(Statement::Block(BlockStatement {
                    meta: meta(),
                    statements,
                }))
            }
            Tag::Fin => Err(CodecError::UnexpectedFin),
            other => Err(CodecError::TagMismatch {
                expected: "a statement",
                found: other.name(),
            }),
        }
    }

    fn decode_case<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<CaseStatement, CodecError> {
        reader.expect(Tag::Case)?;
        let fallthrough = self.decode_bool(reader)?;
        let label = if reader.peek_tag()? == Some(Tag::Operator) {
            let operator = self.decode_operator(reader)?;
            let value = self.decode_expression(reader)?;
            Some(CaseLabel { operator, value })
        } else {
            None
        };
        let mut statements = Vec::new();
        while reader.peek_tag()? != Some(Tag::End) {
            statements.push(self.decode_statement(reader)?);
        }
        reader.expect_end()?;
        Ok(CaseStatement {
            meta: Meta::detached(),
            label,
            statements,
            fallthrough,
        })
    }

    fn decode_block<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<BlockStatement, CodecError> {
        reader.expect(Tag::Block)?;
        let mut statements = Vec::new();
        while reader.peek_tag()? != Some(Tag::End) {
            statements.push(self.decode_statement(reader)?);
        }
        reader.expect_end()?;
        Ok(BlockStatement {
            meta: Meta::detached(),
            statements,
        })
    }

    pub fn decode_expression<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<Expression, CodecError> {
        let tag = reader.peek_tag()?.ok_or(CodecError::UnexpectedEof)?;
        match tag {
            Tag::Ident => Ok(Expression::Ident(self.decode_ident(reader)?)),
            Tag::String => Ok(Expression::String(self.decode_string(reader)?)),
            Tag::Ip => {
                let frame = reader.expect(Tag::Ip)?;
                Ok(Expression::Ip(IpLiteral {
                    meta: Meta::detached(),
                    value: utf8(frame, "IP")?,
                }))
            }
            Tag::Rtime => {
                let frame = reader.expect(Tag::Rtime)?;
                Ok(Expression::Rtime(RtimeLiteral {
                    meta: Meta::detached(),
                    value: utf8(frame, "RTIME")?,
                }))
            }
            Tag::Integer => Ok(Expression::Integer(self.decode_integer(reader)?)),
            Tag::Float => {
                let frame = reader.expect(Tag::Float)?;
                let bytes: [u8; 8] = frame
                    .payload
                    .as_slice()
                    .try_into()
                    .map_err(|_| CodecError::InvalidPayload("FLOAT"))?;
                Ok(Expression::Float(FloatLiteral {
                    meta: Meta::detached(),
                    value: f64::from_be_bytes(bytes),
                }))
            }
            Tag::Bool => {
                let value = self.decode_bool(reader)?;
                Ok(Expression::Boolean(BooleanLiteral {
                    meta: Meta::detached(),
                    value,
                }))
            }
            Tag::Grouped => {
                reader.expect(Tag::Grouped)?;
                let right = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Expression::Grouped(Box::new(GroupedExpression {
                    meta: Meta::detached(),
                    right,
                })))
            }
            Tag::Prefix => {
                reader.expect(Tag::Prefix)?;
                let operator = self.decode_operator(reader)?;
                let right = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Expression::Prefix(Box::new(PrefixExpression {
                    meta: Meta::detached(),
                    operator,
                    right,
                })))
            }
            Tag::Infix => {
                reader.expect(Tag::Infix)?;
                let operator = self.decode_operator(reader)?;
                let left = self.decode_expression(reader)?;
                let right = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Expression::Infix(Box::new(InfixExpression {
                    meta: Meta::detached(),
                    operator,
                    left,
                    right,
                })))
            }
            Tag::Postfix => {
                reader.expect(Tag::Postfix)?;
                let operator = self.decode_operator(reader)?;
                let left = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Expression::Postfix(Box::new(PostfixExpression {
                    meta: Meta::detached(),
                    operator,
                    left,
                })))
            }
            Tag::IfExpression => {
                reader.expect(Tag::IfExpression)?;
                let condition = self.decode_expression(reader)?;
                let consequence = self.decode_expression(reader)?;
                let alternative = self.decode_expression(reader)?;
                reader.expect_end()?;
                Ok(Expression::IfExpr(Box::new(IfExpression {
                    meta: Meta::detached(),
                    condition,
                    consequence,
                    alternative,
                })))
            }
            Tag::FunctionCall => Ok(Expression::FunctionCall(Box::new(
                self.decode_function_call(reader)?,
            ))),
            Tag::Fin => Err(CodecError::UnexpectedFin),
            other => Err(CodecError::TagMismatch {
                expected: "an expression",
                found: other.name(),
            }),
        }
    }

    fn decode_function_call<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<FunctionCallExpression, CodecError> {
        reader.expect(Tag::FunctionCall)?;
        let function = self.decode_ident(reader)?;
        let mut arguments = Vec::new();
        while reader.peek_tag()? != Some(Tag::End) {
            arguments.push(self.decode_expression(reader)?);
        }
        reader.expect_end()?;
        Ok(FunctionCallExpression {
            meta: Meta::detached(),
            function,
            arguments,
        })
    }

    fn decode_ident<R: Read>(&self, reader: &mut FrameReader<R>) -> Result<Ident, CodecError> {
        let frame = reader.expect(Tag::Ident)?;
        Ok(Ident {
            meta: Meta::detached(),
            value: utf8(frame, "IDENT")?,
        })
    }

    fn decode_string<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<StringLiteral, CodecError> {
        let frame = reader.expect(Tag::String)?;
        Ok(StringLiteral {
            meta: Meta::detached(),
            value: utf8(frame, "STRING")?,
        })
    }

    fn decode_integer<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<IntegerLiteral, CodecError> {
        let frame = reader.expect(Tag::Integer)?;
        let bytes: [u8; 8] = frame
            .payload
            .as_slice()
            .try_into()
            .map_err(|_| CodecError::InvalidPayload("INTEGER"))?;
        Ok(IntegerLiteral {
            meta: Meta::detached(),
            value: i64::from_be_bytes(bytes),
        })
    }

    fn decode_bool<R: Read>(&self, reader: &mut FrameReader<R>) -> Result<bool, CodecError> {
        let frame = reader.expect(Tag::Bool)?;
        match frame.payload.as_slice() {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(CodecError::InvalidPayload("BOOL")),
        }
    }

    fn decode_operator<R: Read>(
        &self,
        reader: &mut FrameReader<R>,
    ) -> Result<Operator, CodecError> {
        let frame = reader.expect(Tag::Operator)?;
        let text = utf8(frame, "OPERATOR")?;
        Operator::from_str(&text).ok_or(CodecError::InvalidPayload("OPERATOR"))
    }
}
