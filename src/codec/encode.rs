use std::io::Write;

use crate::ast::{
    BackendValue, BlockStatement, CaseStatement, Declaration, DirectorProperty, Expression, Ident,
    Operator, Program, Statement, StringLiteral, TopLevel,
};
use crate::codec::{Codec, CodecError, Tag};

fn frame(out: &mut impl Write, tag: Tag, payload: &[u8]) -> Result<(), CodecError> {
    let len = u16::try_from(payload.len()).map_err(|_| CodecError::Oversize)?;
    out.write_all(&[tag as u8])?;
    out.write_all(&len.to_be_bytes())?;
    out.write_all(payload)?;
    Ok(())
}

fn open(out: &mut impl Write, tag: Tag) -> Result<(), CodecError> {
    frame(out, tag, &[])
}

fn end(out: &mut impl Write) -> Result<(), CodecError> {
    frame(out, Tag::End, &[])
}

impl Codec {
    pub fn encode_program(
        &self,
        out: &mut impl Write,
        program: &Program,
    ) -> Result<(), CodecError> {
        for item in &program.body {
            match item {
                TopLevel::Declaration(decl) => self.encode_declaration(out, decl)?,
                TopLevel::Statement(stmt) => self.encode_statement(out, stmt)?,
            }
        }
        Ok(())
    }

    pub fn encode_declaration(
        &self,
        out: &mut impl Write,
        declaration: &Declaration,
    ) -> Result<(), CodecError> {
        match declaration {
            Declaration::Acl(acl) => {
                open(out, Tag::Acl)?;
                self.ident(out, &acl.name)?;
                for entry in &acl.entries {
                    open(out, Tag::AclEntry)?;
                    self.boolean(out, entry.inverse)?;
                    self.string(out, &entry.ip.value)?;
                    if let Some(mask) = &entry.mask {
                        self.integer(out, mask.value)?;
                    }
                    end(out)?;
                }
                end(out)
            }
            Declaration::Backend(backend) => {
                open(out, Tag::Backend)?;
                self.ident(out, &backend.name)?;
                for property in &backend.properties {
                    self.backend_property(out, &property.key, &property.value)?;
                }
                end(out)
            }
            Declaration::Director(director) => {
                open(out, Tag::Director)?;
                self.ident(out, &director.name)?;
                self.ident(out, &director.director_type)?;
                for property in &director.properties {
                    match property {
                        DirectorProperty::Property(entry) => {
                            open(out, Tag::DirectorProperty)?;
                            self.ident(out, &entry.key)?;
                            self.encode_expression(out, &entry.value)?;
                            end(out)?;
                        }
                        DirectorProperty::Backend(member) => {
                            open(out, Tag::DirectorBackend)?;
                            for entry in &member.properties {
                                open(out, Tag::DirectorProperty)?;
                                self.ident(out, &entry.key)?;
                                self.encode_expression(out, &entry.value)?;
                                end(out)?;
                            }
                            end(out)?;
                        }
                    }
                }
                end(out)
            }
            Declaration::Table(table) => {
                open(out, Tag::Table)?;
                self.ident(out, &table.name)?;
                if let Some(value_type) = &table.value_type {
                    self.ident(out, value_type)?;
                }
                for entry in &table.entries {
                    open(out, Tag::TableEntry)?;
                    self.string(out, &entry.key.value)?;
                    self.encode_expression(out, &entry.value)?;
                    end(out)?;
                }
                end(out)
            }
            Declaration::Subroutine(sub) => {
                open(out, Tag::Subroutine)?;
                self.ident(out, &sub.name)?;
                if let Some(return_type) = &sub.return_type {
                    self.ident(out, return_type)?;
                }
                self.block(out, &sub.block)?;
                end(out)
            }
            Declaration::Penaltybox(decl) => {
                open(out, Tag::Penaltybox)?;
                self.ident(out, &decl.name)?;
                self.block(out, &decl.block)?;
                end(out)
            }
            Declaration::Ratecounter(decl) => {
                open(out, Tag::Ratecounter)?;
                self.ident(out, &decl.name)?;
                self.block(out, &decl.block)?;
                end(out)
            }
        }
    }

    fn backend_property(
        &self,
        out: &mut impl Write,
        key: &Ident,
        value: &BackendValue,
    ) -> Result<(), CodecError> {
        open(out, Tag::BackendProperty)?;
        self.ident(out, key)?;
        match value {
            BackendValue::Expression(expr) => self.encode_expression(out, expr)?,
            BackendValue::Object(properties) => {
                open(out, Tag::BackendObject)?;
                for property in properties {
                    self.backend_property(out, &property.key, &property.value)?;
                }
                end(out)?;
            }
        }
        end(out)
    }

    pub fn encode_statement(
        &self,
        out: &mut impl Write,
        statement: &Statement,
    ) -> Result<(), CodecError> {
        match statement {
            Statement::Add(stmt) => {
                open(out, Tag::Add)?;
                self.ident(out, &stmt.ident)?;
                self.operator(out, stmt.operator)?;
                self.encode_expression(out, &stmt.value)?;
                end(out)
            }
            Statement::Set(stmt) => {
                open(out, Tag::Set)?;
                self.ident(out, &stmt.ident)?;
                self.operator(out, stmt.operator)?;
                self.encode_expression(out, &stmt.value)?;
                end(out)
            }
            Statement::Break(_) => self.marker(out, Tag::Break),
            Statement::Esi(_) => self.marker(out, Tag::Esi),
            Statement::Fallthrough(_) => self.marker(out, Tag::Fallthrough),
            Statement::Restart(_) => self.marker(out, Tag::Restart),
            Statement::Call(stmt) => {
                open(out, Tag::Call)?;
                self.ident(out, &stmt.subroutine)?;
                end(out)
            }
            Statement::Declare(stmt) => {
                open(out, Tag::Declare)?;
                self.ident(out, &stmt.name)?;
                self.ident(out, &stmt.value_type)?;
                end(out)
            }
            Statement::Error(stmt) => {
                open(out, Tag::Error)?;
                if let Some(code) = &stmt.code {
                    self.encode_expression(out, code)?;
                }
                if let Some(argument) = &stmt.argument {
                    self.encode_expression(out, argument)?;
                }
                end(out)
            }
            Statement::FunctionCall(stmt) => {
                open(out, Tag::FunctionCallStatement)?;
                self.function_call(out, &stmt.call)?;
                end(out)
            }
            Statement::Goto(stmt) => {
                open(out, Tag::Goto)?;
                self.ident(out, &stmt.destination)?;
                end(out)
            }
            Statement::GotoDestination(stmt) => {
                open(out, Tag::GotoDestination)?;
                self.ident(out, &stmt.name)?;
                end(out)
            }
            Statement::If(stmt) => {
                open(out, Tag::If)?;
                self.encode_expression(out, &stmt.condition)?;
                self.block(out, &stmt.consequence)?;
                for branch in &stmt.another {
                    open(out, Tag::ElseIf)?;
                    self.string(out, &branch.keyword)?;
                    self.encode_expression(out, &branch.condition)?;
                    self.block(out, &branch.consequence)?;
                    end(out)?;
                }
                if let Some(alt) = &stmt.alternative {
                    open(out, Tag::Else)?;
                    self.block(out, &alt.consequence)?;
                    end(out)?;
                }
                end(out)
            }
            Statement::Import(stmt) => {
                open(out, Tag::Import)?;
                self.ident(out, &stmt.name)?;
                end(out)
            }
            Statement::Include(stmt) => {
                open(out, Tag::Include)?;
                self.string(out, &stmt.module.value)?;
                end(out)
            }
            Statement::Log(stmt) => {
                open(out, Tag::Log)?;
                self.encode_expression(out, &stmt.value)?;
                end(out)
            }
            Statement::Synthetic(stmt) => {
                open(out, Tag::Synthetic)?;
                self.encode_expression(out, &stmt.value)?;
                end(out)
            }
            Statement::SyntheticBase64(stmt) => {
                open(out, Tag::SyntheticBase64)?;
                self.encode_expression(out, &stmt.value)?;
                end(out)
            }
            Statement::Remove(stmt) => {
                open(out, Tag::Remove)?;
                self.ident(out, &stmt.ident)?;
                end(out)
            }
            Statement::Unset(stmt) => {
                open(out, Tag::Unset)?;
                self.ident(out, &stmt.ident)?;
                end(out)
            }
            Statement::Return(stmt) => {
                open(out, Tag::Return)?;
                self.boolean(out, stmt.has_parenthesis)?;
                if let Some(expression) = &stmt.expression {
                    self.encode_expression(out, expression)?;
                }
                end(out)
            }
            Statement::Switch(stmt) => {
                open(out, Tag::Switch)?;
                self.encode_expression(out, &stmt.control)?;
                self.integer(out, stmt.default_index)?;
                for case in &stmt.cases {
                    self.case(out, case)?;
                }
                end(out)
            }
            Statement::Block(block) => self.block(out, block),
        }
    }

    fn case(&self, out: &mut impl Write, case: &CaseStatement) -> Result<(), CodecError> {
        open(out, Tag::Case)?;
        self.boolean(out, case.fallthrough)?;
        if let Some(label) = &case.label {
            self.operator(out, label.operator)?;
            self.encode_expression(out, &label.value)?;
        }
        for statement in &case.statements {
            self.encode_statement(out, statement)?;
        }
        end(out)
    }

    fn block(&self, out: &mut impl Write, block: &BlockStatement) -> Result<(), CodecError> {
        open(out, Tag::Block)?;
        for statement in &block.statements {
            self.encode_statement(out, statement)?;
        }
        end(out)
    }

    fn marker(&self, out: &mut impl Write, tag: Tag) -> Result<(), CodecError> {
        open(out, tag)?;
        end(out)
    }

    pub fn encode_expression(
        &self,
        out: &mut impl Write,
        expression: &Expression,
    ) -> Result<(), CodecError> {
        match expression {
            Expression::Ident(ident) => self.ident(out, ident),
            Expression::String(literal) => self.string_literal(out, literal),
            Expression::Ip(literal) => frame(out, Tag::Ip, literal.value.as_bytes()),
            Expression::Rtime(literal) => frame(out, Tag::Rtime, literal.value.as_bytes()),
            Expression::Integer(literal) => self.integer(out, literal.value),
            Expression::Float(literal) => {
                frame(out, Tag::Float, &literal.value.to_be_bytes())
            }
            Expression::Boolean(literal) => self.boolean(out, literal.value),
            Expression::Grouped(grouped) => {
                open(out, Tag::Grouped)?;
                self.encode_expression(out, &grouped.right)?;
                end(out)
            }
            Expression::Prefix(prefix) => {
                open(out, Tag::Prefix)?;
                self.operator(out, prefix.operator)?;
                self.encode_expression(out, &prefix.right)?;
                end(out)
            }
            Expression::Infix(infix) => {
                open(out, Tag::Infix)?;
                self.operator(out, infix.operator)?;
                self.encode_expression(out, &infix.left)?;
                self.encode_expression(out, &infix.right)?;
                end(out)
            }
            Expression::Postfix(postfix) => {
                open(out, Tag::Postfix)?;
                self.operator(out, postfix.operator)?;
                self.encode_expression(out, &postfix.left)?;
                end(out)
            }
            Expression::IfExpr(ternary) => {
                open(out, Tag::IfExpression)?;
                self.encode_expression(out, &ternary.condition)?;
                self.encode_expression(out, &ternary.consequence)?;
                self.encode_expression(out, &ternary.alternative)?;
                end(out)
            }
            Expression::FunctionCall(call) => self.function_call(out, call),
        }
    }

    fn function_call(
        &self,
        out: &mut impl Write,
        call: &crate::ast::FunctionCallExpression,
    ) -> Result<(), CodecError> {
        open(out, Tag::FunctionCall)?;
        self.ident(out, &call.function)?;
        for argument in &call.arguments {
            self.encode_expression(out, argument)?;
        }
        end(out)
    }

    fn ident(&self, out: &mut impl Write, ident: &Ident) -> Result<(), CodecError> {
        frame(out, Tag::Ident, ident.value.as_bytes())
    }

    fn string(&self, out: &mut impl Write, value: &str) -> Result<(), CodecError> {
        frame(out, Tag::String, value.as_bytes())
    }

    fn string_literal(
        &self,
        out: &mut impl Write,
        literal: &StringLiteral,
    ) -> Result<(), CodecError> {
        frame(out, Tag::String, literal.value.as_bytes())
    }

    fn integer(&self, out: &mut impl Write, value: i64) -> Result<(), CodecError> {
        frame(out, Tag::Integer, &value.to_be_bytes())
    }

    fn boolean(&self, out: &mut impl Write, value: bool) -> Result<(), CodecError> {
        frame(out, Tag::Bool, &[u8::from(value)])
    }

    fn operator(&self, out: &mut impl Write, operator: Operator) -> Result<(), CodecError> {
        frame(out, Tag::Operator, operator.as_str().as_bytes())
    }
}
