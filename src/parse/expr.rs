use super::*;
use crate::ast::{
    BooleanLiteral, FloatLiteral, FunctionCallExpression, GroupedExpression, IfExpression,
    InfixExpression, Operator, PostfixExpression, PrefixExpression, RtimeLiteral,
};

impl Parser {
    /// Pratt expression parsing with explicit prefix and infix handlers.
    pub(crate) fn parse_expression(&mut self, min: Precedence) -> Result<Expression, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.current_kind();
            let prec = precedence_of(kind);
            if prec <= min {
                break;
            }
            left = match kind {
                TK::Or
                | TK::And
                | TK::Equal
                | TK::NotEqual
                | TK::Match
                | TK::NotMatch
                | TK::GreaterThan
                | TK::LessThan
                | TK::GreaterThanEqual
                | TK::LessThanEqual
                | TK::Addition => self.parse_infix(left, prec)?,
                TK::Percent => self.parse_postfix(left)?,
                TK::LeftParen => self.parse_function_call(left)?,
                _ => break,
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TK::Ident => Ok(Expression::Ident(self.parse_ident()?)),
            TK::String => Ok(Expression::String(self.parse_string()?)),
            TK::Integer => Ok(Expression::Integer(self.parse_integer()?)),
            TK::Float => {
                let value = token
                    .literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidFloat(token.clone()))?;
                let meta = self.open();
                self.advance();
                let mut lit = FloatLiteral { meta, value };
                self.close_expr(&mut lit.meta);
                Ok(Expression::Float(lit))
            }
            TK::Rtime => {
                let meta = self.open();
                self.advance();
                let mut lit = RtimeLiteral {
                    meta,
                    value: token.literal.clone(),
                };
                self.close_expr(&mut lit.meta);
                Ok(Expression::Rtime(lit))
            }
            TK::True | TK::False => {
                let meta = self.open();
                self.advance();
                let mut lit = BooleanLiteral {
                    meta,
                    value: token.kind == TK::True,
                };
                self.close_expr(&mut lit.meta);
                Ok(Expression::Boolean(lit))
            }
            TK::Not | TK::Subtraction => {
                let meta = self.open();
                self.advance();
                let operator = Operator::from_token_kind(token.kind).unwrap();
                let right = self.parse_expression(Precedence::Prefix)?;
                let mut node = PrefixExpression {
                    meta,
                    operator,
                    right,
                };
                self.close_expr(&mut node.meta);
                Ok(Expression::Prefix(Box::new(node)))
            }
            TK::LeftParen => {
                let meta = self.open();
                self.advance();
                let right = self.parse_expression(Precedence::Lowest)?;
                self.consume(TK::RightParen)?;
                let mut node = GroupedExpression { meta, right };
                self.close_expr(&mut node.meta);
                Ok(Expression::Grouped(Box::new(node)))
            }
            // Ternary form: if(cond, then, else)
            TK::If => {
                let meta = self.open();
                self.advance();
                self.consume(TK::LeftParen)?;
                let condition = self.parse_expression(Precedence::Lowest)?;
                self.consume(TK::Comma)?;
                let consequence = self.parse_expression(Precedence::Lowest)?;
                self.consume(TK::Comma)?;
                let alternative = self.parse_expression(Precedence::Lowest)?;
                self.consume(TK::RightParen)?;
                let mut node = IfExpression {
                    meta,
                    condition,
                    consequence,
                    alternative,
                };
                self.close_expr(&mut node.meta);
                Ok(Expression::IfExpr(Box::new(node)))
            }
            TK::Eof => Err(ParseError::UnexpectedEof(token)),
            TK::Illegal => Err(ParseError::IllegalToken(token)),
            _ => Err(ParseError::ExpectedPrimary(token)),
        }
    }

    fn parse_infix(&mut self, left: Expression, prec: Precedence) -> Result<Expression, ParseError> {
        let token = self.current().clone();
        let operator = Operator::from_token_kind(token.kind)
            .ok_or_else(|| ParseError::UnexpectedToken(token.clone()))?;
        let mut meta = Meta::new(token, self.nest);
        self.advance();
        let right = self.parse_expression(prec)?;
        self.close_expr(&mut meta);
        Ok(Expression::Infix(Box::new(InfixExpression {
            meta,
            operator,
            left,
            right,
        })))
    }

    fn parse_postfix(&mut self, left: Expression) -> Result<Expression, ParseError> {
        let token = self.current().clone();
        let mut meta = Meta::new(token, self.nest);
        self.advance();
        self.close_expr(&mut meta);
        Ok(Expression::Postfix(Box::new(PostfixExpression {
            meta,
            operator: Operator::Percent,
            left,
        })))
    }

    pub(crate) fn parse_function_call(&mut self, left: Expression) -> Result<Expression, ParseError> {
        let function = match left {
            Expression::Ident(ident) => ident,
            other => return Err(ParseError::UnexpectedToken(other.meta().token.clone())),
        };
        let mut meta = function.meta.clone();
        self.consume(TK::LeftParen)?;
        let mut arguments = Vec::new();
        if self.current_kind() != TK::RightParen {
            arguments.push(self.parse_expression(Precedence::Lowest)?);
            while self.current_kind() == TK::Comma {
                self.advance();
                arguments.push(self.parse_expression(Precedence::Lowest)?);
            }
        }
        self.consume(TK::RightParen)?;
        self.close_expr(&mut meta);
        Ok(Expression::FunctionCall(Box::new(FunctionCallExpression {
            meta,
            function,
            arguments,
        })))
    }
}
