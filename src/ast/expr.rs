use std::fmt::{Display, Formatter};

use crate::ast::meta::Meta;
use crate::token::TokenKind;

/// Expression and statement operators with their source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    // Comparison
    Equal,
    NotEqual,
    Match,
    NotMatch,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
    // Logical
    And,
    Or,
    Not,
    // Arithmetic / concatenation
    Addition,
    Subtraction,
    Percent,
    // Assignment family (statement-level only)
    Assign,
    AdditionAssign,
    SubtractionAssign,
    MultiplicationAssign,
    DivisionAssign,
    RemainderAssign,
    BitwiseOrAssign,
    BitwiseAndAssign,
    BitwiseXorAssign,
    LeftShiftAssign,
    RightShiftAssign,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Match => "~",
            Operator::NotMatch => "!~",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanEqual => ">=",
            Operator::LessThanEqual => "<=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "!",
            Operator::Addition => "+",
            Operator::Subtraction => "-",
            Operator::Percent => "%",
            Operator::Assign => "=",
            Operator::AdditionAssign => "+=",
            Operator::SubtractionAssign => "-=",
            Operator::MultiplicationAssign => "*=",
            Operator::DivisionAssign => "/=",
            Operator::RemainderAssign => "%=",
            Operator::BitwiseOrAssign => "|=",
            Operator::BitwiseAndAssign => "&=",
            Operator::BitwiseXorAssign => "^=",
            Operator::LeftShiftAssign => "<<=",
            Operator::RightShiftAssign => ">>=",
        }
    }

    pub fn from_token_kind(kind: TokenKind) -> Option<Operator> {
        Some(match kind {
            TokenKind::Equal => Operator::Equal,
            TokenKind::NotEqual => Operator::NotEqual,
            TokenKind::Match => Operator::Match,
            TokenKind::NotMatch => Operator::NotMatch,
            TokenKind::GreaterThan => Operator::GreaterThan,
            TokenKind::LessThan => Operator::LessThan,
            TokenKind::GreaterThanEqual => Operator::GreaterThanEqual,
            TokenKind::LessThanEqual => Operator::LessThanEqual,
            TokenKind::And => Operator::And,
            TokenKind::Or => Operator::Or,
            TokenKind::Not => Operator::Not,
            TokenKind::Addition => Operator::Addition,
            TokenKind::Subtraction => Operator::Subtraction,
            TokenKind::Percent => Operator::Percent,
            TokenKind::Assign => Operator::Assign,
            TokenKind::AdditionAssign => Operator::AdditionAssign,
            TokenKind::SubtractionAssign => Operator::SubtractionAssign,
            TokenKind::MultiplicationAssign => Operator::MultiplicationAssign,
            TokenKind::DivisionAssign => Operator::DivisionAssign,
            TokenKind::RemainderAssign => Operator::RemainderAssign,
            TokenKind::BitwiseOrAssign => Operator::BitwiseOrAssign,
            TokenKind::BitwiseAndAssign => Operator::BitwiseAndAssign,
            TokenKind::BitwiseXorAssign => Operator::BitwiseXorAssign,
            TokenKind::LeftShiftAssign => Operator::LeftShiftAssign,
            TokenKind::RightShiftAssign => Operator::RightShiftAssign,
            _ => return None,
        })
    }

    pub fn from_str(s: &str) -> Option<Operator> {
        Some(match s {
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "~" => Operator::Match,
            "!~" => Operator::NotMatch,
            ">" => Operator::GreaterThan,
            "<" => Operator::LessThan,
            ">=" => Operator::GreaterThanEqual,
            "<=" => Operator::LessThanEqual,
            "&&" => Operator::And,
            "||" => Operator::Or,
            "!" => Operator::Not,
            "+" => Operator::Addition,
            "-" => Operator::Subtraction,
            "%" => Operator::Percent,
            "=" => Operator::Assign,
            "+=" => Operator::AdditionAssign,
            "-=" => Operator::SubtractionAssign,
            "*=" => Operator::MultiplicationAssign,
            "/=" => Operator::DivisionAssign,
            "%=" => Operator::RemainderAssign,
            "|=" => Operator::BitwiseOrAssign,
            "&=" => Operator::BitwiseAndAssign,
            "^=" => Operator::BitwiseXorAssign,
            "<<=" => Operator::LeftShiftAssign,
            ">>=" => Operator::RightShiftAssign,
            _ => return None,
        })
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::AdditionAssign
                | Operator::SubtractionAssign
                | Operator::MultiplicationAssign
                | Operator::DivisionAssign
                | Operator::RemainderAssign
                | Operator::BitwiseOrAssign
                | Operator::BitwiseAndAssign
                | Operator::BitwiseXorAssign
                | Operator::LeftShiftAssign
                | Operator::RightShiftAssign
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// -- Leaf values --

#[derive(Debug, Clone)]
pub struct Ident {
    pub meta: Meta,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub meta: Meta,
    pub value: String,
}

impl StringLiteral {
    /// Whether the literal was written in `{"…"}` form.
    pub fn brace_quoted(&self) -> bool {
        self.meta.token.offset == 4
    }
}

#[derive(Debug, Clone)]
pub struct IpLiteral {
    pub meta: Meta,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct RtimeLiteral {
    pub meta: Meta,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub meta: Meta,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct FloatLiteral {
    pub meta: Meta,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct BooleanLiteral {
    pub meta: Meta,
    pub value: bool,
}

// -- Composite expressions --

#[derive(Debug, Clone)]
pub struct GroupedExpression {
    pub meta: Meta,
    pub right: Expression,
}

#[derive(Debug, Clone)]
pub struct PrefixExpression {
    pub meta: Meta,
    pub operator: Operator,
    pub right: Expression,
}

#[derive(Debug, Clone)]
pub struct InfixExpression {
    pub meta: Meta,
    pub operator: Operator,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone)]
pub struct PostfixExpression {
    pub meta: Meta,
    pub operator: Operator,
    pub left: Expression,
}

/// Ternary `if(cond, then, else)` expression.
#[derive(Debug, Clone)]
pub struct IfExpression {
    pub meta: Meta,
    pub condition: Expression,
    pub consequence: Expression,
    pub alternative: Expression,
}

#[derive(Debug, Clone)]
pub struct FunctionCallExpression {
    pub meta: Meta,
    pub function: Ident,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Ident(Ident),
    String(StringLiteral),
    Ip(IpLiteral),
    Rtime(RtimeLiteral),
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    Boolean(BooleanLiteral),
    Grouped(Box<GroupedExpression>),
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    Postfix(Box<PostfixExpression>),
    IfExpr(Box<IfExpression>),
    FunctionCall(Box<FunctionCallExpression>),
}

impl Expression {
    pub fn meta(&self) -> &Meta {
        match self {
            Expression::Ident(n) => &n.meta,
            Expression::String(n) => &n.meta,
            Expression::Ip(n) => &n.meta,
            Expression::Rtime(n) => &n.meta,
            Expression::Integer(n) => &n.meta,
            Expression::Float(n) => &n.meta,
            Expression::Boolean(n) => &n.meta,
            Expression::Grouped(n) => &n.meta,
            Expression::Prefix(n) => &n.meta,
            Expression::Infix(n) => &n.meta,
            Expression::Postfix(n) => &n.meta,
            Expression::IfExpr(n) => &n.meta,
            Expression::FunctionCall(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Expression::Ident(n) => &mut n.meta,
            Expression::String(n) => &mut n.meta,
            Expression::Ip(n) => &mut n.meta,
            Expression::Rtime(n) => &mut n.meta,
            Expression::Integer(n) => &mut n.meta,
            Expression::Float(n) => &mut n.meta,
            Expression::Boolean(n) => &mut n.meta,
            Expression::Grouped(n) => &mut n.meta,
            Expression::Prefix(n) => &mut n.meta,
            Expression::Infix(n) => &mut n.meta,
            Expression::Postfix(n) => &mut n.meta,
            Expression::IfExpr(n) => &mut n.meta,
            Expression::FunctionCall(n) => &mut n.meta,
        }
    }
}
