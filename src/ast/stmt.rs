use crate::ast::expr::{Expression, FunctionCallExpression, Ident, Operator, StringLiteral};
use crate::ast::meta::Meta;

#[derive(Debug, Clone)]
pub struct AddStatement {
    pub meta: Meta,
    pub ident: Ident,
    pub operator: Operator,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct BreakStatement {
    pub meta: Meta,
}

#[derive(Debug, Clone)]
pub struct CallStatement {
    pub meta: Meta,
    pub subroutine: Ident,
}

#[derive(Debug, Clone)]
pub struct DeclareStatement {
    pub meta: Meta,
    pub name: Ident,
    pub value_type: Ident,
}

#[derive(Debug, Clone)]
pub struct ErrorStatement {
    pub meta: Meta,
    pub code: Option<Expression>,
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct EsiStatement {
    pub meta: Meta,
}

#[derive(Debug, Clone)]
pub struct FallthroughStatement {
    pub meta: Meta,
}

#[derive(Debug, Clone)]
pub struct FunctionCallStatement {
    pub meta: Meta,
    pub call: FunctionCallExpression,
}

#[derive(Debug, Clone)]
pub struct GotoStatement {
    pub meta: Meta,
    pub destination: Ident,
}

/// The `NAME:` label a `goto` jumps to.
#[derive(Debug, Clone)]
pub struct GotoDestinationStatement {
    pub meta: Meta,
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub meta: Meta,
    pub condition: Expression,
    pub consequence: BlockStatement,
    /// The `else if` branches; always present, possibly empty.
    pub another: Vec<ElseIfStatement>,
    pub alternative: Option<ElseStatement>,
}

#[derive(Debug, Clone)]
pub struct ElseIfStatement {
    pub meta: Meta,
    /// Verbatim spelling: `else if`, `elseif` or `elsif`.
    pub keyword: String,
    pub condition: Expression,
    pub consequence: BlockStatement,
}

#[derive(Debug, Clone)]
pub struct ElseStatement {
    pub meta: Meta,
    pub consequence: BlockStatement,
}

#[derive(Debug, Clone)]
pub struct ImportStatement {
    pub meta: Meta,
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct IncludeStatement {
    pub meta: Meta,
    pub module: StringLiteral,
}

#[derive(Debug, Clone)]
pub struct LogStatement {
    pub meta: Meta,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct RemoveStatement {
    pub meta: Meta,
    pub ident: Ident,
}

#[derive(Debug, Clone)]
pub struct RestartStatement {
    pub meta: Meta,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub meta: Meta,
    pub expression: Option<Expression>,
    /// True for the `return(EXPR)` spelling.
    pub has_parenthesis: bool,
}

#[derive(Debug, Clone)]
pub struct SetStatement {
    pub meta: Meta,
    pub ident: Ident,
    pub operator: Operator,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct SwitchStatement {
    pub meta: Meta,
    pub control: Expression,
    pub cases: Vec<CaseStatement>,
    /// Index of the `default:` case in `cases`, or -1 when absent.
    pub default_index: i64,
}

/// A case's test, written as `case EXPR:` (`==` semantics) or `case ~EXPR:`
/// (regex semantics). The default case has no label.
#[derive(Debug, Clone)]
pub struct CaseLabel {
    pub operator: Operator,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct CaseStatement {
    pub meta: Meta,
    pub label: Option<CaseLabel>,
    pub statements: Vec<Statement>,
    pub fallthrough: bool,
}

#[derive(Debug, Clone)]
pub struct SyntheticStatement {
    pub meta: Meta,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct SyntheticBase64Statement {
    pub meta: Meta,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct UnsetStatement {
    pub meta: Meta,
    pub ident: Ident,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub meta: Meta,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Add(AddStatement),
    Break(BreakStatement),
    Call(CallStatement),
    Declare(DeclareStatement),
    Error(ErrorStatement),
    Esi(EsiStatement),
    Fallthrough(FallthroughStatement),
    FunctionCall(FunctionCallStatement),
    Goto(GotoStatement),
    GotoDestination(GotoDestinationStatement),
    If(IfStatement),
    Import(ImportStatement),
    Include(IncludeStatement),
    Log(LogStatement),
    Remove(RemoveStatement),
    Restart(RestartStatement),
    Return(ReturnStatement),
    Set(SetStatement),
    Switch(SwitchStatement),
    Synthetic(SyntheticStatement),
    SyntheticBase64(SyntheticBase64Statement),
    Unset(UnsetStatement),
    Block(BlockStatement),
}

impl Statement {
    pub fn meta(&self) -> &Meta {
        match self {
            Statement::Add(n) => &n.meta,
            Statement::Break(n) => &n.meta,
            Statement::Call(n) => &n.meta,
            Statement::Declare(n) => &n.meta,
            Statement::Error(n) => &n.meta,
            Statement::Esi(n) => &n.meta,
            Statement::Fallthrough(n) => &n.meta,
            Statement::FunctionCall(n) => &n.meta,
            Statement::Goto(n) => &n.meta,
            Statement::GotoDestination(n) => &n.meta,
            Statement::If(n) => &n.meta,
            Statement::Import(n) => &n.meta,
            Statement::Include(n) => &n.meta,
            Statement::Log(n) => &n.meta,
            Statement::Remove(n) => &n.meta,
            Statement::Restart(n) => &n.meta,
            Statement::Return(n) => &n.meta,
            Statement::Set(n) => &n.meta,
            Statement::Switch(n) => &n.meta,
            Statement::Synthetic(n) => &n.meta,
            Statement::SyntheticBase64(n) => &n.meta,
            Statement::Unset(n) => &n.meta,
            Statement::Block(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Statement::Add(n) => &mut n.meta,
            Statement::Break(n) => &mut n.meta,
            Statement::Call(n) => &mut n.meta,
            Statement::Declare(n) => &mut n.meta,
            Statement::Error(n) => &mut n.meta,
            Statement::Esi(n) => &mut n.meta,
            Statement::Fallthrough(n) => &mut n.meta,
            Statement::FunctionCall(n) => &mut n.meta,
            Statement::Goto(n) => &mut n.meta,
            Statement::GotoDestination(n) => &mut n.meta,
            Statement::If(n) => &mut n.meta,
            Statement::Import(n) => &mut n.meta,
            Statement::Include(n) => &mut n.meta,
            Statement::Log(n) => &mut n.meta,
            Statement::Remove(n) => &mut n.meta,
            Statement::Restart(n) => &mut n.meta,
            Statement::Return(n) => &mut n.meta,
            Statement::Set(n) => &mut n.meta,
            Statement::Switch(n) => &mut n.meta,
            Statement::Synthetic(n) => &mut n.meta,
            Statement::SyntheticBase64(n) => &mut n.meta,
            Statement::Unset(n) => &mut n.meta,
            Statement::Block(n) => &mut n.meta,
        }
    }
}
