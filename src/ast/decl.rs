use crate::ast::expr::{Expression, Ident, IntegerLiteral, StringLiteral};
use crate::ast::meta::Meta;
use crate::ast::stmt::BlockStatement;

#[derive(Debug, Clone)]
pub struct AclDeclaration {
    pub meta: Meta,
    pub name: Ident,
    pub entries: Vec<AclEntry>,
}

/// One ACL member, e.g. `!"192.168.0.4"/32;`.
#[derive(Debug, Clone)]
pub struct AclEntry {
    pub meta: Meta,
    pub ip: StringLiteral,
    pub mask: Option<IntegerLiteral>,
    pub inverse: bool,
}

#[derive(Debug, Clone)]
pub struct BackendDeclaration {
    pub meta: Meta,
    pub name: Ident,
    pub properties: Vec<BackendProperty>,
}

#[derive(Debug, Clone)]
pub struct BackendProperty {
    pub meta: Meta,
    pub key: Ident,
    pub value: BackendValue,
}

/// A backend property value: a plain expression, or the nested object used
/// for `.probe`.
#[derive(Debug, Clone)]
pub enum BackendValue {
    Expression(Expression),
    Object(Vec<BackendProperty>),
}

#[derive(Debug, Clone)]
pub struct DirectorDeclaration {
    pub meta: Meta,
    pub name: Ident,
    pub director_type: Ident,
    pub properties: Vec<DirectorProperty>,
}

/// Directors interleave plain `.key = value;` properties with brace-delimited
/// backend objects; source order is preserved.
#[derive(Debug, Clone)]
pub enum DirectorProperty {
    Property(DirectorPropertyEntry),
    Backend(DirectorBackend),
}

#[derive(Debug, Clone)]
pub struct DirectorPropertyEntry {
    pub meta: Meta,
    pub key: Ident,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct DirectorBackend {
    pub meta: Meta,
    pub properties: Vec<DirectorPropertyEntry>,
}

#[derive(Debug, Clone)]
pub struct TableDeclaration {
    pub meta: Meta,
    pub name: Ident,
    /// Value type; string when omitted in source.
    pub value_type: Option<Ident>,
    pub entries: Vec<TableEntry>,
}

#[derive(Debug, Clone)]
pub struct TableEntry {
    pub meta: Meta,
    pub key: StringLiteral,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct SubroutineDeclaration {
    pub meta: Meta,
    pub name: Ident,
    /// Present for functional subroutines.
    pub return_type: Option<Ident>,
    pub block: BlockStatement,
}

#[derive(Debug, Clone)]
pub struct PenaltyboxDeclaration {
    pub meta: Meta,
    pub name: Ident,
    pub block: BlockStatement,
}

#[derive(Debug, Clone)]
pub struct RatecounterDeclaration {
    pub meta: Meta,
    pub name: Ident,
    pub block: BlockStatement,
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Acl(AclDeclaration),
    Backend(BackendDeclaration),
    Director(DirectorDeclaration),
    Table(TableDeclaration),
    Subroutine(SubroutineDeclaration),
    Penaltybox(PenaltyboxDeclaration),
    Ratecounter(RatecounterDeclaration),
}

impl Declaration {
    pub fn meta(&self) -> &Meta {
        match self {
            Declaration::Acl(n) => &n.meta,
            Declaration::Backend(n) => &n.meta,
            Declaration::Director(n) => &n.meta,
            Declaration::Table(n) => &n.meta,
            Declaration::Subroutine(n) => &n.meta,
            Declaration::Penaltybox(n) => &n.meta,
            Declaration::Ratecounter(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Declaration::Acl(n) => &mut n.meta,
            Declaration::Backend(n) => &mut n.meta,
            Declaration::Director(n) => &mut n.meta,
            Declaration::Table(n) => &mut n.meta,
            Declaration::Subroutine(n) => &mut n.meta,
            Declaration::Penaltybox(n) => &mut n.meta,
            Declaration::Ratecounter(n) => &mut n.meta,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Acl(n) => &n.name.value,
            Declaration::Backend(n) => &n.name.value,
            Declaration::Director(n) => &n.name.value,
            Declaration::Table(n) => &n.name.value,
            Declaration::Subroutine(n) => &n.name.value,
            Declaration::Penaltybox(n) => &n.name.value,
            Declaration::Ratecounter(n) => &n.name.value,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Declaration::Acl(_) => "acl",
            Declaration::Backend(_) => "backend",
            Declaration::Director(_) => "director",
            Declaration::Table(_) => "table",
            Declaration::Subroutine(_) => "sub",
            Declaration::Penaltybox(_) => "penaltybox",
            Declaration::Ratecounter(_) => "ratecounter",
        }
    }
}
