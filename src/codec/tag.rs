/// Frame tags for the binary AST stream. The numbering is part of the wire
/// contract with external transformers; values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    // Control
    Fin = 0x00,
    End = 0x01,

    // Leaves
    Ident = 0x10,
    String = 0x11,
    Ip = 0x12,
    Rtime = 0x13,
    Integer = 0x14,
    Float = 0x15,
    Bool = 0x16,
    Operator = 0x17,

    // Declarations
    Acl = 0x20,
    AclEntry = 0x21,
    Backend = 0x22,
    BackendProperty = 0x23,
    BackendObject = 0x24,
    Director = 0x25,
    DirectorProperty = 0x26,
    DirectorBackend = 0x27,
    Table = 0x28,
    TableEntry = 0x29,
    Subroutine = 0x2a,
    Penaltybox = 0x2b,
    Ratecounter = 0x2c,

    // Statements
    Add = 0x40,
    Break = 0x41,
    Call = 0x42,
    Declare = 0x43,
    Error = 0x44,
    Esi = 0x45,
    Fallthrough = 0x46,
    FunctionCallStatement = 0x47,
    Goto = 0x48,
    GotoDestination = 0x49,
    If = 0x4a,
    ElseIf = 0x4b,
    Else = 0x4c,
    Import = 0x4d,
    Include = 0x4e,
    Log = 0x4f,
    Remove = 0x50,
    Restart = 0x51,
    Return = 0x52,
    Set = 0x53,
    Switch = 0x54,
    Case = 0x55,
    Synthetic = 0x56,
    SyntheticBase64 = 0x57,
    Unset = 0x58,
    Block = 0x59,

    // Composite expressions
    Grouped = 0x80,
    Prefix = 0x81,
    Infix = 0x82,
    Postfix = 0x83,
    IfExpression = 0x84,
    FunctionCall = 0x85,
}

impl Tag {
    pub fn from_u8(byte: u8) -> Option<Tag> {
        Some(match byte {
            0x00 => Tag::Fin,
            0x01 => Tag::End,
            0x10 => Tag::Ident,
            0x11 => Tag::String,
            0x12 => Tag::Ip,
            0x13 => Tag::Rtime,
            0x14 => Tag::Integer,
            0x15 => Tag::Float,
            0x16 => Tag::Bool,
            0x17 => Tag::Operator,
            0x20 => Tag::Acl,
            0x21 => Tag::AclEntry,
            0x22 => Tag::Backend,
            0x23 => Tag::BackendProperty,
            0x24 => Tag::BackendObject,
            0x25 => Tag::Director,
            0x26 => Tag::DirectorProperty,
            0x27 => Tag::DirectorBackend,
            0x28 => Tag::Table,
            0x29 => Tag::TableEntry,
            0x2a => Tag::Subroutine,
            0x2b => Tag::Penaltybox,
            0x2c => Tag::Ratecounter,
            0x40 => Tag::Add,
            0x41 => Tag::Break,
            0x42 => Tag::Call,
            0x43 => Tag::Declare,
            0x44 => Tag::Error,
            0x45 => Tag::Esi,
            0x46 => Tag::Fallthrough,
            0x47 => Tag::FunctionCallStatement,
            0x48 => Tag::Goto,
            0x49 => Tag::GotoDestination,
            0x4a => Tag::If,
            0x4b => Tag::ElseIf,
            0x4c => Tag::Else,
            0x4d => Tag::Import,
            0x4e => Tag::Include,
            0x4f => Tag::Log,
            0x50 => Tag::Remove,
            0x51 => Tag::Restart,
            0x52 => Tag::Return,
            0x53 => Tag::Set,
            0x54 => Tag::Switch,
            0x55 => Tag::Case,
            0x56 => Tag::Synthetic,
            0x57 => Tag::SyntheticBase64,
            0x58 => Tag::Unset,
            0x59 => Tag::Block,
            0x80 => Tag::Grouped,
            0x81 => Tag::Prefix,
            0x82 => Tag::Infix,
            0x83 => Tag::Postfix,
            0x84 => Tag::IfExpression,
            0x85 => Tag::FunctionCall,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tag::Fin => "FIN",
            Tag::End => "END",
            Tag::Ident => "IDENT",
            Tag::String => "STRING",
            Tag::Ip => "IP",
            Tag::Rtime => "RTIME",
            Tag::Integer => "INTEGER",
            Tag::Float => "FLOAT",
            Tag::Bool => "BOOL",
            Tag::Operator => "OPERATOR",
            Tag::Acl => "ACL",
            Tag::AclEntry => "ACL_ENTRY",
            Tag::Backend => "BACKEND",
            Tag::BackendProperty => "BACKEND_PROPERTY",
            Tag::BackendObject => "BACKEND_OBJECT",
            Tag::Director => "DIRECTOR",
            Tag::DirectorProperty => "DIRECTOR_PROPERTY",
            Tag::DirectorBackend => "DIRECTOR_BACKEND",
            Tag::Table => "TABLE",
            Tag::TableEntry => "TABLE_ENTRY",
            Tag::Subroutine => "SUBROUTINE",
            Tag::Penaltybox => "PENALTYBOX",
            Tag::Ratecounter => "RATECOUNTER",
            Tag::Add => "ADD",
            Tag::Break => "BREAK",
            Tag::Call => "CALL",
            Tag::Declare => "DECLARE",
            Tag::Error => "ERROR",
            Tag::Esi => "ESI",
            Tag::Fallthrough => "FALLTHROUGH",
            Tag::FunctionCallStatement => "FUNCTION_CALL_STATEMENT",
            Tag::Goto => "GOTO",
            Tag::GotoDestination => "GOTO_DESTINATION",
            Tag::If => "IF",
            Tag::ElseIf => "ELSE_IF",
            Tag::Else => "ELSE",
            Tag::Import => "IMPORT",
            Tag::Include => "INCLUDE",
            Tag::Log => "LOG",
            Tag::Remove => "REMOVE",
            Tag::Restart => "RESTART",
            Tag::Return => "RETURN",
            Tag::Set => "SET",
            Tag::Switch => "SWITCH",
            Tag::Case => "CASE",
            Tag::Synthetic => "SYNTHETIC",
            Tag::SyntheticBase64 => "SYNTHETIC_BASE64",
            Tag::Unset => "UNSET",
            Tag::Block => "BLOCK",
            Tag::Grouped => "GROUPED",
            Tag::Prefix => "PREFIX",
            Tag::Infix => "INFIX",
            Tag::Postfix => "POSTFIX",
            Tag::IfExpression => "IF_EXPRESSION",
            Tag::FunctionCall => "FUNCTION_CALL",
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Tag::Acl
                | Tag::Backend
                | Tag::Director
                | Tag::Table
                | Tag::Subroutine
                | Tag::Penaltybox
                | Tag::Ratecounter
        )
    }

    pub fn is_statement(&self) -> bool {
        (*self as u8) >= Tag::Add as u8 && (*self as u8) <= Tag::Block as u8
            && !matches!(self, Tag::ElseIf | Tag::Else | Tag::Case)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
