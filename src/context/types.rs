use std::fmt::{Display, Formatter};

/// VCL value types, as used by variable accessors, function signatures and
/// the expression checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VclType {
    Acl,
    Backend,
    Bool,
    Float,
    /// Reserved bare identifiers such as return states and cipher names.
    Id,
    Integer,
    Ip,
    Rtime,
    String,
    Time,
}

impl VclType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VclType::Acl => "ACL",
            VclType::Backend => "BACKEND",
            VclType::Bool => "BOOL",
            VclType::Float => "FLOAT",
            VclType::Id => "ID",
            VclType::Integer => "INTEGER",
            VclType::Ip => "IP",
            VclType::Rtime => "RTIME",
            VclType::String => "STRING",
            VclType::Time => "TIME",
        }
    }

    /// Parses a type name as written in `declare local` and subroutine
    /// return positions.
    pub fn from_name(name: &str) -> Option<VclType> {
        Some(match name.to_ascii_uppercase().as_str() {
            "ACL" => VclType::Acl,
            "BACKEND" => VclType::Backend,
            "BOOL" => VclType::Bool,
            "FLOAT" => VclType::Float,
            "INTEGER" => VclType::Integer,
            "IP" => VclType::Ip,
            "RTIME" => VclType::Rtime,
            "STRING" => VclType::String,
            "TIME" => VclType::Time,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, VclType::Integer | VclType::Float)
    }

    /// Implicit conversion rules for assignments and argument passing.
    ///
    /// Strings absorb every scalar (VCL stringifies), floats absorb
    /// integers, and durations absorb bare numbers.
    pub fn accepts(self, from: VclType) -> bool {
        if self == from {
            return true;
        }
        match self {
            VclType::String => !matches!(from, VclType::Acl),
            VclType::Float => from == VclType::Integer,
            VclType::Rtime => from.is_numeric() || from == VclType::Time,
            VclType::Time => from == VclType::Rtime,
            _ => false,
        }
    }

    /// Whether two types may be compared with `==`-family operators.
    /// Integer and float compare freely, numbers compare against durations,
    /// and strings compare against header-style idents.
    pub fn comparable(self, other: VclType) -> bool {
        if self == other {
            return true;
        }
        if self.is_numeric() && other.is_numeric() {
            return true;
        }
        if (self.is_numeric() && other == VclType::Rtime)
            || (other.is_numeric() && self == VclType::Rtime)
        {
            return true;
        }
        matches!(
            (self, other),
            (VclType::String, VclType::Id) | (VclType::Id, VclType::String)
        )
    }
}

impl Display for VclType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
