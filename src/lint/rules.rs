use crate::diag::Severity;

const DOCS: &str = "https://developer.fastly.com/reference/vcl";

/// Closed set of lint rule ids. The string forms are the stable names users
/// reference in severity overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    AssignReadOnly,
    ScopeAccess,
    RegexCaptureOverwritten,
    DeclarationDuplicate,
    DeclarationUnused,
    VariableUndefined,
    UnsetNotAllowed,
    DeclareVarPrefix,
    DeclareDuplicate,
    TypeMismatch,
    OperatorCondition,
    OperatorAssignment,
    FunctionUndefined,
    FunctionArity,
    FunctionArgument,
    CallUndefined,
    ReturnType,
    IncludeUnresolved,
    GotoUnresolved,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::AssignReadOnly => "assign/read-only",
            Rule::ScopeAccess => "scope/access",
            Rule::RegexCaptureOverwritten => "regex/capture-overwritten",
            Rule::DeclarationDuplicate => "declaration/duplicate",
            Rule::DeclarationUnused => "declaration/unused",
            Rule::VariableUndefined => "variable/undefined",
            Rule::UnsetNotAllowed => "unset/not-allowed",
            Rule::DeclareVarPrefix => "declare/var-prefix",
            Rule::DeclareDuplicate => "declare/duplicate",
            Rule::TypeMismatch => "type/mismatch",
            Rule::OperatorCondition => "operator/condition",
            Rule::OperatorAssignment => "operator/assignment",
            Rule::FunctionUndefined => "function/undefined",
            Rule::FunctionArity => "function/arity",
            Rule::FunctionArgument => "function/argument",
            Rule::CallUndefined => "call/undefined",
            Rule::ReturnType => "return/type",
            Rule::IncludeUnresolved => "include/unresolved",
            Rule::GotoUnresolved => "goto/unresolved",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::DeclarationUnused => Severity::Info,
            Rule::RegexCaptureOverwritten => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn reference(&self) -> Option<&'static str> {
        match self {
            Rule::AssignReadOnly
            | Rule::ScopeAccess
            | Rule::VariableUndefined
            | Rule::UnsetNotAllowed
            | Rule::FunctionUndefined => Some(DOCS),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
