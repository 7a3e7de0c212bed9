//! Semantic context: which names exist, what type they carry, and in which
//! lifecycle phases they may be touched.
//!
//! The linter drives one [`Context`] per program. Declarations register
//! themselves up front, then each subroutine body is walked with the scope
//! set to the phase it runs in.

pub mod builtin;
pub mod functions;
pub mod scope;
pub mod types;
pub mod variables;

use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

pub use functions::{Function, FunctionNode};
pub use scope::{is_lifecycle_subroutine, Scope, LIFECYCLE_SUBROUTINES};
pub use types::VclType;
pub use variables::{Accessor, VariableNode};

use crate::token::Token;

#[derive(Debug, Clone, Error)]
pub enum ContextError {
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String, token: Token },

    #[error("variable `{name}` cannot be read")]
    NotReadable { name: String, token: Token },

    #[error("variable `{name}` is read-only")]
    ReadOnly { name: String, token: Token },

    #[error("variable `{name}` cannot be unset")]
    CannotUnset { name: String, token: Token },

    #[error("`{name}` is not accessible in {scope} (allowed: {allowed})")]
    OutOfScope {
        name: String,
        scope: Scope,
        allowed: String,
        token: Token,
    },

    #[error("undefined function `{name}`")]
    UndefinedFunction { name: String, token: Token },

    #[error("`{name}` is already declared")]
    Duplicate { name: String, token: Token },

    #[error("local variable `{name}` must be named `var.*`")]
    BadLocalName { name: String, token: Token },
}

impl ContextError {
    pub fn token(&self) -> &Token {
        match self {
            ContextError::UndefinedVariable { token, .. }
            | ContextError::NotReadable { token, .. }
            | ContextError::ReadOnly { token, .. }
            | ContextError::CannotUnset { token, .. }
            | ContextError::OutOfScope { token, .. }
            | ContextError::UndefinedFunction { token, .. }
            | ContextError::Duplicate { token, .. }
            | ContextError::BadLocalName { token, .. } => token,
        }
    }
}

/// A user declaration tracked for duplicate and unused reporting.
#[derive(Debug, Clone)]
pub struct Entity {
    pub token: Token,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct SubroutineInfo {
    pub token: Token,
    pub return_type: Option<VclType>,
    /// Phases this subroutine is known to run in. Lifecycle subroutines get
    /// their fixed phase; custom subroutines accumulate call-site phases.
    pub scopes: Scope,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct Local {
    pub ty: VclType,
    pub token: Token,
    pub used: bool,
}

/// Snapshot of regex capture-group state, taken before walking a branch and
/// restored after, so a match inside an `if` arm does not leak into the
/// sibling arm.
#[derive(Debug, Clone, Copy)]
pub struct RegexState {
    pushed: bool,
}

pub struct Context {
    pub variables: VariableNode,
    pub functions: FunctionNode,
    reserved: HashSet<&'static str>,

    pub acls: IndexMap<String, Entity>,
    pub backends: IndexMap<String, Entity>,
    pub directors: IndexMap<String, Entity>,
    pub tables: IndexMap<String, Entity>,
    pub penaltyboxes: IndexMap<String, Entity>,
    pub ratecounters: IndexMap<String, Entity>,
    pub subroutines: IndexMap<String, SubroutineInfo>,

    locals: IndexMap<String, Local>,
    scope: Scope,
    pub current_subroutine: Option<String>,
    /// Declared return type of the subroutine being walked, if functional.
    pub return_type: Option<VclType>,

    regex_pushed: bool,
}

impl Context {
    pub fn new() -> Self {
        Context {
            variables: builtin::variables(),
            functions: builtin::functions(),
            reserved: builtin::reserved_identifiers(),
            acls: IndexMap::new(),
            backends: IndexMap::new(),
            directors: IndexMap::new(),
            tables: IndexMap::new(),
            penaltyboxes: IndexMap::new(),
            ratecounters: IndexMap::new(),
            subroutines: IndexMap::new(),
            locals: IndexMap::new(),
            scope: Scope::NONE,
            current_subroutine: None,
            return_type: None,
            regex_pushed: false,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Enters a subroutine body: sets the active phase, clears locals, and
    /// resets regex capture state.
    pub fn enter_subroutine(
        &mut self,
        name: &str,
        scope: Scope,
        return_type: Option<VclType>,
    ) {
        self.current_subroutine = Some(name.to_string());
        self.scope = scope;
        self.return_type = return_type;
        self.locals.clear();
        self.regex_pushed = false;
    }

    /// Leaves the current subroutine, yielding its never-read locals.
    pub fn leave_subroutine(&mut self) -> Vec<(String, Token)> {
        self.current_subroutine = None;
        self.return_type = None;
        self.scope = Scope::NONE;
        self.locals
            .drain(..)
            .filter(|(_, local)| !local.used)
            .map(|(name, local)| (name, local.token))
            .collect()
    }

    fn register(
        registry: &mut IndexMap<String, Entity>,
        name: &str,
        token: Token,
    ) -> Result<(), ContextError> {
        if registry.contains_key(name) {
            return Err(ContextError::Duplicate {
                name: name.to_string(),
                token,
            });
        }
        registry.insert(name.to_string(), Entity { token, used: false });
        Ok(())
    }

    pub fn register_acl(&mut self, name: &str, token: Token) -> Result<(), ContextError> {
        Self::register(&mut self.acls, name, token)
    }

    pub fn register_backend(&mut self, name: &str, token: Token) -> Result<(), ContextError> {
        // Backends and directors share a namespace.
        if self.directors.contains_key(name) {
            return Err(ContextError::Duplicate {
                name: name.to_string(),
                token,
            });
        }
        Self::register(&mut self.backends, name, token)
    }

    pub fn register_director(&mut self, name: &str, token: Token) -> Result<(), ContextError> {
        if self.backends.contains_key(name) {
            return Err(ContextError::Duplicate {
                name: name.to_string(),
                token,
            });
        }
        Self::register(&mut self.directors, name, token)
    }

    pub fn register_table(&mut self, name: &str, token: Token) -> Result<(), ContextError> {
        Self::register(&mut self.tables, name, token)
    }

    pub fn register_penaltybox(&mut self, name: &str, token: Token) -> Result<(), ContextError> {
        Self::register(&mut self.penaltyboxes, name, token)
    }

    pub fn register_ratecounter(&mut self, name: &str, token: Token) -> Result<(), ContextError> {
        Self::register(&mut self.ratecounters, name, token)
    }

    pub fn register_subroutine(
        &mut self,
        name: &str,
        token: Token,
        return_type: Option<VclType>,
    ) -> Result<(), ContextError> {
        if self.subroutines.contains_key(name) {
            return Err(ContextError::Duplicate {
                name: name.to_string(),
                token,
            });
        }
        let scopes = Scope::from_subroutine(name).unwrap_or(Scope::NONE);
        self.subroutines.insert(
            name.to_string(),
            SubroutineInfo {
                token,
                return_type,
                scopes,
                used: is_lifecycle_subroutine(name),
            },
        );
        Ok(())
    }

    pub fn declare_local(
        &mut self,
        name: &str,
        ty: VclType,
        token: Token,
    ) -> Result<(), ContextError> {
        if !name.starts_with("var.") {
            return Err(ContextError::BadLocalName {
                name: name.to_string(),
                token,
            });
        }
        if self.locals.contains_key(name) {
            return Err(ContextError::Duplicate {
                name: name.to_string(),
                token,
            });
        }
        self.locals.insert(
            name.to_string(),
            Local {
                ty,
                token,
                used: false,
            },
        );
        Ok(())
    }

    /// Resolves a name in read position and returns the type it yields.
    pub fn get(&mut self, name: &str, token: &Token) -> Result<VclType, ContextError> {
        if let Some(local) = self.locals.get_mut(name) {
            local.used = true;
            return Ok(local.ty);
        }
        if self.reserved.contains(name) {
            return Ok(VclType::Id);
        }
        if let Some(entity) = self.acls.get_mut(name) {
            entity.used = true;
            return Ok(VclType::Acl);
        }
        if let Some(entity) = self.backends.get_mut(name) {
            entity.used = true;
            return Ok(VclType::Backend);
        }
        if let Some(entity) = self.directors.get_mut(name) {
            entity.used = true;
            return Ok(VclType::Backend);
        }
        if let Some(entity) = self.tables.get_mut(name) {
            entity.used = true;
            return Ok(VclType::Id);
        }
        if let Some(entity) = self.penaltyboxes.get_mut(name) {
            entity.used = true;
            return Ok(VclType::Id);
        }
        if let Some(entity) = self.ratecounters.get_mut(name) {
            entity.used = true;
            return Ok(VclType::Id);
        }

        let scope = self.scope;
        let node = self.variables.lookup(name).ok_or_else(|| {
            ContextError::UndefinedVariable {
                name: name.to_string(),
                token: token.clone(),
            }
        })?;
        let accessor = node.accessor.as_ref().ok_or_else(|| {
            ContextError::UndefinedVariable {
                name: name.to_string(),
                token: token.clone(),
            }
        })?;
        if !accessor.scopes.contains(scope) {
            return Err(ContextError::OutOfScope {
                name: name.to_string(),
                scope,
                allowed: accessor.scopes.phase_list(),
                token: token.clone(),
            });
        }
        let ty = accessor.get.ok_or_else(|| ContextError::NotReadable {
            name: name.to_string(),
            token: token.clone(),
        })?;
        node.used = true;
        Ok(ty)
    }

    /// Resolves a name in assignment position and returns the type the
    /// right-hand side must produce.
    pub fn set(&mut self, name: &str, token: &Token) -> Result<VclType, ContextError> {
        if let Some(local) = self.locals.get_mut(name) {
            local.used = true;
            return Ok(local.ty);
        }
        let scope = self.scope;
        let node = self.variables.lookup(name).ok_or_else(|| {
            ContextError::UndefinedVariable {
                name: name.to_string(),
                token: token.clone(),
            }
        })?;
        let accessor = node.accessor.as_ref().ok_or_else(|| {
            ContextError::UndefinedVariable {
                name: name.to_string(),
                token: token.clone(),
            }
        })?;
        if !accessor.scopes.contains(scope) {
            return Err(ContextError::OutOfScope {
                name: name.to_string(),
                scope,
                allowed: accessor.scopes.phase_list(),
                token: token.clone(),
            });
        }
        accessor.set.ok_or_else(|| ContextError::ReadOnly {
            name: name.to_string(),
            token: token.clone(),
        })
    }

    pub fn unset(&mut self, name: &str, token: &Token) -> Result<(), ContextError> {
        let scope = self.scope;
        let node = self.variables.lookup(name).ok_or_else(|| {
            ContextError::UndefinedVariable {
                name: name.to_string(),
                token: token.clone(),
            }
        })?;
        let accessor = node.accessor.as_ref().ok_or_else(|| {
            ContextError::UndefinedVariable {
                name: name.to_string(),
                token: token.clone(),
            }
        })?;
        if !accessor.scopes.contains(scope) {
            return Err(ContextError::OutOfScope {
                name: name.to_string(),
                scope,
                allowed: accessor.scopes.phase_list(),
                token: token.clone(),
            });
        }
        if !accessor.unset {
            return Err(ContextError::CannotUnset {
                name: name.to_string(),
                token: token.clone(),
            });
        }
        Ok(())
    }

    pub fn get_function(&self, name: &str, token: &Token) -> Result<Function, ContextError> {
        let function =
            self.functions
                .lookup(name)
                .ok_or_else(|| ContextError::UndefinedFunction {
                    name: name.to_string(),
                    token: token.clone(),
                })?;
        if !function.scopes.contains(self.scope) {
            return Err(ContextError::OutOfScope {
                name: name.to_string(),
                scope: self.scope,
                allowed: function.scopes.phase_list(),
                token: token.clone(),
            });
        }
        Ok(function.clone())
    }

    /// Records that a regex match just populated the capture groups.
    /// Returns true when an earlier match in the same subroutine walk had
    /// already populated them, which is the capture-overwritten condition.
    pub fn push_regex_captures(&mut self) -> bool {
        let overwritten = self.regex_pushed;
        self.regex_pushed = true;
        overwritten
    }

    pub fn snapshot_regex(&self) -> RegexState {
        RegexState {
            pushed: self.regex_pushed,
        }
    }

    pub fn restore_regex(&mut self, state: RegexState) {
        self.regex_pushed = state.pushed;
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

#[cfg(test)]
#[path = "../tests/t_context.rs"]
mod tests;
