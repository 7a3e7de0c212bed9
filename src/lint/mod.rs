//! Semantic linting over a resolved program.
//!
//! Findings never abort the walk; everything is accumulated as
//! [`Diagnostic`]s in source order and deduplicated on
//! (rule, position, message).

mod expr;
pub mod rules;
mod stmt;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ast::{Declaration, DirectorProperty, Program, SubroutineDeclaration};
use crate::config::Config;
use crate::context::{
    is_lifecycle_subroutine, Context, ContextError, Scope, VclType,
};
use crate::diag::{Diagnostic, Severity};
use crate::token::Token;

pub use rules::Rule;

/// Lints a program and returns its diagnostics in walk order.
pub fn lint(program: &Program, config: &Config) -> Vec<Diagnostic> {
    Linter::new(config).run(program)
}

pub struct Linter<'a> {
    config: &'a Config,
    pub(crate) context: Context,
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<(String, usize, usize, String)>,
    /// Subroutine bodies by name, for call-site linting of custom subs.
    subs: IndexMap<String, &'a SubroutineDeclaration>,
    /// Names currently being walked, guarding against call recursion.
    call_stack: Vec<String>,
    /// `goto` statements seen in the current subroutine walk, with their
    /// statement ordinal.
    gotos: Vec<(String, Token, usize)>,
    destinations: Vec<(String, usize)>,
    step: usize,
    capture_warned: bool,
}

impl<'a> Linter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Linter {
            config,
            context: Context::new(),
            diagnostics: Vec::new(),
            seen: HashSet::new(),
            subs: IndexMap::new(),
            call_stack: Vec::new(),
            gotos: Vec::new(),
            destinations: Vec::new(),
            step: 0,
            capture_warned: false,
        }
    }

    pub fn run(mut self, program: &'a Program) -> Vec<Diagnostic> {
        self.declaration_pass(program);
        self.body_pass(program);
        self.unused_pass();
        self.diagnostics
    }

    fn declaration_pass(&mut self, program: &'a Program) {
        for decl in program.declarations() {
            let name = decl.name().to_string();
            let token = decl.meta().token.clone();
            let result = match decl {
                Declaration::Acl(_) => self.context.register_acl(&name, token),
                Declaration::Backend(_) => self.context.register_backend(&name, token),
                Declaration::Director(_) => self.context.register_director(&name, token),
                Declaration::Table(_) => self.context.register_table(&name, token),
                Declaration::Penaltybox(_) => self.context.register_penaltybox(&name, token),
                Declaration::Ratecounter(_) => self.context.register_ratecounter(&name, token),
                Declaration::Subroutine(sub) => {
                    // Lifecycle names may legitimately appear more than once;
                    // custom names may not.
                    if is_lifecycle_subroutine(&name) && self.context.subroutines.contains_key(&name)
                    {
                        self.subs.entry(name.clone()).or_insert(sub);
                        continue;
                    }
                    let return_type = self.subroutine_return_type(sub);
                    self.subs.insert(name.clone(), sub);
                    self.context.register_subroutine(&name, token, return_type)
                }
            };
            if let Err(err) = result {
                let token = err.token().clone();
                self.report(
                    Rule::DeclarationDuplicate,
                    &token,
                    format!("{} `{}` is declared more than once", decl.kind_str(), name),
                );
            }
        }

        // Director members must point at declared backends.
        for decl in program.declarations() {
            if let Declaration::Director(director) = decl {
                self.check_director(director);
            }
        }
    }

    fn check_director(&mut self, director: &crate::ast::DirectorDeclaration) {
        for property in &director.properties {
            let DirectorProperty::Backend(member) = property else {
                continue;
            };
            for entry in &member.properties {
                if entry.key.value != "backend" {
                    continue;
                }
                let crate::ast::Expression::Ident(ident) = &entry.value else {
                    continue;
                };
                if let Some(backend) = self.context.backends.get_mut(&ident.value) {
                    backend.used = true;
                } else {
                    self.report(
                        Rule::VariableUndefined,
                        &ident.meta.token,
                        format!(
                            "director `{}` references undeclared backend `{}`",
                            director.name.value, ident.value
                        ),
                    );
                }
            }
        }
    }

    fn body_pass(&mut self, program: &'a Program) {
        for sub in program.subroutines() {
            let scopes = if let Some(scope) = Scope::from_subroutine(&sub.name.value) {
                scope
            } else if let Some(scopes) = annotated_scopes(sub) {
                scopes
            } else {
                // Custom subroutines are linted where they are called.
                continue;
            };
            for bit in 0..10u16 {
                let scope = Scope(1 << bit);
                if scopes.contains(scope) {
                    self.lint_subroutine(sub, scope);
                }
            }
        }
    }

    pub(crate) fn lint_subroutine(&mut self, sub: &'a SubroutineDeclaration, scope: Scope) {
        let return_type = self.subroutine_return_type(sub);
        self.context
            .enter_subroutine(&sub.name.value, scope, return_type);
        self.gotos.clear();
        self.destinations.clear();
        self.step = 0;
        self.capture_warned = false;

        self.call_stack.push(sub.name.value.clone());
        self.lint_block(&sub.block);
        self.call_stack.pop();

        self.check_gotos();
        for (name, token) in self.context.leave_subroutine() {
            self.report(
                Rule::DeclarationUnused,
                &token,
                format!("local variable `{name}` is never read"),
            );
        }
    }

    fn check_gotos(&mut self) {
        let gotos = std::mem::take(&mut self.gotos);
        for (name, token, step) in gotos {
            let matched = self
                .destinations
                .iter()
                .any(|(dest, dest_step)| *dest == name && *dest_step > step);
            if !matched {
                self.report(
                    Rule::GotoUnresolved,
                    &token,
                    format!("goto target `{name}:` does not appear later in this subroutine"),
                );
            }
        }
    }

    fn unused_pass(&mut self) {
        let mut findings: Vec<(String, String, Token)> = Vec::new();
        let mut collect = |kind: &str, registry: &IndexMap<String, crate::context::Entity>| {
            for (name, entity) in registry {
                if !entity.used {
                    findings.push((kind.to_string(), name.clone(), entity.token.clone()));
                }
            }
        };
        collect("acl", &self.context.acls);
        collect("backend", &self.context.backends);
        collect("director", &self.context.directors);
        collect("table", &self.context.tables);
        collect("penaltybox", &self.context.penaltyboxes);
        collect("ratecounter", &self.context.ratecounters);
        for (name, info) in &self.context.subroutines {
            if !info.used {
                findings.push(("subroutine".to_string(), name.clone(), info.token.clone()));
            }
        }
        for (kind, name, token) in findings {
            self.report(
                Rule::DeclarationUnused,
                &token,
                format!("{kind} `{name}` is never used"),
            );
        }
    }

    fn subroutine_return_type(&mut self, sub: &SubroutineDeclaration) -> Option<VclType> {
        let ident = sub.return_type.as_ref()?;
        match VclType::from_name(&ident.value) {
            Some(ty) => Some(ty),
            None => {
                let token = ident.meta.token.clone();
                self.report(
                    Rule::TypeMismatch,
                    &token,
                    format!("unknown return type `{}`", ident.value),
                );
                None
            }
        }
    }

    pub(crate) fn report(&mut self, rule: Rule, token: &Token, message: String) {
        let severity = self
            .config
            .severity_for(rule.as_str(), rule.default_severity());
        if severity == Severity::Ignore {
            return;
        }
        let key = (
            rule.as_str().to_string(),
            token.line,
            token.position,
            message.clone(),
        );
        if !self.seen.insert(key) {
            return;
        }
        self.diagnostics.push(Diagnostic {
            severity,
            rule: rule.as_str().to_string(),
            message,
            token: token.clone(),
            reference: rule.reference(),
        });
    }

    pub(crate) fn report_context(&mut self, err: ContextError) {
        let rule = match &err {
            ContextError::UndefinedVariable { .. } => Rule::VariableUndefined,
            ContextError::NotReadable { .. } | ContextError::OutOfScope { .. } => Rule::ScopeAccess,
            ContextError::ReadOnly { .. } => Rule::AssignReadOnly,
            ContextError::CannotUnset { .. } => Rule::UnsetNotAllowed,
            ContextError::UndefinedFunction { .. } => Rule::FunctionUndefined,
            ContextError::Duplicate { .. } => Rule::DeclareDuplicate,
            ContextError::BadLocalName { .. } => Rule::DeclareVarPrefix,
        };
        let token = err.token().clone();
        self.report(rule, &token, err.to_string());
    }
}

/// Reads `@scope: recv,fetch` annotations out of a subroutine's leading
/// comments.
fn annotated_scopes(sub: &SubroutineDeclaration) -> Option<Scope> {
    let mut scopes = Scope::NONE;
    for comment in &sub.meta.leading {
        let text = comment.text().trim();
        let Some(rest) = text.strip_prefix("@scope:") else {
            continue;
        };
        for word in rest.split(',') {
            if let Some(scope) = Scope::from_phase(word.trim()) {
                scopes = scopes | scope;
            }
        }
    }
    if scopes.is_empty() {
        None
    } else {
        Some(scopes)
    }
}

#[cfg(test)]
#[path = "../tests/t_lint.rs"]
mod tests;
