use crate::ast::{
    AddStatement, BlockStatement, CallStatement, CaseStatement, DeclareStatement, ErrorStatement,
    Expression, IfStatement, Operator, ReturnStatement, SetStatement, Statement, SwitchStatement,
    UnsetStatement,
};
use crate::context::VclType;
use crate::lint::{Linter, Rule};

impl<'a> Linter<'a> {
    pub(crate) fn lint_block(&mut self, block: &BlockStatement) {
        for statement in &block.statements {
            self.lint_statement(statement);
        }
    }

    fn lint_statement(&mut self, statement: &Statement) {
        self.step += 1;
        match statement {
            Statement::Set(stmt) => self.lint_assignment(stmt),
            Statement::Add(stmt) => self.lint_add(stmt),
            Statement::Unset(stmt) => self.lint_unset(stmt),
            Statement::Remove(stmt) => {
                if let Err(err) = self.context.unset(&stmt.ident.value, &stmt.ident.meta.token) {
                    self.report_context(err);
                }
            }
            Statement::Declare(stmt) => self.lint_declare(stmt),
            Statement::If(stmt) => self.lint_if(stmt),
            Statement::Switch(stmt) => self.lint_switch(stmt),
            Statement::Call(stmt) => self.lint_call(stmt),
            Statement::FunctionCall(stmt) => {
                self.check_function_call(&stmt.call);
            }
            Statement::Return(stmt) => self.lint_return(stmt),
            Statement::Error(stmt) => self.lint_error(stmt),
            Statement::Log(stmt) => self.expect_string(&stmt.value),
            Statement::Synthetic(stmt) => self.expect_string(&stmt.value),
            Statement::SyntheticBase64(stmt) => self.expect_string(&stmt.value),
            Statement::Goto(stmt) => {
                self.gotos.push((
                    stmt.destination.value.clone(),
                    stmt.destination.meta.token.clone(),
                    self.step,
                ));
            }
            Statement::GotoDestination(stmt) => {
                self.destinations.push((stmt.name.value.clone(), self.step));
            }
            Statement::Block(block) => {
                let snapshot = self.context.snapshot_regex();
                self.lint_block(block);
                self.context.restore_regex(snapshot);
            }
            Statement::Include(stmt) => {
                self.report(
                    Rule::IncludeUnresolved,
                    &stmt.meta.token,
                    format!("include `{}` was not resolved", stmt.module.value),
                );
            }
            Statement::Esi(_)
            | Statement::Restart(_)
            | Statement::Break(_)
            | Statement::Fallthrough(_)
            | Statement::Import(_) => {}
        }
    }

    fn lint_assignment(&mut self, stmt: &SetStatement) {
        let ident = &stmt.ident;
        let target = match self.context.set(&ident.value, &ident.meta.token) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.report_context(err);
                None
            }
        };
        if let Some(target) = target {
            if !assignment_operator_ok(target, stmt.operator) {
                self.report(
                    Rule::OperatorAssignment,
                    &stmt.meta.token,
                    format!(
                        "operator `{}` cannot be applied to {} target `{}`",
                        stmt.operator, target, ident.value
                    ),
                );
            }
            if let Some(rhs) = self.type_of(&stmt.value) {
                if !target.accepts(rhs) {
                    self.report(
                        Rule::TypeMismatch,
                        &stmt.value.meta().token,
                        format!("cannot assign {rhs} to {target} variable `{}`", ident.value),
                    );
                }
            }
        } else {
            self.type_of(&stmt.value);
        }
    }

    fn lint_add(&mut self, stmt: &AddStatement) {
        // `add` only makes sense for unsettable (header) targets.
        let name = stmt.ident.value.clone();
        if let Err(err) = self.context.unset(&name, &stmt.ident.meta.token) {
            if let crate::context::ContextError::CannotUnset { .. } = err {
                self.report(
                    Rule::OperatorAssignment,
                    &stmt.ident.meta.token,
                    format!("`add` requires a header variable, `{name}` is not one"),
                );
            } else {
                self.report_context(err);
            }
        }
        if stmt.operator != Operator::Assign {
            self.report(
                Rule::OperatorAssignment,
                &stmt.meta.token,
                format!("`add` only supports `=`, found `{}`", stmt.operator),
            );
        }
        self.expect_string(&stmt.value);
    }

    fn lint_unset(&mut self, stmt: &UnsetStatement) {
        if let Err(err) = self.context.unset(&stmt.ident.value, &stmt.ident.meta.token) {
            self.report_context(err);
        }
    }

    fn lint_declare(&mut self, stmt: &DeclareStatement) {
        let Some(ty) = VclType::from_name(&stmt.value_type.value) else {
            self.report(
                Rule::TypeMismatch,
                &stmt.value_type.meta.token,
                format!("unknown type `{}`", stmt.value_type.value),
            );
            return;
        };
        if let Err(err) =
            self.context
                .declare_local(&stmt.name.value, ty, stmt.name.meta.token.clone())
        {
            self.report_context(err);
        }
    }

    fn lint_if(&mut self, stmt: &IfStatement) {
        self.expect_condition(&stmt.condition);
        let snapshot = self.context.snapshot_regex();
        self.lint_block(&stmt.consequence);
        self.context.restore_regex(snapshot);
        for branch in &stmt.another {
            self.expect_condition(&branch.condition);
            let snapshot = self.context.snapshot_regex();
            self.lint_block(&branch.consequence);
            self.context.restore_regex(snapshot);
        }
        if let Some(alt) = &stmt.alternative {
            let snapshot = self.context.snapshot_regex();
            self.lint_block(&alt.consequence);
            self.context.restore_regex(snapshot);
        }
    }

    fn lint_switch(&mut self, stmt: &SwitchStatement) {
        self.type_of(&stmt.control);
        for case in &stmt.cases {
            self.lint_case(case);
        }
    }

    fn lint_case(&mut self, case: &CaseStatement) {
        let snapshot = self.context.snapshot_regex();
        if let Some(label) = &case.label {
            if label.operator == Operator::Match {
                if let Expression::String(pattern) = &label.value {
                    self.note_regex_match(&pattern.value, &pattern.meta.token);
                }
            }
            self.type_of(&label.value);
        }
        for statement in &case.statements {
            self.lint_statement(statement);
        }
        self.context.restore_regex(snapshot);
    }

    fn lint_call(&mut self, stmt: &CallStatement) {
        let name = stmt.subroutine.value.clone();
        let scope = self.context.scope();
        let Some(info) = self.context.subroutines.get_mut(&name) else {
            self.report(
                Rule::CallUndefined,
                &stmt.subroutine.meta.token,
                format!("call of undeclared subroutine `{name}`"),
            );
            return;
        };
        info.used = true;
        info.scopes = info.scopes | scope;
        if let Some(sub) = self.subs.get(&name).copied() {
            self.lint_call_target(sub);
        }
    }

    /// Walks a custom subroutine's body under the caller's scope. Goto
    /// bookkeeping is scoped to the callee; regex state intentionally leaks
    /// back to the caller, as it does at runtime.
    pub(crate) fn lint_call_target(&mut self, sub: &'a crate::ast::SubroutineDeclaration) {
        if self.call_stack.iter().any(|frame| frame == &sub.name.value) {
            return;
        }
        self.call_stack.push(sub.name.value.clone());
        let gotos = std::mem::take(&mut self.gotos);
        let destinations = std::mem::take(&mut self.destinations);
        self.lint_block(&sub.block);
        self.check_gotos_nested();
        self.gotos = gotos;
        self.destinations = destinations;
        self.call_stack.pop();
    }

    fn check_gotos_nested(&mut self) {
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

    fn lint_return(&mut self, stmt: &ReturnStatement) {
        match (self.context.return_type, &stmt.expression) {
            (Some(expected), Some(expression)) => {
                if let Some(actual) = self.type_of(expression) {
                    if !expected.accepts(actual) {
                        self.report(
                            Rule::ReturnType,
                            &expression.meta().token,
                            format!("expected {expected} return value, found {actual}"),
                        );
                    }
                }
            }
            (Some(expected), None) => {
                self.report(
                    Rule::ReturnType,
                    &stmt.meta.token,
                    format!("this subroutine must return a {expected} value"),
                );
            }
            (None, Some(expression)) => {
                // Lifecycle-style returns name a transition state.
                if let Some(actual) = self.type_of(expression) {
                    if actual != VclType::Id {
                        self.report(
                            Rule::ReturnType,
                            &expression.meta().token,
                            format!("expected a return state, found {actual}"),
                        );
                    }
                }
            }
            (None, None) => {}
        }
    }

    fn lint_error(&mut self, stmt: &ErrorStatement) {
        if let Some(code) = &stmt.code {
            if let Some(ty) = self.type_of(code) {
                if !VclType::Integer.accepts(ty) {
                    self.report(
                        Rule::TypeMismatch,
                        &code.meta().token,
                        format!("error code must be INTEGER, found {ty}"),
                    );
                }
            }
        }
        if let Some(argument) = &stmt.argument {
            self.expect_string(argument);
        }
    }

    pub(crate) fn expect_string(&mut self, expression: &Expression) {
        if let Some(ty) = self.type_of(expression) {
            if !VclType::String.accepts(ty) {
                self.report(
                    Rule::TypeMismatch,
                    &expression.meta().token,
                    format!("expected a STRING value, found {ty}"),
                );
            }
        }
    }

    pub(crate) fn expect_condition(&mut self, expression: &Expression) {
        if let Some(ty) = self.type_of(expression) {
            if ty != VclType::Bool {
                self.report(
                    Rule::OperatorCondition,
                    &expression.meta().token,
                    format!("condition must be BOOL, found {ty}"),
                );
            }
        }
    }
}

fn assignment_operator_ok(target: VclType, operator: Operator) -> bool {
    use Operator::*;
    match operator {
        Assign => true,
        AdditionAssign => matches!(
            target,
            VclType::String | VclType::Integer | VclType::Float | VclType::Rtime | VclType::Time
        ),
        SubtractionAssign => {
            target.is_numeric() || matches!(target, VclType::Rtime | VclType::Time)
        }
        MultiplicationAssign | DivisionAssign | RemainderAssign => {
            target.is_numeric() || target == VclType::Rtime
        }
        BitwiseOrAssign | BitwiseAndAssign | BitwiseXorAssign | LeftShiftAssign
        | RightShiftAssign => target == VclType::Integer,
        _ => false,
    }
}
