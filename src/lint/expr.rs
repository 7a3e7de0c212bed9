use crate::ast::{
    Expression, FunctionCallExpression, IfExpression, InfixExpression, Operator, PrefixExpression,
};
use crate::context::{ContextError, VclType};
use crate::lint::{Linter, Rule};
use crate::token::Token;

impl<'a> Linter<'a> {
    /// Types an expression, reporting any findings along the way. `None`
    /// means the type could not be established; the caller skips dependent
    /// checks rather than cascading.
    pub(crate) fn type_of(&mut self, expression: &Expression) -> Option<VclType> {
        match expression {
            Expression::Ident(ident) => {
                match self.context.get(&ident.value, &ident.meta.token) {
                    Ok(ty) => Some(ty),
                    Err(err) => {
                        self.report_context(err);
                        None
                    }
                }
            }
            Expression::String(_) => Some(VclType::String),
            Expression::Ip(_) => Some(VclType::Ip),
            Expression::Rtime(_) => Some(VclType::Rtime),
            Expression::Integer(_) => Some(VclType::Integer),
            Expression::Float(_) => Some(VclType::Float),
            Expression::Boolean(_) => Some(VclType::Bool),
            Expression::Grouped(grouped) => self.type_of(&grouped.right),
            Expression::Prefix(prefix) => self.type_of_prefix(prefix),
            Expression::Postfix(postfix) => {
                let ty = self.type_of(&postfix.left)?;
                if !ty.is_numeric() {
                    self.report(
                        Rule::TypeMismatch,
                        &postfix.meta.token,
                        format!("operator `{}` needs a numeric operand, found {ty}", postfix.operator),
                    );
                    return None;
                }
                Some(ty)
            }
            Expression::Infix(infix) => self.type_of_infix(infix),
            Expression::IfExpr(ternary) => self.type_of_ternary(ternary),
            Expression::FunctionCall(call) => match self.check_function_call(call)? {
                Some(ty) => Some(ty),
                None => {
                    self.report(
                        Rule::TypeMismatch,
                        &call.function.meta.token,
                        format!("`{}` does not return a value", call.function.value),
                    );
                    None
                }
            },
        }
    }

    fn type_of_prefix(&mut self, prefix: &PrefixExpression) -> Option<VclType> {
        let ty = self.type_of(&prefix.right)?;
        match prefix.operator {
            Operator::Not => {
                if ty != VclType::Bool {
                    self.report(
                        Rule::OperatorCondition,
                        &prefix.meta.token,
                        format!("operator `!` needs a BOOL operand, found {ty}"),
                    );
                    return None;
                }
                Some(VclType::Bool)
            }
            Operator::Subtraction => {
                if !ty.is_numeric() && ty != VclType::Rtime {
                    self.report(
                        Rule::TypeMismatch,
                        &prefix.meta.token,
                        format!("operator `-` needs a numeric operand, found {ty}"),
                    );
                    return None;
                }
                Some(ty)
            }
            _ => None,
        }
    }

    fn type_of_infix(&mut self, infix: &InfixExpression) -> Option<VclType> {
        match infix.operator {
            Operator::And | Operator::Or => {
                let left = self.type_of(&infix.left);
                let right = self.type_of(&infix.right);
                for (ty, side) in [(left, &infix.left), (right, &infix.right)] {
                    if let Some(ty) = ty {
                        if ty != VclType::Bool {
                            self.report(
                                Rule::OperatorCondition,
                                &side.meta().token,
                                format!(
                                    "operator `{}` needs BOOL operands, found {ty}",
                                    infix.operator
                                ),
                            );
                        }
                    }
                }
                Some(VclType::Bool)
            }
            Operator::Equal
            | Operator::NotEqual
            | Operator::GreaterThan
            | Operator::LessThan
            | Operator::GreaterThanEqual
            | Operator::LessThanEqual => {
                let left = self.type_of(&infix.left);
                let right = self.type_of(&infix.right);
                if let (Some(left), Some(right)) = (left, right) {
                    if !left.comparable(right) {
                        self.report(
                            Rule::TypeMismatch,
                            &infix.meta.token,
                            format!("cannot compare {left} with {right}"),
                        );
                    }
                }
                Some(VclType::Bool)
            }
            Operator::Match | Operator::NotMatch => self.type_of_match(infix),
            Operator::Addition => {
                let left = self.type_of(&infix.left);
                let right = self.type_of(&infix.right);
                match (left, right) {
                    (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
                        if l == VclType::Float || r == VclType::Float {
                            Some(VclType::Float)
                        } else {
                            Some(VclType::Integer)
                        }
                    }
                    // Everything stringly concatenates.
                    (Some(l), Some(r)) => {
                        for (ty, side) in [(l, &infix.left), (r, &infix.right)] {
                            if !VclType::String.accepts(ty) {
                                self.report(
                                    Rule::TypeMismatch,
                                    &side.meta().token,
                                    format!("{ty} cannot be concatenated"),
                                );
                            }
                        }
                        Some(VclType::String)
                    }
                    _ => None,
                }
            }
            Operator::Subtraction => {
                let left = self.type_of(&infix.left)?;
                let right = self.type_of(&infix.right)?;
                if (left.is_numeric() || left == VclType::Rtime)
                    && (right.is_numeric() || right == VclType::Rtime)
                {
                    if left == VclType::Rtime || right == VclType::Rtime {
                        Some(VclType::Rtime)
                    } else if left == VclType::Float || right == VclType::Float {
                        Some(VclType::Float)
                    } else {
                        Some(VclType::Integer)
                    }
                } else {
                    self.report(
                        Rule::TypeMismatch,
                        &infix.meta.token,
                        format!("cannot subtract {right} from {left}"),
                    );
                    None
                }
            }
            _ => None,
        }
    }

    /// `~` / `!~` match either an ACL (right side names a declared ACL) or
    /// a regex pattern.
    fn type_of_match(&mut self, infix: &InfixExpression) -> Option<VclType> {
        let left = self.type_of(&infix.left);
        match &infix.right {
            Expression::Ident(_) => {
                let right = self.type_of(&infix.right);
                match right {
                    Some(VclType::Acl) => {}
                    Some(ty) if !VclType::String.accepts(ty) => {
                        self.report(
                            Rule::TypeMismatch,
                            &infix.right.meta().token,
                            format!("match pattern must be a STRING, found {ty}"),
                        );
                    }
                    _ => {}
                }
            }
            Expression::String(pattern) => {
                let token = pattern.meta.token.clone();
                self.note_regex_match(&pattern.value, &token);
            }
            other => {
                if let Some(ty) = self.type_of(other) {
                    if !VclType::String.accepts(ty) {
                        self.report(
                            Rule::TypeMismatch,
                            &other.meta().token,
                            format!("match pattern must be a STRING, found {ty}"),
                        );
                    }
                }
            }
        }
        if let Some(left) = left {
            if !VclType::String.accepts(left) && left != VclType::Ip {
                self.report(
                    Rule::TypeMismatch,
                    &infix.left.meta().token,
                    format!("cannot match against {left}"),
                );
            }
        }
        Some(VclType::Bool)
    }

    fn type_of_ternary(&mut self, ternary: &IfExpression) -> Option<VclType> {
        self.expect_condition(&ternary.condition);
        let snapshot = self.context.snapshot_regex();
        let consequence = self.type_of(&ternary.consequence);
        self.context.restore_regex(snapshot);
        let alternative = self.type_of(&ternary.alternative);
        match (consequence, alternative) {
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), Some(b)) if a.accepts(b) => Some(a),
            (Some(a), Some(b)) if b.accepts(a) => Some(b),
            (Some(a), Some(b)) => {
                self.report(
                    Rule::TypeMismatch,
                    &ternary.meta.token,
                    format!("ternary branches disagree: {a} vs {b}"),
                );
                None
            }
            _ => None,
        }
    }

    /// Checks a call and reports findings. Outer `None` means the call did
    /// not resolve; `Some(None)` is a well-formed procedure call.
    pub(crate) fn check_function_call(
        &mut self,
        call: &FunctionCallExpression,
    ) -> Option<Option<VclType>> {
        let name = call.function.value.clone();
        let token = call.function.meta.token.clone();
        let function = match self.context.get_function(&name, &token) {
            Ok(function) => function,
            Err(ContextError::UndefinedFunction { .. }) => {
                return self.check_functional_subroutine(call, &name, &token);
            }
            Err(err) => {
                self.report_context(err);
                return None;
            }
        };

        let arg_count = call.arguments.len();
        let arities: Vec<usize> = function.arguments.iter().map(Vec::len).collect();
        if !arities.contains(&arg_count) {
            self.report(
                Rule::FunctionArity,
                &token,
                format!(
                    "`{name}` takes {} argument(s), {arg_count} given",
                    arities
                        .iter()
                        .map(usize::to_string)
                        .collect::<Vec<_>>()
                        .join(" or ")
                ),
            );
            for argument in &call.arguments {
                self.type_of(argument);
            }
            return None;
        }

        let mut arg_types: Vec<Option<VclType>> = Vec::with_capacity(arg_count);
        for argument in &call.arguments {
            arg_types.push(self.type_of(argument));
        }
        let accepted = function
            .arguments
            .iter()
            .filter(|alt| alt.len() == arg_count)
            .any(|alt| {
                alt.iter().zip(&arg_types).all(|(param, arg)| match arg {
                    None => true,
                    Some(arg) => param_accepts(*param, *arg),
                })
            });
        if !accepted {
            self.report(
                Rule::FunctionArgument,
                &token,
                format!("arguments to `{name}` do not match its signature"),
            );
        }
        Some(function.return_type)
    }

    fn check_functional_subroutine(
        &mut self,
        call: &FunctionCallExpression,
        name: &str,
        token: &Token,
    ) -> Option<Option<VclType>> {
        let scope = self.context.scope();
        let mut functional_return = None;
        if let Some(info) = self.context.subroutines.get_mut(name) {
            if let Some(ret) = info.return_type {
                info.used = true;
                info.scopes = info.scopes | scope;
                functional_return = Some(ret);
            }
        }
        let Some(ret) = functional_return else {
            self.report(
                Rule::FunctionUndefined,
                token,
                format!("undefined function `{name}`"),
            );
            return None;
        };
        if !call.arguments.is_empty() {
            self.report(
                Rule::FunctionArity,
                token,
                format!("subroutine `{name}` takes no arguments"),
            );
        }
        if let Some(sub) = self.subs.get(name).copied() {
            self.lint_call_target(sub);
        }
        Some(Some(ret))
    }

    /// Records a regex literal match: counts its capture groups and warns
    /// once per subroutine when a fresh match would overwrite unread
    /// captures.
    pub(crate) fn note_regex_match(&mut self, pattern: &str, token: &Token) {
        if capture_groups(pattern) == 0 {
            return;
        }
        if self.context.push_regex_captures() && !self.capture_warned {
            self.capture_warned = true;
            self.report(
                Rule::RegexCaptureOverwritten,
                token,
                "capture groups from an earlier match may be overwritten before they are read"
                    .to_string(),
            );
        }
    }
}

/// Whether an argument type satisfies a parameter slot. `ID` slots take any
/// bare-identifier value, which also covers table and ACL names.
fn param_accepts(param: VclType, arg: VclType) -> bool {
    param.accepts(arg)
        || (param == VclType::Id
            && matches!(arg, VclType::Id | VclType::Acl | VclType::Backend))
}

/// Counts capturing groups: unescaped `(` not followed by `?`.
fn capture_groups(pattern: &str) -> usize {
    let bytes = pattern.as_bytes();
    let mut count = 0;
    let mut escaped = false;
    for (idx, &byte) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => escaped = true,
            b'(' if bytes.get(idx + 1) != Some(&b'?') => count += 1,
            _ => {}
        }
    }
    count
}
