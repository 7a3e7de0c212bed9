use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;
use crate::parse::ParseError;
use crate::resolve::ResolveError;
use crate::token::Token;
use crate::transformer::TransformError;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("IO error on {0}: {1}")]
    Io(PathBuf, std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ignore,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ignore => "ignore",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Severity> {
        Some(match name.to_ascii_lowercase().as_str() {
            "ignore" => Severity::Ignore,
            "info" => Severity::Info,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => return None,
        })
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finding, anchored at the token that triggered it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub token: Token,
    pub reference: Option<&'static str>,
}

impl Diagnostic {
    /// Dedup key: two findings for the same rule at the same position with
    /// the same text are one finding.
    pub fn key(&self) -> (String, usize, usize, String) {
        (
            self.rule.clone(),
            self.token.line,
            self.token.position,
            self.message.clone(),
        )
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {} [{}]",
            self.token.file, self.token.line, self.token.position, self.severity, self.message, self.rule
        )
    }
}

fn build_marker(len: usize) -> String {
    if len <= 1 {
        "^".to_string()
    } else {
        "-".repeat(len)
    }
}

/// Formats a diagnostic with a source snippet and a marker line under the
/// offending token. Shows one line before and after for context.
///
/// ```text
/// example.vcl(3:9) variable `beresp.ttl` is not accessible in recv
/// │ 2 │ sub vcl_recv {
/// │ 3 │     set beresp.ttl = 1h;
/// │   │         ----------
/// │ 4 │ }
/// ```
pub fn format_diagnostic(source: &str, diagnostic: &Diagnostic) -> String {
    let token = &diagnostic.token;
    let lines: Vec<&str> = source.lines().collect();

    let line = token.line.max(1);
    let first_line = line.saturating_sub(1).max(1);
    let last_line = (line + 1).min(lines.len().max(line));
    let number_width = last_line.to_string().len();

    let mut out = String::new();
    out.push_str(&format!(
        "{}({}:{}) [{}/{}] {}\n",
        token.file, token.line, token.position, diagnostic.severity, diagnostic.rule, diagnostic.message
    ));

    for line_no in first_line..=last_line {
        let content = lines.get(line_no - 1).copied().unwrap_or("");
        out.push_str(&format!(
            "│ {:>number_width$} │ {}\n",
            line_no,
            content,
            number_width = number_width
        ));
        if line_no != line {
            continue;
        }
        let start_col = token.position.max(1);
        // literal length plus opening delimiter chars on this line
        let len = token.literal.chars().count() + token.offset / 2;
        let mut marker = String::new();
        marker.push_str(&" ".repeat(start_col - 1));
        marker.push_str(&build_marker(len));
        out.push_str(&format!(
            "│ {:>number_width$} │ {}\n",
            "",
            marker,
            number_width = number_width
        ));
    }
    if let Some(url) = diagnostic.reference {
        out.push_str(&format!("see: {url}\n"));
    }
    out
}
