use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diag::Severity;

/// Project configuration, consumed but not defined here. The surrounding
/// tooling usually materialises this from a `.vclint.json` next to the
/// entry file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered directories searched by the include resolver.
    pub include_paths: Vec<PathBuf>,
    /// Per-rule severity overrides; mapping a rule to `ignore` silences it.
    pub rules: HashMap<String, Severity>,
    /// Transformer tags; tag `foo` spawns `vclint-transform-foo`.
    pub transformers: Vec<String>,
    /// Lowest severity printed by the CLI. Detection is unaffected.
    pub verbosity: u8,
}

impl Config {
    pub fn load(path: &Path) -> std::io::Result<Config> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    pub fn severity_for(&self, rule: &str, default: Severity) -> Severity {
        self.rules.get(rule).copied().unwrap_or(default)
    }
}
