use indexmap::IndexMap;

/// Provider-managed VCL fragments, fed to the resolver.
///
/// Snippets arrive from the surrounding tooling already fetched; a failed
/// fetch upstream simply yields an empty store. Items are grouped two ways:
/// by name, for `include "snippet::NAME"` references, and by lifecycle phase,
/// for boilerplate-marker injection.
#[derive(Debug, Clone, Default)]
pub struct SnippetStore {
    by_name: IndexMap<String, Vec<String>>,
    by_phase: IndexMap<String, Vec<String>>,
}

impl SnippetStore {
    pub fn new() -> Self {
        SnippetStore::default()
    }

    /// Adds one snippet. `phase` is the lifecycle phase the snippet is
    /// pinned to, or `None` for snippets only reachable by name.
    pub fn push(&mut self, name: &str, phase: Option<&str>, source: &str) {
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push(source.to_string());
        if let Some(phase) = phase {
            self.by_phase
                .entry(phase.to_ascii_lowercase())
                .or_default()
                .push(source.to_string());
        }
    }

    /// All snippets registered under `name`, concatenated in insertion
    /// order. `None` when the name is unknown.
    pub fn by_name(&self, name: &str) -> Option<String> {
        self.by_name.get(name).map(|items| items.join("\n"))
    }

    /// All snippets pinned to a lifecycle phase, concatenated. An unknown
    /// phase yields an empty source, which parses to zero statements.
    pub fn by_phase(&self, phase: &str) -> String {
        self.by_phase
            .get(&phase.to_ascii_lowercase())
            .map(|items| items.join("\n"))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
