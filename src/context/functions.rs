use indexmap::IndexMap;

use crate::context::scope::Scope;
use crate::context::types::VclType;

/// Catalog entry for one built-in function.
///
/// `arguments` lists the accepted signatures; a call matches if any
/// alternative accepts its argument types. A `None` return type marks a
/// procedure usable only in statement position.
#[derive(Debug, Clone)]
pub struct Function {
    pub return_type: Option<VclType>,
    pub arguments: Vec<Vec<VclType>>,
    pub scopes: Scope,
    pub reference: Option<&'static str>,
}

impl Function {
    pub fn new(return_type: Option<VclType>, arguments: Vec<Vec<VclType>>, scopes: Scope) -> Self {
        Function {
            return_type,
            arguments,
            scopes,
            reference: None,
        }
    }

    pub fn with_reference(mut self, url: &'static str) -> Self {
        self.reference = Some(url);
        self
    }
}

/// The function catalog mirrors the variable trie's dotted-path shape
/// (`std.tolower`, `table.lookup`, ...).
#[derive(Debug, Clone, Default)]
pub struct FunctionNode {
    pub function: Option<Function>,
    pub children: IndexMap<String, FunctionNode>,
}

impl FunctionNode {
    pub fn insert(&mut self, path: &str, function: Function) {
        let mut node = self;
        for segment in path.split('.') {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.function = Some(function);
    }

    pub fn lookup(&self, path: &str) -> Option<&Function> {
        let mut node = self;
        for segment in path.split('.') {
            node = node.children.get(segment)?;
        }
        node.function.as_ref()
    }
}
