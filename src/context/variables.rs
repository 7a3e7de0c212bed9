use indexmap::IndexMap;

use crate::context::scope::Scope;
use crate::context::types::VclType;

/// Access rules for one variable leaf: what reading yields, what writing
/// requires (`None` means read-only), whether `unset` is legal, and the
/// scopes the variable exists in.
#[derive(Debug, Clone)]
pub struct Accessor {
    pub get: Option<VclType>,
    pub set: Option<VclType>,
    pub unset: bool,
    pub scopes: Scope,
    pub reference: Option<&'static str>,
}

impl Accessor {
    pub fn read_only(ty: VclType, scopes: Scope) -> Self {
        Accessor {
            get: Some(ty),
            set: None,
            unset: false,
            scopes,
            reference: None,
        }
    }

    pub fn read_write(ty: VclType, scopes: Scope) -> Self {
        Accessor {
            get: Some(ty),
            set: Some(ty),
            unset: false,
            scopes,
            reference: None,
        }
    }

    pub fn header(scopes: Scope) -> Self {
        Accessor {
            get: Some(VclType::String),
            set: Some(VclType::String),
            unset: true,
            scopes,
            reference: None,
        }
    }

    pub fn with_reference(mut self, url: &'static str) -> Self {
        self.reference = Some(url);
        self
    }
}

/// One node of the variable trie.
///
/// Lookup walks dot-separated path segments through `children`. A node may
/// also carry a wildcard child: when the *final* segment misses, the wildcard
/// accessor is materialised under the segment's lower-cased spelling, which
/// is how `req.http.X-Foo` and `req.http.x-foo` resolve to one leaf.
#[derive(Debug, Clone, Default)]
pub struct VariableNode {
    pub accessor: Option<Accessor>,
    pub children: IndexMap<String, VariableNode>,
    pub wildcard: Option<Box<VariableNode>>,
    pub used: bool,
}

impl VariableNode {
    pub fn leaf(accessor: Accessor) -> Self {
        VariableNode {
            accessor: Some(accessor),
            ..Default::default()
        }
    }

    /// Inserts a leaf accessor at a dotted path, creating intermediate
    /// nodes as needed.
    pub fn insert(&mut self, path: &str, accessor: Accessor) {
        let mut node = self;
        for segment in path.split('.') {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.accessor = Some(accessor);
    }

    /// Installs a wildcard child at a dotted path; any unmatched final
    /// segment below that path resolves to this accessor.
    pub fn insert_wildcard(&mut self, path: &str, accessor: Accessor) {
        let mut node = self;
        for segment in path.split('.') {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.wildcard = Some(Box::new(VariableNode::leaf(accessor)));
    }

    /// Resolves a dotted path, materialising wildcard leaves on demand.
    /// Returns `None` for unknown names.
    pub fn lookup(&mut self, path: &str) -> Option<&mut VariableNode> {
        let mut node = self;
        let segments: Vec<&str> = path.split('.').collect();
        for (idx, segment) in segments.iter().enumerate() {
            let is_last = idx == segments.len() - 1;
            if node.children.contains_key(*segment) {
                node = node.children.get_mut(*segment).unwrap();
                continue;
            }
            // Case-folded match against an already-materialised subkey.
            let folded = segment.to_ascii_lowercase();
            if node.children.contains_key(&folded) {
                node = node.children.get_mut(&folded).unwrap();
                continue;
            }
            if is_last {
                if let Some(wildcard) = &node.wildcard {
                    let leaf = (**wildcard).clone();
                    return Some(node.children.entry(folded).or_insert(leaf));
                }
            }
            return None;
        }
        Some(node)
    }

    /// Walks every materialised leaf, in insertion order.
    pub fn walk_leaves(&self, path: &mut String, visit: &mut impl FnMut(&str, &VariableNode)) {
        if self.accessor.is_some() {
            visit(path, self);
        }
        for (key, child) in &self.children {
            let len = path.len();
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(key);
            child.walk_leaves(path, visit);
            path.truncate(len);
        }
    }
}
