//! Semantic-type tree used to widen a semantic-type filter to descendants.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct SemanticTypeTree {
    children: HashMap<String, Vec<String>>,
}

impl SemanticTypeTree {
    /// Build from `(parent, child)` edges.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for (parent, child) in edges {
            let list = children.entry(parent).or_default();
            if !list.contains(&child) {
                list.push(child);
            }
        }
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Requested codes followed by all their descendants, each once.
    pub fn expand(&self, codes: &[String]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out: Vec<String> = Vec::new();
        let mut queue: VecDeque<&str> = codes.iter().map(String::as_str).collect();

        while let Some(code) = queue.pop_front() {
            if !seen.insert(code) {
                continue;
            }
            out.push(code.to_string());
            if let Some(kids) = self.children.get(code) {
                queue.extend(kids.iter().map(String::as_str));
            }
        }
        out
    }
}
