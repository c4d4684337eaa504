//! Memoized, cycle-safe lineage resolution.
//!
//! A lineage is the semicolon-joined chain from a root identifier down
//! to a given identifier through the parent relation. Resolution walks
//! parent edges iteratively with an explicit chain (no recursion, so
//! pathological inputs cannot exhaust the call stack) and caches every
//! lineage it computes, so each identifier is resolved at most once
//! across a run.

use std::collections::HashMap;

use tracing::warn;

use tabxml_shared::PLACEHOLDER;

use crate::index::IdentIndex;

/// Maximum number of parent edges a single resolution may follow.
/// Exceeding it signals a probable cycle in data that is nominally a
/// tree. Kept at the original tool's bound.
pub const MAX_DEPTH: usize = 1000;

/// Lineage separator between ancestor identifiers.
const SEPARATOR: char = ';';

/// Computes and caches lineages against a borrowed [`IdentIndex`].
#[derive(Debug)]
pub struct Resolver<'idx> {
    index: &'idx IdentIndex,
    lineage: HashMap<String, String>,
}

impl<'idx> Resolver<'idx> {
    pub fn new(index: &'idx IdentIndex) -> Self {
        Self {
            index,
            lineage: HashMap::new(),
        }
    }

    /// Resolve the full root-to-node lineage of `id`.
    ///
    /// Returns `None` when the depth bound is exceeded (probable
    /// cycle); no partial lineage is produced or cached for the failed
    /// walk. An empty `id` resolves to an empty lineage.
    pub fn resolve(&mut self, id: &str) -> Option<String> {
        if id.is_empty() {
            return Some(String::new());
        }

        // Walk up the parent chain until a cached lineage or a root,
        // remembering the nodes passed on the way.
        let mut chain: Vec<String> = Vec::new();
        let mut cur = id.to_string();

        let base = loop {
            if let Some(cached) = self.lineage.get(&cur) {
                break cached.clone();
            }

            match self.index.parent_of(&cur) {
                None | Some("") | Some(PLACEHOLDER) => {
                    // Root node: lineage is the identifier itself.
                    self.lineage.insert(cur.clone(), cur.clone());
                    break cur;
                }
                Some(parent) => {
                    if chain.len() >= MAX_DEPTH {
                        return None;
                    }
                    let parent = parent.to_string();
                    chain.push(cur);
                    cur = parent;
                }
            }
        };

        // Unwind: extend the resolved prefix one node at a time,
        // caching each intermediate lineage for later lookups.
        let mut lineage = base;
        while let Some(node) = chain.pop() {
            self.check_sort_order(&node);
            lineage.push(SEPARATOR);
            lineage.push_str(&node);
            self.lineage.insert(node, lineage.clone());
        }

        Some(lineage)
    }

    /// The cached lineage of `id`, if resolution reached it.
    pub fn lineage_of(&self, id: &str) -> Option<&str> {
        self.lineage.get(id).map(String::as_str)
    }

    /// Informational check: in 4-column data a child's sort key is
    /// expected to be at least its parent's. An inversion hints at a
    /// mis-assigned parent but does not affect resolution.
    fn check_sort_order(&self, id: &str) {
        if !self.index.has_four_columns() {
            return;
        }
        let Some(parent) = self.index.parent_of(id) else {
            return;
        };
        if self.index.sort_of(id) < self.index.sort_of(parent) {
            warn!(
                id,
                label = self.index.label_of(id),
                parent,
                parent_label = self.index.label_of(parent),
                "sort key inversion: node should not be a child of its recorded parent"
            );
        }
    }
}
