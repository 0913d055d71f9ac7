//! @acp:module "Comment Indexer"
//! @acp:summary "One-time scan mapping elements to their opening marker"
//! @acp:domain markers
//! @acp:layer service
//!
//! Each opening marker is attached to the first element that follows it
//! among its siblings. The association is positional and heuristic: a
//! conditionally inserted wrapper right after the comment receives the
//! metadata instead of the block's real root.
//!
//! The index is a snapshot. Later changes to the page are not observed;
//! call [`CommentIndex::build`] again to pick them up.

use std::collections::HashMap;

use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::marker::{is_opening_marker, parse_marker, MarkerKind, MarkerMetadata};

/// @acp:summary "Element identity to marker metadata, one entry per element"
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    entries: HashMap<NodeId, MarkerMetadata>,
}

/// One row of the index, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub node: NodeId,
    pub element: String,
    pub marker: MarkerMetadata,
}

impl CommentIndex {
    /// @acp:summary "Scan every comment under `<body>` and build the index"
    pub fn build(document: &Document) -> Self {
        Self::build_under(document, document.boundary())
    }

    /// Scan comments below an arbitrary subtree root
    pub fn build_under(document: &Document, root: NodeId) -> Self {
        let mut entries = HashMap::new();
        let mut markers = 0usize;

        for (comment, text) in document.comments_under(root) {
            if !is_opening_marker(text) {
                continue;
            }
            let Some(meta) = parse_marker(text.trim()) else {
                continue;
            };
            markers += 1;

            match following_element(document, comment) {
                Some(element) => {
                    tracing::debug!(
                        element = %document.describe(element),
                        kind = %meta.kind,
                        name = %meta.name,
                        "Mapped marker"
                    );
                    // last marker wins when several precede the same element
                    entries.insert(element, meta);
                }
                None => {
                    tracing::debug!(name = %meta.name, "Marker has no following element");
                }
            }
        }

        tracing::info!(markers, mapped = entries.len(), "Built comment index");
        Self { entries }
    }

    pub fn get(&self, element: NodeId) -> Option<&MarkerMetadata> {
        self.entries.get(&element)
    }

    pub fn contains(&self, element: NodeId) -> bool {
        self.entries.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by node id, i.e. document order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MarkerMetadata)> {
        let mut nodes: Vec<_> = self.entries.keys().copied().collect();
        nodes.sort();
        nodes.into_iter().map(move |n| (n, &self.entries[&n]))
    }

    pub fn count_kind(&self, kind: MarkerKind) -> usize {
        self.entries.values().filter(|m| m.kind == kind).count()
    }

    pub fn entries(&self, document: &Document) -> Vec<IndexEntry> {
        self.iter()
            .map(|(node, marker)| IndexEntry {
                node,
                element: document.describe(node),
                marker: marker.clone(),
            })
            .collect()
    }
}

/// First element among the following siblings of `node`
fn following_element(document: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = document.next_sibling(node);
    while let Some(candidate) = current {
        if document.is_element(candidate) {
            return Some(candidate);
        }
        current = document.next_sibling(candidate);
    }
    None
}
