//! @acp:module "Hierarchy Resolver"
//! @acp:summary "Collects the root-to-leaf chain of markers around an element"
//! @acp:domain markers
//! @acp:layer service
//!
//! Walks from an element up to `<body>`. At every level two sources are
//! consulted: the element's own index entry, and opening marker comments
//! among its preceding siblings. The sibling source exists because a
//! template may emit its marker next to a wrapper rather than directly in
//! front of the element that ends up in the index.

use std::collections::HashSet;

use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::index::CommentIndex;
use crate::marker::{parse_opening_marker, MarkerKey, MarkerMetadata};

/// Maximum preceding siblings inspected per level
pub const DEFAULT_SIBLING_SCAN_LIMIT: usize = 100;

/// @acp:summary "Deduplicated markers ordered root first"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HierarchyPath {
    entries: Vec<MarkerMetadata>,
}

impl HierarchyPath {
    pub fn entries(&self) -> &[MarkerMetadata] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Innermost entry
    pub fn leaf(&self) -> Option<&MarkerMetadata> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarkerMetadata> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|m| m.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a HierarchyPath {
    type Item = &'a MarkerMetadata;
    type IntoIter = std::slice::Iter<'a, MarkerMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Accumulates entries leaf-first while ascending
struct Collector {
    reversed: Vec<MarkerMetadata>,
    seen: HashSet<MarkerKey>,
}

impl Collector {
    fn offer(&mut self, meta: &MarkerMetadata) {
        if self.seen.insert(meta.key()) {
            self.reversed.push(meta.clone());
        }
    }

    fn finish(mut self) -> HierarchyPath {
        self.reversed.reverse();
        HierarchyPath {
            entries: self.reversed,
        }
    }
}

/// @acp:summary "Resolves hierarchy paths against a built comment index"
pub struct HierarchyResolver<'a> {
    document: &'a Document,
    index: &'a CommentIndex,
    sibling_scan_limit: usize,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(document: &'a Document, index: &'a CommentIndex) -> Self {
        Self {
            document,
            index,
            sibling_scan_limit: DEFAULT_SIBLING_SCAN_LIMIT,
        }
    }

    pub fn with_sibling_scan_limit(mut self, limit: usize) -> Self {
        self.sibling_scan_limit = limit;
        self
    }

    pub fn sibling_scan_limit(&self) -> usize {
        self.sibling_scan_limit
    }

    /// @acp:summary "Markers enclosing `node`, root first; empty when none"
    pub fn resolve(&self, node: NodeId) -> HierarchyPath {
        let boundary = self.document.boundary();
        let mut collector = Collector {
            reversed: Vec::new(),
            seen: HashSet::new(),
        };

        let mut current = self.document.closest_element(node);
        while let Some(element) = current {
            if element == boundary {
                break;
            }
            if let Some(meta) = self.index.get(element) {
                collector.offer(meta);
            }
            self.scan_preceding_siblings(element, &mut collector);
            current = self.document.parent_element(element);
        }

        collector.finish()
    }

    fn scan_preceding_siblings(&self, element: NodeId, collector: &mut Collector) {
        let mut sibling = self.document.previous_sibling(element);
        let mut checks = 0;

        while let Some(node) = sibling {
            if checks >= self.sibling_scan_limit {
                break;
            }
            checks += 1;

            if let Some(meta) = self.document.comment_text(node).and_then(parse_opening_marker) {
                collector.offer(&meta);
            }
            sibling = self.document.previous_sibling(node);
        }
    }

    /// Element whose own index entry carries `key`, searching upward from
    /// `node`; `None` when the entry only came from a sibling comment
    pub fn owner_of(&self, node: NodeId, key: &MarkerKey) -> Option<NodeId> {
        let boundary = self.document.boundary();
        let mut current = self.document.closest_element(node);

        while let Some(element) = current {
            if element == boundary {
                break;
            }
            if self.index.get(element).is_some_and(|m| m.has_key(key)) {
                return Some(element);
            }
            current = self.document.parent_element(element);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::TargetQuery;
    use crate::marker::MarkerKind;

    fn doc(body: &str) -> Document {
        Document::parse_html(&format!(
            "<!DOCTYPE html><html><head></head><body>{}</body></html>",
            body
        ))
        .unwrap()
    }

    fn by_id(d: &Document, id: &str) -> NodeId {
        d.find(&TargetQuery::Id(id.to_string())).unwrap()
    }

    #[test]
    fn test_nested_markers_root_first() {
        let d = doc(
            "<!-- CONTAINER NAME: root --><div id=\"root\">\
             <!-- BLOCK NAME: content --><div id=\"content\">\
             <!-- BLOCK NAME: detail --><div id=\"detail\"><span id=\"leaf\">x</span></div>\
             </div></div>",
        );
        let index = CommentIndex::build(&d);
        let path = HierarchyResolver::new(&d, &index).resolve(by_id(&d, "leaf"));

        assert_eq!(path.names(), vec!["root", "content", "detail"]);
        assert_eq!(path.entries()[0].kind, MarkerKind::Container);
        assert_eq!(path.leaf().unwrap().name, "detail");
    }

    #[test]
    fn test_sibling_comments_collected() {
        // marker sits in front of a text node wrapper, not the hovered element
        let d = doc(
            "<div id=\"wrap\"><!-- BLOCK NAME: promo --><span>label</span>\
             <a id=\"link\">go</a></div>",
        );
        let index = CommentIndex::build(&d);
        let path = HierarchyResolver::new(&d, &index).resolve(by_id(&d, "link"));

        assert_eq!(path.names(), vec!["promo"]);
    }

    #[test]
    fn test_no_duplicates() {
        let d = doc(
            "<!-- BLOCK NAME: a --><div id=\"outer\">\
             <!-- BLOCK NAME: a --><div id=\"inner\"></div></div>",
        );
        let index = CommentIndex::build(&d);
        let path = HierarchyResolver::new(&d, &index).resolve(by_id(&d, "inner"));

        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_empty_when_unmarked() {
        let d = doc("<div><p id=\"plain\">nothing</p></div>");
        let index = CommentIndex::build(&d);
        let path = HierarchyResolver::new(&d, &index).resolve(by_id(&d, "plain"));
        assert!(path.is_empty());
    }

    #[test]
    fn test_sibling_scan_is_bounded() {
        let filler = "<i></i>".repeat(5);
        let d = doc(&format!(
            "<div><!-- BLOCK NAME: far -->{}<b id=\"target\"></b></div>",
            filler
        ));
        let index = CommentIndex::build(&d);
        let target = by_id(&d, "target");

        let limited = HierarchyResolver::new(&d, &index).with_sibling_scan_limit(5);
        assert!(limited.resolve(target).is_empty());

        let wide = HierarchyResolver::new(&d, &index).with_sibling_scan_limit(6);
        assert_eq!(wide.resolve(target).names(), vec!["far"]);
    }

    #[test]
    fn test_owner_of_leaf() {
        let d = doc(
            "<!-- BLOCK NAME: card --><div id=\"card\"><p><em id=\"deep\">x</em></p></div>",
        );
        let index = CommentIndex::build(&d);
        let resolver = HierarchyResolver::new(&d, &index);
        let path = resolver.resolve(by_id(&d, "deep"));
        let leaf = path.leaf().unwrap().key();

        assert_eq!(resolver.owner_of(by_id(&d, "deep"), &leaf), Some(by_id(&d, "card")));
    }

    #[test]
    fn test_text_node_resolves_from_parent() {
        let d = doc("<!-- BLOCK NAME: note --><p id=\"p\">hello</p>");
        let index = CommentIndex::build(&d);
        let p = by_id(&d, "p");
        let text = d.children(p)[0];

        let path = HierarchyResolver::new(&d, &index).resolve(text);
        assert_eq!(path.names(), vec!["note"]);
    }
}
