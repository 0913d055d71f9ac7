//! @acp:module "Page"
//! @acp:summary "A parsed document bundled with its comment index"
//! @acp:domain dom
//! @acp:layer model

use std::path::Path;

use crate::dom::{Document, NodeId, TargetQuery};
use crate::error::{InspectorError, Result};
use crate::hierarchy::{HierarchyPath, HierarchyResolver};
use crate::index::CommentIndex;

/// @acp:summary "Document plus index; the index always exists before any query"
#[derive(Debug, Clone)]
pub struct Page {
    document: Document,
    index: CommentIndex,
}

impl Page {
    pub fn new(document: Document) -> Self {
        let index = CommentIndex::build(&document);
        Self { document, index }
    }

    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self::new(Document::parse_html(html)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Document::load(path)?))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> &CommentIndex {
        &self.index
    }

    /// Re-run the comment scan; never happens implicitly
    pub fn rebuild_index(&mut self) {
        self.index = CommentIndex::build(&self.document);
    }

    pub fn resolver(&self, sibling_scan_limit: usize) -> HierarchyResolver<'_> {
        HierarchyResolver::new(&self.document, &self.index)
            .with_sibling_scan_limit(sibling_scan_limit)
    }

    pub fn resolve(&self, node: NodeId, sibling_scan_limit: usize) -> HierarchyPath {
        self.resolver(sibling_scan_limit).resolve(node)
    }

    pub fn find(&self, query: &TargetQuery) -> Result<NodeId> {
        self.document
            .find(query)
            .ok_or_else(|| InspectorError::TargetNotFound(query.to_string()))
    }
}
