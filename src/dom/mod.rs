//! @acp:module "DOM Snapshot"
//! @acp:summary "Arena-backed page snapshot parsed with html5ever"
//! @acp:domain dom
//! @acp:layer model
//!
//! The inspector never mutates page content, so the parsed tree is
//! flattened once into an arena addressed by [`NodeId`]. Comment nodes are
//! kept: they carry the layout markers everything else depends on.

use std::fmt;
use std::io;
use std::str::FromStr;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::{Deserialize, Serialize};

use crate::error::{InspectorError, Result};

/// Stable identity of a node within one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element {
        tag_name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    /// Doctype and processing instructions
    Other,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Position within the parent's child list
    slot: usize,
}

/// @acp:summary "Immutable page snapshot"
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: Option<NodeId>,
}

impl Document {
    /// @acp:summary "Parse an HTML string into a snapshot"
    pub fn parse_html(html: &str) -> Result<Self> {
        Self::parse_bytes(html.as_bytes())
    }

    /// Parse raw page bytes; invalid UTF-8 is replaced rather than rejected
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut reader = io::Cursor::new(bytes);
        let dom: RcDom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut reader)
            .map_err(|e| InspectorError::Html(e.to_string()))?;

        let mut document = Document {
            nodes: Vec::new(),
            body: None,
        };
        document.convert(&dom.document);

        tracing::debug!(nodes = document.nodes.len(), "Parsed page snapshot");
        Ok(document)
    }

    /// Read and parse an HTML file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse_bytes(&bytes)
    }

    /// Flatten the rcdom tree without recursion; ids follow document order
    fn convert(&mut self, root: &Handle) {
        let mut stack: Vec<(Handle, Option<NodeId>)> = vec![(root.clone(), None)];

        while let Some((handle, parent)) = stack.pop() {
            let kind = node_kind(&handle);
            let is_body = matches!(&kind, NodeKind::Element { tag_name, .. } if tag_name == "body");
            let id = self.push(kind, parent);
            if is_body && self.body.is_none() {
                self.body = Some(id);
            }

            let children = handle.children.borrow();
            stack.extend(children.iter().rev().map(|child| (child.clone(), Some(id))));
        }
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let slot = match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p.0].children;
                siblings.push(id);
                siblings.len() - 1
            }
            None => 0,
        };
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            slot,
        });
        id
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    /// Node at which upward walks stop: `<body>`, or the document node
    pub fn boundary(&self) -> NodeId {
        self.body.unwrap_or_else(|| self.root())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Validate a raw id coming from outside the snapshot
    pub fn node_id(&self, raw: usize) -> Result<NodeId> {
        if raw < self.nodes.len() {
            Ok(NodeId(raw))
        } else {
            Err(InspectorError::UnknownNode(raw))
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let parent = self.get(node.parent?)?;
        let slot = node.slot.checked_sub(1)?;
        parent.children.get(slot).copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let parent = self.get(node.parent?)?;
        parent.children.get(node.slot + 1).copied()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.kind), Some(NodeKind::Element { .. }))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn comment_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Nearest element at or above `id`
    pub fn closest_element(&self, id: NodeId) -> Option<NodeId> {
        if self.is_element(id) {
            Some(id)
        } else {
            self.parent_element(id)
        }
    }

    /// All nodes below `root` in document order, `root` excluded
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(root).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Comment nodes below `root` in document order
    pub fn comments_under(&self, root: NodeId) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.descendants(root)
            .filter_map(move |id| self.comment_text(id).map(|text| (id, text)))
    }

    pub fn find(&self, query: &TargetQuery) -> Option<NodeId> {
        let root = self.root();
        match query {
            TargetQuery::NodeId(raw) => self.node_id(*raw).ok(),
            TargetQuery::Id(id) => self
                .descendants(root)
                .find(|n| self.attribute(*n, "id") == Some(id.as_str())),
            TargetQuery::Tag(tag) => self
                .descendants(root)
                .find(|n| self.tag_name(*n).is_some_and(|t| t.eq_ignore_ascii_case(tag))),
        }
    }

    /// Short CSS-like label such as `div#header.page-header`
    pub fn describe(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element { tag_name, .. }) => {
                let mut label = tag_name.clone();
                if let Some(element_id) = self.attribute(id, "id") {
                    label.push('#');
                    label.push_str(element_id);
                }
                if let Some(classes) = self.attribute(id, "class") {
                    for class in classes.split_whitespace() {
                        label.push('.');
                        label.push_str(class);
                    }
                }
                label
            }
            Some(NodeKind::Document) => "#document".to_string(),
            Some(NodeKind::Text(_)) => "#text".to_string(),
            Some(NodeKind::Comment(_)) => "#comment".to_string(),
            Some(NodeKind::Other) => "#other".to_string(),
            None => format!("{}", id),
        }
    }
}

fn node_kind(handle: &Handle) -> NodeKind {
    match &handle.data {
        NodeData::Document => NodeKind::Document,
        NodeData::Element { name, attrs, .. } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            NodeKind::Element {
                tag_name: name.local.to_string(),
                attributes,
            }
        }
        NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
        NodeData::Comment { contents } => NodeKind::Comment(contents.to_string()),
        _ => NodeKind::Other,
    }
}

/// Pre-order walk over a subtree
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// How a CLI user or script names an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetQuery {
    /// `#header`: match the `id` attribute exactly
    Id(String),
    /// `@42`: a snapshot node id
    NodeId(usize),
    /// `main`: first element with this tag name
    Tag(String),
}

impl FromStr for TargetQuery {
    type Err = InspectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix('#') {
            if id.is_empty() {
                return Err(InspectorError::InvalidTarget(s.to_string()));
            }
            Ok(TargetQuery::Id(id.to_string()))
        } else if let Some(raw) = s.strip_prefix('@') {
            raw.parse()
                .map(TargetQuery::NodeId)
                .map_err(|_| InspectorError::InvalidTarget(s.to_string()))
        } else if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Ok(TargetQuery::Tag(s.to_ascii_lowercase()))
        } else {
            Err(InspectorError::InvalidTarget(s.to_string()))
        }
    }
}

impl fmt::Display for TargetQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetQuery::Id(id) => write!(f, "#{}", id),
            TargetQuery::NodeId(raw) => write!(f, "@{}", raw),
            TargetQuery::Tag(tag) => write!(f, "{}", tag),
        }
    }
}
