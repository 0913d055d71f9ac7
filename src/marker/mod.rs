//! @acp:module "Marker Parser"
//! @acp:summary "Parses layout marker comments into typed metadata"
//! @acp:domain markers
//! @acp:layer service
//!
//! The host templating system wraps rendered blocks and containers in
//! comments such as `<!-- BLOCK NAME: header BLOCK CLASS: Vendor\Block -->`.
//! Only the opening comment carries metadata; the matching `END BLOCK` /
//! `END CONTAINER` comment is ignored.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CONTAINER_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CONTAINER NAME:\s*([^\s<]+)").unwrap());

static BLOCK_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BLOCK NAME:\s*([^\s/]+)").unwrap());

/// Class names may contain spaces and backslashes; they stop at the next `/`
static BLOCK_CLASS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BLOCK CLASS:\s*([^/]+)").unwrap());

static TEMPLATE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TEMPLATE NAME:\s*([^\s/]+)").unwrap());

static TEMPLATE_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TEMPLATE FILE:\s*(\S+)").unwrap());

const BLOCK_OPEN: &str = "BLOCK NAME:";
const BLOCK_CLOSE: &str = "END BLOCK";
const CONTAINER_OPEN: &str = "CONTAINER NAME:";
const CONTAINER_CLOSE: &str = "END CONTAINER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Block,
    Container,
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Block => "block",
            MarkerKind::Container => "container",
        }
    }

    /// Upper-case label shown in the overlay
    pub fn label(&self) -> &'static str {
        match self {
            MarkerKind::Block => "BLOCK",
            MarkerKind::Container => "CONTAINER",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @acp:summary "Metadata carried by one opening marker comment"
/// Optional fields are empty strings when the marker does not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMetadata {
    pub kind: MarkerKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_file: String,
}

/// Identity used to deduplicate hierarchy entries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub kind: MarkerKind,
    pub name: String,
}

impl MarkerMetadata {
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            kind: MarkerKind::Container,
            name: name.into(),
            class_name: String::new(),
            template_name: String::new(),
            template_file: String::new(),
        }
    }

    pub fn block(name: impl Into<String>) -> Self {
        Self {
            kind: MarkerKind::Block,
            ..Self::container(name)
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, file: impl Into<String>) -> Self {
        self.template_name = name.into();
        self.template_file = file.into();
        self
    }

    pub fn key(&self) -> MarkerKey {
        MarkerKey {
            kind: self.kind,
            name: self.name.clone(),
        }
    }

    pub fn has_key(&self, key: &MarkerKey) -> bool {
        self.kind == key.kind && self.name == key.name
    }
}

/// True for an opening block or container comment, false for its `END`
/// counterpart and for unrelated comments
pub fn is_opening_marker(text: &str) -> bool {
    let text = text.trim();
    (text.contains(BLOCK_OPEN) && !text.contains(BLOCK_CLOSE))
        || (text.contains(CONTAINER_OPEN) && !text.contains(CONTAINER_CLOSE))
}

/// @acp:summary "Parse comment text into marker metadata"
/// A container name wins over any block fields in the same text.
pub fn parse_marker(text: &str) -> Option<MarkerMetadata> {
    if let Some(name) = capture(&CONTAINER_NAME_PATTERN, text) {
        return Some(MarkerMetadata::container(name));
    }

    let name = capture(&BLOCK_NAME_PATTERN, text)?;
    Some(MarkerMetadata {
        kind: MarkerKind::Block,
        name,
        class_name: capture(&BLOCK_CLASS_PATTERN, text).unwrap_or_default(),
        template_name: capture(&TEMPLATE_NAME_PATTERN, text).unwrap_or_default(),
        template_file: capture(&TEMPLATE_FILE_PATTERN, text).unwrap_or_default(),
    })
}

/// Parse only if `text` is an opening marker
pub fn parse_opening_marker(text: &str) -> Option<MarkerMetadata> {
    if is_opening_marker(text) {
        parse_marker(text)
    } else {
        None
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}
