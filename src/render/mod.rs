//! @acp:module "Tooltip Renderer"
//! @acp:summary "Builds the overlay node tree from a hierarchy path"
//! @acp:domain overlay
//! @acp:layer presentation
//!
//! Every marker-derived value is sanitized before it lands in the tree;
//! page content is untrusted.

use serde::Serialize;

use crate::hierarchy::HierarchyPath;
use crate::marker::{MarkerKind, MarkerMetadata};

pub const TOOLTIP_CLASS: &str = "magento-block-inspector-tooltip";
pub const HIGHLIGHT_CLASS: &str = "magento-block-hovered";
pub const PINNED_CLASS: &str = "pinned";
pub const CLOSE_CLASS: &str = "magento-tooltip-close";
pub const DRAG_HANDLE_CLASS: &str = "magento-tooltip-drag-handle";
pub const PIN_HINT_CLASS: &str = "magento-pin-instruction";
pub const BANNER_CLASS: &str = "magento-inspector-warning";

pub const CLOSE_LABEL: &str = "✕";
pub const DRAG_HANDLE_LABEL: &str = "⋮⋮";
pub const DRAG_HANDLE_TITLE: &str = "Drag to move";

/// Escape text for insertion into markup
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipField {
    pub label: &'static str,
    pub class: &'static str,
    /// Already sanitized
    pub value: String,
}

/// One hierarchy level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipItem {
    pub kind: MarkerKind,
    /// 1-based, root is level 1
    pub level: usize,
    pub indent_px: u32,
    pub heading: String,
    pub fields: Vec<TooltipField>,
}

impl TooltipItem {
    fn from_marker(meta: &MarkerMetadata, depth: usize, indent_step: u32) -> Self {
        let mut fields = vec![TooltipField {
            label: "Name",
            class: "block-name",
            value: sanitize(&meta.name),
        }];

        let optional = [
            ("Class", "block-class", &meta.class_name),
            ("Template", "block-template", &meta.template_name),
            ("File", "block-file", &meta.template_file),
        ];
        for (label, class, value) in optional {
            if !value.is_empty() {
                fields.push(TooltipField {
                    label,
                    class,
                    value: sanitize(value),
                });
            }
        }

        Self {
            kind: meta.kind,
            level: depth + 1,
            indent_px: depth as u32 * indent_step,
            heading: format!("{} - Level {}", meta.kind.label(), depth + 1),
            fields,
        }
    }

    fn type_class(&self) -> &'static str {
        match self.kind {
            MarkerKind::Container => "container-type",
            MarkerKind::Block => "block-type",
        }
    }
}

/// @acp:summary "Overlay content for one hierarchy path"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub items: Vec<TooltipItem>,
    pub close_label: &'static str,
}

impl TooltipContent {
    pub fn from_path(path: &HierarchyPath, indent_step: u32) -> Self {
        let items = path
            .iter()
            .enumerate()
            .map(|(depth, meta)| TooltipItem::from_marker(meta, depth, indent_step))
            .collect();
        Self {
            items,
            close_label: CLOSE_LABEL,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Plain-text lines paired with their left indentation in pixels
    pub fn lines(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        self.items.iter().flat_map(|item| {
            std::iter::once((item.indent_px, item.heading.clone())).chain(
                item.fields
                    .iter()
                    .map(move |f| (item.indent_px, format!("{}: {}", f.label, f.value))),
            )
        })
    }

    /// Markup for the overlay element
    pub fn to_html(&self) -> String {
        let mut html = format!("<div class=\"{}\">", TOOLTIP_CLASS);
        html.push_str("<div class=\"block-hierarchy\">");

        for item in &self.items {
            let type_class = item.type_class();
            html.push_str(&format!(
                "<div class=\"block-item {tc}\" style=\"margin-left: {indent}px;\">\
                 <div class=\"block-level {tc}\">{heading}</div>",
                tc = type_class,
                indent = item.indent_px,
                heading = item.heading,
            ));
            for field in &item.fields {
                html.push_str(&format!(
                    "<div class=\"{}\"><strong>{}:</strong> {}</div>",
                    field.class, field.label, field.value
                ));
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
        html.push_str(&format!(
            "<button class=\"{}\">{}</button>",
            CLOSE_CLASS, self.close_label
        ));
        html.push_str("</div>");
        html
    }
}
