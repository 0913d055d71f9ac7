//! @acp:module "Resolve Command"
//! @acp:summary "Print the block hierarchy that produced one element"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `block-inspector resolve <page> <target>`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::config::Config;
use crate::dom::{NodeId, TargetQuery};
use crate::hierarchy::HierarchyPath;
use crate::marker::{MarkerKind, MarkerMetadata};
use crate::page::Page;

/// Options for the resolve command
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Saved HTML page
    pub page: PathBuf,
    /// `#id`, `@node` or tag name
    pub target: String,
    /// Output as JSON
    pub json: bool,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    target: &'a str,
    node: NodeId,
    element: String,
    path: &'a HierarchyPath,
}

/// Execute the resolve command
pub fn execute_resolve(options: ResolveOptions, config: Config) -> Result<()> {
    let page = Page::load(&options.page)?;
    let query: TargetQuery = options.target.parse()?;
    let node = page.find(&query)?;
    let path = page.resolve(node, config.sibling_scan_limit);

    if options.json {
        let report = ResolveReport {
            target: &options.target,
            node,
            element: page.document().describe(node),
            path: &path,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        style("→").cyan(),
        style(page.document().describe(node)).bold(),
        style(node.to_string()).dim()
    );

    if path.is_empty() {
        println!("  {} No block hierarchy for this element", style("⚠").yellow());
        return Ok(());
    }

    for (depth, marker) in path.iter().enumerate() {
        print_marker(marker, depth);
    }

    Ok(())
}

fn print_marker(marker: &MarkerMetadata, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let branch = if depth == 0 { "" } else { "└─ " };
    let label = match marker.kind {
        MarkerKind::Container => style(marker.kind.label()).magenta(),
        MarkerKind::Block => style(marker.kind.label()).cyan(),
    };
    println!("{}{}{} {}", indent, branch, label, style(&marker.name).bold());

    let detail_indent = "  ".repeat(depth + 2);
    if !marker.class_name.is_empty() {
        println!("{}   class: {}", detail_indent, marker.class_name);
    }
    if !marker.template_name.is_empty() {
        println!("{}   template: {}", detail_indent, marker.template_name);
    }
    if !marker.template_file.is_empty() {
        println!("{}   file: {}", detail_indent, style(&marker.template_file).dim());
    }
}
