//! @acp:module "Index Command"
//! @acp:summary "Build the comment index for a page and list it"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `block-inspector index <page>`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::index::IndexEntry;
use crate::marker::MarkerKind;
use crate::page::Page;

/// Options for the index command
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Saved HTML page
    pub page: PathBuf,
    /// Output as JSON
    pub json: bool,
}

#[derive(Serialize)]
struct IndexReport<'a> {
    page: String,
    nodes: usize,
    blocks: usize,
    containers: usize,
    entries: &'a [IndexEntry],
}

/// Execute the index command
pub fn execute_index(options: IndexOptions) -> Result<()> {
    let page = Page::load(&options.page)?;
    let index = page.index();
    let entries = index.entries(page.document());

    if options.json {
        let report = IndexReport {
            page: options.page.to_string_lossy().to_string(),
            nodes: page.document().len(),
            blocks: index.count_kind(MarkerKind::Block),
            containers: index.count_kind(MarkerKind::Container),
            entries: &entries,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "{} No markers found in {}",
            style("⚠").yellow(),
            options.page.display()
        );
        return Ok(());
    }

    println!(
        "{} Indexed {}",
        style("✓").green(),
        options.page.display()
    );
    for entry in &entries {
        let kind = match entry.marker.kind {
            MarkerKind::Container => style(entry.marker.kind.label()).magenta(),
            MarkerKind::Block => style(entry.marker.kind.label()).cyan(),
        };
        println!(
            "  {:>6}  {:<9} {}  {}",
            style(entry.node.to_string()).dim(),
            kind,
            style(&entry.marker.name).bold(),
            style(&entry.element).dim()
        );
        if !entry.marker.class_name.is_empty() {
            println!("          class: {}", entry.marker.class_name);
        }
    }
    println!(
        "\n  Blocks: {}  Containers: {}",
        index.count_kind(MarkerKind::Block),
        index.count_kind(MarkerKind::Container)
    );

    Ok(())
}
