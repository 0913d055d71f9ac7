//! @acp:module "Scan Command"
//! @acp:summary "Summarize markers across a directory of saved pages"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `block-inspector scan <dir>`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::scan::Scanner;

/// Options for the scan command
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to walk
    pub root: PathBuf,
    /// Output as JSON
    pub json: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            json: false,
        }
    }
}

/// Execute the scan command
pub fn execute_scan(options: ScanOptions, config: Config) -> Result<()> {
    if !options.json {
        println!("{} Scanning {}...", style("→").cyan(), options.root.display());
    }

    let include = config.include.clone();
    let exclude = config.exclude.clone();
    let report = Scanner::new(config).scan(&options.root)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.pages.is_empty() {
        eprintln!(
            "{} No pages found matching include patterns",
            style("✗").red()
        );
        eprintln!("  Current patterns:");
        for pattern in &include {
            eprintln!("    include: {}", pattern);
        }
        for pattern in &exclude {
            eprintln!("    exclude: {}", pattern);
        }
        std::process::exit(1);
    }

    for page in &report.pages {
        let marker = if page.mapped_elements > 0 {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!(
            "  {} {}  markers: {}  blocks: {}  containers: {}  depth: {}",
            marker,
            page.path,
            page.markers,
            page.blocks,
            page.containers,
            page.max_depth
        );
    }
    for skipped in &report.skipped {
        println!(
            "  {} {}  {}",
            style("⚠").yellow(),
            skipped.path,
            style(&skipped.reason).dim()
        );
    }

    println!(
        "\n{} {} pages, {} markers, {} mapped elements",
        style("✓").green(),
        report.pages.len(),
        report.total_markers(),
        report.total_mapped()
    );
    println!(
        "  Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    Ok(())
}
