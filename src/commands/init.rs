//! @acp:module "Init Command"
//! @acp:summary "Write a default inspector config file"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `block-inspector init`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::{Config, DEFAULT_CONFIG_PATH};

/// Options for the init command
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Where to write the config
    pub path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
            force: false,
        }
    }
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    if options.path.exists() && !options.force {
        eprintln!(
            "{} Config file already exists. Use --force to overwrite.",
            style("✗").red()
        );
        std::process::exit(1);
    }

    let config = Config::default();
    config.save(&options.path)?;
    println!(
        "{} Created {}",
        style("✓").green(),
        options.path.display()
    );

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Run {} to list the markers on a saved page",
        style("block-inspector index <page.html>").cyan()
    );
    println!(
        "  2. Run {} to see which blocks produced an element",
        style("block-inspector resolve <page.html> '#id'").cyan()
    );

    Ok(())
}
