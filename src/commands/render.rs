//! @acp:module "Render Command"
//! @acp:summary "Print the tooltip markup the overlay would show for an element"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::dom::TargetQuery;
use crate::page::Page;
use crate::render::TooltipContent;

/// Options for the render command
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub page: PathBuf,
    pub target: String,
}

/// Execute the render command
pub fn execute_render(options: RenderOptions, config: Config) -> Result<()> {
    let page = Page::load(&options.page)?;
    let query: TargetQuery = options.target.parse()?;
    let node = page.find(&query)?;
    let path = page.resolve(node, config.sibling_scan_limit);

    if path.is_empty() {
        eprintln!(
            "{} {} has no block hierarchy, nothing to render",
            style("⚠").yellow(),
            options.target
        );
        return Ok(());
    }

    let content = TooltipContent::from_path(&path, config.overlay.indent_step);
    println!("{}", content.to_html());
    Ok(())
}
