//! @acp:module "Page Scanner"
//! @acp:summary "Walks a directory of saved pages and summarizes their markers"
//! @acp:domain markers
//! @acp:layer service
//!
//! Pages are parsed in parallel; each page gets its own document and
//! index, nothing is shared between workers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use glob::Pattern;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::marker::{is_opening_marker, MarkerKind};
use crate::page::Page;

/// @acp:summary "Marker statistics for one page"
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub path: String,
    pub nodes: usize,
    /// Opening marker comments found anywhere under `<body>`
    pub markers: usize,
    /// Elements that received a marker in the index
    pub mapped_elements: usize,
    pub blocks: usize,
    pub containers: usize,
    /// Longest hierarchy path over all mapped elements
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedPage {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub root: String,
    pub pages: Vec<PageSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedPage>,
}

impl ScanReport {
    pub fn total_markers(&self) -> usize {
        self.pages.iter().map(|p| p.markers).sum()
    }

    pub fn total_mapped(&self) -> usize {
        self.pages.iter().map(|p| p.mapped_elements).sum()
    }
}

/// @acp:summary "Directory scanner driven by config include/exclude globs"
pub struct Scanner {
    config: Config,
}

impl Scanner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// @acp:summary "Scan every matching page below `root`"
    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<ScanReport> {
        let root = root.as_ref();
        let files = self.find_files(root)?;
        tracing::info!(files = files.len(), root = %root.display(), "Scanning pages");

        let limit = self.config.sibling_scan_limit;
        let results: Vec<_> = files
            .par_iter()
            .map(|path| summarize(path, root, limit))
            .collect();

        let mut pages = Vec::new();
        let mut skipped = Vec::new();
        for result in results {
            match result {
                Ok(summary) => pages.push(summary),
                Err(skip) => {
                    tracing::warn!(path = %skip.path, reason = %skip.reason, "Skipped page");
                    skipped.push(skip);
                }
            }
        }
        pages.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(ScanReport {
            generated_at: Utc::now(),
            root: root.to_string_lossy().to_string(),
            pages,
            skipped,
        })
    }

    /// Files below `root` matching at least one include and no exclude pattern
    pub fn find_files<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        let include_patterns: Vec<_> = self
            .config
            .include
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        let exclude_patterns: Vec<_> = self
            .config
            .exclude
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        let match_opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let relative = relative_path(e.path(), root);
                let included = include_patterns.is_empty()
                    || include_patterns.iter().any(|p| p.matches_with(&relative, match_opts));
                let excluded = exclude_patterns.iter().any(|p| p.matches_with(&relative, match_opts));
                included && !excluded
            })
            .map(|e| e.into_path())
            .collect();

        files.sort();
        Ok(files)
    }
}

fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

fn summarize(path: &Path, root: &Path, sibling_scan_limit: usize) -> std::result::Result<PageSummary, SkippedPage> {
    let relative = relative_path(path, root);
    let page = Page::load(path).map_err(|e| SkippedPage {
        path: relative.clone(),
        reason: e.to_string(),
    })?;

    let document = page.document();
    let index = page.index();
    let markers = document
        .comments_under(document.boundary())
        .filter(|(_, text)| is_opening_marker(text))
        .count();

    let resolver = page.resolver(sibling_scan_limit);
    let max_depth = index
        .iter()
        .map(|(node, _)| resolver.resolve(node).len())
        .max()
        .unwrap_or(0);

    Ok(PageSummary {
        path: relative,
        nodes: document.len(),
        markers,
        mapped_elements: index.len(),
        blocks: index.count_kind(MarkerKind::Block),
        containers: index.count_kind(MarkerKind::Container),
        max_depth,
    })
}
