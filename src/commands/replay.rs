//! @acp:module "Replay Command"
//! @acp:summary "Drive a headless inspector session from a timed event script"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `block-inspector replay <page> <script.json>`. A script is a
//! JSON array of steps:
//!
//! ```json
//! [
//!   { "at_ms": 0,   "event": { "type": "key_down", "key": "Z", "shift": true } },
//!   { "at_ms": 40,  "event": { "type": "pointer_move", "target": "#logo", "x": 120, "y": 80 } },
//!   { "at_ms": 90,  "event": { "type": "key_down", "key": "A", "shift": true } }
//! ]
//! ```
//!
//! Targets use the same `#id` / `@node` / tag syntax as `resolve`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use console::style;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dom::{NodeId, TargetQuery};
use crate::geometry::Rect;
use crate::hierarchy::HierarchyPath;
use crate::input::{InputEvent, KeyPress};
use crate::overlay::OverlayState;
use crate::page::Page;
use crate::session::Session;
use crate::surface::SurfaceSnapshot;

/// Options for the replay command
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub page: PathBuf,
    pub script: PathBuf,
    /// Advance the clock to this time after the last step
    pub until_ms: Option<u64>,
    /// Output as JSON
    pub json: bool,
}

/// One timed step of a replay script
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    #[serde(default)]
    pub at_ms: u64,
    pub event: ScriptEvent,
}

/// [`InputEvent`] with element targets written as query strings
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    KeyDown(KeyPress),
    PointerMove { target: String, x: f32, y: f32 },
    PointerLeave,
    HandleDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    CloseClick,
}

impl ScriptEvent {
    fn into_event(self, page: &Page) -> crate::Result<InputEvent> {
        Ok(match self {
            ScriptEvent::KeyDown(key) => InputEvent::KeyDown(key),
            ScriptEvent::PointerMove { target, x, y } => {
                let query: TargetQuery = target.parse()?;
                InputEvent::PointerMove {
                    target: page.find(&query)?,
                    x,
                    y,
                }
            }
            ScriptEvent::PointerLeave => InputEvent::PointerLeave,
            ScriptEvent::HandleDown { x, y } => InputEvent::HandleDown { x, y },
            ScriptEvent::PointerUp { x, y } => InputEvent::PointerUp { x, y },
            ScriptEvent::CloseClick => InputEvent::CloseClick,
        })
    }
}

/// Final session state after a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySnapshot {
    pub steps: usize,
    /// Steps whose default handling the host would have suppressed
    pub prevented: usize,
    pub clock_ms: u64,
    pub enabled: bool,
    pub state: OverlayState,
    pub anchor: Option<NodeId>,
    pub path: Option<HierarchyPath>,
    pub overlay_rect: Option<Rect>,
    pub pending_timers: usize,
    pub surface: SurfaceSnapshot,
}

pub fn load_script<P: AsRef<Path>>(path: P) -> crate::Result<Vec<ScriptStep>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// @acp:summary "Run `steps` against a headless session over `page`"
pub fn run_script(
    page: Page,
    steps: Vec<ScriptStep>,
    config: &Config,
    until_ms: Option<u64>,
) -> crate::Result<ReplaySnapshot> {
    let mut session = Session::headless(page, config)?;
    let total = steps.len();
    let mut prevented = 0;

    for (i, step) in steps.into_iter().enumerate() {
        let event = step.event.into_event(session.controller().page())?;
        tracing::debug!(step = i, at_ms = step.at_ms, ?event, "Replaying");
        let routed = session.handle(&event, Duration::from_millis(step.at_ms));
        if routed.prevent_default {
            prevented += 1;
        }
    }

    if let Some(until) = until_ms {
        session.advance(Duration::from_millis(until));
    }

    let controller = session.controller();
    Ok(ReplaySnapshot {
        steps: total,
        prevented,
        clock_ms: session.now().as_millis() as u64,
        enabled: controller.is_enabled(),
        state: controller.state(),
        anchor: controller.anchor(),
        path: controller.path().cloned(),
        overlay_rect: controller.overlay_rect(),
        pending_timers: session.pending_timers(),
        surface: controller.surface().snapshot(),
    })
}

/// Execute the replay command
pub fn execute_replay(options: ReplayOptions, config: Config) -> Result<()> {
    let page = Page::load(&options.page)?;
    let steps = load_script(&options.script)?;
    let snapshot = run_script(page, steps, &config, options.until_ms)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "{} Replayed {} steps ({} reserved chords) up to {}ms",
        style("✓").green(),
        snapshot.steps,
        snapshot.prevented,
        snapshot.clock_ms
    );
    println!(
        "  Inspection: {}",
        if snapshot.enabled {
            style("on").green()
        } else {
            style("off").dim()
        }
    );
    println!("  State: {}", style(format!("{:?}", snapshot.state)).bold());

    if let Some(path) = &snapshot.path {
        println!("  Path: {}", path.names().join(" › "));
    }
    if let Some(rect) = snapshot.overlay_rect {
        println!(
            "  Overlay: {}x{} at ({}, {})",
            rect.size.width, rect.size.height, rect.origin.x, rect.origin.y
        );
    }
    if !snapshot.surface.highlighted.is_empty() {
        let nodes: Vec<String> = snapshot
            .surface
            .highlighted
            .iter()
            .map(|n| n.to_string())
            .collect();
        println!("  Highlighted: {}", nodes.join(", "));
    }
    for hint in &snapshot.surface.pin_hints {
        println!("  Pin hint: \"{}\" at ({}, {})", hint.text, hint.at.x, hint.at.y);
    }
    for banner in &snapshot.surface.banners {
        println!("  Banner: {}", banner.text);
    }

    Ok(())
}
