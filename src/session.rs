//! @acp:module "Session"
//! @acp:summary "Single-threaded dispatcher tying router, controller and timers"
//! @acp:domain input
//! @acp:layer service
//!
//! Events are handled one at a time, each to completion. The only timed
//! work is banner dismissal: a timer firing for a banner that has since
//! been replaced does nothing.

use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::geometry::Size;
use crate::input::{InputEvent, InputRouter, Routed};
use crate::overlay::{ControllerOptions, OverlayController};
use crate::page::Page;
use crate::surface::{BannerId, HeadlessSurface, Surface, TextMetrics};

#[derive(Debug, Clone, Copy)]
struct PendingDismissal {
    due: Duration,
    banner: BannerId,
}

/// @acp:summary "Inspector session over one page"
pub struct Session<S: Surface> {
    router: InputRouter,
    controller: OverlayController<S>,
    timers: Vec<PendingDismissal>,
    now: Duration,
}

impl<S: Surface> Session<S> {
    pub fn new(router: InputRouter, controller: OverlayController<S>) -> Self {
        Self {
            router,
            controller,
            timers: Vec::new(),
            now: Duration::ZERO,
        }
    }

    pub fn from_config(page: Page, surface: S, config: &Config) -> Result<Self> {
        let router = InputRouter::from_config(&config.keys)?;
        let options = ControllerOptions::from_config(config)?;
        Ok(Self::new(router, OverlayController::new(page, surface, options)))
    }

    pub fn controller(&self) -> &OverlayController<S> {
        &self.controller
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// @acp:summary "Fire due timers, then route and apply one event"
    pub fn handle(&mut self, event: &InputEvent, now: Duration) -> Routed {
        self.advance(now);

        let routed = self.router.route(event, self.controller.is_dragging());
        for action in &routed.actions {
            if let Some(ticket) = self.controller.apply(*action) {
                self.timers.push(PendingDismissal {
                    due: self.now + ticket.dismiss_after,
                    banner: ticket.banner,
                });
            }
        }
        routed
    }

    /// Move the clock forward, firing every timer due by `now`
    pub fn advance(&mut self, now: Duration) {
        self.now = self.now.max(now);
        let now = self.now;

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due <= now);
        self.timers = pending;

        for timer in due {
            if !self.controller.dismiss_banner(timer.banner) {
                tracing::debug!(banner = timer.banner.0, "Banner already replaced");
            }
        }
    }
}

impl Session<HeadlessSurface> {
    /// Session drawing into a [`HeadlessSurface`] sized from config
    pub fn headless(page: Page, config: &Config) -> Result<Self> {
        let viewport = Size::new(config.viewport.width, config.viewport.height);
        let metrics = TextMetrics {
            line_height: config.overlay.line_height,
            glyph_width: config.overlay.glyph_width,
            padding: config.overlay.padding,
        };
        Self::from_config(page, HeadlessSurface::with_metrics(viewport, metrics), config)
    }
}
