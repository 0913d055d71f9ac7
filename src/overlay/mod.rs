//! @acp:module "Overlay Controller"
//! @acp:summary "Owns the single live tooltip and drives Idle/Following/Pinned"
//! @acp:domain overlay
//! @acp:layer service
//!
//! All mutable inspector state lives in [`OverlayController`] and changes
//! only through its transition methods. At most one overlay exists at a
//! time; it exists exactly when the state is not [`OverlayState::Idle`].

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::dom::NodeId;
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::hierarchy::{HierarchyPath, DEFAULT_SIBLING_SCAN_LIMIT};
use crate::input::{Action, KeyChord};
use crate::page::Page;
use crate::render::TooltipContent;
use crate::surface::{BannerId, HintId, OverlayId, Surface};

pub const BANNER_ON: &str = "✓ Block Inspector ON - Hover over elements to inspect";
pub const BANNER_OFF: &str = "✗ Block Inspector OFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayState {
    Idle,
    Following,
    Pinned,
}

/// @acp:summary "Tunables for placement, rendering and resolution"
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub sibling_scan_limit: usize,
    pub pointer_margin: f32,
    pub indent_step: u32,
    pub pin_hint_offset: Point,
    pub pin_hint_text: String,
    pub banner_dismiss_after: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            sibling_scan_limit: DEFAULT_SIBLING_SCAN_LIMIT,
            pointer_margin: 10.0,
            indent_step: 16,
            pin_hint_offset: Point::new(15.0, -35.0),
            pin_hint_text: "Press Shift+A to pin".to_string(),
            banner_dismiss_after: Duration::from_millis(2000),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        let pin_chord: KeyChord = config.keys.toggle_pin.parse()?;
        let [dx, dy] = config.overlay.pin_hint_offset;
        Ok(Self {
            sibling_scan_limit: config.sibling_scan_limit,
            pointer_margin: config.overlay.pointer_margin,
            indent_step: config.overlay.indent_step,
            pin_hint_offset: Point::new(dx, dy),
            pin_hint_text: format!("Press {} to pin", pin_chord),
            banner_dismiss_after: Duration::from_millis(config.banner.dismiss_after_ms),
        })
    }
}

/// Handed back when a banner is shown; pass it to
/// [`OverlayController::dismiss_banner`] once `dismiss_after` elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerTicket {
    pub banner: BannerId,
    pub dismiss_after: Duration,
}

/// Top-left corner for a tooltip of `size` next to `pointer`: below-right
/// by `margin`, pulled left at the right edge, flipped above at the bottom
pub fn tooltip_position(pointer: Point, size: Size, viewport: Size, margin: f32) -> Point {
    let mut left = pointer.x + margin;
    let mut top = pointer.y + margin;

    if left + size.width > viewport.width {
        left = viewport.width - size.width - margin;
    }
    if top + size.height > viewport.height {
        top = pointer.y - size.height - margin;
    }
    Point::new(left, top)
}

#[derive(Debug)]
struct LiveOverlay {
    id: OverlayId,
    anchor: NodeId,
    path: HierarchyPath,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Following(LiveOverlay),
    Pinned {
        live: LiveOverlay,
        /// Pointer minus overlay top-left, set while a drag is active
        drag: Option<Point>,
    },
}

/// @acp:summary "Inspector overlay state machine"
pub struct OverlayController<S: Surface> {
    page: Page,
    surface: S,
    options: ControllerOptions,
    enabled: bool,
    phase: Phase,
    pin_hint: Option<HintId>,
    banner: Option<BannerId>,
}

impl<S: Surface> OverlayController<S> {
    pub fn new(page: Page, surface: S, options: ControllerOptions) -> Self {
        Self {
            page,
            surface,
            options,
            enabled: false,
            phase: Phase::Idle,
            pin_hint: None,
            banner: None,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn state(&self) -> OverlayState {
        match self.phase {
            Phase::Idle => OverlayState::Idle,
            Phase::Following(_) => OverlayState::Following,
            Phase::Pinned { .. } => OverlayState::Pinned,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Pinned { drag: Some(_), .. })
    }

    fn live(&self) -> Option<&LiveOverlay> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Following(live) | Phase::Pinned { live, .. } => Some(live),
        }
    }

    pub fn path(&self) -> Option<&HierarchyPath> {
        self.live().map(|l| &l.path)
    }

    /// Element that was hovered when the overlay content was built
    pub fn anchor(&self) -> Option<NodeId> {
        self.live().map(|l| l.anchor)
    }

    pub fn overlay_id(&self) -> Option<OverlayId> {
        self.live().map(|l| l.id)
    }

    pub fn overlay_rect(&self) -> Option<Rect> {
        self.overlay_id().and_then(|id| self.surface.overlay_rect(id))
    }

    pub fn pin_hint(&self) -> Option<HintId> {
        self.pin_hint
    }

    pub fn banner(&self) -> Option<BannerId> {
        self.banner
    }

    /// Apply one routed action; a ticket comes back when a banner was shown
    pub fn apply(&mut self, action: Action) -> Option<BannerTicket> {
        match action {
            Action::ToggleInspection => return Some(self.toggle_inspection()),
            Action::EnableInspection => self.enable_inspection(),
            Action::DisableInspection => self.disable_inspection(),
            Action::PointerMove { target, at } => self.pointer_move(target, at),
            Action::PointerLeave => self.pointer_leave(),
            Action::PinRequest => self.pin_request(),
            Action::Escape => self.escape(),
            Action::CloseButton => self.close_button(),
            Action::DragStart(at) => self.drag_start(at),
            Action::DragMove(at) => self.drag_move(at),
            Action::DragEnd => self.drag_end(),
        }
        None
    }

    /// Takes effect on the next pointer event
    pub fn enable_inspection(&mut self) {
        self.enabled = true;
        tracing::debug!("Inspection enabled");
    }

    /// Always ends in Idle with nothing left on screen
    pub fn disable_inspection(&mut self) {
        self.enabled = false;
        self.reset();
        tracing::debug!("Inspection disabled");
    }

    /// @acp:summary "Flip inspection and announce it with a banner"
    pub fn toggle_inspection(&mut self) -> BannerTicket {
        if self.enabled {
            self.disable_inspection();
        } else {
            self.enable_inspection();
        }

        if let Some(previous) = self.banner.take() {
            self.surface.remove_banner(previous);
        }
        let text = if self.enabled { BANNER_ON } else { BANNER_OFF };
        let banner = self.surface.show_banner(text);
        self.banner = Some(banner);

        BannerTicket {
            banner,
            dismiss_after: self.options.banner_dismiss_after,
        }
    }

    /// Remove `banner` if it is still the live one; false otherwise
    pub fn dismiss_banner(&mut self, banner: BannerId) -> bool {
        if self.banner != Some(banner) {
            return false;
        }
        self.banner = None;
        self.surface.remove_banner(banner);
        true
    }

    /// @acp:summary "Rebuild the overlay for the hovered element"
    pub fn pointer_move(&mut self, target: NodeId, pointer: Point) {
        if !self.enabled || matches!(self.phase, Phase::Pinned { .. }) {
            return;
        }

        let resolver = self.page.resolver(self.options.sibling_scan_limit);
        let path = resolver.resolve(target);
        let owner = path
            .leaf()
            .and_then(|leaf| resolver.owner_of(target, &leaf.key()));

        if path.is_empty() {
            if self.state() != OverlayState::Idle {
                tracing::debug!(node = %target, "No hierarchy under pointer");
            }
            self.reset();
            return;
        }

        self.surface.clear_highlights();
        if let Some(owner) = owner {
            self.surface.highlight(owner);
        }

        self.discard_overlay();
        let content = TooltipContent::from_path(&path, self.options.indent_step);
        let id = self.surface.mount_overlay(content);
        let size = self
            .surface
            .overlay_rect(id)
            .map(|r| r.size)
            .unwrap_or_default();
        let top_left = tooltip_position(
            pointer,
            size,
            self.surface.viewport(),
            self.options.pointer_margin,
        );
        self.surface.place_overlay(id, top_left);
        self.show_pin_hint(pointer);

        tracing::debug!(node = %target, depth = path.len(), "Following pointer");
        self.phase = Phase::Following(LiveOverlay {
            id,
            anchor: target,
            path,
        });
    }

    pub fn pointer_leave(&mut self) {
        if matches!(self.phase, Phase::Pinned { .. }) {
            return;
        }
        self.reset();
    }

    /// Pins a following overlay, or unpins a pinned one
    pub fn pin_request(&mut self) {
        match self.state() {
            OverlayState::Idle => {}
            OverlayState::Following => self.pin(),
            OverlayState::Pinned => self.unpin(),
        }
    }

    pub fn escape(&mut self) {
        if matches!(self.phase, Phase::Pinned { .. }) {
            self.unpin();
        }
    }

    pub fn close_button(&mut self) {
        if matches!(self.phase, Phase::Pinned { .. }) {
            self.unpin();
        }
    }

    /// Only honoured while pinned; `pointer` is where the handle was pressed
    pub fn drag_start(&mut self, pointer: Point) {
        let Phase::Pinned { live, drag } = &mut self.phase else {
            return;
        };
        let Some(rect) = self.surface.overlay_rect(live.id) else {
            return;
        };
        if drag.is_none() {
            self.surface.attach_drag_listeners();
        }
        *drag = Some(pointer - rect.origin);
        tracing::debug!(x = pointer.x, y = pointer.y, "Drag started");
    }

    pub fn drag_move(&mut self, pointer: Point) {
        if let Phase::Pinned {
            live,
            drag: Some(offset),
        } = &self.phase
        {
            self.surface.place_overlay(live.id, pointer - *offset);
        }
    }

    pub fn drag_end(&mut self) {
        if let Phase::Pinned { drag, .. } = &mut self.phase {
            if drag.take().is_some() {
                self.surface.detach_drag_listeners();
                tracing::debug!("Drag ended");
            }
        }
    }

    fn pin(&mut self) {
        let Phase::Following(live) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };
        let Some(rect) = self.surface.overlay_rect(live.id) else {
            self.reset();
            return;
        };

        self.surface.fix_overlay(live.id, rect);
        self.hide_pin_hint();
        self.surface.attach_drag_handle(live.id);

        tracing::debug!(x = rect.min_x(), y = rect.min_y(), "Overlay pinned");
        self.phase = Phase::Pinned { live, drag: None };
    }

    fn unpin(&mut self) {
        self.reset();
        tracing::debug!("Overlay unpinned");
    }

    /// Tear down the live overlay (and any drag on it); phase becomes Idle
    fn discard_overlay(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Following(live) => self.surface.remove_overlay(live.id),
            Phase::Pinned { live, drag } => {
                if drag.is_some() {
                    self.surface.detach_drag_listeners();
                }
                self.surface.remove_overlay(live.id);
            }
        }
    }

    /// Overlay, highlight and pin hint all gone
    fn reset(&mut self) {
        self.discard_overlay();
        self.surface.clear_highlights();
        self.hide_pin_hint();
    }

    fn show_pin_hint(&mut self, pointer: Point) {
        self.hide_pin_hint();
        let at = pointer + self.options.pin_hint_offset;
        let hint = self.surface.show_pin_hint(&self.options.pin_hint_text, at);
        self.pin_hint = Some(hint);
    }

    fn hide_pin_hint(&mut self) {
        if let Some(hint) = self.pin_hint.take() {
            self.surface.remove_pin_hint(hint);
        }
    }
}
