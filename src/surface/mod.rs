//! @acp:module "Rendering Surface"
//! @acp:summary "Seam between the overlay controller and whatever draws it"
//! @acp:domain overlay
//! @acp:layer adapter
//!
//! The controller only talks to [`Surface`]. Every removal on the trait
//! must accept an id that is already gone.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::dom::NodeId;
use crate::geometry::{Point, Rect, Size};
use crate::render::TooltipContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OverlayId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HintId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BannerId(pub u64);

/// How an overlay is anchored on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    /// Follows the pointer
    Absolute,
    /// Frozen in the viewport
    Fixed,
}

/// @acp:summary "Drawing operations used by the overlay controller"
pub trait Surface {
    fn viewport(&self) -> Size;

    /// Insert a new overlay; it is not positioned until [`Surface::place_overlay`]
    fn mount_overlay(&mut self, content: TooltipContent) -> OverlayId;

    /// Current on-screen rectangle, `None` once removed
    fn overlay_rect(&self, id: OverlayId) -> Option<Rect>;

    fn place_overlay(&mut self, id: OverlayId, top_left: Point);

    /// Switch to fixed positioning at `rect` and mark as pinned
    fn fix_overlay(&mut self, id: OverlayId, rect: Rect);

    fn attach_drag_handle(&mut self, id: OverlayId);

    fn remove_overlay(&mut self, id: OverlayId);

    fn highlight(&mut self, element: NodeId);

    fn clear_highlights(&mut self);

    fn show_pin_hint(&mut self, text: &str, at: Point) -> HintId;

    fn remove_pin_hint(&mut self, id: HintId);

    fn show_banner(&mut self, text: &str) -> BannerId;

    fn remove_banner(&mut self, id: BannerId);

    /// Document-level pointer move/up listeners used while dragging
    fn attach_drag_listeners(&mut self);

    fn detach_drag_listeners(&mut self);
}

/// Character-cell metrics for headless measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub line_height: f32,
    pub glyph_width: f32,
    pub padding: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            line_height: 18.0,
            glyph_width: 7.0,
            padding: 12.0,
        }
    }
}

impl TextMetrics {
    pub fn measure(&self, content: &TooltipContent) -> Size {
        let mut lines = 0usize;
        let mut widest = 0f32;
        for (indent, text) in content.lines() {
            lines += 1;
            let width = indent as f32 + text.chars().count() as f32 * self.glyph_width;
            widest = widest.max(width);
        }
        Size::new(
            widest + self.padding * 2.0,
            lines as f32 * self.line_height + self.padding * 2.0,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayRecord {
    pub id: OverlayId,
    pub rect: Rect,
    pub positioning: Positioning,
    pub pinned: bool,
    pub drag_handle: bool,
    pub content: TooltipContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct HintRecord {
    pub id: HintId,
    pub text: String,
    pub at: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerRecord {
    pub id: BannerId,
    pub text: String,
}

/// @acp:summary "In-memory surface for tests and scripted replay"
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    viewport: Size,
    metrics: TextMetrics,
    next_id: u64,
    overlays: BTreeMap<OverlayId, OverlayRecord>,
    highlighted: BTreeSet<NodeId>,
    hints: BTreeMap<HintId, HintRecord>,
    banners: BTreeMap<BannerId, BannerRecord>,
    drag_listeners: bool,
}

/// Serializable view of everything currently on a [`HeadlessSurface`]
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceSnapshot {
    pub viewport: Size,
    pub overlays: Vec<OverlayRecord>,
    pub highlighted: Vec<NodeId>,
    pub pin_hints: Vec<HintRecord>,
    pub banners: Vec<BannerRecord>,
    pub drag_listeners: bool,
}

impl HeadlessSurface {
    pub fn new(viewport: Size) -> Self {
        Self::with_metrics(viewport, TextMetrics::default())
    }

    pub fn with_metrics(viewport: Size, metrics: TextMetrics) -> Self {
        Self {
            viewport,
            metrics,
            next_id: 1,
            overlays: BTreeMap::new(),
            highlighted: BTreeSet::new(),
            hints: BTreeMap::new(),
            banners: BTreeMap::new(),
            drag_listeners: false,
        }
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlayRecord> {
        self.overlays.values()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&OverlayRecord> {
        self.overlays.get(&id)
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn highlighted(&self) -> Vec<NodeId> {
        self.highlighted.iter().copied().collect()
    }

    pub fn pin_hints(&self) -> impl Iterator<Item = &HintRecord> {
        self.hints.values()
    }

    pub fn banners(&self) -> impl Iterator<Item = &BannerRecord> {
        self.banners.values()
    }

    pub fn drag_listeners_attached(&self) -> bool {
        self.drag_listeners
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            viewport: self.viewport,
            overlays: self.overlays.values().cloned().collect(),
            highlighted: self.highlighted(),
            pin_hints: self.hints.values().cloned().collect(),
            banners: self.banners.values().cloned().collect(),
            drag_listeners: self.drag_listeners,
        }
    }
}

impl Surface for HeadlessSurface {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn mount_overlay(&mut self, content: TooltipContent) -> OverlayId {
        let id = OverlayId(self.allocate());
        let size = self.metrics.measure(&content);
        self.overlays.insert(
            id,
            OverlayRecord {
                id,
                rect: Rect::new(Point::ZERO, size),
                positioning: Positioning::Absolute,
                pinned: false,
                drag_handle: false,
                content,
            },
        );
        id
    }

    fn overlay_rect(&self, id: OverlayId) -> Option<Rect> {
        self.overlays.get(&id).map(|o| o.rect)
    }

    fn place_overlay(&mut self, id: OverlayId, top_left: Point) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.rect = overlay.rect.with_origin(top_left);
        }
    }

    fn fix_overlay(&mut self, id: OverlayId, rect: Rect) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.rect = rect;
            overlay.positioning = Positioning::Fixed;
            overlay.pinned = true;
        }
    }

    fn attach_drag_handle(&mut self, id: OverlayId) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.drag_handle = true;
        }
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(&id);
    }

    fn highlight(&mut self, element: NodeId) {
        self.highlighted.insert(element);
    }

    fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    fn show_pin_hint(&mut self, text: &str, at: Point) -> HintId {
        let id = HintId(self.allocate());
        self.hints.insert(
            id,
            HintRecord {
                id,
                text: text.to_string(),
                at,
            },
        );
        id
    }

    fn remove_pin_hint(&mut self, id: HintId) {
        self.hints.remove(&id);
    }

    fn show_banner(&mut self, text: &str) -> BannerId {
        let id = BannerId(self.allocate());
        self.banners.insert(
            id,
            BannerRecord {
                id,
                text: text.to_string(),
            },
        );
        id
    }

    fn remove_banner(&mut self, id: BannerId) {
        self.banners.remove(&id);
    }

    fn attach_drag_listeners(&mut self) {
        self.drag_listeners = true;
    }

    fn detach_drag_listeners(&mut self) {
        self.drag_listeners = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{TooltipField, TooltipItem};
    use crate::marker::MarkerKind;

    fn content() -> TooltipContent {
        TooltipContent {
            items: vec![TooltipItem {
                kind: MarkerKind::Block,
                level: 1,
                indent_px: 0,
                heading: "BLOCK - Level 1".to_string(),
                fields: vec![TooltipField {
                    label: "Name",
                    class: "block-name",
                    value: "header".to_string(),
                }],
            }],
            close_label: "✕",
        }
    }

    #[test]
    fn test_measure() {
        let metrics = TextMetrics {
            line_height: 10.0,
            glyph_width: 2.0,
            padding: 1.0,
        };
        // "BLOCK - Level 1" is 15 chars, "Name: header" is 12
        assert_eq!(metrics.measure(&content()), Size::new(32.0, 22.0));
    }

    #[test]
    fn test_removals_are_idempotent() {
        let mut surface = HeadlessSurface::new(Size::new(800.0, 600.0));
        let overlay = surface.mount_overlay(content());
        let hint = surface.show_pin_hint("pin", Point::ZERO);
        let banner = surface.show_banner("on");

        surface.remove_overlay(overlay);
        surface.remove_overlay(overlay);
        surface.remove_pin_hint(hint);
        surface.remove_pin_hint(hint);
        surface.remove_banner(banner);
        surface.remove_banner(banner);
        surface.detach_drag_listeners();

        assert_eq!(surface.overlay_count(), 0);
        assert_eq!(surface.pin_hints().count(), 0);
        assert_eq!(surface.banners().count(), 0);
        assert_eq!(surface.overlay_rect(overlay), None);
    }

    #[test]
    fn test_fix_overlay_pins() {
        let mut surface = HeadlessSurface::new(Size::new(800.0, 600.0));
        let overlay = surface.mount_overlay(content());
        let rect = Rect::from_xywh(40.0, 50.0, 100.0, 60.0);
        surface.fix_overlay(overlay, rect);

        let record = surface.overlay(overlay).unwrap();
        assert_eq!(record.positioning, Positioning::Fixed);
        assert!(record.pinned);
        assert_eq!(record.rect, rect);
    }
}
