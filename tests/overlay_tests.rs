//! Overlay controller and session integration tests
//!
//! Everything runs against `HeadlessSurface`, which records exactly what a
//! browser surface would be asked to draw.

use std::time::Duration;

use pretty_assertions::assert_eq;

use block_inspector::overlay::{BANNER_OFF, BANNER_ON};
use block_inspector::render::HIGHLIGHT_CLASS;
use block_inspector::surface::Positioning;
use block_inspector::{
    Config, ControllerOptions, HeadlessSurface, InputEvent, KeyPress, NodeId, OverlayController,
    OverlayState, Page, Point, Session, Size, TargetQuery,
};

const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
    <p id="plain">no markers here</p>
    <!-- CONTAINER NAME: root -->
    <div id="root">
        <!-- BLOCK NAME: content BLOCK CLASS: Vendor\Cms\Block\Page -->
        <section id="content">
            <span id="leaf">hello</span>
        </section>
        <div>
            <!-- BLOCK NAME: promo -->
            <aside>sale</aside>
            <em id="after-promo">later</em>
        </div>
    </div>
</body></html>"#;

fn controller() -> OverlayController<HeadlessSurface> {
    let page = Page::parse(PAGE).unwrap();
    OverlayController::new(
        page,
        HeadlessSurface::new(Size::new(1280.0, 800.0)),
        ControllerOptions::default(),
    )
}

fn node<S: block_inspector::Surface>(c: &OverlayController<S>, query: &str) -> NodeId {
    c.page().find(&query.parse::<TargetQuery>().unwrap()).unwrap()
}

fn assert_clean_idle(c: &OverlayController<HeadlessSurface>) {
    assert_eq!(c.state(), OverlayState::Idle);
    assert_eq!(c.surface().overlay_count(), 0);
    assert!(c.surface().highlighted().is_empty());
    assert_eq!(c.surface().pin_hints().count(), 0);
    assert!(!c.surface().drag_listeners_attached());
    assert!(c.pin_hint().is_none());
    assert!(c.path().is_none());
}

/// Enabled controller following the pointer over `#leaf` at (100, 100)
fn following() -> OverlayController<HeadlessSurface> {
    let mut c = controller();
    c.enable_inspection();
    let leaf = node(&c, "#leaf");
    c.pointer_move(leaf, Point::new(100.0, 100.0));
    c
}

fn pinned() -> OverlayController<HeadlessSurface> {
    let mut c = following();
    c.pin_request();
    c
}

// =============================================================================
// Following
// =============================================================================

mod following_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_disabled_ignores_pointer() {
        let mut c = controller();
        let leaf = node(&c, "#leaf");
        c.pointer_move(leaf, Point::new(100.0, 100.0));
        assert_clean_idle(&c);
    }

    #[test]
    fn test_hover_builds_overlay_highlight_and_hint() {
        let c = following();

        assert_eq!(c.state(), OverlayState::Following);
        assert_eq!(c.path().unwrap().names(), vec!["root", "content"]);
        assert_eq!(c.surface().overlay_count(), 1);
        assert_eq!(c.surface().highlighted(), vec![node(&c, "#content")]);

        let hints: Vec<_> = c.surface().pin_hints().collect();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].text, "Press Shift+A to pin");
        assert_eq!(hints[0].at, Point::new(115.0, 65.0));

        let rect = c.overlay_rect().unwrap();
        assert_eq!(rect.origin, Point::new(110.0, 110.0));
    }

    #[test]
    fn test_hover_replaces_single_overlay() {
        let mut c = following();
        let first = c.overlay_id().unwrap();

        let root = node(&c, "#root");
        c.pointer_move(root, Point::new(300.0, 200.0));

        assert_eq!(c.surface().overlay_count(), 1);
        assert_ne!(c.overlay_id().unwrap(), first);
        assert!(c.surface().overlay(first).is_none());
        assert_eq!(c.path().unwrap().names(), vec!["root"]);
        assert_eq!(c.surface().pin_hints().count(), 1);
    }

    #[test]
    fn test_unmarked_target_tears_everything_down() {
        let mut c = following();
        let plain = node(&c, "#plain");
        c.pointer_move(plain, Point::new(50.0, 50.0));

        assert_clean_idle(&c);
        assert!(c.is_enabled());
    }

    #[test]
    fn test_sibling_only_leaf_is_not_highlighted() {
        let mut c = controller();
        c.enable_inspection();
        let after = node(&c, "#after-promo");
        c.pointer_move(after, Point::new(10.0, 10.0));

        // the wrapper <div> also picks up the `content` comment before <section>
        assert_eq!(c.path().unwrap().names(), vec!["root", "content", "promo"]);
        assert!(c.surface().highlighted().is_empty());
    }

    #[test]
    fn test_pointer_leave_clears() {
        let mut c = following();
        c.pointer_leave();
        assert_clean_idle(&c);
    }

    #[test]
    fn test_tooltip_flips_near_viewport_corner() {
        let mut c = controller();
        c.enable_inspection();
        let leaf = node(&c, "#leaf");
        c.pointer_move(leaf, Point::new(1270.0, 790.0));

        let rect = c.overlay_rect().unwrap();
        assert!(rect.max_x() <= 1280.0 - 10.0 + f32::EPSILON);
        assert!(rect.max_y() <= 790.0);
    }
}

// =============================================================================
// Pinning
// =============================================================================

mod pinned_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pin_freezes_overlay() {
        let c = pinned();
        let record = c.surface().overlay(c.overlay_id().unwrap()).unwrap();

        assert_eq!(c.state(), OverlayState::Pinned);
        assert!(record.pinned);
        assert!(record.drag_handle);
        assert_eq!(record.positioning, Positioning::Fixed);
        assert_eq!(c.surface().pin_hints().count(), 0);
    }

    #[test]
    fn test_pointer_move_while_pinned_changes_nothing() {
        let mut c = pinned();
        let id = c.overlay_id().unwrap();
        let rect = c.overlay_rect().unwrap();
        let content = c.surface().overlay(id).unwrap().content.clone();

        let root = node(&c, "#root");
        let plain = node(&c, "#plain");
        for (target, at) in [(root, (400.0, 300.0)), (plain, (5.0, 5.0)), (root, (900.0, 20.0))] {
            c.pointer_move(target, Point::new(at.0, at.1));
        }
        c.pointer_leave();

        assert_eq!(c.state(), OverlayState::Pinned);
        assert_eq!(c.overlay_id(), Some(id));
        assert_eq!(c.overlay_rect(), Some(rect));
        assert_eq!(c.surface().overlay(id).unwrap().content, content);
    }

    #[test]
    fn test_every_unpin_route_clears_everything() {
        let unpins: [fn(&mut OverlayController<HeadlessSurface>); 3] = [
            |c| c.pin_request(),
            |c| c.escape(),
            |c| c.close_button(),
        ];
        for unpin in unpins {
            let mut c = pinned();
            unpin(&mut c);
            assert_clean_idle(&c);
            assert!(c.is_enabled());
        }
    }

    #[test]
    fn test_pin_request_when_idle_is_noop() {
        let mut c = controller();
        c.enable_inspection();
        c.pin_request();
        assert_clean_idle(&c);
    }

    #[test]
    fn test_escape_and_close_ignored_while_following() {
        let mut c = following();
        c.escape();
        c.close_button();
        assert_eq!(c.state(), OverlayState::Following);
        assert_eq!(c.surface().overlay_count(), 1);
    }

    #[test]
    fn test_hover_after_unpin_follows_again() {
        let mut c = pinned();
        c.escape();
        let leaf = node(&c, "#leaf");
        c.pointer_move(leaf, Point::new(20.0, 20.0));
        assert_eq!(c.state(), OverlayState::Following);
        assert_eq!(c.surface().overlay_count(), 1);
    }
}

// =============================================================================
// Dragging
// =============================================================================

mod drag_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut c = pinned();
        let start = c.overlay_rect().unwrap().origin;

        c.drag_start(Point::new(120.0, 115.0));
        assert!(c.is_dragging());
        assert!(c.surface().drag_listeners_attached());

        c.drag_move(Point::new(170.0, 135.0));
        assert_eq!(c.overlay_rect().unwrap().origin, start + Point::new(50.0, 20.0));

        c.drag_move(Point::new(100.0, 415.0));
        assert_eq!(c.overlay_rect().unwrap().origin, start + Point::new(-20.0, 300.0));

        c.drag_end();
        assert!(!c.is_dragging());
        assert!(!c.surface().drag_listeners_attached());

        let settled = c.overlay_rect().unwrap().origin;
        c.drag_move(Point::new(600.0, 600.0));
        assert_eq!(c.overlay_rect().unwrap().origin, settled);
    }

    #[test]
    fn test_drag_requires_pin() {
        let mut c = following();
        let before = c.overlay_rect();
        c.drag_start(Point::new(100.0, 100.0));
        c.drag_move(Point::new(200.0, 200.0));

        assert!(!c.is_dragging());
        assert!(!c.surface().drag_listeners_attached());
        assert_eq!(c.overlay_rect(), before);
    }

    #[test]
    fn test_unpin_mid_drag_detaches_listeners() {
        let mut c = pinned();
        c.drag_start(Point::new(120.0, 115.0));
        c.escape();
        assert_clean_idle(&c);
    }
}

// =============================================================================
// Inspection toggle
// =============================================================================

mod toggle_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_disable_from_every_state_resets() {
        let states: [fn() -> OverlayController<HeadlessSurface>; 3] =
            [controller, following, pinned];
        for make in states {
            let mut c = make();
            c.disable_inspection();
            assert_clean_idle(&c);
            assert!(!c.is_enabled());
        }

        let mut dragging = pinned();
        dragging.drag_start(Point::new(120.0, 115.0));
        dragging.disable_inspection();
        assert_clean_idle(&dragging);
    }

    #[test]
    fn test_toggle_shows_one_banner() {
        let mut c = controller();
        let on = c.toggle_inspection();
        assert!(c.is_enabled());

        let off = c.toggle_inspection();
        assert!(!c.is_enabled());
        assert_ne!(on.banner, off.banner);

        let banners: Vec<_> = c.surface().banners().map(|b| b.text.clone()).collect();
        assert_eq!(banners, vec![BANNER_OFF.to_string()]);

        // the first banner's timer must not remove the second
        assert!(!c.dismiss_banner(on.banner));
        assert_eq!(c.surface().banners().count(), 1);
        assert!(c.dismiss_banner(off.banner));
        assert_eq!(c.surface().banners().count(), 0);
    }

    #[test]
    fn test_highlight_class_name() {
        assert_eq!(HIGHLIGHT_CLASS, "magento-block-hovered");
    }
}

// =============================================================================
// Session
// =============================================================================

mod session_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> Session<HeadlessSurface> {
        Session::headless(Page::parse(PAGE).unwrap(), &Config::default()).unwrap()
    }

    fn hover(s: &Session<HeadlessSurface>, query: &str, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMove {
            target: node(s.controller(), query),
            x,
            y,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_reserved_chords_prevent_default() {
        let mut s = session();

        let routed = s.handle(&InputEvent::KeyDown(KeyPress::shifted("Z")), ms(0));
        assert!(routed.prevent_default);
        assert!(s.controller().is_enabled());

        let routed = s.handle(&InputEvent::KeyDown(KeyPress::new("z")), ms(5));
        assert!(!routed.prevent_default);
        assert!(routed.actions.is_empty());

        let routed = s.handle(&InputEvent::KeyDown(KeyPress::new("Escape")), ms(6));
        assert!(!routed.prevent_default);
    }

    #[test]
    fn test_banner_timer_fires_once_due() {
        let mut s = session();
        s.handle(&InputEvent::KeyDown(KeyPress::shifted("z")), ms(0));
        let texts: Vec<_> = s.controller().surface().banners().map(|b| b.text.clone()).collect();
        assert_eq!(texts, vec![BANNER_ON.to_string()]);

        s.advance(ms(1999));
        assert_eq!(s.controller().surface().banners().count(), 1);

        s.advance(ms(2000));
        assert_eq!(s.controller().surface().banners().count(), 0);
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn test_stale_timer_leaves_newer_banner() {
        let mut s = session();
        s.handle(&InputEvent::KeyDown(KeyPress::shifted("Z")), ms(0));
        s.handle(&InputEvent::KeyDown(KeyPress::shifted("Z")), ms(1500));

        // first timer fires at 2000 against a replaced banner
        s.advance(ms(2100));
        let texts: Vec<_> = s.controller().surface().banners().map(|b| b.text.clone()).collect();
        assert_eq!(texts, vec![BANNER_OFF.to_string()]);

        s.advance(ms(3500));
        assert_eq!(s.controller().surface().banners().count(), 0);
    }

    #[test]
    fn test_scripted_pin_and_drag() {
        let mut s = session();
        s.handle(&InputEvent::KeyDown(KeyPress::shifted("Z")), ms(0));
        let event = hover(&s, "#leaf", 100.0, 100.0);
        s.handle(&event, ms(10));
        s.handle(&InputEvent::KeyDown(KeyPress::shifted("A")), ms(20));
        assert_eq!(s.controller().state(), OverlayState::Pinned);

        let start = s.controller().overlay_rect().unwrap().origin;
        s.handle(&InputEvent::HandleDown { x: 115.0, y: 115.0 }, ms(30));
        let event = hover(&s, "#plain", 135.0, 145.0);
        s.handle(&event, ms(40));
        assert_eq!(
            s.controller().overlay_rect().unwrap().origin,
            start + Point::new(20.0, 30.0)
        );

        // released away from the overlay
        s.handle(&InputEvent::PointerUp { x: 900.0, y: 700.0 }, ms(50));
        assert!(!s.controller().is_dragging());
        assert!(!s.controller().surface().drag_listeners_attached());
        assert_eq!(s.controller().state(), OverlayState::Pinned);

        s.handle(&InputEvent::CloseClick, ms(60));
        assert_clean_idle(s.controller());
    }

    #[test]
    fn test_event_json_shape() {
        let event: InputEvent = serde_json::from_str(
            r#"{"type": "pointer_move", "target": 7, "x": 1.5, "y": 2}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InputEvent::PointerMove {
                target: NodeId(7),
                x: 1.5,
                y: 2.0
            }
        );

        let event: InputEvent =
            serde_json::from_str(r#"{"type": "key_down", "key": "A", "shift": true}"#).unwrap();
        assert_eq!(event, InputEvent::KeyDown(KeyPress::shifted("A")));
    }
}
