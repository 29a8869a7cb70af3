use std::time::{Duration, Instant};

use gallery_lightbox::config::LightboxConfig;
use gallery_lightbox::events::{Effect, PointerKind};
use gallery_lightbox::gallery::layout::GridLayout;
use gallery_lightbox::gallery::{GallerySet, ImageRef};
use gallery_lightbox::geometry::{Point, Viewport};
use gallery_lightbox::lightbox::state::{Direction, Phase, SessionOptions};
use gallery_lightbox::lightbox::{AlwaysReady, LightboxSession};

const CROSSFADE: Duration = Duration::from_millis(350);
const FULL_CLOSE: Duration = Duration::from_millis(380 + 150);

fn viewport() -> Viewport {
    Viewport::new(1280.0, 800.0)
}

fn session(options: SessionOptions, count: usize) -> LightboxSession {
    let mut grid = GridLayout::new(3, 16.0, 1280.0);
    let items = grid.place_all((0..count).map(|i| ImageRef::new(format!("img-{i}.jpg"), 1200, 800)));
    let mut s = LightboxSession::new(options, LightboxConfig::default());
    assert!(s.attach(GallerySet::from_items(items)));
    s
}

fn open_fully(s: &mut LightboxSession, index: usize, now: Instant) {
    s.open(index, viewport()).expect("open accepted");
    s.on_animation_frame(now);
    s.on_animation_frame(now);
    assert_eq!(s.phase(), Phase::Open);
}

#[test]
fn open_then_close_returns_to_closed_for_every_index() {
    for i in 0..5 {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 5);
        s.open(i, viewport()).unwrap();
        s.close(t0).unwrap();
        assert_eq!(s.phase(), Phase::Closing);
        assert!(s.scene().overlay_visible);

        // Frames queued by the open are stale now.
        s.on_animation_frame(t0);
        s.on_animation_frame(t0);
        assert_eq!(s.phase(), Phase::Closing);

        s.on_tick(t0 + FULL_CLOSE);
        assert_eq!(s.phase(), Phase::Closed, "index {i}");
        let scene = s.scene();
        assert!(!scene.overlay_visible);
        assert!(!scene.scroll_locked);
        assert!(scene.slots.iter().all(|slot| slot.opacity == 0.0));
        assert!(s.next_deadline().is_none());
        assert!(!s.wants_frames());
    }
}

#[test]
fn open_locks_scroll_and_close_releases_it() {
    let t0 = Instant::now();
    let mut s = session(SessionOptions::gallery(), 3);
    open_fully(&mut s, 1, t0);
    let effects = s.drain_effects();
    assert!(effects.contains(&Effect::DocumentScrollLock { locked: true }));
    assert!(effects.contains(&Effect::GlobalListeners { attached: true }));

    s.close(t0).unwrap();
    s.on_tick(t0 + FULL_CLOSE);
    let effects = s.drain_effects();
    assert!(effects.contains(&Effect::DocumentScrollLock { locked: false }));
    assert!(effects.contains(&Effect::GlobalListeners { attached: false }));
}

#[test]
fn navigate_previous_moves_back_one() {
    for i in 1..4 {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 5);
        open_fully(&mut s, i, t0);
        let nav = s.navigate(Direction::Previous, &AlwaysReady, t0).unwrap();
        assert_eq!((nav.from, nav.to), (i, i - 1));
        assert_eq!(s.state().current_index, i - 1);
    }
}

#[test]
fn previous_at_first_image_clamps_in_gallery_and_wraps_in_carousel() {
    let t0 = Instant::now();
    let mut gallery = session(SessionOptions::gallery(), 5);
    open_fully(&mut gallery, 0, t0);
    assert!(gallery.navigate(Direction::Previous, &AlwaysReady, t0).is_none());
    assert_eq!(gallery.state().current_index, 0);
    assert!(!gallery.state().is_navigating);

    let mut carousel = session(SessionOptions::carousel(), 5);
    open_fully(&mut carousel, 0, t0);
    let nav = carousel.navigate(Direction::Previous, &AlwaysReady, t0).unwrap();
    assert_eq!(nav.to, 4);
    assert_eq!(carousel.state().current_index, 4);
}

#[test]
fn zoom_is_always_cleared_by_close() {
    for toggles in 1..5 {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        open_fully(&mut s, 0, t0);
        for _ in 0..toggles {
            s.toggle_zoom(Point::new(100.0, 100.0), PointerKind::Mouse, t0);
        }
        s.close(t0).unwrap();
        assert!(!s.state().is_zoomed);

        // Whatever zoom step was still queued must not resurrect it.
        s.on_animation_frame(t0);
        s.on_tick(t0 + Duration::from_millis(300));
        s.on_tick(t0 + FULL_CLOSE);
        assert!(!s.state().is_zoomed, "after {toggles} toggles");
        assert_eq!(s.buffer().active().scale, 1.0);
        assert_eq!(s.phase(), Phase::Closed);
    }
}

#[test]
fn back_to_back_navigation_changes_index_once() {
    let t0 = Instant::now();
    let mut s = session(SessionOptions::gallery(), 5);
    open_fully(&mut s, 1, t0);
    assert!(s.navigate(Direction::Next, &AlwaysReady, t0).is_some());
    assert!(s.navigate(Direction::Next, &AlwaysReady, t0).is_none());
    assert_eq!(s.state().current_index, 2);

    s.on_tick(t0 + CROSSFADE);
    assert!(!s.state().is_navigating);
    assert!(s.navigate(Direction::Next, &AlwaysReady, t0 + CROSSFADE).is_some());
    assert_eq!(s.state().current_index, 3);
}

#[test]
fn five_images_step_to_the_end_and_clamp() {
    let mut now = Instant::now();
    let mut s = session(SessionOptions::gallery(), 5);
    open_fully(&mut s, 2, now);
    for expected in [3, 4] {
        s.navigate(Direction::Next, &AlwaysReady, now).unwrap();
        now += CROSSFADE;
        s.on_tick(now);
        assert_eq!(s.state().current_index, expected);
        assert!(!s.state().is_navigating);
    }
    assert!(s.navigate(Direction::Next, &AlwaysReady, now).is_none());
    assert_eq!(s.state().current_index, 4);
}

#[test]
fn crossfade_flips_the_active_slot_each_navigation() {
    let mut now = Instant::now();
    let mut s = session(SessionOptions::gallery(), 4);
    open_fully(&mut s, 0, now);
    let first = s.state().active_slot;
    s.navigate(Direction::Next, &AlwaysReady, now).unwrap();
    assert_eq!(s.state().active_slot, first.other());
    let scene = s.scene();
    assert_eq!(scene.active().opacity, 1.0);
    assert_eq!(scene.slot(first).opacity, 0.0);
    assert_eq!(scene.active().src.as_deref(), Some("img-1.jpg"));
    now += CROSSFADE;
    s.on_tick(now);
    s.navigate(Direction::Next, &AlwaysReady, now).unwrap();
    assert_eq!(s.state().active_slot, first);
}

#[test]
fn gallery_navigation_scrolls_background_smoothly() {
    let t0 = Instant::now();
    let mut s = session(SessionOptions::gallery(), 12);
    open_fully(&mut s, 2, t0);
    s.drain_effects();
    s.navigate(Direction::Next, &AlwaysReady, t0).unwrap();
    let target = s.gallery().get(3).unwrap().page_rect;
    let expected = (target.top + target.height / 2.0 - viewport().height / 2.0).max(0.0);
    assert!(s.drain_effects().contains(&Effect::ScrollBackground {
        top: expected,
        smooth: true,
    }));
    assert_eq!(s.viewport().scroll_top, expected);
}

#[test]
fn carousel_navigation_leaves_background_alone() {
    let t0 = Instant::now();
    let mut s = session(SessionOptions::carousel(), 4);
    open_fully(&mut s, 0, t0);
    s.drain_effects();
    s.navigate(Direction::Next, &AlwaysReady, t0).unwrap();
    assert!(
        !s.drain_effects()
            .iter()
            .any(|e| matches!(e, Effect::ScrollBackground { .. }))
    );
}

#[test]
fn close_during_pending_load_drops_the_crossfade() {
    let t0 = Instant::now();
    let mut s = session(SessionOptions::gallery(), 3);
    open_fully(&mut s, 0, t0);
    let nothing_ready = std::collections::HashSet::<String>::new();
    s.navigate(Direction::Next, &nothing_ready, t0).unwrap();
    assert!(s.state().is_navigating);
    s.close(t0).unwrap();
    s.on_image_settled("img-1.jpg", gallery_lightbox::events::LoadOutcome::Loaded, t0);
    s.on_tick(t0 + FULL_CLOSE);
    assert_eq!(s.phase(), Phase::Closed);
    assert!(!s.state().is_navigating);
}

#[test]
fn operations_on_a_closed_session_are_no_ops() {
    let t0 = Instant::now();
    let mut s = session(SessionOptions::gallery(), 3);
    assert!(s.close(t0).is_none());
    assert!(s.navigate(Direction::Next, &AlwaysReady, t0).is_none());
    assert!(s.toggle_zoom(Point::new(0.0, 0.0), PointerKind::Mouse, t0).is_none());
    assert!(!s.pointer_moved(Point::new(0.0, 0.0)));
    assert!(s.drain_effects().is_empty());
    assert_eq!(s.phase(), Phase::Closed);
}
