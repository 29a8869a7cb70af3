//! Full-screen lightbox session: open from a thumbnail, crossfade between
//! images, click-to-zoom, and shrink back on close.

pub mod buffer;
pub mod render;
pub mod schedule;
pub mod state;
pub mod zoom;

use std::collections::HashSet;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LightboxConfig;
use crate::events::{Effect, LoadOutcome, PointerKind};
use crate::gallery::{GalleryItem, GallerySet, ImageRef};
use crate::geometry::{Point, Rect, Viewport, fit_to_viewport};

use buffer::{DoubleBuffer, Transitions};
use render::Scene;
use schedule::{Ready, Scheduler};
use state::{Direction, Navigation, Phase, PhaseChange, SessionOptions, SessionState};
use zoom::ZoomController;

/// Answers whether an image is decoded and can be shown without waiting.
pub trait ImageReadiness {
    fn is_ready(&self, image: &ImageRef) -> bool;
}

/// Readiness for preloaded content.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ImageReadiness for AlwaysReady {
    fn is_ready(&self, _image: &ImageRef) -> bool {
        true
    }
}

impl ImageReadiness for HashSet<String> {
    fn is_ready(&self, image: &ImageRef) -> bool {
        self.contains(&image.src)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// First frame after open: the source rect has applied, enable transitions.
    OpenArm,
    /// Second frame: animate to the fitted rect.
    OpenExpand,
    /// Staged image is usable; start the crossfade.
    Crossfade,
    NavigationUnlock,
    /// Frame after the zoom origin was committed.
    ZoomScaleUp,
    ZoomOriginReset,
    CloseFade,
    CloseTeardown,
}

/// One lightbox over a [`GallerySet`].
///
/// All timing is driven from outside: [`LightboxSession::on_animation_frame`],
/// [`LightboxSession::on_tick`] and [`LightboxSession::on_image_settled`]
/// resume the scheduled phases. Every open creates a fresh session token;
/// navigation and zoom continuations run under child tokens, so closing or
/// re-opening drops anything still in flight.
#[derive(Debug)]
pub struct LightboxSession {
    options: SessionOptions,
    settings: LightboxConfig,
    gallery: GallerySet,
    attached: bool,
    viewport: Viewport,
    phase: Phase,
    current: usize,
    navigating: bool,
    buffer: DoubleBuffer,
    zoom: ZoomController,
    scheduler: Scheduler<Step>,
    session_token: CancellationToken,
    nav_token: CancellationToken,
    zoom_token: CancellationToken,
    effects: Vec<Effect>,
}

impl LightboxSession {
    pub fn new(options: SessionOptions, settings: LightboxConfig) -> Self {
        let zoom = ZoomController::new(
            settings.zoom_factor,
            settings.timings.zoom,
            settings.timings.pan,
        );
        let session_token = CancellationToken::new();
        let nav_token = session_token.child_token();
        let zoom_token = session_token.child_token();
        Self {
            options,
            settings,
            gallery: GallerySet::default(),
            attached: false,
            viewport: Viewport::default(),
            phase: Phase::Closed,
            current: 0,
            navigating: false,
            buffer: DoubleBuffer::new(),
            zoom,
            scheduler: Scheduler::new(),
            session_token,
            nav_token,
            zoom_token,
            effects: Vec::new(),
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn gallery(&self) -> &GallerySet {
        &self.gallery
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            is_open: matches!(self.phase, Phase::Opening | Phase::Open),
            current_index: self.current,
            active_slot: self.buffer.active_id(),
            is_zoomed: self.zoom.is_zoomed(),
            is_navigating: self.navigating,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn buffer(&self) -> &DoubleBuffer {
        &self.buffer
    }

    pub fn scene(&self) -> Scene {
        render::project(&self.state(), &self.buffer, self.settings.timings.fade_out)
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Replace the gallery snapshot. Fixed-content sessions accept only the
    /// first attach.
    pub fn attach(&mut self, gallery: GallerySet) -> bool {
        if self.attached && !self.options.lazy_source {
            warn!("ignoring re-attach on a fixed-content lightbox");
            return false;
        }
        debug!(images = gallery.len(), "lightbox attached");
        self.gallery = gallery;
        self.attached = true;
        if !self.gallery.is_empty() && self.current >= self.gallery.len() {
            self.current = self.gallery.len() - 1;
        }
        true
    }

    /// Append newly rendered items.
    pub fn extend(&mut self, items: impl IntoIterator<Item = GalleryItem>) -> bool {
        if !self.options.lazy_source {
            warn!("ignoring appended content on a fixed-content lightbox");
            return false;
        }
        self.gallery.extend(items);
        true
    }

    /// Expand `index` from its on-screen thumbnail into the overlay.
    ///
    /// Valid while closed, or while closing (the close is abandoned).
    pub fn open(&mut self, index: usize, viewport: Viewport) -> Option<PhaseChange> {
        if !matches!(self.phase, Phase::Closed | Phase::Closing) {
            return None;
        }
        let item = self.gallery.get(index)?.clone();
        let from = self.phase;

        self.session_token.cancel();
        self.session_token = CancellationToken::new();
        self.nav_token = self.session_token.child_token();
        self.zoom_token = self.session_token.child_token();

        self.viewport = viewport;
        self.current = index;
        self.navigating = false;
        self.zoom.force_reset(self.buffer.active_mut());

        let source = item.page_rect.translated(0.0, -viewport.scroll_top);
        self.buffer.show_in_a(item.image.clone(), source);
        self.effects.push(Effect::LoadImage { image: item.image });
        if from == Phase::Closed {
            self.effects.push(Effect::DocumentScrollLock { locked: true });
            self.effects.push(Effect::GlobalListeners { attached: true });
        }

        self.scheduler.after_frames(1, Step::OpenArm, &self.session_token);
        self.phase = Phase::Opening;
        info!(index, "lightbox opening");
        Some(PhaseChange {
            from,
            to: Phase::Opening,
        })
    }

    /// Shrink back to the current thumbnail, fade, then tear down.
    pub fn close(&mut self, now: Instant) -> Option<PhaseChange> {
        if !matches!(self.phase, Phase::Opening | Phase::Open) {
            return None;
        }
        let from = self.phase;
        self.session_token.cancel();
        self.session_token = CancellationToken::new();

        self.zoom.force_reset(self.buffer.active_mut());
        self.navigating = false;
        self.buffer.settle();

        let target = self
            .gallery
            .on_screen_rect(self.current, self.viewport.scroll_top)
            .unwrap_or(self.buffer.active().rect);
        let timings = self.settings.timings;
        let active = self.buffer.active_mut();
        active.transitions = Transitions {
            geometry: timings.shrink,
            opacity: timings.fade_out,
            transform: std::time::Duration::ZERO,
        };
        active.rect = target;

        self.scheduler
            .at(now + timings.shrink, Step::CloseFade, &self.session_token);
        self.phase = Phase::Closing;
        info!(index = self.current, "lightbox closing");
        Some(PhaseChange {
            from,
            to: Phase::Closing,
        })
    }

    /// Move one image in `direction`, crossfading once the target is usable.
    ///
    /// Dropped while a previous navigation is still in flight.
    pub fn navigate(
        &mut self,
        direction: Direction,
        images: &dyn ImageReadiness,
        now: Instant,
    ) -> Option<Navigation> {
        if self.phase != Phase::Open {
            return None;
        }
        if self.navigating {
            debug!(?direction, "navigation dropped: transition in flight");
            return None;
        }
        let to = direction.target(self.current, self.gallery.len(), self.options.wrap_navigation)?;
        let item = self.gallery.get(to)?.clone();
        let from = self.current;

        self.navigating = true;
        self.reset_zoom();

        if self.options.sync_background_scroll {
            let center = item.page_rect.top + item.page_rect.height / 2.0;
            let top = (center - self.viewport.height / 2.0).max(0.0);
            self.viewport.scroll_top = top;
            self.effects.push(Effect::ScrollBackground { top, smooth: true });
        }

        let rect = self.fitted(&item.image);
        self.buffer.stage(item.image.clone(), rect);
        self.current = to;
        self.nav_token = self.session_token.child_token();

        if !self.options.lazy_source || images.is_ready(&item.image) {
            self.begin_crossfade(now);
        } else {
            let src = item.image.src.clone();
            self.effects.push(Effect::LoadImage { image: item.image });
            self.scheduler.on_image(src, Step::Crossfade, &self.nav_token);
        }
        debug!(from, to, "lightbox navigating");
        Some(Navigation { from, to })
    }

    /// Toggle zoom around `pointer`. Returns the new zoom state.
    pub fn toggle_zoom(&mut self, pointer: Point, kind: PointerKind, now: Instant) -> Option<bool> {
        if self.phase != Phase::Open {
            return None;
        }
        if kind == PointerKind::Touch && self.options.suppress_touch_zoom {
            debug!("zoom suppressed for touch input");
            return None;
        }
        self.zoom_token.cancel();
        self.zoom_token = self.session_token.child_token();
        if self.zoom.is_zoomed() {
            self.zoom.zoom_out(self.buffer.active_mut());
            self.scheduler.at(
                now + self.zoom.zoom_duration(),
                Step::ZoomOriginReset,
                &self.zoom_token,
            );
            Some(false)
        } else {
            self.zoom.zoom_in(self.buffer.active_mut(), pointer);
            self.scheduler
                .after_frames(1, Step::ZoomScaleUp, &self.zoom_token);
            Some(true)
        }
    }

    /// Pan the zoomed image. Returns `false` when not zoomed.
    pub fn pointer_moved(&mut self, pointer: Point) -> bool {
        if self.phase != Phase::Open {
            return false;
        }
        self.zoom.pan(self.buffer.active_mut(), pointer)
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom.is_zoomed()
    }

    /// Track a viewport change; re-fits the image when open and unzoomed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        if self.phase != Phase::Open || self.zoom.is_zoomed() {
            return false;
        }
        let Some(image) = self.buffer.active().source.clone() else {
            return false;
        };
        let rect = self.fitted(&image);
        let active = self.buffer.active_mut();
        active.transitions.geometry = std::time::Duration::ZERO;
        active.rect = rect;
        true
    }

    /// One animation-frame callback.
    pub fn on_animation_frame(&mut self, now: Instant) {
        let ready = self.scheduler.frame(now);
        self.run(ready);
    }

    /// Fire every timer due at `now`, including follow-ups that became due.
    pub fn on_tick(&mut self, now: Instant) {
        loop {
            let ready = self.scheduler.due(now);
            if ready.is_empty() {
                break;
            }
            self.run(ready);
        }
    }

    /// An image finished loading; failures continue the same way.
    pub fn on_image_settled(&mut self, src: &str, outcome: LoadOutcome, now: Instant) {
        if outcome == LoadOutcome::Failed {
            warn!(src, "image failed to load; continuing");
        }
        let ready = self.scheduler.image_settled(src, now);
        self.run(ready);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn wants_frames(&self) -> bool {
        self.scheduler.wants_frames()
    }

    fn run(&mut self, ready: Vec<Ready<Step>>) {
        for Ready { step, token, at } in ready {
            if token.is_cancelled() {
                continue;
            }
            self.apply(step, at);
        }
    }

    fn apply(&mut self, step: Step, at: Instant) {
        let timings = self.settings.timings;
        match step {
            Step::OpenArm => {
                self.buffer.active_mut().transitions = Transitions {
                    geometry: timings.expand,
                    opacity: timings.expand,
                    transform: std::time::Duration::ZERO,
                };
                self.scheduler
                    .after_frames(1, Step::OpenExpand, &self.session_token);
            }
            Step::OpenExpand => {
                if let Some(image) = self.buffer.active().source.clone() {
                    let rect = self.fitted(&image);
                    self.buffer.active_mut().rect = rect;
                }
                self.phase = Phase::Open;
                info!(index = self.current, "lightbox open");
            }
            Step::Crossfade => self.begin_crossfade(at),
            Step::NavigationUnlock => {
                self.buffer.settle();
                if let Some(image) = self.buffer.active().source.clone() {
                    if !self.zoom.is_zoomed() {
                        let rect = self.fitted(&image);
                        self.buffer.active_mut().rect = rect;
                    }
                }
                self.navigating = false;
                debug!(index = self.current, "navigation settled");
            }
            Step::ZoomScaleUp => self.zoom.apply_scale(self.buffer.active_mut()),
            Step::ZoomOriginReset => self.zoom.reset_origin(self.buffer.active_mut()),
            Step::CloseFade => {
                self.buffer.active_mut().opacity = 0.0;
                self.scheduler
                    .at(at + timings.fade_out, Step::CloseTeardown, &self.session_token);
            }
            Step::CloseTeardown => self.teardown(),
        }
    }

    fn begin_crossfade(&mut self, at: Instant) {
        // Zoom may have been toggled on the outgoing image while loading.
        self.reset_zoom();
        self.buffer.crossfade(self.settings.timings.crossfade);
        self.scheduler.at(
            at + self.settings.timings.crossfade,
            Step::NavigationUnlock,
            &self.nav_token,
        );
    }

    fn reset_zoom(&mut self) {
        self.zoom_token.cancel();
        self.zoom_token = self.session_token.child_token();
        self.zoom.force_reset(self.buffer.active_mut());
    }

    fn teardown(&mut self) {
        self.session_token.cancel();
        self.buffer.park_all();
        self.phase = Phase::Closed;
        self.current = 0;
        self.navigating = false;
        self.zoom.force_reset(self.buffer.active_mut());
        self.effects
            .push(Effect::DocumentScrollLock { locked: false });
        self.effects
            .push(Effect::GlobalListeners { attached: false });
        info!("lightbox closed");
    }

    fn fitted(&self, image: &ImageRef) -> Rect {
        let aspect = image
            .aspect_ratio()
            .or(Some(self.settings.default_aspect_ratio));
        fit_to_viewport(aspect, self.viewport.width, self.viewport.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::gallery::layout::GridLayout;

    fn session(options: SessionOptions, count: usize) -> LightboxSession {
        let mut grid = GridLayout::new(3, 16.0, 1024.0);
        let items = grid.place_all((0..count).map(|i| ImageRef::new(format!("{i}.jpg"), 400, 300)));
        let mut s = LightboxSession::new(options, LightboxConfig::default());
        s.attach(GallerySet::from_items(items));
        s
    }

    fn opened(s: &mut LightboxSession, index: usize, t0: Instant) {
        s.open(index, Viewport::new(1024.0, 768.0)).unwrap();
        s.on_animation_frame(t0);
        s.on_animation_frame(t0);
        assert_eq!(s.phase(), Phase::Open);
    }

    #[test]
    fn open_starts_at_thumbnail_then_expands_after_two_frames() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        let thumb = s.gallery().on_screen_rect(1, 0.0).unwrap();
        s.open(1, Viewport::new(1024.0, 768.0)).unwrap();
        assert_eq!(s.phase(), Phase::Opening);
        assert_eq!(s.buffer().active().rect, thumb);
        assert_eq!(s.buffer().active().transitions, Transitions::NONE);

        s.on_animation_frame(t0);
        assert_eq!(s.buffer().active().rect, thumb);
        assert_eq!(s.buffer().active().transitions.geometry, Duration::from_millis(380));

        s.on_animation_frame(t0);
        assert_eq!(s.phase(), Phase::Open);
        assert_eq!(s.buffer().active().rect, Rect::new(0.0, 0.0, 1024.0, 768.0));
    }

    #[test]
    fn open_is_rejected_while_open_and_for_bad_index() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        assert!(s.open(7, Viewport::new(1024.0, 768.0)).is_none());
        opened(&mut s, 0, t0);
        assert!(s.open(1, Viewport::new(1024.0, 768.0)).is_none());
        assert_eq!(s.state().current_index, 0);
    }

    #[test]
    fn close_shrinks_then_fades_then_tears_down() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        opened(&mut s, 2, t0);
        s.drain_effects();
        let thumb = s.gallery().on_screen_rect(2, 0.0).unwrap();

        s.close(t0).unwrap();
        assert_eq!(s.buffer().active().rect, thumb);
        assert_eq!(s.buffer().active().opacity, 1.0);

        s.on_tick(t0 + Duration::from_millis(379));
        assert_eq!(s.buffer().active().opacity, 1.0);
        s.on_tick(t0 + Duration::from_millis(380));
        assert_eq!(s.buffer().active().opacity, 0.0);
        assert_eq!(s.phase(), Phase::Closing);

        s.on_tick(t0 + Duration::from_millis(530));
        assert_eq!(s.phase(), Phase::Closed);
        assert!(!s.scene().overlay_visible);
        assert_eq!(s.buffer().active().rect, Rect::OFFSCREEN);
        assert_eq!(
            s.drain_effects(),
            vec![
                Effect::DocumentScrollLock { locked: false },
                Effect::GlobalListeners { attached: false },
            ]
        );
    }

    #[test]
    fn reopen_during_close_cancels_teardown() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        opened(&mut s, 0, t0);
        s.close(t0).unwrap();
        s.on_tick(t0 + Duration::from_millis(100));
        let change = s.open(1, Viewport::new(1024.0, 768.0)).unwrap();
        assert_eq!(change.from, Phase::Closing);
        s.on_tick(t0 + Duration::from_secs(5));
        assert_eq!(s.phase(), Phase::Opening);
        assert_eq!(s.buffer().active().opacity, 1.0);
    }

    #[test]
    fn navigation_waits_for_unready_image() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        opened(&mut s, 0, t0);
        s.drain_effects();

        let nav = s.navigate(Direction::Next, &HashSet::<String>::new(), t0).unwrap();
        assert_eq!(nav, Navigation { from: 0, to: 1 });
        assert!(s.state().is_navigating);
        assert_eq!(s.state().active_slot, buffer::SlotId::A);
        assert!(
            s.drain_effects()
                .iter()
                .any(|e| matches!(e, Effect::LoadImage { image } if image.src == "1.jpg"))
        );

        let t1 = t0 + Duration::from_millis(40);
        s.on_image_settled("1.jpg", LoadOutcome::Failed, t1);
        assert_eq!(s.state().active_slot, buffer::SlotId::B);
        s.on_tick(t1 + Duration::from_millis(349));
        assert!(s.state().is_navigating);
        s.on_tick(t1 + Duration::from_millis(350));
        assert!(!s.state().is_navigating);
    }

    #[test]
    fn zoom_scale_waits_one_frame_and_close_resets_it() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        opened(&mut s, 0, t0);
        assert_eq!(s.toggle_zoom(Point::new(512.0, 384.0), PointerKind::Mouse, t0), Some(true));
        assert_eq!(s.buffer().active().scale, 1.0);
        s.on_animation_frame(t0);
        assert_eq!(s.buffer().active().scale, 2.5);

        s.close(t0).unwrap();
        assert!(!s.state().is_zoomed);
        assert_eq!(s.buffer().active().scale, 1.0);
    }

    #[test]
    fn zoom_out_resets_origin_after_scale_animation() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 3);
        opened(&mut s, 0, t0);
        s.toggle_zoom(Point::new(0.0, 0.0), PointerKind::Mouse, t0);
        s.on_animation_frame(t0);
        assert_eq!(s.toggle_zoom(Point::new(0.0, 0.0), PointerKind::Mouse, t0), Some(false));
        assert_eq!(s.buffer().active().origin, Point::new(0.0, 0.0));
        s.on_tick(t0 + Duration::from_millis(299));
        assert_eq!(s.buffer().active().origin, Point::new(0.0, 0.0));
        s.on_tick(t0 + Duration::from_millis(300));
        assert_eq!(s.buffer().active().origin, buffer::CENTER_ORIGIN);
    }

    #[test]
    fn carousel_ignores_touch_zoom_and_reattach() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::carousel(), 4);
        assert!(!s.attach(GallerySet::default()));
        opened(&mut s, 0, t0);
        assert_eq!(s.toggle_zoom(Point::new(1.0, 1.0), PointerKind::Touch, t0), None);
        assert_eq!(s.toggle_zoom(Point::new(1.0, 1.0), PointerKind::Mouse, t0), Some(true));
    }

    #[test]
    fn resize_refits_only_when_unzoomed() {
        let t0 = Instant::now();
        let mut s = session(SessionOptions::gallery(), 1);
        opened(&mut s, 0, t0);
        assert!(s.resize(Viewport::new(800.0, 800.0)));
        assert_eq!(s.buffer().active().rect, Rect::new(0.0, 100.0, 800.0, 600.0));
        s.toggle_zoom(Point::new(0.0, 0.0), PointerKind::Mouse, t0);
        assert!(!s.resize(Viewport::new(400.0, 400.0)));
        assert_eq!(s.buffer().active().rect, Rect::new(0.0, 100.0, 800.0, 600.0));
    }
}
