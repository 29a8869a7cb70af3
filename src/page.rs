//! Page controller: owns the gallery, its lightbox and the product modal,
//! and routes page input to them.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Configuration;
use crate::events::{ClickTarget, Effect, Handled, InputEvent, Key, LoadOutcome, PointerKind};
use crate::gallery::infinite::InfiniteScroll;
use crate::gallery::layout::GridLayout;
use crate::gallery::reveal::{RevealStyle, RevealTracker};
use crate::gallery::{GalleryItem, GallerySet, ImageRef};
use crate::geometry::{Point, Viewport};
use crate::lightbox::LightboxSession;
use crate::lightbox::render::Scene;
use crate::lightbox::state::{Direction, Phase, SessionOptions};
use crate::product::{ProductModal, ProductScene};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageScene {
    pub viewport: Viewport,
    pub thumbnails: Vec<RevealStyle>,
    pub lightbox: Option<Scene>,
    pub product: Option<ProductScene>,
}

#[derive(Debug)]
pub struct GalleryPage {
    cfg: Configuration,
    viewport: Viewport,
    layout: GridLayout,
    gallery: GallerySet,
    reveal: RevealTracker,
    feed: InfiniteScroll,
    /// Constructed once the viewport is wider than the configured minimum.
    lightbox: Option<LightboxSession>,
    product: Option<ProductModal>,
    ready: HashSet<String>,
    effects: Vec<Effect>,
}

impl GalleryPage {
    pub fn new(cfg: &Configuration, images: Vec<ImageRef>, viewport: Viewport) -> Self {
        let layout = GridLayout::new(cfg.gallery.columns, cfg.gallery.gap, viewport.width);
        let product = cfg
            .product
            .as_ref()
            .map(|p| ProductModal::new(p, &cfg.lightbox, p.card));
        let mut page = Self {
            cfg: cfg.clone(),
            viewport,
            layout,
            gallery: GallerySet::default(),
            reveal: RevealTracker::new(cfg.gallery.reveal),
            feed: InfiniteScroll::new(cfg.gallery.load_more_threshold),
            lightbox: None,
            product,
            ready: HashSet::new(),
            effects: Vec::new(),
        };
        page.append(images);
        page.ensure_lightbox();
        page
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn gallery(&self) -> &GallerySet {
        &self.gallery
    }

    pub fn lightbox(&self) -> Option<&LightboxSession> {
        self.lightbox.as_ref()
    }

    pub fn product(&self) -> Option<&ProductModal> {
        self.product.as_ref()
    }

    pub fn document_height(&self) -> f32 {
        self.layout.document_height()
    }

    pub fn handle(&mut self, event: &InputEvent, now: Instant) -> Handled {
        let handled = match event {
            InputEvent::Click {
                target,
                x,
                y,
                pointer,
            } => self.click(*target, Point::new(*x, *y), *pointer, now),
            InputEvent::PointerMove { x, y } => self.pointer_moved(Point::new(*x, *y)),
            InputEvent::Wheel { delta_y } => self.wheel(*delta_y, now),
            InputEvent::Key { key } => self.key(key, now),
            InputEvent::Resize { width, height } => self.resize(*width, *height),
            InputEvent::Scroll { top } => self.scroll(*top),
            InputEvent::ContentAppended { images } => {
                self.append(images.clone());
                Handled::Ignored
            }
        };
        self.collect_effects();
        handled
    }

    pub fn on_image_settled(&mut self, src: &str, outcome: LoadOutcome, now: Instant) {
        self.ready.insert(src.to_owned());
        let loaded: Vec<usize> = self
            .gallery
            .iter()
            .enumerate()
            .filter(|(_, item)| item.image.src == src)
            .map(|(idx, _)| idx)
            .collect();
        for idx in loaded {
            self.reveal.mark_loaded(idx);
        }
        if let Some(lb) = self.lightbox.as_mut() {
            lb.on_image_settled(src, outcome, now);
        }
        if let Some(product) = self.product.as_mut() {
            product.on_image_settled(src, outcome, now);
        }
        self.collect_effects();
    }

    pub fn on_animation_frame(&mut self, now: Instant) {
        if let Some(lb) = self.lightbox.as_mut() {
            lb.on_animation_frame(now);
        }
        if let Some(product) = self.product.as_mut() {
            product.on_animation_frame(now);
        }
        self.collect_effects();
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(lb) = self.lightbox.as_mut() {
            lb.on_tick(now);
        }
        if let Some(product) = self.product.as_mut() {
            product.on_tick(now);
        }
        self.collect_effects();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let lb = self.lightbox.as_ref().and_then(|lb| lb.next_deadline());
        let product = self.product.as_ref().and_then(|p| p.next_deadline());
        match (lb, product) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn wants_frames(&self) -> bool {
        self.lightbox.as_ref().is_some_and(|lb| lb.wants_frames())
            || self.product.as_ref().is_some_and(|p| p.wants_frames())
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn scene(&self) -> PageScene {
        PageScene {
            viewport: self.viewport,
            thumbnails: (0..self.reveal.len())
                .filter_map(|idx| self.reveal.style(idx))
                .collect(),
            lightbox: self.lightbox.as_ref().map(|lb| lb.scene()),
            product: self.product.as_ref().map(|p| p.scene()),
        }
    }

    fn lightbox_open(&self) -> bool {
        self.lightbox.as_ref().is_some_and(|lb| lb.state().is_open)
    }

    fn product_open(&self) -> bool {
        self.product
            .as_ref()
            .is_some_and(|p| p.carousel().state().is_open)
    }

    /// Any overlay still on screen keeps the background locked.
    fn overlay_shown(&self) -> bool {
        self.lightbox
            .as_ref()
            .is_some_and(|lb| lb.phase() != Phase::Closed)
            || self
                .product
                .as_ref()
                .is_some_and(|p| p.carousel().phase() != Phase::Closed)
    }

    fn click(&mut self, target: ClickTarget, at: Point, pointer: PointerKind, now: Instant) -> Handled {
        let viewport = self.viewport;
        let done = match target {
            ClickTarget::Thumbnail(index) => {
                if self.product_open() {
                    false
                } else {
                    self.lightbox
                        .as_mut()
                        .and_then(|lb| lb.open(index, viewport))
                        .is_some()
                }
            }
            ClickTarget::LightboxImage => self
                .lightbox
                .as_mut()
                .and_then(|lb| lb.toggle_zoom(at, pointer, now))
                .is_some(),
            ClickTarget::Backdrop => match self.lightbox.as_mut() {
                // A zoomed image intercepts clicks that would reach the backdrop.
                Some(lb) if lb.is_zoomed() => lb.toggle_zoom(at, pointer, now).is_some(),
                Some(lb) => lb.close(now).is_some(),
                None => false,
            },
            ClickTarget::Previous => self.navigate_lightbox(Direction::Previous, now),
            ClickTarget::Next => self.navigate_lightbox(Direction::Next, now),
            ClickTarget::Close => self
                .lightbox
                .as_mut()
                .and_then(|lb| lb.close(now))
                .is_some(),
            ClickTarget::ProductCard => {
                if self.lightbox_open() {
                    false
                } else {
                    self.product
                        .as_mut()
                        .and_then(|p| p.open(viewport))
                        .is_some()
                }
            }
            ClickTarget::ProductImage => self
                .product
                .as_mut()
                .and_then(|p| p.toggle_zoom(at, pointer, now))
                .is_some(),
            ClickTarget::ProductBackdrop => match self.product.as_mut() {
                Some(p) if p.carousel().is_zoomed() => p.toggle_zoom(at, pointer, now).is_some(),
                Some(p) => p.close(now).is_some(),
                None => false,
            },
            ClickTarget::ProductPrevious => self.navigate_product(Direction::Previous, now),
            ClickTarget::ProductNext => self.navigate_product(Direction::Next, now),
            ClickTarget::ProductClose => self
                .product
                .as_mut()
                .and_then(|p| p.close(now))
                .is_some(),
            ClickTarget::QuantityIncrement => {
                self.product.as_mut().is_some_and(|p| p.increment())
            }
            ClickTarget::QuantityDecrement => {
                self.product.as_mut().is_some_and(|p| p.decrement())
            }
        };
        debug!(?target, handled = done, "click");
        if done { Handled::Consumed } else { Handled::Ignored }
    }

    fn navigate_lightbox(&mut self, direction: Direction, now: Instant) -> bool {
        match self.lightbox.as_mut() {
            Some(lb) => lb.navigate(direction, &self.ready, now).is_some(),
            None => false,
        }
    }

    fn navigate_product(&mut self, direction: Direction, now: Instant) -> bool {
        self.product
            .as_mut()
            .and_then(|p| p.navigate(direction, now))
            .is_some()
    }

    fn pointer_moved(&mut self, at: Point) -> Handled {
        let panned = if self.product_open() {
            self.product.as_mut().is_some_and(|p| p.pointer_moved(at))
        } else {
            self.lightbox.as_mut().is_some_and(|lb| lb.pointer_moved(at))
        };
        if panned { Handled::Consumed } else { Handled::Ignored }
    }

    fn wheel(&mut self, delta_y: f32, now: Instant) -> Handled {
        if !self.overlay_shown() {
            return Handled::Ignored;
        }
        if let Some(direction) = Direction::from_delta(delta_y) {
            if self.product_open() {
                self.navigate_product(direction, now);
            } else if self.lightbox_open() {
                self.navigate_lightbox(direction, now);
            }
        }
        // Page scrolling stays suppressed until the overlay is torn down.
        Handled::Consumed
    }

    fn key(&mut self, key: &Key, now: Instant) -> Handled {
        let direction = match key {
            Key::Escape => {
                let closed = if self.product_open() {
                    self.product.as_mut().and_then(|p| p.close(now)).is_some()
                } else {
                    self.lightbox.as_mut().and_then(|lb| lb.close(now)).is_some()
                };
                return if closed { Handled::Consumed } else { Handled::Ignored };
            }
            Key::ArrowLeft | Key::ArrowUp => Direction::Previous,
            Key::ArrowRight | Key::ArrowDown => Direction::Next,
            Key::Other => return Handled::Ignored,
        };
        if self.product_open() {
            self.navigate_product(direction, now);
            Handled::Consumed
        } else if self.lightbox_open() {
            self.navigate_lightbox(direction, now);
            Handled::Consumed
        } else {
            Handled::Ignored
        }
    }

    fn resize(&mut self, width: f32, height: f32) -> Handled {
        self.viewport.width = width;
        self.viewport.height = height;
        self.relayout();
        self.ensure_lightbox();
        let viewport = self.viewport;
        if let Some(lb) = self.lightbox.as_mut() {
            lb.attach(self.gallery.clone());
            lb.resize(viewport);
        }
        if let Some(product) = self.product.as_mut() {
            product.resize(viewport);
        }
        self.observe_reveal();
        Handled::Ignored
    }

    fn scroll(&mut self, top: f32) -> Handled {
        if self.overlay_shown() {
            return Handled::Ignored;
        }
        self.viewport.scroll_top = top.max(0.0);
        self.observe_reveal();
        if self.feed.on_scroll(
            self.viewport.scroll_top,
            self.viewport.height,
            self.layout.document_height(),
        ) {
            self.effects.push(Effect::LoadMoreContent);
        }
        Handled::Ignored
    }

    fn append(&mut self, images: Vec<ImageRef>) {
        let items: Vec<GalleryItem> = self.layout.place_all(images);
        let appended = items.len();
        self.reveal.track(items.iter().map(|item| self.ready.contains(&item.image.src)));
        for item in &items {
            if !self.ready.contains(&item.image.src) {
                self.effects.push(Effect::LoadImage {
                    image: item.image.clone(),
                });
            }
        }
        self.gallery.extend(items.iter().cloned());
        if let Some(lb) = self.lightbox.as_mut() {
            lb.extend(items);
        }
        if self.feed.is_loading() {
            self.feed.on_batch(appended);
        }
        debug!(appended, total = self.gallery.len(), "gallery content appended");
        self.observe_reveal();
    }

    fn relayout(&mut self) {
        self.layout = GridLayout::new(
            self.cfg.gallery.columns,
            self.cfg.gallery.gap,
            self.viewport.width,
        );
        let images: Vec<ImageRef> = self.gallery.iter().map(|item| item.image.clone()).collect();
        self.gallery = GallerySet::from_items(self.layout.place_all(images));
    }

    fn ensure_lightbox(&mut self) {
        if self.lightbox.is_some() || self.viewport.width <= self.cfg.gallery.lazy_init_min_width {
            return;
        }
        let mut lb = LightboxSession::new(SessionOptions::gallery(), self.cfg.lightbox.clone());
        lb.attach(self.gallery.clone());
        lb.resize(self.viewport);
        info!(
            width = self.viewport.width,
            images = self.gallery.len(),
            "lightbox controller constructed"
        );
        self.lightbox = Some(lb);
    }

    fn observe_reveal(&mut self) {
        let window = self.viewport.page_window();
        self.reveal
            .observe(self.gallery.iter().map(|item| &item.page_rect), &window);
    }

    fn collect_effects(&mut self) {
        let mut drained = Vec::new();
        if let Some(lb) = self.lightbox.as_mut() {
            drained.extend(lb.drain_effects());
        }
        if let Some(product) = self.product.as_mut() {
            drained.extend(product.drain_effects());
        }
        let mut scrolled = false;
        for effect in &drained {
            if let Effect::ScrollBackground { top, .. } = effect {
                self.viewport.scroll_top = *top;
                scrolled = true;
            }
        }
        if scrolled {
            self.observe_reveal();
        }
        self.effects.extend(drained);
    }
}
