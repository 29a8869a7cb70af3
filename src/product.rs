//! Product preview modal: a wrapping image carousel plus a quantity stepper
//! that drives the checkout link.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::config::{LightboxConfig, ProductConfig, QuantityConfig};
use crate::events::{Effect, LoadOutcome, PointerKind};
use crate::gallery::GallerySet;
use crate::geometry::{Point, Rect, Viewport};
use crate::lightbox::render::Scene;
use crate::lightbox::state::{Direction, Navigation, PhaseChange, SessionOptions};
use crate::lightbox::{AlwaysReady, LightboxSession};

/// Integer counter bounded to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    value: u32,
    bounds: QuantityConfig,
}

impl QuantityStepper {
    pub fn new(bounds: QuantityConfig) -> Self {
        Self {
            value: bounds.min,
            bounds,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Returns `true` when the value changed.
    pub fn increment(&mut self) -> bool {
        self.set(self.value.saturating_add(self.bounds.step))
    }

    pub fn decrement(&mut self) -> bool {
        self.set(self.value.saturating_sub(self.bounds.step))
    }

    pub fn set(&mut self, value: u32) -> bool {
        let clamped = value.clamp(self.bounds.min, self.bounds.max);
        let changed = clamped != self.value;
        self.value = clamped;
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductScene {
    pub carousel: Scene,
    pub quantity: u32,
    pub checkout_url: String,
}

#[derive(Debug)]
pub struct ProductModal {
    carousel: LightboxSession,
    quantity: QuantityStepper,
    checkout_base_url: String,
    effects: Vec<Effect>,
}

impl ProductModal {
    /// Every carousel image expands from `card`, the product card's page rect.
    pub fn new(cfg: &ProductConfig, lightbox: &LightboxConfig, card: Rect) -> Self {
        let mut carousel = LightboxSession::new(SessionOptions::carousel(), lightbox.clone());
        carousel.attach(GallerySet::anchored(cfg.images.iter().cloned(), card));
        Self {
            carousel,
            quantity: QuantityStepper::new(cfg.quantity),
            checkout_base_url: cfg.checkout_base_url.clone(),
            effects: Vec::new(),
        }
    }

    pub fn carousel(&self) -> &LightboxSession {
        &self.carousel
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.value()
    }

    pub fn checkout_url(&self) -> String {
        format!("{}{}", self.checkout_base_url, self.quantity.value())
    }

    pub fn open(&mut self, viewport: Viewport) -> Option<PhaseChange> {
        let change = self.carousel.open(0, viewport)?;
        // Fixed content: warm every image up front.
        for image in self.carousel.gallery().iter().skip(1) {
            self.effects.push(Effect::LoadImage {
                image: image.image.clone(),
            });
        }
        self.effects.push(Effect::CheckoutLink {
            url: self.checkout_url(),
        });
        Some(change)
    }

    pub fn close(&mut self, now: Instant) -> Option<PhaseChange> {
        self.carousel.close(now)
    }

    pub fn navigate(&mut self, direction: Direction, now: Instant) -> Option<Navigation> {
        self.carousel.navigate(direction, &AlwaysReady, now)
    }

    pub fn toggle_zoom(&mut self, pointer: Point, kind: PointerKind, now: Instant) -> Option<bool> {
        self.carousel.toggle_zoom(pointer, kind, now)
    }

    pub fn pointer_moved(&mut self, pointer: Point) -> bool {
        self.carousel.pointer_moved(pointer)
    }

    pub fn resize(&mut self, viewport: Viewport) -> bool {
        self.carousel.resize(viewport)
    }

    pub fn increment(&mut self) -> bool {
        let changed = self.quantity.increment();
        self.publish_checkout(changed);
        changed
    }

    pub fn decrement(&mut self) -> bool {
        let changed = self.quantity.decrement();
        self.publish_checkout(changed);
        changed
    }

    fn publish_checkout(&mut self, changed: bool) {
        if changed {
            let url = self.checkout_url();
            debug!(quantity = self.quantity.value(), %url, "checkout link updated");
            self.effects.push(Effect::CheckoutLink { url });
        }
    }

    pub fn on_animation_frame(&mut self, now: Instant) {
        self.carousel.on_animation_frame(now);
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.carousel.on_tick(now);
    }

    pub fn on_image_settled(&mut self, src: &str, outcome: LoadOutcome, now: Instant) {
        self.carousel.on_image_settled(src, outcome, now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.carousel.next_deadline()
    }

    pub fn wants_frames(&self) -> bool {
        self.carousel.wants_frames()
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        let mut effects = self.carousel.drain_effects();
        effects.append(&mut self.effects);
        effects
    }

    pub fn scene(&self) -> ProductScene {
        ProductScene {
            carousel: self.carousel.scene(),
            quantity: self.quantity.value(),
            checkout_url: self.checkout_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepper_stays_within_bounds() {
        let mut q = QuantityStepper::new(QuantityConfig::default());
        assert_eq!(q.value(), 1);
        assert!(!q.decrement());
        assert_eq!(q.value(), 1);
        assert!(q.set(50));
        assert!(!q.increment());
        assert_eq!(q.value(), 50);
        assert!(q.decrement());
        assert_eq!(q.value(), 49);
    }

    #[test]
    fn custom_step_clamps_at_max() {
        let mut q = QuantityStepper::new(QuantityConfig {
            min: 2,
            max: 10,
            step: 4,
        });
        assert!(q.increment());
        assert!(q.increment());
        assert_eq!(q.value(), 10);
        assert!(q.decrement());
        assert_eq!(q.value(), 6);
    }
}
