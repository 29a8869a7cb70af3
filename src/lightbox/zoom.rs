//! Click-to-zoom around the pointer with pan-on-move.

use std::time::Duration;

use tracing::debug;

use crate::geometry::{Point, percent_within};
use crate::lightbox::buffer::{BufferSlot, CENTER_ORIGIN};

/// Binary zoom state for the active buffer slot.
///
/// Zooming in is two-phase: the origin is committed with transform
/// transitions off, and the scale is applied on the next frame so it
/// animates around the new origin ([`ZoomController::apply_scale`]).
/// Zooming out animates the scale first; the origin returns to the center
/// only after the scale animation ([`ZoomController::reset_origin`]).
#[derive(Debug, Clone)]
pub struct ZoomController {
    zoomed: bool,
    factor: f32,
    zoom_duration: Duration,
    pan_duration: Duration,
}

impl ZoomController {
    pub fn new(factor: f32, zoom_duration: Duration, pan_duration: Duration) -> Self {
        Self {
            zoomed: false,
            factor,
            zoom_duration,
            pan_duration,
        }
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn zoom_duration(&self) -> Duration {
        self.zoom_duration
    }

    pub fn zoom_in(&mut self, slot: &mut BufferSlot, pointer: Point) {
        let origin = percent_within(&slot.rect, pointer);
        debug!(origin_x = origin.x, origin_y = origin.y, "zoom in");
        slot.transitions.transform = Duration::ZERO;
        slot.origin = origin;
        self.zoomed = true;
    }

    pub fn apply_scale(&self, slot: &mut BufferSlot) {
        if !self.zoomed {
            return;
        }
        slot.transitions.transform = self.zoom_duration;
        slot.scale = self.factor;
    }

    /// Returns `false` when not zoomed.
    pub fn pan(&self, slot: &mut BufferSlot, pointer: Point) -> bool {
        if !self.zoomed {
            return false;
        }
        slot.transitions.transform = self.pan_duration;
        slot.origin = percent_within(&slot.rect, pointer);
        true
    }

    pub fn zoom_out(&mut self, slot: &mut BufferSlot) {
        debug!("zoom out");
        slot.transitions.transform = self.zoom_duration;
        slot.scale = 1.0;
        self.zoomed = false;
    }

    pub fn reset_origin(&self, slot: &mut BufferSlot) {
        if self.zoomed {
            return;
        }
        slot.transitions.transform = Duration::ZERO;
        slot.origin = CENTER_ORIGIN;
    }

    /// Snap back to unzoomed without animation.
    pub fn force_reset(&mut self, slot: &mut BufferSlot) {
        self.zoomed = false;
        slot.transitions.transform = Duration::ZERO;
        slot.scale = 1.0;
        slot.origin = CENTER_ORIGIN;
    }
}
