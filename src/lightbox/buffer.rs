//! Two interchangeable image surfaces: one active, one staged for the next
//! crossfade.

use std::time::Duration;

use serde::Serialize;

use crate::gallery::ImageRef;
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SlotId {
    #[default]
    A,
    B,
}

impl SlotId {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Transition durations per animated property group. Zero means the
/// property snaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Transitions {
    #[serde(with = "humantime_serde")]
    pub geometry: Duration,
    #[serde(with = "humantime_serde")]
    pub opacity: Duration,
    #[serde(with = "humantime_serde")]
    pub transform: Duration,
}

impl Transitions {
    pub const NONE: Transitions = Transitions {
        geometry: Duration::ZERO,
        opacity: Duration::ZERO,
        transform: Duration::ZERO,
    };
}

/// Transform origin at the center, in percent.
pub const CENTER_ORIGIN: Point = Point::new(50.0, 50.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferSlot {
    pub source: Option<ImageRef>,
    pub rect: Rect,
    pub opacity: f32,
    pub scale: f32,
    /// Transform origin as a percentage of `rect`.
    pub origin: Point,
    pub z_index: i32,
    pub transitions: Transitions,
}

impl BufferSlot {
    /// Invisible, off-screen and unscaled.
    pub fn parked() -> Self {
        Self {
            source: None,
            rect: Rect::OFFSCREEN,
            opacity: 0.0,
            scale: 1.0,
            origin: CENTER_ORIGIN,
            z_index: 0,
            transitions: Transitions::NONE,
        }
    }

    pub fn park(&mut self) {
        let source = self.source.take();
        *self = Self::parked();
        // Keep the last source so revisiting it needs no reload.
        self.source = source;
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    slots: [BufferSlot; 2],
    active: SlotId,
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubleBuffer {
    pub fn new() -> Self {
        Self {
            slots: [BufferSlot::parked(), BufferSlot::parked()],
            active: SlotId::A,
        }
    }

    pub fn active_id(&self) -> SlotId {
        self.active
    }

    pub fn slot(&self, id: SlotId) -> &BufferSlot {
        &self.slots[id.index()]
    }

    pub fn slot_mut(&mut self, id: SlotId) -> &mut BufferSlot {
        &mut self.slots[id.index()]
    }

    pub fn active(&self) -> &BufferSlot {
        self.slot(self.active)
    }

    pub fn active_mut(&mut self) -> &mut BufferSlot {
        self.slot_mut(self.active)
    }

    pub fn inactive_mut(&mut self) -> &mut BufferSlot {
        self.slot_mut(self.active.other())
    }

    pub fn slots(&self) -> [(SlotId, &BufferSlot); 2] {
        [(SlotId::A, &self.slots[0]), (SlotId::B, &self.slots[1])]
    }

    /// Show `image` in slot A at `rect`, fully opaque with transitions off.
    pub fn show_in_a(&mut self, image: ImageRef, rect: Rect) {
        self.active = SlotId::A;
        self.slots[1].park();
        self.slots[0] = BufferSlot {
            source: Some(image),
            rect,
            opacity: 1.0,
            scale: 1.0,
            origin: CENTER_ORIGIN,
            z_index: 1,
            transitions: Transitions::NONE,
        };
    }

    /// Load `image` into the inactive slot, transparent and beneath the
    /// active one. Returns the staged slot.
    pub fn stage(&mut self, image: ImageRef, rect: Rect) -> SlotId {
        let staged = self.active.other();
        *self.slot_mut(staged) = BufferSlot {
            source: Some(image),
            rect,
            opacity: 0.0,
            scale: 1.0,
            origin: CENTER_ORIGIN,
            z_index: 0,
            transitions: Transitions::NONE,
        };
        staged
    }

    /// Fade the active slot out and the staged slot in simultaneously. The
    /// staged slot becomes active immediately, not when the fade completes.
    pub fn crossfade(&mut self, duration: Duration) -> SlotId {
        let fading = self.active;
        let incoming = fading.other();
        let fade = Transitions {
            opacity: duration,
            ..Transitions::NONE
        };
        {
            let out = self.slot_mut(fading);
            out.opacity = 0.0;
            out.z_index = 0;
            out.transitions = fade;
        }
        {
            let inc = self.slot_mut(incoming);
            inc.opacity = 1.0;
            inc.z_index = 1;
            inc.transitions = fade;
        }
        self.active = incoming;
        incoming
    }

    /// Relocate the inactive slot off-screen once a crossfade has finished.
    pub fn settle(&mut self) {
        self.inactive_mut().park();
    }

    pub fn park_all(&mut self) {
        for slot in &mut self.slots {
            slot.park();
        }
        self.active = SlotId::A;
    }
}
