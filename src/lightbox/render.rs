//! Pure projection from session state to visual properties.

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::lightbox::buffer::{DoubleBuffer, SlotId, Transitions};
use crate::lightbox::state::{Phase, SessionState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotStyle {
    pub slot: SlotId,
    pub src: Option<String>,
    pub rect: Rect,
    pub opacity: f32,
    pub scale: f32,
    pub origin: Point,
    pub z_index: i32,
    pub transitions: Transitions,
    /// Receives clicks and pointer moves.
    pub interactive: bool,
    pub cursor: &'static str,
}

impl SlotStyle {
    /// Inline CSS equivalent of this style.
    pub fn css(&self) -> String {
        let mut out = String::new();
        let r = &self.rect;
        let _ = write!(
            out,
            "left:{}px;top:{}px;width:{}px;height:{}px;opacity:{};z-index:{};",
            r.left, r.top, r.width, r.height, self.opacity, self.z_index
        );
        let _ = write!(
            out,
            "transform:scale({});transform-origin:{}% {}%;",
            self.scale, self.origin.x, self.origin.y
        );
        let t = &self.transitions;
        let parts: Vec<String> = [
            ("left", t.geometry),
            ("top", t.geometry),
            ("width", t.geometry),
            ("height", t.geometry),
            ("opacity", t.opacity),
            ("transform", t.transform),
        ]
        .into_iter()
        .filter(|(_, d)| !d.is_zero())
        .map(|(prop, d)| format!("{prop} {}ms ease", d.as_millis()))
        .collect();
        if parts.is_empty() {
            out.push_str("transition:none;");
        } else {
            let _ = write!(out, "transition:{};", parts.join(","));
        }
        if !self.interactive {
            out.push_str("pointer-events:none;");
        }
        let _ = write!(out, "cursor:{};", self.cursor);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub state: SessionState,
    pub overlay_visible: bool,
    /// Backdrop opacity animation length for the current phase.
    #[serde(with = "humantime_serde")]
    pub overlay_transition: Duration,
    pub scroll_locked: bool,
    pub slots: [SlotStyle; 2],
}

impl Scene {
    pub fn slot(&self, id: SlotId) -> &SlotStyle {
        match id {
            SlotId::A => &self.slots[0],
            SlotId::B => &self.slots[1],
        }
    }

    pub fn active(&self) -> &SlotStyle {
        self.slot(self.state.active_slot)
    }
}

pub fn project(state: &SessionState, buffer: &DoubleBuffer, fade: Duration) -> Scene {
    let shown = state.phase != Phase::Closed;
    let [a, b] = buffer.slots().map(|(id, slot)| {
        let active = id == state.active_slot;
        let interactive = shown && active && state.phase == Phase::Open;
        SlotStyle {
            slot: id,
            src: slot.source.as_ref().map(|s| s.src.clone()),
            rect: slot.rect,
            opacity: slot.opacity,
            scale: slot.scale,
            origin: slot.origin,
            z_index: slot.z_index,
            transitions: slot.transitions,
            interactive,
            cursor: match (interactive, state.is_zoomed) {
                (false, _) => "default",
                (true, false) => "zoom-in",
                (true, true) => "zoom-out",
            },
        }
    });
    Scene {
        state: *state,
        overlay_visible: shown,
        overlay_transition: fade,
        scroll_locked: shown,
        slots: [a, b],
    }
}
