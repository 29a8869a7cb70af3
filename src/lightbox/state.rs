use serde::Serialize;

use crate::lightbox::buffer::SlotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Closed,
    /// Waiting on the two frames that let the source rect apply before the
    /// expand transition is enabled.
    Opening,
    Open,
    /// Shrinking back to the thumbnail, then fading out.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Maps a wheel or key delta to a direction; zero maps to nothing.
    pub fn from_delta(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Next)
        } else if delta < 0.0 {
            Some(Self::Previous)
        } else {
            None
        }
    }

    const fn step(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }

    /// Target index from `current` in a list of `len`, or `None` when the
    /// move leaves the list and `wrap` is off.
    pub fn target(self, current: usize, len: usize, wrap: bool) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let raw = current as isize + self.step();
        if wrap {
            let len = len as isize;
            let idx = ((raw % len) + len) % len;
            Some(idx as usize).filter(|&idx| idx != current)
        } else if raw < 0 || raw as usize >= len {
            None
        } else {
            Some(raw as usize)
        }
    }
}

/// Observable session state; rendering is a projection of this plus the
/// buffer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub is_open: bool,
    pub current_index: usize,
    pub active_slot: SlotId,
    pub is_zoomed: bool,
    pub is_navigating: bool,
}

/// Behavioural differences between the gallery lightbox and the product
/// carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Cycle past either end instead of stopping.
    pub wrap_navigation: bool,
    /// Scroll the page so the current thumbnail stays vertically centered.
    pub sync_background_scroll: bool,
    /// Content can grow after attach and images may still be loading.
    pub lazy_source: bool,
    /// Ignore zoom requests from touch input.
    pub suppress_touch_zoom: bool,
}

impl SessionOptions {
    pub const fn gallery() -> Self {
        Self {
            wrap_navigation: false,
            sync_background_scroll: true,
            lazy_source: true,
            suppress_touch_zoom: false,
        }
    }

    pub const fn carousel() -> Self {
        Self {
            wrap_navigation: true,
            sync_background_scroll: false,
            lazy_source: false,
            suppress_touch_zoom: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_stops_at_both_ends() {
        assert_eq!(Direction::Previous.target(0, 5, false), None);
        assert_eq!(Direction::Next.target(4, 5, false), None);
        assert_eq!(Direction::Next.target(2, 5, false), Some(3));
    }

    #[test]
    fn wrap_cycles() {
        assert_eq!(Direction::Previous.target(0, 4, true), Some(3));
        assert_eq!(Direction::Next.target(3, 4, true), Some(0));
        assert_eq!(Direction::Next.target(0, 1, true), None);
    }

    #[test]
    fn wheel_sign_maps_to_direction() {
        assert_eq!(Direction::from_delta(120.0), Some(Direction::Next));
        assert_eq!(Direction::from_delta(-3.0), Some(Direction::Previous));
        assert_eq!(Direction::from_delta(0.0), None);
    }
}
