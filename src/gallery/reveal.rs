//! Fade-in of gallery thumbnails as they load and scroll into view.

use std::time::Duration;

use serde::Serialize;

use crate::config::RevealConfig;
use crate::geometry::Rect;

/// Visual state of one thumbnail's reveal animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevealStyle {
    pub opacity: f32,
    pub translate_y: f32,
    #[serde(with = "humantime_serde")]
    pub transition: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RevealFlags {
    loaded: bool,
    revealed: bool,
}

/// Tracks load and intersection for every thumbnail in the gallery.
///
/// A thumbnail starts transparent and shifted down by `offset`. Loading makes
/// it opaque; crossing the visibility threshold makes it opaque and slides it
/// into place. Neither step is ever undone.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    cfg: RevealConfig,
    flags: Vec<RevealFlags>,
}

impl RevealTracker {
    pub fn new(cfg: RevealConfig) -> Self {
        Self {
            cfg,
            flags: Vec::new(),
        }
    }

    /// Start tracking newly rendered thumbnails. `already_complete` marks
    /// images that were decoded before observation began.
    pub fn track(&mut self, already_complete: impl IntoIterator<Item = bool>) {
        self.flags.extend(already_complete.into_iter().map(|loaded| RevealFlags {
            loaded,
            revealed: false,
        }));
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns `true` when the thumbnail's style changed.
    pub fn mark_loaded(&mut self, index: usize) -> bool {
        match self.flags.get_mut(index) {
            Some(flags) if !flags.loaded => {
                flags.loaded = true;
                true
            }
            _ => false,
        }
    }

    /// Re-evaluate intersections against the visible page window. Returns
    /// the indices that were revealed by this pass.
    pub fn observe<'a>(
        &mut self,
        page_rects: impl IntoIterator<Item = &'a Rect>,
        window: &Rect,
    ) -> Vec<usize> {
        let threshold = self.cfg.threshold;
        let mut revealed = Vec::new();
        for (index, (flags, rect)) in self.flags.iter_mut().zip(page_rects).enumerate() {
            if !flags.revealed && rect.visible_fraction_in(window) >= threshold {
                flags.revealed = true;
                revealed.push(index);
            }
        }
        revealed
    }

    pub fn style(&self, index: usize) -> Option<RevealStyle> {
        self.flags.get(index).map(|flags| RevealStyle {
            opacity: if flags.loaded || flags.revealed { 1.0 } else { 0.0 },
            translate_y: if flags.revealed { 0.0 } else { self.cfg.offset },
            transition: self.cfg.fade,
        })
    }
}
