//! Screen-space geometry and the viewport fit calculation used by the lightbox.

use serde::{Deserialize, Serialize};

/// Aspect ratio assumed when an image's intrinsic size is unknown.
pub const DEFAULT_ASPECT_RATIO: f32 = 3.0 / 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when either side is degenerate.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width > 0.0 && self.height > 0.0 {
            Some(self.width / self.height)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Parking position for surfaces that must not intercept input.
    pub const OFFSCREEN: Rect = Rect {
        left: -10_000.0,
        top: -10_000.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// Fraction of this rect's area that overlaps `other`, in `[0, 1]`.
    pub fn visible_fraction_in(&self, other: &Rect) -> f32 {
        let area = self.width * self.height;
        if area <= 0.0 {
            return 0.0;
        }
        let w = (self.right().min(other.right()) - self.left.max(other.left)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0);
        (w * h / area).clamp(0.0, 1.0)
    }
}

/// Browser-style viewport: visible size plus vertical document scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub scroll_top: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_top: 0.0,
        }
    }

    pub const fn with_scroll(mut self, scroll_top: f32) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// The visible region expressed in page coordinates.
    pub fn page_window(&self) -> Rect {
        Rect::new(0.0, self.scroll_top, self.width, self.height)
    }
}

/// Largest rect with aspect ratio `aspect` (width / height) that fits the
/// viewport, centered. Height is filled first; width wins when it would
/// overflow. Degenerate ratios fall back to [`DEFAULT_ASPECT_RATIO`].
pub fn fit_to_viewport(aspect: Option<f32>, viewport_w: f32, viewport_h: f32) -> Rect {
    let r = aspect
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_ASPECT_RATIO);
    let mut height = viewport_h;
    let mut width = height * r;
    if width > viewport_w {
        width = viewport_w;
        height = width / r;
    }
    Rect::new(
        (viewport_w - width) / 2.0,
        (viewport_h - height) / 2.0,
        width,
        height,
    )
}

/// Pointer position inside `rect` as a percentage on each axis, clamped to `[0, 100]`.
pub fn percent_within(rect: &Rect, p: Point) -> Point {
    let pct = |offset: f32, extent: f32| {
        if extent <= 0.0 {
            50.0
        } else {
            (offset / extent * 100.0).clamp(0.0, 100.0)
        }
    };
    Point::new(
        pct(p.x - rect.left, rect.width),
        pct(p.y - rect.top, rect.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_close(a: Rect, b: Rect) {
        let eps = 0.001;
        assert!((a.left - b.left).abs() <= eps, "left mismatch: {a:?} vs {b:?}");
        assert!((a.top - b.top).abs() <= eps, "top mismatch: {a:?} vs {b:?}");
        assert!((a.width - b.width).abs() <= eps, "width mismatch: {a:?} vs {b:?}");
        assert!((a.height - b.height).abs() <= eps, "height mismatch: {a:?} vs {b:?}");
    }

    #[test]
    fn four_by_three_fills_800x600_exactly() {
        let rect = fit_to_viewport(Some(4.0 / 3.0), 800.0, 600.0);
        rect_close(rect, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn sixteen_by_nine_is_width_constrained() {
        let rect = fit_to_viewport(Some(16.0 / 9.0), 800.0, 600.0);
        rect_close(rect, Rect::new(0.0, 75.0, 800.0, 450.0));
    }

    #[test]
    fn portrait_is_height_filled_and_centered() {
        let rect = fit_to_viewport(Some(0.5), 1000.0, 600.0);
        rect_close(rect, Rect::new(350.0, 0.0, 300.0, 600.0));
    }

    #[test]
    fn unknown_ratio_uses_three_by_four() {
        let rect = fit_to_viewport(None, 800.0, 600.0);
        rect_close(rect, Rect::new(175.0, 0.0, 450.0, 600.0));
        let rect = fit_to_viewport(Some(f32::NAN), 800.0, 600.0);
        rect_close(rect, Rect::new(175.0, 0.0, 450.0, 600.0));
    }

    #[test]
    fn percent_is_clamped_to_rect() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(percent_within(&rect, Point::new(150.0, 175.0)), Point::new(25.0, 75.0));
        assert_eq!(percent_within(&rect, Point::new(0.0, 500.0)), Point::new(0.0, 100.0));
    }

    #[test]
    fn visible_fraction_of_partially_scrolled_rect() {
        let thumb = Rect::new(0.0, 550.0, 100.0, 100.0);
        let window = Viewport::new(800.0, 600.0).page_window();
        assert!((thumb.visible_fraction_in(&window) - 0.5).abs() < f32::EPSILON);
    }
}
