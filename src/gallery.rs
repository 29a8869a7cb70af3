//! Gallery content: the ordered image list the lightbox navigates over.

pub mod infinite;
pub mod layout;
pub mod reveal;
pub mod scan;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};

/// An image source plus its natural dimensions, when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageRef {
    pub fn new(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width: Some(width),
            height: Some(height),
        }
    }

    /// An image whose intrinsic size has not been probed yet.
    pub fn without_size(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: None,
            height: None,
        }
    }

    pub fn natural_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Size::new(w as f32, h as f32)),
            _ => None,
        }
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        self.natural_size().and_then(|s| s.aspect_ratio())
    }
}

/// One rendered thumbnail: the image and where it sits on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub image: ImageRef,
    /// Bounding box in document coordinates (unaffected by scrolling).
    pub page_rect: Rect,
}

impl GalleryItem {
    pub fn new(image: ImageRef, page_rect: Rect) -> Self {
        Self { image, page_rect }
    }
}

/// Ordered gallery snapshot; the index is the only navigation address.
#[derive(Debug, Clone, Default)]
pub struct GallerySet {
    items: Vec<GalleryItem>,
}

impl GallerySet {
    pub fn from_items(items: Vec<GalleryItem>) -> Self {
        Self { items }
    }

    /// Every image anchored at the same frame, as in a modal carousel.
    pub fn anchored(images: impl IntoIterator<Item = ImageRef>, frame: Rect) -> Self {
        Self {
            items: images
                .into_iter()
                .map(|image| GalleryItem::new(image, frame))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    /// The thumbnail's bounding box relative to the viewport at `scroll_top`.
    pub fn on_screen_rect(&self, index: usize, scroll_top: f32) -> Option<Rect> {
        self.items
            .get(index)
            .map(|item| item.page_rect.translated(0.0, -scroll_top))
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = GalleryItem>) {
        self.items.extend(items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalleryItem> {
        self.items.iter()
    }
}
