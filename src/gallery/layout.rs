use crate::gallery::{GalleryItem, ImageRef};
use crate::geometry::{DEFAULT_ASPECT_RATIO, Rect};

/// Masonry-style column layout for gallery thumbnails.
///
/// Each image goes to the currently shortest column and keeps its aspect
/// ratio. The layout remembers column heights so appended batches continue
/// below the existing content.
#[derive(Debug, Clone)]
pub struct GridLayout {
    gap: f32,
    column_width: f32,
    heights: Vec<f32>,
}

impl GridLayout {
    pub fn new(columns: u32, gap: f32, page_width: f32) -> Self {
        let columns = columns.max(1);
        let usable = page_width - gap * (columns as f32 + 1.0);
        let column_width = (usable / columns as f32).max(1.0);
        Self {
            gap,
            column_width,
            heights: vec![gap; columns as usize],
        }
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    pub fn place(&mut self, image: ImageRef) -> GalleryItem {
        let (col, top) = self
            .heights
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MAX), |best, (idx, h)| if h < best.1 { (idx, h) } else { best });
        let aspect = image.aspect_ratio().unwrap_or(DEFAULT_ASPECT_RATIO);
        let height = self.column_width / aspect;
        let left = self.gap + col as f32 * (self.column_width + self.gap);
        self.heights[col] = top + height + self.gap;
        GalleryItem::new(image, Rect::new(left, top, self.column_width, height))
    }

    pub fn place_all(&mut self, images: impl IntoIterator<Item = ImageRef>) -> Vec<GalleryItem> {
        images.into_iter().map(|image| self.place(image)).collect()
    }

    /// Total document height occupied by the grid.
    pub fn document_height(&self) -> f32 {
        self.heights.iter().copied().fold(0.0, f32::max)
    }
}
