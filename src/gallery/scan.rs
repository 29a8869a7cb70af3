use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::gallery::ImageRef;

/// Recursively collect images under `root` in path order, probing each
/// file's header for its natural dimensions.
pub fn discover_images(root: &Path) -> Result<Vec<ImageRef>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    let images: Vec<ImageRef> = paths
        .into_iter()
        .map(|path| {
            let src = path.to_string_lossy().into_owned();
            match probe_dimensions(&path) {
                Some((w, h)) => ImageRef::new(src, w, h),
                None => {
                    warn!(path = %path.display(), "could not read image dimensions");
                    ImageRef::without_size(src)
                }
            }
        })
        .collect();
    info!(root = %root.display(), discovered = images.len(), "gallery scan complete");
    Ok(images)
}

/// Reads only the header; pixel data is never decoded.
pub fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
    let dims = image::ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    debug!(path = %path.display(), width = dims.0, height = dims.1, "probed dimensions");
    Some(dims)
}

#[inline]
pub fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref e) if ["jpg", "jpeg", "png", "webp", "gif"].contains(&e.as_str())
    )
}
