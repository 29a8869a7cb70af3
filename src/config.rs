use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::gallery::ImageRef;
use crate::geometry::{DEFAULT_ASPECT_RATIO, Rect};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Lightbox behaviour shared by the gallery and the product carousel.
    pub lightbox: LightboxConfig,
    /// Gallery content and page layout.
    pub gallery: GalleryConfig,
    /// Optional product preview modal.
    pub product: Option<ProductConfig>,
    /// Cadence of animation-frame callbacks in the driver.
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
    /// Maximum number of concurrent image availability checks in the loader.
    pub loader_max_concurrent: usize,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.frame_interval > Duration::ZERO,
            "frame-interval must be greater than zero"
        );
        ensure!(
            self.loader_max_concurrent > 0,
            "loader-max-concurrent must be greater than zero"
        );
        self.lightbox.validate().context("invalid lightbox settings")?;
        self.gallery.validate().context("invalid gallery settings")?;
        if let Some(product) = &self.product {
            product.validate().context("invalid product settings")?;
        }
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            lightbox: LightboxConfig::default(),
            gallery: GalleryConfig::default(),
            product: None,
            frame_interval: Duration::from_millis(16),
            loader_max_concurrent: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LightboxConfig {
    /// Magnification applied by click-to-zoom.
    pub zoom_factor: f32,
    /// Width / height assumed for images without intrinsic dimensions.
    pub default_aspect_ratio: f32,
    pub timings: Timings,
}

impl LightboxConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.zoom_factor > 1.0, "zoom-factor must be greater than 1");
        ensure!(
            self.default_aspect_ratio.is_finite() && self.default_aspect_ratio > 0.0,
            "default-aspect-ratio must be positive"
        );
        self.timings.validate()
    }
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 2.5,
            default_aspect_ratio: DEFAULT_ASPECT_RATIO,
            timings: Timings::default(),
        }
    }
}

/// Durations of the timed lightbox phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Timings {
    /// Source rect to fitted rect on open.
    #[serde(with = "humantime_serde")]
    pub expand: Duration,
    /// Fitted rect back to the thumbnail on close.
    #[serde(with = "humantime_serde")]
    pub shrink: Duration,
    /// Opacity fade after the shrink completes.
    #[serde(with = "humantime_serde")]
    pub fade_out: Duration,
    /// Opacity crossfade between buffer slots; also the navigation lock window.
    #[serde(with = "humantime_serde")]
    pub crossfade: Duration,
    /// Scale animation for zoom in and out.
    #[serde(with = "humantime_serde")]
    pub zoom: Duration,
    /// Transform-origin easing while panning a zoomed image.
    #[serde(with = "humantime_serde")]
    pub pan: Duration,
}

impl Timings {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("expand", self.expand),
            ("shrink", self.shrink),
            ("fade-out", self.fade_out),
            ("crossfade", self.crossfade),
            ("zoom", self.zoom),
            ("pan", self.pan),
        ] {
            ensure!(
                value > Duration::ZERO,
                "timings.{name} must be greater than zero"
            );
        }
        Ok(())
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            expand: Duration::from_millis(380),
            shrink: Duration::from_millis(380),
            fade_out: Duration::from_millis(150),
            crossfade: Duration::from_millis(350),
            zoom: Duration::from_millis(300),
            pan: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GalleryConfig {
    /// Statically listed images, in display order.
    pub images: Vec<ImageRef>,
    /// Directory scanned recursively for images when `images` is empty.
    pub library_path: Option<PathBuf>,
    pub columns: u32,
    /// Spacing between thumbnails and around the grid, in px.
    pub gap: f32,
    /// Images appended per infinite-scroll load.
    pub batch_size: usize,
    /// Viewport width above which the lightbox controller is constructed.
    pub lazy_init_min_width: f32,
    /// Distance from the document bottom that triggers loading more content.
    pub load_more_threshold: f32,
    pub reveal: RevealConfig,
}

impl GalleryConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.columns > 0, "gallery.columns must be greater than zero");
        ensure!(self.gap >= 0.0, "gallery.gap must not be negative");
        ensure!(
            self.batch_size > 0,
            "gallery.batch-size must be greater than zero"
        );
        ensure!(
            self.load_more_threshold >= 0.0,
            "gallery.load-more-threshold must not be negative"
        );
        self.reveal.validate()
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            library_path: None,
            columns: 3,
            gap: 16.0,
            batch_size: 12,
            lazy_init_min_width: 768.0,
            load_more_threshold: 500.0,
            reveal: RevealConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RevealConfig {
    #[serde(with = "humantime_serde")]
    pub fade: Duration,
    /// Initial downward offset, in px.
    pub offset: f32,
    /// Visible fraction that counts as intersecting.
    pub threshold: f32,
}

impl RevealConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.threshold > 0.0 && self.threshold <= 1.0,
            "gallery.reveal.threshold must be within (0, 1]"
        );
        Ok(())
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(500),
            offset: 20.0,
            threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProductConfig {
    pub images: Vec<ImageRef>,
    /// Quantity is appended verbatim to this URL.
    pub checkout_base_url: String,
    #[serde(default)]
    pub quantity: QuantityConfig,
    /// Page rect of the product card the carousel expands from.
    #[serde(default = "ProductConfig::default_card")]
    pub card: Rect,
}

impl ProductConfig {
    const fn default_card() -> Rect {
        Rect::new(16.0, 16.0, 320.0, 320.0)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.images.is_empty(),
            "product.images must include at least one image"
        );
        self.quantity.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct QuantityConfig {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl QuantityConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.min >= 1, "product.quantity.min must be at least 1");
        ensure!(
            self.min <= self.max,
            "product.quantity.min must not exceed product.quantity.max"
        );
        ensure!(self.step > 0, "product.quantity.step must be greater than zero");
        Ok(())
    }
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            min: 1,
            max: 50,
            step: 1,
        }
    }
}
