use serde::{Deserialize, Serialize};

use crate::gallery::ImageRef;
use crate::page::PageScene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    #[serde(other)]
    Other,
}

/// Element a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickTarget {
    Thumbnail(usize),
    LightboxImage,
    Backdrop,
    Previous,
    Next,
    Close,
    ProductCard,
    ProductImage,
    ProductBackdrop,
    ProductPrevious,
    ProductNext,
    ProductClose,
    QuantityIncrement,
    QuantityDecrement,
}

/// Page-level input, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum InputEvent {
    Click {
        target: ClickTarget,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        pointer: PointerKind,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    Wheel {
        delta_y: f32,
    },
    Key {
        key: Key,
    },
    Resize {
        width: f32,
        height: f32,
    },
    Scroll {
        top: f32,
    },
    /// The content provider appended a batch of images.
    ContentAppended {
        images: Vec<ImageRef>,
    },
}

/// Whether the page consumed an input (suppressing its default action).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Consumed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

/// Request for the image loader.
#[derive(Debug, Clone)]
pub struct LoadImage(pub ImageRef);

/// Loader notification; failures proceed exactly like successes.
#[derive(Debug, Clone)]
pub struct ImageSettled {
    pub src: String,
    pub outcome: LoadOutcome,
}

/// Side effects requested by the page and its lightbox sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Effect {
    LoadImage { image: ImageRef },
    ScrollBackground { top: f32, smooth: bool },
    /// Marks the document so background scrolling is styled as locked.
    DocumentScrollLock { locked: bool },
    /// Wheel, keydown and resize listeners are (de)registered globally.
    GlobalListeners { attached: bool },
    CheckoutLink { url: String },
    LoadMoreContent,
}

/// What the driver publishes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Output {
    Frame { at_ms: u64, scene: PageScene },
    Effect { at_ms: u64, effect: Effect },
}
