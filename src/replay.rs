//! Timed input scripts and the paged content provider used by the
//! `lightbox-replay` binary.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tokio::sync::mpsc::Sender;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::events::InputEvent;
use crate::gallery::ImageRef;
use crate::geometry::Viewport;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScriptStep {
    /// Offset from the start of the replay.
    #[serde(with = "humantime_serde")]
    pub at: Duration,
    pub event: InputEvent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Script {
    /// Initial page viewport.
    #[serde(default = "Script::default_viewport")]
    pub viewport: Viewport,
    /// How long to keep running after the last step so animations finish.
    #[serde(default = "Script::default_tail", with = "humantime_serde")]
    pub tail: Duration,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    const fn default_viewport() -> Viewport {
        Viewport::new(1280.0, 800.0)
    }

    const fn default_tail() -> Duration {
        Duration::from_secs(1)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let script: Self = serde_yaml::from_str(&s)
            .with_context(|| format!("failed to parse script {}", path.display()))?;
        script.validated()
    }

    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.viewport.width > 0.0 && self.viewport.height > 0.0,
            "script viewport must have a positive size"
        );
        ensure!(
            self.steps.windows(2).all(|w| w[0].at <= w[1].at),
            "script steps must be ordered by `at`"
        );
        Ok(self)
    }

    /// Offset of the last step plus the tail.
    pub fn duration(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, |s| s.at) + self.tail
    }
}

/// Feed each step into `input_tx` at its offset from `started`.
pub async fn play(
    script: &Script,
    started: Instant,
    input_tx: Sender<InputEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    for (idx, step) in script.steps.iter().enumerate() {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = sleep_until(started + step.at) => {}
        }
        debug!(step = idx, at = %humantime::format_duration(step.at), "replaying input");
        input_tx
            .send(step.event.clone())
            .await
            .context("driver input channel closed")?;
    }
    info!(steps = script.steps.len(), "script finished");
    Ok(())
}

/// Hands out the images not yet on the page, one batch per request.
#[derive(Debug, Clone)]
pub struct ContentFeed {
    remaining: std::vec::IntoIter<ImageRef>,
    batch_size: usize,
}

impl ContentFeed {
    pub fn new(images: Vec<ImageRef>, batch_size: usize) -> Self {
        Self {
            remaining: images.into_iter(),
            batch_size: batch_size.max(1),
        }
    }

    /// Split off the first batch for the initial page render.
    pub fn initial(images: Vec<ImageRef>, batch_size: usize) -> (Vec<ImageRef>, Self) {
        let mut feed = Self::new(images, batch_size);
        let first = feed.next_batch();
        (first, feed)
    }

    /// An empty batch means the content is exhausted.
    pub fn next_batch(&mut self) -> Vec<ImageRef> {
        self.remaining.by_ref().take(self.batch_size).collect()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ClickTarget, PointerKind};

    #[test]
    fn parses_script_with_defaults() {
        let yaml = r#"
steps:
  - at: 0ms
    event: { type: click, target: { thumbnail: 2 } }
  - at: 500ms
    event: { type: key, key: ArrowRight }
  - at: 1s
    event: { type: resize, width: 1024, height: 768 }
"#;
        let script: Script = serde_yaml::from_str(yaml).unwrap();
        let script = script.validated().unwrap();
        assert_eq!(script.viewport, Viewport::new(1280.0, 800.0));
        assert_eq!(script.duration(), Duration::from_secs(2));
        assert_eq!(
            script.steps[0].event,
            InputEvent::Click {
                target: ClickTarget::Thumbnail(2),
                x: 0.0,
                y: 0.0,
                pointer: PointerKind::Mouse,
            }
        );
    }

    #[test]
    fn unordered_steps_are_rejected() {
        let yaml = r#"
steps:
  - { at: 1s, event: { type: wheel, delta-y: 10 } }
  - { at: 0s, event: { type: wheel, delta-y: 10 } }
"#;
        let script: Script = serde_yaml::from_str(yaml).unwrap();
        assert!(script.validated().is_err());
    }

    #[test]
    fn feed_splits_into_batches() {
        let images: Vec<ImageRef> = (0..5).map(|i| ImageRef::without_size(format!("{i}.jpg"))).collect();
        let (first, mut feed) = ContentFeed::initial(images, 2);
        assert_eq!(first.len(), 2);
        assert_eq!(feed.remaining(), 3);
        assert_eq!(feed.next_batch().len(), 2);
        assert_eq!(feed.next_batch()[0].src, "4.jpg");
        assert!(feed.next_batch().is_empty());
    }
}
