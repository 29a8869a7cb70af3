use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{ImageSettled, LoadImage, LoadOutcome};
use crate::gallery::scan::probe_dimensions;

/// Remote and inline sources are handed to the renderer as-is.
fn is_remote(src: &str) -> bool {
    src.contains("://") || src.starts_with("data:")
}

fn check_local(path: &Path) -> LoadOutcome {
    match probe_dimensions(path) {
        Some(_) => LoadOutcome::Loaded,
        None => LoadOutcome::Failed,
    }
}

async fn settle(src: String) -> ImageSettled {
    if is_remote(&src) {
        return ImageSettled {
            src,
            outcome: LoadOutcome::Loaded,
        };
    }
    let path = std::path::PathBuf::from(&src);
    let outcome = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => tokio::task::spawn_blocking(move || check_local(&path))
            .await
            .unwrap_or(LoadOutcome::Failed),
        _ => LoadOutcome::Failed,
    };
    ImageSettled { src, outcome }
}

/// Sources of the checks still running, by task id.
#[derive(Debug, Default)]
struct InFlight {
    sources: HashSet<String>,
    tasks: HashMap<Id, String>,
}

impl InFlight {
    fn len(&self) -> usize {
        self.sources.len()
    }

    fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns `false` when `src` is already being checked.
    fn start(&mut self, src: String, tasks: &mut JoinSet<ImageSettled>) -> bool {
        if !self.sources.insert(src.clone()) {
            return false;
        }
        let handle = tasks.spawn(settle(src.clone()));
        self.tasks.insert(handle.id(), src);
        true
    }

    /// A check that panicked or was aborted still settles its source, as failed.
    fn finish(&mut self, joined: Result<(Id, ImageSettled), JoinError>) -> Option<ImageSettled> {
        match joined {
            Ok((id, settled)) => {
                self.tasks.remove(&id);
                self.sources.remove(&settled.src);
                Some(settled)
            }
            Err(err) => {
                let src = self.tasks.remove(&err.id())?;
                self.sources.remove(&src);
                warn!(%src, "image check did not complete: {err}");
                Some(ImageSettled {
                    src,
                    outcome: LoadOutcome::Failed,
                })
            }
        }
    }
}

/// Settles image load requests with at most `max_in_flight` checks running.
///
/// Duplicate requests for a source already in flight are coalesced.
pub async fn run(
    mut load_rx: Receiver<LoadImage>,
    settled_tx: Sender<ImageSettled>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let mut in_flight = InFlight::default();
    let mut tasks: JoinSet<ImageSettled> = JoinSet::new();

    loop {
        select! {
            _ = cancel.cancelled() => break,

            Some(LoadImage(image)) = load_rx.recv(), if in_flight.len() < max_in_flight => {
                in_flight.start(image.src, &mut tasks);
            }

            Some(joined) = tasks.join_next_with_id() => {
                if let Some(settled) = in_flight.finish(joined) {
                    debug!(src = %settled.src, outcome = ?settled.outcome, "image settled");
                    if settled_tx.send(settled).await.is_err() {
                        break;
                    }
                }
            }

            else => {
                if in_flight.is_empty() {
                    break;
                }
            }
        }
    }
    Ok(())
}
