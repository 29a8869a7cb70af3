use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{MissedTickBehavior, interval, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::events::{Effect, Handled, ImageSettled, InputEvent, LoadImage, Output};
use crate::page::{GalleryPage, PageScene};

/// Drives a [`GalleryPage`] in real time.
///
/// Animation frames tick at `frame_interval` only while a continuation is
/// waiting on one; timers sleep until the page's next deadline. Load
/// requests go to the loader, everything else is published on `output_tx`
/// together with every scene change. Returns the page once cancelled.
pub async fn run(
    mut page: GalleryPage,
    mut input_rx: Receiver<InputEvent>,
    mut settled_rx: Receiver<ImageSettled>,
    to_loader: Sender<LoadImage>,
    output_tx: Sender<Output>,
    frame_interval: Duration,
    cancel: CancellationToken,
) -> Result<GalleryPage> {
    let started = Instant::now();
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pending_loads: VecDeque<LoadImage> = VecDeque::new();
    let mut last_scene: Option<PageScene> = None;

    let mut open = publish(&mut page, started, &mut pending_loads, &mut last_scene, &output_tx).await;
    while open {
        let deadline = page.next_deadline();
        let wants_frames = page.wants_frames();
        select! {
            _ = cancel.cancelled() => break,

            Some(event) = input_rx.recv() => {
                let now = Instant::now();
                page.on_tick(now);
                let handled = page.handle(&event, now);
                debug!(?event, consumed = handled == Handled::Consumed, "input dispatched");
            }

            Some(settled) = settled_rx.recv() => {
                page.on_image_settled(&settled.src, settled.outcome, Instant::now());
            }

            _ = frames.tick(), if wants_frames => {
                trace!("animation frame");
                page.on_animation_frame(Instant::now());
            }

            _ = sleep_until(deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std)), if deadline.is_some() => {
                page.on_tick(Instant::now());
            }

            permit = to_loader.reserve(), if !pending_loads.is_empty() => {
                match permit {
                    Ok(permit) => {
                        if let Some(load) = pending_loads.pop_front() {
                            permit.send(load);
                        }
                    }
                    Err(_) => {
                        debug!("loader gone; dropping {} load requests", pending_loads.len());
                        pending_loads.clear();
                    }
                }
            }
        }
        open = publish(&mut page, started, &mut pending_loads, &mut last_scene, &output_tx).await;
    }
    info!("lightbox driver stopped");
    Ok(page)
}

/// Returns `false` once nobody listens for output.
async fn publish(
    page: &mut GalleryPage,
    started: Instant,
    pending_loads: &mut VecDeque<LoadImage>,
    last_scene: &mut Option<PageScene>,
    output_tx: &Sender<Output>,
) -> bool {
    let at_ms = started.elapsed().as_millis() as u64;
    for effect in page.drain_effects() {
        if let Effect::LoadImage { image } = &effect {
            pending_loads.push_back(LoadImage(image.clone()));
        }
        if output_tx.send(Output::Effect { at_ms, effect }).await.is_err() {
            return false;
        }
    }
    let scene = page.scene();
    if last_scene.as_ref() != Some(&scene) {
        *last_scene = Some(scene.clone());
        if output_tx.send(Output::Frame { at_ms, scene }).await.is_err() {
            return false;
        }
    }
    true
}
