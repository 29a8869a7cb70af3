//! Deferred continuations for the lightbox phases.
//!
//! Every continuation waits on exactly one thing (a number of animation
//! frames, a deadline, or an image settling) and carries the cancellation
//! token of the phase that scheduled it. Cancelled continuations are dropped
//! without running.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
enum Wait {
    Frames(u8),
    Until(Instant),
    Image(String),
}

#[derive(Debug)]
struct Pending<S> {
    wait: Wait,
    step: S,
    token: CancellationToken,
}

/// A continuation whose wait is over.
#[derive(Debug)]
pub struct Ready<S> {
    pub step: S,
    pub token: CancellationToken,
    /// Deadline for timer steps, the polling instant otherwise. Follow-up
    /// steps are scheduled from here so late ticks do not stretch a sequence.
    pub at: Instant,
}

#[derive(Debug)]
pub struct Scheduler<S> {
    pending: Vec<Pending<S>>,
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<S> Scheduler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run after `frames` animation-frame callbacks (at least one).
    pub fn after_frames(&mut self, frames: u8, step: S, token: &CancellationToken) {
        self.push(Wait::Frames(frames.max(1)), step, token);
    }

    pub fn at(&mut self, deadline: Instant, step: S, token: &CancellationToken) {
        self.push(Wait::Until(deadline), step, token);
    }

    pub fn on_image(&mut self, src: impl Into<String>, step: S, token: &CancellationToken) {
        self.push(Wait::Image(src.into()), step, token);
    }

    fn push(&mut self, wait: Wait, step: S, token: &CancellationToken) {
        self.pending.push(Pending {
            wait,
            step,
            token: token.clone(),
        });
    }

    /// One animation-frame callback elapsed.
    pub fn frame(&mut self, now: Instant) -> Vec<Ready<S>> {
        self.prune();
        for p in &mut self.pending {
            if let Wait::Frames(n) = &mut p.wait {
                *n = n.saturating_sub(1);
            }
        }
        self.take_where(|wait| matches!(wait, Wait::Frames(0)), now)
    }

    /// Timer continuations due at `now`, earliest deadline first.
    pub fn due(&mut self, now: Instant) -> Vec<Ready<S>> {
        self.prune();
        let mut ready = self.take_where(
            |wait| matches!(wait, Wait::Until(deadline) if *deadline <= now),
            now,
        );
        ready.sort_by_key(|r| r.at);
        ready
    }

    pub fn image_settled(&mut self, src: &str, now: Instant) -> Vec<Ready<S>> {
        self.prune();
        self.take_where(|wait| matches!(wait, Wait::Image(s) if s == src), now)
    }

    /// Earliest live timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter(|p| !p.token.is_cancelled())
            .filter_map(|p| match p.wait {
                Wait::Until(deadline) => Some(deadline),
                _ => None,
            })
            .min()
    }

    pub fn wants_frames(&self) -> bool {
        self.pending
            .iter()
            .any(|p| !p.token.is_cancelled() && matches!(p.wait, Wait::Frames(_)))
    }

    /// Number of live continuations.
    pub fn len(&self) -> usize {
        self.pending
            .iter()
            .filter(|p| !p.token.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.pending.retain(|p| !p.token.is_cancelled());
    }

    fn take_where(&mut self, pred: impl Fn(&Wait) -> bool, now: Instant) -> Vec<Ready<S>> {
        let mut ready = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if pred(&self.pending[i].wait) {
                let Pending { wait, step, token } = self.pending.remove(i);
                let at = match wait {
                    Wait::Until(deadline) => deadline,
                    _ => now,
                };
                ready.push(Ready { step, token, at });
            } else {
                i += 1;
            }
        }
        ready
    }
}
