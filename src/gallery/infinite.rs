use tracing::debug;

/// Scroll-position trigger for appending more gallery content.
///
/// Fires once when the viewport bottom comes within `threshold` px of the
/// document bottom, then stays quiet until the requested batch arrives.
#[derive(Debug, Clone)]
pub struct InfiniteScroll {
    threshold: f32,
    in_flight: bool,
    exhausted: bool,
}

impl InfiniteScroll {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            in_flight: false,
            exhausted: false,
        }
    }

    /// Returns `true` when a load should be requested now.
    pub fn on_scroll(&mut self, scroll_top: f32, viewport_height: f32, document_height: f32) -> bool {
        if self.in_flight || self.exhausted {
            return false;
        }
        let near_bottom = scroll_top + viewport_height >= document_height - self.threshold;
        if near_bottom {
            debug!(scroll_top, document_height, "infinite scroll: requesting more content");
            self.in_flight = true;
        }
        near_bottom
    }

    /// Re-arm after a batch was appended; an empty batch ends the feed.
    pub fn on_batch(&mut self, appended: usize) {
        self.in_flight = false;
        if appended == 0 {
            debug!("infinite scroll: content provider exhausted");
            self.exhausted = true;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_within_threshold_once_until_batch() {
        let mut feed = InfiniteScroll::new(500.0);
        assert!(!feed.on_scroll(0.0, 600.0, 2000.0));
        assert!(feed.on_scroll(900.0, 600.0, 2000.0));
        assert!(!feed.on_scroll(950.0, 600.0, 2000.0));
        feed.on_batch(6);
        assert!(feed.on_scroll(950.0, 600.0, 2000.0));
    }

    #[test]
    fn empty_batch_stops_the_feed() {
        let mut feed = InfiniteScroll::new(500.0);
        assert!(feed.on_scroll(0.0, 600.0, 800.0));
        feed.on_batch(0);
        assert!(feed.is_exhausted());
        assert!(!feed.on_scroll(0.0, 600.0, 800.0));
    }
}
