use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Incremental indicator fed one scalar per step.
///
/// Object-safe on purpose: rule agents that mix indicators can store them as
/// `Box<dyn StreamingIndicator>` without generics leaking into the `Agent`
/// trait.
pub trait StreamingIndicator: std::fmt::Debug + Send + Sync {
    /// Feeds the next value (typically a close price) and returns the
    /// indicator output, or `None` while the warm-up window is still filling.
    fn update(&mut self, value: f64) -> Option<f64>;

    /// Discards all accumulated history, e.g. between episodes.
    fn reset(&mut self);
}

// ================================================================================================
// SMA: Simple Moving Average
// ================================================================================================

/// Sliding-window mean maintained in O(1) per update via a running sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingSma {
    window_size: usize,
    buffer: VecDeque<f64>,
    sum: f64,
}

impl StreamingSma {
    pub fn new(window_size: u16) -> Self {
        let size = window_size as usize;
        Self {
            window_size: size,
            buffer: VecDeque::with_capacity(size),
            sum: 0.0,
        }
    }
}

impl StreamingIndicator for StreamingSma {
    fn update(&mut self, value: f64) -> Option<f64> {
        self.buffer.push_back(value);
        self.sum += value;

        // The buffer never holds more than one extra element, so a single
        // pop keeps the running sum aligned with the window.
        if self.buffer.len() > self.window_size
            && let Some(evicted) = self.buffer.pop_front()
        {
            self.sum -= evicted;
        }

        (self.buffer.len() >= self.window_size).then(|| self.sum / self.window_size as f64)
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warms_up_then_slides() {
        let mut sma = StreamingSma::new(3);
        assert_eq!(sma.update(1.0), None);
        assert_eq!(sma.update(2.0), None);
        assert_eq!(sma.update(3.0), Some(2.0));
        assert_eq!(sma.update(7.0), Some(4.0));
    }

    #[test]
    fn reset_clears_history() {
        let mut sma = StreamingSma::new(2);
        sma.update(10.0);
        sma.update(20.0);
        sma.reset();
        assert_eq!(sma.update(1.0), None);
        assert_eq!(sma.update(3.0), Some(2.0));
    }

    #[test]
    fn output_is_the_mean_of_exactly_the_window() {
        let mut sma = StreamingSma::new(2);
        sma.update(1.0);
        sma.update(100.0);
        // The first value must no longer contribute once evicted.
        assert_eq!(sma.update(200.0), Some(150.0));
    }
}
