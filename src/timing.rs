//! Keeps cue spans strictly ordered and non-empty.

use crate::config::AlignmentConfig;

/// Settles provisional cue spans one line at a time.
///
/// Corrections are cumulative: each settled end becomes the lower bound for
/// the next start, so this must run per line and in order.
#[derive(Debug, Clone)]
pub struct TimingNormalizer {
    min_gap: f64,
    fallback_duration: f64,
    previous_end: Option<f64>,
}

impl TimingNormalizer {
    pub fn new(config: &AlignmentConfig, average_word_duration: f64) -> Self {
        Self {
            min_gap: config.min_gap,
            fallback_duration: average_word_duration.max(config.min_fallback_duration),
            previous_end: None,
        }
    }

    /// Duration given to a span that collapsed after clamping.
    pub fn fallback_duration(&self) -> f64 {
        self.fallback_duration
    }

    pub fn settle(&mut self, start: f64, end: f64) -> (f64, f64) {
        let start = match self.previous_end {
            Some(previous_end) => start.max(previous_end + self.min_gap),
            None => start,
        };
        let end = if end <= start {
            start + self.fallback_duration
        } else {
            end
        };

        self.previous_end = Some(end);
        (start, end)
    }
}
