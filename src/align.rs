//! Greedy, windowed alignment of transcript lines against a recognized word
//! stream.
//!
//! Every line is matched token by token against a bounded window ahead of a
//! single forward cursor. Matches never move the cursor backwards, so each
//! recognized word is consumed at most once and cue order follows transcript
//! order. Lines without any accepted match get a fallback span estimated from
//! the cursor position and the line's token count. Spans are then settled by
//! [`TimingNormalizer`] so the cue sequence is strictly increasing.
//!
//! This is a best-effort match, not forced alignment: the window bounds how
//! far recognition drift can be recovered, in exchange for linear cost.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AlignmentConfig;
use crate::error::{CuesyncError, Result};
use crate::recognize::{Word, average_word_duration};
use crate::text::{similarity, tokenize};
use crate::timing::TimingNormalizer;
use crate::transcript::TranscriptLine;

/// How a cue's span was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentMethod {
    /// At least one token matched a recognized word
    Matched { matched: usize, tokens: usize },
    /// No token matched; span estimated from the cursor
    Fallback { tokens: usize },
}

/// One timed subtitle entry for a transcript line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue<'a> {
    pub identifier: String,
    pub start: f64,
    pub end: f64,
    pub transcript: &'a TranscriptLine,
    pub method: AlignmentMethod,
}

impl Cue<'_> {
    pub fn is_fallback(&self) -> bool {
        matches!(self.method, AlignmentMethod::Fallback { .. })
    }
}

/// Forward-only position in the word stream
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    pointer: usize,
}

pub struct Aligner {
    config: AlignmentConfig,
}

impl Aligner {
    /// Out-of-range settings fall back to their defaults.
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    /// Produce exactly one cue per line, in line order.
    ///
    /// `words` must be non-empty and ordered by start time.
    pub fn align<'a>(&self, lines: &'a [TranscriptLine], words: &[Word]) -> Result<Vec<Cue<'a>>> {
        if words.is_empty() {
            return Err(CuesyncError::NoWordsRecognized);
        }

        let mut cursor = Cursor::default();
        let mut timing = TimingNormalizer::new(&self.config, average_word_duration(words));
        let mut cues = Vec::with_capacity(lines.len());

        for line in lines {
            let (start, end, method) = self.align_line(line, words, &mut cursor);
            let (start, end) = timing.settle(start, end);

            debug!(
                "line {}: {:.3} --> {:.3} ({:?}, cursor at {})",
                line.index, start, end, method, cursor.pointer
            );

            cues.push(Cue {
                identifier: format!("line-{}", line.index),
                start,
                end,
                transcript: line,
                method,
            });
        }

        let fallbacks = cues.iter().filter(|cue| cue.is_fallback()).count();
        info!(
            "Aligned {} lines against {} words ({} matched, {} fallback)",
            cues.len(),
            words.len(),
            cues.len() - fallbacks,
            fallbacks
        );

        Ok(cues)
    }

    /// Provisional span for one line; advances the cursor.
    fn align_line(&self, line: &TranscriptLine, words: &[Word], cursor: &mut Cursor) -> (f64, f64, AlignmentMethod) {
        let tokens = tokenize(&line.text);
        let mut first_match: Option<usize> = None;
        let mut last_match: Option<usize> = None;
        let mut matched = 0;

        for token in &tokens {
            if let Some(index) = self.find_match(token, words, cursor.pointer) {
                first_match.get_or_insert(index);
                last_match = Some(index);
                matched += 1;
                cursor.pointer = index + 1;
            }
        }

        if let (Some(first), Some(last)) = (first_match, last_match) {
            let method = AlignmentMethod::Matched {
                matched,
                tokens: tokens.len(),
            };
            return (words[first].start, words[last].end, method);
        }

        let last_index = words.len() - 1;
        let start_index = cursor.pointer.min(last_index);
        let end_index = (start_index + tokens.len().max(1)).min(last_index);
        cursor.pointer = end_index + 1;

        (
            words[start_index].start,
            words[end_index].end,
            AlignmentMethod::Fallback { tokens: tokens.len() },
        )
    }

    /// Best candidate for `token` in the window starting at `pointer`.
    ///
    /// An exact match wins immediately. Otherwise the earliest candidate with
    /// the highest similarity is taken, provided it reaches the threshold.
    fn find_match(&self, token: &str, words: &[Word], pointer: usize) -> Option<usize> {
        let window_end = pointer.saturating_add(self.config.search_window).min(words.len());
        let mut best: Option<(usize, f64)> = None;

        for (index, word) in words.iter().enumerate().take(window_end).skip(pointer) {
            let candidate = word.normalized.as_str();
            if candidate.is_empty() {
                continue;
            }
            if candidate == token {
                return Some(index);
            }

            let score = similarity(token, candidate);
            if score > best.map_or(0.0, |(_, best_score)| best_score) {
                best = Some((index, score));
            }
        }

        best.filter(|(_, score)| *score >= self.config.match_threshold)
            .map(|(index, _)| index)
    }
}
