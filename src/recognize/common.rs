use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CuesyncError, Result};
use crate::text::normalize_token;

/// A recognized word with its normalized form and time span in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub normalized: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Backend-agnostic recognized word before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Trait for converting backend-specific output into raw words
pub trait WordMapper<T> {
    fn to_raw_words(service_output: T) -> Vec<RawWord>;
}

/// Normalize raw recognizer output into the word stream consumed by the aligner.
///
/// Words that normalize to nothing are dropped, and an inverted span is
/// collapsed onto its start. Fails when no usable word remains.
pub fn build_word_stream<I>(raw: I) -> Result<Vec<Word>>
where
    I: IntoIterator<Item = RawWord>,
{
    let mut dropped = 0usize;
    let words: Vec<Word> = raw
        .into_iter()
        .filter_map(|word| {
            let normalized = normalize_token(&word.text);
            if normalized.is_empty() {
                dropped += 1;
                return None;
            }
            let start = word.start.max(0.0);
            Some(Word {
                text: word.text,
                normalized,
                start,
                end: word.end.max(start),
            })
        })
        .collect();

    if dropped > 0 {
        debug!("Dropped {} recognized tokens without comparable text", dropped);
    }

    if words.is_empty() {
        return Err(CuesyncError::NoWordsRecognized);
    }

    info!("Word stream ready: {} words", words.len());
    Ok(words)
}

/// Mean duration over the whole stream; zero for an empty stream.
pub fn average_word_duration(words: &[Word]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    words.iter().map(Word::duration).sum::<f64>() / words.len() as f64
}

/// Read a word stream previously exported as JSON.
pub async fn read_word_stream<P: AsRef<Path>>(path: P) -> Result<Vec<Word>> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(CuesyncError::FileNotFound(path.display().to_string()));
    }
    let content = tokio::fs::read_to_string(path).await?;
    let words: Vec<Word> = serde_json::from_str(&content)?;
    Ok(words)
}

/// Export a word stream as pretty JSON.
pub async fn write_word_stream<P: AsRef<Path>>(words: &[Word], path: P) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(words)?;
    tokio::fs::write(path, content).await?;
    info!("Wrote {} words to {}", words.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, start: f64, end: f64) -> RawWord {
        RawWord {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_build_word_stream_normalizes_and_drops_empty() {
        let words = build_word_stream(vec![
            raw(" Olá,", 0.0, 0.4),
            raw(" ...", 0.4, 0.5),
            raw(" Mundo!", 0.5, 1.0),
        ])
        .unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].normalized, "ola");
        assert_eq!(words[0].text, " Olá,");
        assert_eq!(words[1].normalized, "mundo");
    }

    #[test]
    fn test_build_word_stream_repairs_inverted_span() {
        let words = build_word_stream(vec![raw("sim", 2.0, 1.5)]).unwrap();
        assert_eq!(words[0].start, 2.0);
        assert_eq!(words[0].end, 2.0);
    }

    #[test]
    fn test_build_word_stream_empty_is_fatal() {
        let err = build_word_stream(vec![raw("?!", 0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, CuesyncError::NoWordsRecognized));

        let err = build_word_stream(Vec::new()).unwrap_err();
        assert!(matches!(err, CuesyncError::NoWordsRecognized));
    }

    #[test]
    fn test_average_word_duration() {
        let words = build_word_stream(vec![raw("a", 0.0, 0.2), raw("b", 1.0, 1.6)]).unwrap();
        assert!((average_word_duration(&words) - 0.4).abs() < 1e-9);
        assert_eq!(average_word_duration(&[]), 0.0);
    }

    #[tokio::test]
    async fn test_word_stream_json_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        let words = build_word_stream(vec![raw("olá", 0.0, 0.5), raw("mundo", 0.5, 1.0)]).unwrap();

        write_word_stream(&words, &path).await.unwrap();
        let loaded = read_word_stream(&path).await.unwrap();
        assert_eq!(loaded, words);
    }
}
