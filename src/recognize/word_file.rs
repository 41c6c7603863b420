use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CuesyncError, Result};
use super::{Recognizer, common::{RawWord, Word, build_word_stream, read_word_stream}};

/// Replays a word stream exported by an earlier recognition run.
///
/// The stored words are renormalized, so files edited by hand or produced by
/// other tools only need `text`, `start` and `end` to be meaningful.
pub struct WordFileRecognizer {
    path: PathBuf,
}

impl WordFileRecognizer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Recognizer for WordFileRecognizer {
    async fn transcribe(&self, audio_path: &Path, _language: &str) -> Result<Vec<Word>> {
        info!(
            "Using recorded word stream {} for {}",
            self.path.display(),
            audio_path.display()
        );
        if self.path.as_os_str().is_empty() {
            return Err(CuesyncError::Config("No word stream file configured".to_string()));
        }

        let stored = read_word_stream(&self.path).await?;
        build_word_stream(stored.into_iter().map(|word| RawWord {
            text: word.text,
            start: word.start,
            end: word.end,
        }))
    }

    fn name(&self) -> String {
        "word-file".to_string()
    }
}
