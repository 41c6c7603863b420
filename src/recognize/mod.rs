// Speech recognition backends
//
// The aligner only needs one flat, time-ordered word stream. Each backend runs
// an external recognizer, maps its native output to `RawWord`s through a
// `WordMapper`, and hands them to `build_word_stream`:
// - OpenAI: the `whisper` Python command line tool with word timestamps
// - WhisperCpp: `whisper-cli` splitting output into one word per segment
// - WordFile: a word stream exported earlier by `cuesync transcribe`

pub mod cache;
pub mod common;
pub mod openai;
pub mod whisper_cpp;
pub mod word_file;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{RecognizerConfig, RecognizerImplementation};
use crate::error::Result;

/// Source of recognized words for an audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize the audio and return its time-ordered word stream.
    ///
    /// An empty stream is reported as `CuesyncError::NoWordsRecognized`.
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<Vec<Word>>;

    /// Short backend label used in logs and cache keys
    fn name(&self) -> String;
}

/// Factory for creating recognizer instances
pub struct RecognizerFactory;

impl RecognizerFactory {
    pub fn create(config: &RecognizerConfig) -> Box<dyn Recognizer> {
        match config.implementation {
            RecognizerImplementation::OpenAI => {
                Box::new(openai::OpenAIRecognizer::new(config.clone()))
            }
            RecognizerImplementation::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppRecognizer::new(config.clone()))
            }
            RecognizerImplementation::WordFile => {
                Box::new(word_file::WordFileRecognizer::new(config.words_path.clone().unwrap_or_default()))
            }
        }
    }
}
