use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuesyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(
        "The transcript and translation must have the same number of non-empty lines \
         (transcript: {transcript}, translation: {translation})"
    )]
    TranslationMismatch { transcript: usize, translation: usize },

    #[error("No words were recognized in the audio. Check the language parameter and audio quality.")]
    NoWordsRecognized,

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Recognition timed out after {0} seconds")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

pub type Result<T> = std::result::Result<T, CuesyncError>;
