use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, CuesyncError};

fn default_search_window() -> usize {
    30
}

fn default_match_threshold() -> f64 {
    0.6
}

fn default_min_gap() -> f64 {
    0.001
}

fn default_min_fallback_duration() -> f64 {
    0.3
}

fn default_timeout_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recognizer: RecognizerConfig,
    pub alignment: AlignmentConfig,
    pub output: OutputConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Speech recognition backend
    pub implementation: RecognizerImplementation,
    /// Path to the recognizer binary (`whisper` or `whisper-cli`)
    pub binary_path: String,
    /// Model name or path (e.g. "small", or a ggml file for whisper.cpp)
    pub model: String,
    /// Inference device selector: auto, cpu, cuda
    pub device: String,
    /// Language code of the audio
    pub language: String,
    /// Directory holding downloaded whisper.cpp models
    pub models_dir: PathBuf,
    /// Upper bound for a single recognition run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Word stream JSON used by the `WordFile` backend
    pub words_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognizerImplementation {
    /// OpenAI Whisper Python command line tool
    OpenAI,
    /// whisper.cpp `whisper-cli`
    WhisperCpp,
    /// Previously exported word stream
    WordFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Number of recognized words searched ahead of the cursor for each token
    #[serde(default = "default_search_window")]
    pub search_window: usize,
    /// Minimum similarity for a non-exact match to be accepted
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Gap enforced between consecutive cues, in seconds
    #[serde(default = "default_min_gap")]
    pub min_gap: f64,
    /// Lower bound for the duration given to a degenerate cue, in seconds
    #[serde(default = "default_min_fallback_duration")]
    pub min_fallback_duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSS class wrapping the transcript text in WebVTT cues
    pub source_class: String,
    /// CSS class wrapping the translation in WebVTT cues
    pub translation_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse word streams recognized earlier for the same audio and settings
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            implementation: RecognizerImplementation::OpenAI,
            binary_path: "whisper".to_string(),
            model: "small".to_string(),
            device: "auto".to_string(),
            language: "pt".to_string(),
            models_dir: PathBuf::from(".cuesync").join("models"),
            timeout_secs: default_timeout_secs(),
            words_path: None,
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            search_window: default_search_window(),
            match_threshold: default_match_threshold(),
            min_gap: default_min_gap(),
            min_fallback_duration: default_min_fallback_duration(),
        }
    }
}

impl AlignmentConfig {
    /// Replace out-of-range values with their defaults so cues always keep a
    /// positive gap and duration.
    pub fn sanitized(self) -> Self {
        let positive_or = |value: f64, default: f64| if value > 0.0 && value.is_finite() { value } else { default };

        Self {
            search_window: if self.search_window == 0 { default_search_window() } else { self.search_window },
            match_threshold: if self.match_threshold.is_nan() {
                default_match_threshold()
            } else {
                self.match_threshold.clamp(0.0, 1.0)
            },
            min_gap: positive_or(self.min_gap, default_min_gap()),
            min_fallback_duration: positive_or(self.min_fallback_duration, default_min_fallback_duration()),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            source_class: "pt".to_string(),
            translation_class: "en".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".cuesync").join("cache").join("words"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CuesyncError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CuesyncError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CuesyncError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CuesyncError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let alignment = &self.alignment;
        if alignment.search_window == 0 {
            return Err(CuesyncError::Config("alignment.search_window must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&alignment.match_threshold) {
            return Err(CuesyncError::Config(format!(
                "alignment.match_threshold must be within [0, 1], got {}",
                alignment.match_threshold
            )));
        }
        let positive = |value: f64| value > 0.0;
        if !positive(alignment.min_gap) || !positive(alignment.min_fallback_duration) {
            return Err(CuesyncError::Config(
                "alignment.min_gap and alignment.min_fallback_duration must be > 0".to_string(),
            ));
        }
        if self.recognizer.implementation == RecognizerImplementation::WordFile
            && self.recognizer.words_path.is_none()
        {
            return Err(CuesyncError::Config(
                "recognizer.words_path is required for the WordFile recognizer".to_string(),
            ));
        }
        Ok(())
    }
}
