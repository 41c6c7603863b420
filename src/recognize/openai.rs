// OpenAI Whisper Python implementation
// Runs the `whisper` command line tool with word-level timestamps enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::RecognizerConfig;
use crate::error::{CuesyncError, Result};
use super::{Recognizer, common::{RawWord, Word, WordMapper, build_word_stream}};

/// OpenAI Whisper JSON output with `--word_timestamps True`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: String,
    pub segments: Vec<OpenAIWhisperSegment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<OpenAIWhisperWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub probability: Option<f64>,
}

/// Mapper for OpenAI Whisper format to raw words
pub struct OpenAIWhisperMapper;

impl WordMapper<OpenAIWhisperOutput> for OpenAIWhisperMapper {
    fn to_raw_words(whisper_output: OpenAIWhisperOutput) -> Vec<RawWord> {
        whisper_output
            .segments
            .into_iter()
            .flat_map(|segment| segment.words)
            .map(|word| RawWord {
                text: word.word,
                start: word.start,
                end: word.end,
            })
            .collect()
    }
}

pub struct OpenAIRecognizer {
    config: RecognizerConfig,
}

impl OpenAIRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, output_dir: &Path, language: &str) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--language").arg(language)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json")
            .arg("--word_timestamps").arg("True")
            .arg("--beam_size").arg("5")
            .arg("--verbose").arg("False");

        if self.config.device != "auto" {
            cmd.arg("--device").arg(&self.config.device);
        }

        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Recognizer for OpenAIRecognizer {
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<Vec<Word>> {
        info!(
            "Recognizing {} with OpenAI Whisper (model: {}, language: {})",
            audio_path.display(),
            self.config.model,
            language
        );

        let temp_dir = tempfile::tempdir()
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let output = self
            .build_command(audio_path, output_dir, language)
            .output()
            .await
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to execute {}: {}", self.config.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CuesyncError::Recognizer(format!("Whisper failed: {}", stderr)));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| CuesyncError::Recognizer("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));
        debug!("Reading whisper output from {}", json_file.display());

        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to read output: {}", e)))?;

        let whisper_output: OpenAIWhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to parse Whisper JSON: {}", e)))?;

        build_word_stream(OpenAIWhisperMapper::to_raw_words(whisper_output))
    }

    fn name(&self) -> String {
        "openai".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "text": " Olá mundo. Tudo bem?",
        "segments": [
            {"id": 0, "seek": 0, "start": 0.0, "end": 1.0, "text": " Olá mundo.",
             "words": [
                {"word": " Olá", "start": 0.0, "end": 0.5, "probability": 0.91},
                {"word": " mundo.", "start": 0.5, "end": 1.0, "probability": 0.88}
             ]},
            {"id": 1, "seek": 0, "start": 1.2, "end": 2.0, "text": " Tudo bem?",
             "words": [
                {"word": " Tudo", "start": 1.2, "end": 1.5, "probability": 0.95},
                {"word": " bem?", "start": 1.5, "end": 2.0, "probability": 0.97}
             ]},
            {"id": 2, "seek": 0, "start": 2.0, "end": 2.1, "text": ""}
        ],
        "language": "pt"
    }"#;

    #[test]
    fn test_mapper_flattens_segment_words_in_order() {
        let parsed: OpenAIWhisperOutput = serde_json::from_str(SAMPLE).unwrap();
        let raw = OpenAIWhisperMapper::to_raw_words(parsed);

        assert_eq!(raw.len(), 4);
        assert_eq!(raw[0].text, " Olá");
        assert_eq!(raw[3].start, 1.5);

        let words = build_word_stream(raw).unwrap();
        let normalized: Vec<&str> = words.iter().map(|w| w.normalized.as_str()).collect();
        assert_eq!(normalized, vec!["ola", "mundo", "tudo", "bem"]);
    }

    #[test]
    fn test_device_flag_only_when_explicit() {
        let mut config = RecognizerConfig::default();
        let recognizer = OpenAIRecognizer::new(config.clone());
        let cmd = recognizer.build_command(Path::new("a.mp3"), Path::new("/tmp/out"), "pt");
        let args: Vec<String> = cmd.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert!(!args.contains(&"--device".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--word_timestamps" && w[1] == "True"));

        config.device = "cuda".to_string();
        let recognizer = OpenAIRecognizer::new(config);
        let cmd = recognizer.build_command(Path::new("a.mp3"), Path::new("/tmp/out"), "pt");
        let args: Vec<String> = cmd.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert!(args.windows(2).any(|w| w[0] == "--device" && w[1] == "cuda"));
    }
}
