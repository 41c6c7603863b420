// whisper.cpp implementation
// `-ml 1 -sow` makes whisper-cli emit one word per segment, so segment
// offsets are word timestamps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::RecognizerConfig;
use crate::error::{CuesyncError, Result};
use crate::setup::resolve_model_path;
use super::{Recognizer, common::{RawWord, Word, WordMapper, build_word_stream}};

/// whisper.cpp JSON output (`-oj`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: Option<WhisperCppResult>,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

/// Segment bounds in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

/// Mapper for whisper.cpp format to raw words
pub struct WhisperCppMapper;

impl WordMapper<WhisperCppOutput> for WhisperCppMapper {
    fn to_raw_words(whisper_output: WhisperCppOutput) -> Vec<RawWord> {
        whisper_output
            .transcription
            .into_iter()
            .map(|segment| RawWord {
                text: segment.text,
                start: segment.offsets.from.max(0) as f64 / 1000.0,
                end: segment.offsets.to.max(0) as f64 / 1000.0,
            })
            .collect()
    }
}

pub struct WhisperCppRecognizer {
    config: RecognizerConfig,
}

impl WhisperCppRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    fn model_path(&self) -> PathBuf {
        resolve_model_path(&self.config.models_dir, &self.config.model)
    }

    fn build_command(&self, audio_path: &Path, output_prefix: &Path, language: &str) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("-m").arg(self.model_path())
            .arg("-f").arg(audio_path)
            .arg("-l").arg(language)
            .arg("-ml").arg("1")
            .arg("-sow")
            .arg("-bs").arg("5")
            .arg("-oj")
            .arg("-of").arg(output_prefix)
            .arg("-np");

        if self.config.device == "cpu" {
            cmd.arg("-ng");
        }

        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Recognizer for WhisperCppRecognizer {
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<Vec<Word>> {
        let model_path = self.model_path();
        info!(
            "Recognizing {} with whisper.cpp (model: {}, language: {})",
            audio_path.display(),
            model_path.display(),
            language
        );

        if !model_path.exists() {
            return Err(CuesyncError::Recognizer(format!(
                "whisper.cpp model not found at {}; run `cuesync models --download`",
                model_path.display()
            )));
        }

        let temp_dir = tempfile::tempdir()
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to create temp directory: {}", e)))?;
        let output_prefix = temp_dir.path().join("words");

        let output = self
            .build_command(audio_path, &output_prefix, language)
            .output()
            .await
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to execute {}: {}", self.config.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CuesyncError::Recognizer(format!("whisper-cli failed: {}", stderr)));
        }

        let json_file = output_prefix.with_extension("json");
        debug!("Reading whisper.cpp output from {}", json_file.display());

        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to read output: {}", e)))?;

        let whisper_output: WhisperCppOutput = serde_json::from_str(&json_content)
            .map_err(|e| CuesyncError::Recognizer(format!("Failed to parse whisper.cpp JSON: {}", e)))?;

        build_word_stream(WhisperCppMapper::to_raw_words(whisper_output))
    }

    fn name(&self) -> String {
        "whisper-cpp".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "systeminfo": "AVX = 1",
        "model": {"type": "small"},
        "result": {"language": "pt"},
        "transcription": [
            {"timestamps": {"from": "00:00:00,000", "to": "00:00:00,000"}, "offsets": {"from": 0, "to": 0}, "text": ""},
            {"timestamps": {"from": "00:00:00,000", "to": "00:00:00,480"}, "offsets": {"from": 0, "to": 480}, "text": " Olá"},
            {"timestamps": {"from": "00:00:00,480", "to": "00:00:01,020"}, "offsets": {"from": 480, "to": 1020}, "text": " mundo"},
            {"timestamps": {"from": "00:00:01,020", "to": "00:00:01,030"}, "offsets": {"from": 1020, "to": 1030}, "text": "."}
        ]
    }"#;

    #[test]
    fn test_mapper_converts_offsets_to_seconds() {
        let parsed: WhisperCppOutput = serde_json::from_str(SAMPLE).unwrap();
        let words = build_word_stream(WhisperCppMapper::to_raw_words(parsed)).unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].normalized, "ola");
        assert!((words[0].end - 0.48).abs() < 1e-9);
        assert!((words[1].start - 0.48).abs() < 1e-9);
        assert!((words[1].end - 1.02).abs() < 1e-9);
    }

    #[test]
    fn test_command_resolves_model_and_device() {
        let config = RecognizerConfig {
            model: "base".to_string(),
            device: "cpu".to_string(),
            models_dir: PathBuf::from("/models"),
            ..RecognizerConfig::default()
        };
        let recognizer = WhisperCppRecognizer::new(config);
        let cmd = recognizer.build_command(Path::new("a.wav"), Path::new("/tmp/words"), "pt");
        let args: Vec<String> = cmd.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert!(args.windows(2).any(|w| w[0] == "-m" && w[1] == "/models/ggml-base.bin"));
        assert!(args.contains(&"-sow".to_string()));
        assert!(args.contains(&"-ng".to_string()));
    }
}
