use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{CuesyncError, Result};

/// One logical unit of the reference transcript, usually a speaker turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub index: usize,
    pub text: String,
    pub translation: Option<String>,
}

/// Trimmed, non-empty lines that are not `#` comments.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Pair transcript lines with their translation, if one is given.
///
/// Both sources must have the same number of content lines.
pub fn build_lines(source: &str, translation: Option<&str>) -> Result<Vec<TranscriptLine>> {
    let source_lines = parse_lines(source);

    let translations: Vec<Option<String>> = match translation {
        Some(content) => {
            let translated = parse_lines(content);
            if translated.len() != source_lines.len() {
                return Err(CuesyncError::TranslationMismatch {
                    transcript: source_lines.len(),
                    translation: translated.len(),
                });
            }
            translated.into_iter().map(Some).collect()
        }
        None => vec![None; source_lines.len()],
    };

    Ok(source_lines
        .into_iter()
        .zip(translations)
        .enumerate()
        .map(|(index, (text, translation))| TranscriptLine {
            index,
            text,
            translation,
        })
        .collect())
}

/// Read the transcript and optional translation from disk.
pub async fn load_transcript<P: AsRef<Path>>(
    transcript_path: P,
    translation_path: Option<P>,
) -> Result<Vec<TranscriptLine>> {
    let transcript_path = transcript_path.as_ref();
    info!("Loading transcript: {}", transcript_path.display());

    let source = read_text(transcript_path).await?;
    let translation = match translation_path {
        Some(path) => {
            let path = path.as_ref();
            info!("Loading translation: {}", path.display());
            Some(read_text(path).await?)
        }
        None => None,
    };

    let lines = build_lines(&source, translation.as_deref())?;
    info!("Loaded {} transcript lines", lines.len());
    Ok(lines)
}

async fn read_text(path: &Path) -> Result<String> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(CuesyncError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path).await?)
}
