use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::align::Cue;
use crate::error::Result;

/// Alignment diagnostics written next to the subtitles on request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugDump {
    pub audio: String,
    pub transcript: String,
    pub translation: Option<String>,
    pub model: String,
    pub cues: Vec<DebugCue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugCue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub translation: Option<String>,
    pub fallback: bool,
}

impl DebugDump {
    pub fn new(
        audio: &Path,
        transcript: &Path,
        translation: Option<&Path>,
        model: &str,
        cues: &[Cue<'_>],
    ) -> Self {
        Self {
            audio: audio.display().to_string(),
            transcript: transcript.display().to_string(),
            translation: translation.map(|p| p.display().to_string()),
            model: model.to_string(),
            cues: cues
                .iter()
                .map(|cue| DebugCue {
                    index: cue.transcript.index,
                    start: cue.start,
                    end: cue.end,
                    text: cue.transcript.text.clone(),
                    translation: cue.transcript.translation.clone(),
                    fallback: cue.is_fallback(),
                })
                .collect(),
        }
    }

    pub async fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, serde_json::to_string_pretty(self)?).await?;
        info!("Wrote alignment diagnostics to {}", path.display());
        Ok(())
    }
}
