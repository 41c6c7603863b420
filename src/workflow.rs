use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::align::Aligner;
use crate::config::{Config, RecognizerImplementation};
use crate::debug_dump::DebugDump;
use crate::error::{CuesyncError, Result};
use crate::recognize::cache::{CacheKey, WordCache};
use crate::recognize::{Recognizer, RecognizerFactory, Word, write_word_stream};
use crate::subtitle::write_subtitles;
use crate::transcript::load_transcript;

/// Inputs and outputs of one alignment run
#[derive(Debug, Clone)]
pub struct AlignRequest {
    pub audio: PathBuf,
    pub transcript: PathBuf,
    pub translation: Option<PathBuf>,
    pub output: PathBuf,
    pub dump_debug: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignSummary {
    pub cues: usize,
    pub fallbacks: usize,
    pub output: PathBuf,
}

pub struct Workflow {
    config: Config,
    recognizer: Box<dyn Recognizer>,
    cache: Option<WordCache>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let recognizer = RecognizerFactory::create(&config.recognizer);
        Ok(Self::with_recognizer(config, recognizer))
    }

    pub fn with_recognizer(config: Config, recognizer: Box<dyn Recognizer>) -> Self {
        let cache = (config.cache.enabled
            && config.recognizer.implementation != RecognizerImplementation::WordFile)
            .then(|| WordCache::new(config.cache.dir.clone()));

        Self {
            config,
            recognizer,
            cache,
        }
    }

    /// Load the transcript, recognize the audio, align and write subtitles.
    ///
    /// The transcript is validated before any recognition work starts.
    pub async fn align(&self, request: &AlignRequest) -> Result<AlignSummary> {
        info!("Aligning {} against {}", request.transcript.display(), request.audio.display());

        let lines = load_transcript(&request.transcript, request.translation.as_ref()).await?;
        if lines.is_empty() {
            warn!("Transcript {} has no content lines", request.transcript.display());
        }

        let words = self.recognize(&request.audio).await?;

        let aligner = Aligner::new(self.config.alignment.clone());
        let cues = aligner.align(&lines, &words)?;

        write_subtitles(&cues, &request.output, &self.config.output).await?;

        if let Some(dump_path) = &request.dump_debug {
            DebugDump::new(
                &request.audio,
                &request.transcript,
                request.translation.as_deref(),
                &self.config.recognizer.model,
                &cues,
            )
            .write(dump_path)
            .await?;
        }

        Ok(AlignSummary {
            cues: cues.len(),
            fallbacks: cues.iter().filter(|cue| cue.is_fallback()).count(),
            output: request.output.clone(),
        })
    }

    /// Recognize the audio and export its word stream as JSON.
    pub async fn transcribe_to_file<P: AsRef<Path>>(&self, audio: P, output: P) -> Result<usize> {
        let words = self.recognize(audio.as_ref()).await?;
        write_word_stream(&words, output).await?;
        Ok(words.len())
    }

    /// Word stream for `audio`, served from the cache when possible.
    pub async fn recognize(&self, audio: &Path) -> Result<Vec<Word>> {
        let recognizer_config = &self.config.recognizer;
        let is_word_file = recognizer_config.implementation == RecognizerImplementation::WordFile;

        if !is_word_file && !tokio::fs::try_exists(audio).await.unwrap_or(false) {
            return Err(CuesyncError::FileNotFound(audio.display().to_string()));
        }

        let name = self.recognizer.name();
        let key = CacheKey {
            audio_path: audio,
            recognizer: &name,
            model: &recognizer_config.model,
            language: &recognizer_config.language,
        };

        if let Some(cache) = &self.cache {
            match cache.load(&key).await {
                Ok(Some(words)) => return Ok(words),
                Ok(None) => {}
                Err(e) => warn!("Word cache unavailable: {}", e),
            }
        }

        let timeout_secs = recognizer_config.timeout_secs;
        let words = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.recognizer.transcribe(audio, &recognizer_config.language),
        )
        .await
        .map_err(|_| CuesyncError::Timeout(timeout_secs))??;

        if words.is_empty() {
            return Err(CuesyncError::NoWordsRecognized);
        }
        info!("Recognized {} words with {}", words.len(), name);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&key, &words).await {
                warn!("Failed to cache word stream: {}", e);
            }
        }

        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognize::MockRecognizer;
    use crate::text::normalize_token;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            text: text.to_string(),
            normalized: normalize_token(text),
            start,
            end,
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        config: Config,
    }

    impl Fixture {
        fn new(transcript: &str, translation: Option<&str>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("talk.mp3"), b"audio").unwrap();
            std::fs::write(dir.path().join("talk.pt.txt"), transcript).unwrap();
            if let Some(translation) = translation {
                std::fs::write(dir.path().join("talk.en.txt"), translation).unwrap();
            }

            let mut config = Config::default();
            config.cache.dir = dir.path().join("cache");
            Self { dir, config }
        }

        fn request(&self, with_translation: bool) -> AlignRequest {
            AlignRequest {
                audio: self.dir.path().join("talk.mp3"),
                transcript: self.dir.path().join("talk.pt.txt"),
                translation: with_translation.then(|| self.dir.path().join("talk.en.txt")),
                output: self.dir.path().join("out").join("talk.vtt"),
                dump_debug: Some(self.dir.path().join("debug.json")),
            }
        }
    }

    fn recognizer_returning(words: Vec<Word>, times: usize) -> MockRecognizer {
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_name().return_const("mock".to_string());
        recognizer
            .expect_transcribe()
            .times(times)
            .returning(move |_, _| Ok(words.clone()));
        recognizer
    }

    #[tokio::test]
    async fn test_align_writes_vtt_and_debug_dump() {
        let fixture = Fixture::new("Olá mundo\n# comment\nTudo bem?\n", Some("Hello world\nAll good?\n"));
        let words = vec![
            word(" Olá", 0.0, 0.5),
            word(" mundo.", 0.5, 1.0),
            word(" Tudo", 1.2, 1.5),
            word(" bem?", 1.5, 2.0),
        ];
        let workflow = Workflow::with_recognizer(fixture.config.clone(), Box::new(recognizer_returning(words, 1)));

        let request = fixture.request(true);
        let summary = workflow.align(&request).await.unwrap();
        assert_eq!(summary.cues, 2);
        assert_eq!(summary.fallbacks, 0);

        let vtt = std::fs::read_to_string(&request.output).unwrap();
        assert!(vtt.starts_with("WEBVTT\n\nline-0\n00:00:00.000 --> 00:00:01.000\n"));
        assert!(vtt.contains("line-1\n00:00:01.200 --> 00:00:02.000\n"));
        assert!(vtt.contains("<span class=\"en\">All good?</span>"));

        let dump: DebugDump =
            serde_json::from_str(&std::fs::read_to_string(fixture.dir.path().join("debug.json")).unwrap()).unwrap();
        assert_eq!(dump.cues.len(), 2);
        assert_eq!(dump.model, "small");
    }

    #[tokio::test]
    async fn test_translation_mismatch_fails_before_recognition() {
        let fixture = Fixture::new("Olá\nTudo bem?\n", Some("Hello\n"));
        let workflow = Workflow::with_recognizer(fixture.config.clone(), Box::new(recognizer_returning(Vec::new(), 0)));

        let err = workflow.align(&fixture.request(true)).await.unwrap_err();
        assert!(matches!(
            err,
            CuesyncError::TranslationMismatch { transcript: 2, translation: 1 }
        ));
        assert!(!fixture.request(true).output.exists());
    }

    #[tokio::test]
    async fn test_empty_word_stream_is_fatal() {
        let fixture = Fixture::new("Olá\n", None);
        let workflow = Workflow::with_recognizer(fixture.config.clone(), Box::new(recognizer_returning(Vec::new(), 1)));

        let err = workflow.align(&fixture.request(false)).await.unwrap_err();
        assert!(matches!(err, CuesyncError::NoWordsRecognized));
    }

    #[tokio::test]
    async fn test_recognition_errors_propagate() {
        let fixture = Fixture::new("Olá\n", None);
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_name().return_const("mock".to_string());
        recognizer
            .expect_transcribe()
            .returning(|_, _| Err(CuesyncError::Recognizer("model exploded".to_string())));
        let workflow = Workflow::with_recognizer(fixture.config.clone(), Box::new(recognizer));

        let err = workflow.align(&fixture.request(false)).await.unwrap_err();
        assert!(matches!(err, CuesyncError::Recognizer(_)));
    }

    #[tokio::test]
    async fn test_second_run_uses_word_cache() {
        let fixture = Fixture::new("Olá\n", None);
        let words = vec![word("olá", 0.0, 0.5)];
        // a single recognizer call serves both runs
        let workflow = Workflow::with_recognizer(fixture.config.clone(), Box::new(recognizer_returning(words, 1)));

        let request = fixture.request(false);
        workflow.align(&request).await.unwrap();
        let summary = workflow.align(&request).await.unwrap();
        assert_eq!(summary.cues, 1);
    }

    #[tokio::test]
    async fn test_missing_audio_is_reported() {
        let fixture = Fixture::new("Olá\n", None);
        let workflow = Workflow::with_recognizer(fixture.config.clone(), Box::new(recognizer_returning(Vec::new(), 0)));

        let mut request = fixture.request(false);
        request.audio = fixture.dir.path().join("missing.mp3");
        let err = workflow.align(&request).await.unwrap_err();
        assert!(matches!(err, CuesyncError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_transcribe_to_file_exports_words() {
        let fixture = Fixture::new("Olá\n", None);
        let mut config = fixture.config.clone();
        config.cache.enabled = false;
        let words = vec![word("olá", 0.0, 0.5), word("mundo", 0.5, 1.0)];
        let workflow = Workflow::with_recognizer(config, Box::new(recognizer_returning(words.clone(), 1)));

        let output = fixture.dir.path().join("words.json");
        let count = workflow
            .transcribe_to_file(fixture.dir.path().join("talk.mp3"), output.clone())
            .await
            .unwrap();
        assert_eq!(count, 2);

        let exported = crate::recognize::read_word_stream(&output).await.unwrap();
        assert_eq!(exported, words);
    }
}
