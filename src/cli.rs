use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RecognizerConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Recognizer settings that override the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RecognizerArgs {
    /// Name or path of the Whisper model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Inference device (auto, cpu, cuda)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Language code of the audio
    #[arg(short, long)]
    pub language: Option<String>,
}

impl RecognizerArgs {
    pub fn apply_to(&self, config: &mut RecognizerConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(device) = &self.device {
            config.device = device.clone();
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align a transcript with an audio file and write subtitles
    Align {
        /// Audio file (MP3, MP4, WAV, ...)
        #[arg(short, long)]
        audio: PathBuf,

        /// Transcript, one speaker turn per line
        #[arg(short, long)]
        transcript: PathBuf,

        /// Translation with the same number of lines as the transcript
        #[arg(long)]
        translation: Option<PathBuf>,

        /// Output subtitle file (.vtt or .srt)
        #[arg(short, long, default_value = "output.vtt")]
        output: PathBuf,

        /// Export alignment diagnostics as JSON
        #[arg(long)]
        dump_debug: Option<PathBuf>,

        /// Use a word stream exported by `transcribe` instead of recognizing
        #[arg(long)]
        words: Option<PathBuf>,

        #[command(flatten)]
        recognizer: RecognizerArgs,
    },

    /// Recognize an audio file and export its timestamped words as JSON
    Transcribe {
        /// Audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Output word stream file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        recognizer: RecognizerArgs,
    },

    /// List whisper.cpp models and their status
    Models {
        /// Download all missing models
        #[arg(long)]
        download: bool,
    },

    /// Manage the recognized word cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Write the default configuration to a file
    InitConfig {
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show cache statistics and size
    Info,

    /// Clear all cached word streams
    Clear,
}
