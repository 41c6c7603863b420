use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{CuesyncError, Result};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Downloadable whisper.cpp model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: &'static str,
    pub size_mb: f64,
}

impl ModelInfo {
    pub fn filename(&self) -> String {
        format!("ggml-{}.bin", self.name)
    }

    pub fn url(&self) -> String {
        format!("{}/{}", MODEL_BASE_URL, self.filename())
    }
}

pub const AVAILABLE_MODELS: &[ModelInfo] = &[
    ModelInfo { name: "tiny", size_mb: 39.0 },
    ModelInfo { name: "tiny.en", size_mb: 39.0 },
    ModelInfo { name: "base", size_mb: 142.0 },
    ModelInfo { name: "base.en", size_mb: 142.0 },
    ModelInfo { name: "small", size_mb: 244.0 },
    ModelInfo { name: "small.en", size_mb: 244.0 },
    ModelInfo { name: "medium", size_mb: 769.0 },
    ModelInfo { name: "medium.en", size_mb: 769.0 },
    ModelInfo { name: "large-v2", size_mb: 1550.0 },
    ModelInfo { name: "large-v3", size_mb: 1550.0 },
];

/// Map a model name to its file under `models_dir`; paths are kept as-is.
pub fn resolve_model_path(models_dir: &Path, model: &str) -> PathBuf {
    if model.contains('/') || model.contains('\\') || model.ends_with(".bin") {
        return PathBuf::from(model);
    }
    models_dir.join(format!("ggml-{}.bin", model))
}

pub fn find_model(name: &str) -> Option<&'static ModelInfo> {
    AVAILABLE_MODELS.iter().find(|m| m.name == name)
}

pub struct ModelManager {
    client: Client,
    models_dir: PathBuf,
}

impl ModelManager {
    pub fn new<P: Into<PathBuf>>(models_dir: P) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cuesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CuesyncError::Http)?;

        Ok(Self {
            client,
            models_dir: models_dir.into(),
        })
    }

    pub fn is_downloaded(&self, model: &ModelInfo) -> bool {
        self.models_dir.join(model.filename()).exists()
    }

    /// Make sure a named model is present locally, downloading it if needed
    pub async fn ensure_model(&self, name: &str) -> Result<PathBuf> {
        let path = resolve_model_path(&self.models_dir, name);
        if path.exists() {
            return Ok(path);
        }

        let model = find_model(name)
            .ok_or_else(|| CuesyncError::Config(format!("Unknown whisper.cpp model: {}", name)))?;
        self.download_model(model).await
    }

    pub async fn download_model(&self, model: &ModelInfo) -> Result<PathBuf> {
        let local_path = self.models_dir.join(model.filename());

        if local_path.exists() {
            info!("Model {} already exists at {}", model.name, local_path.display());
            return Ok(local_path);
        }

        async_fs::create_dir_all(&self.models_dir).await?;
        info!("Downloading {} model ({:.1} MB)...", model.name, model.size_mb);

        let mut response = self.client.get(model.url()).send().await?;

        if !response.status().is_success() {
            return Err(CuesyncError::Config(format!(
                "Failed to download model {}: HTTP {}",
                model.name,
                response.status()
            )));
        }

        let total = response
            .content_length()
            .unwrap_or((model.size_mb * 1_000_000.0) as u64);
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .map_err(|e| CuesyncError::Config(format!("Invalid progress template: {}", e)))?
                .progress_chars("#>-"),
        );

        let temp_path = local_path.with_extension("tmp");
        let mut file = async_fs::File::create(&temp_path).await?;

        let mut downloaded = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await?;
        drop(file);

        async_fs::rename(&temp_path, &local_path).await?;

        pb.finish_with_message(format!("Downloaded {}", model.name));
        info!("Successfully downloaded {} to {}", model.name, local_path.display());

        Ok(local_path)
    }
}
