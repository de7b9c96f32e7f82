use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Root of the data tree (raw snapshots under raw/, artifacts under results/).
    pub data_dir: PathBuf,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables. Both settings have
    /// defaults, so loading never fails on a fresh machine.
    pub fn load() -> Result<Self> {
        let data_dir = env::var("THREADLENS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let model_dir = env::var("THREADLENS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::models::download::default_model_dir());

        Ok(Self {
            data_dir,
            model_dir,
        })
    }

    /// Check that both ONNX models are on disk.
    /// Call this before any operation that needs inference.
    pub fn require_models(&self) -> Result<()> {
        if !crate::models::download::sentiment_files_present(&self.model_dir) {
            anyhow::bail!(
                "Sentiment model files not found in {}\n\
                 Run `threadlens download-models` to download them.",
                self.model_dir.display()
            );
        }
        if !crate::models::download::embedding_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `threadlens download-models` to download them.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}
