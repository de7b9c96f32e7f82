// Model download helper for ONNX models.
//
// Downloads two models from HuggingFace:
// 1. bert-base-multilingual-uncased-sentiment — 5-class sentiment (~167MB)
// 2. all-MiniLM-L6-v2 — sentence embeddings for topics and relevance (~90MB)
//
// Files are stored in a platform-appropriate directory
// (~/.local/share/threadlens/models/ on Linux) so they persist across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the sentiment model.
const SENTIMENT_HF_URL: &str =
    "https://huggingface.co/onnx-community/bert-base-multilingual-uncased-sentiment-ONNX/resolve/main";

/// HuggingFace repo for the sentence embedding model.
const EMBEDDING_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Files for the sentiment model (model stored under onnx/ upstream).
const SENTIMENT_MODEL_FILE: &str = "onnx/model_quantized.onnx";
const SENTIMENT_TOKENIZER_FILE: &str = "tokenizer.json";

/// Files for the sentence embedding model (model stored under onnx/ upstream).
const EMBEDDING_MODEL_FILE: &str = "onnx/model.onnx";
const EMBEDDING_TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/threadlens/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("threadlens")
        .join("models")
}

/// Subdirectory within model_dir for the sentiment model.
pub fn sentiment_model_dir(base: &Path) -> PathBuf {
    base.join("bert-sentiment")
}

/// Subdirectory within model_dir for the sentence embedding model.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join("all-MiniLM-L6-v2")
}

/// Check whether both required sentiment model files exist.
pub fn sentiment_files_present(dir: &Path) -> bool {
    let sent_dir = sentiment_model_dir(dir);
    sent_dir.join("model_quantized.onnx").exists() && sent_dir.join("tokenizer.json").exists()
}

/// Check whether both required embedding model files exist.
pub fn embedding_files_present(dir: &Path) -> bool {
    let embed_dir = embedding_model_dir(dir);
    embed_dir.join("model.onnx").exists() && embed_dir.join("tokenizer.json").exists()
}

/// Download all ONNX models (sentiment + embedding).
///
/// Shows progress bars for large files. Skips files that already exist.
/// Creates directories as needed.
pub async fn download_models(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    // --- Sentiment model (bert-base-multilingual-uncased-sentiment) ---
    println!("\nSentiment model (bert-base-multilingual-uncased-sentiment):");

    let sent_dir = sentiment_model_dir(dir);
    std::fs::create_dir_all(&sent_dir).with_context(|| {
        format!(
            "Failed to create sentiment model directory: {}",
            sent_dir.display()
        )
    })?;

    let sent_tokenizer_path = sent_dir.join("tokenizer.json");
    if sent_tokenizer_path.exists() {
        info!("Sentiment tokenizer already exists, skipping");
        println!("  tokenizer.json (already exists)");
    } else {
        println!("  Downloading tokenizer.json...");
        download_file(
            &format!("{}/{}", SENTIMENT_HF_URL, SENTIMENT_TOKENIZER_FILE),
            &sent_tokenizer_path,
            false,
        )
        .await?;
    }

    let sent_model_path = sent_dir.join("model_quantized.onnx");
    if sent_model_path.exists() {
        info!("Sentiment model already exists, skipping");
        println!("  model_quantized.onnx (already exists)");
    } else {
        println!("  Downloading model_quantized.onnx (~167 MB)...");
        download_file(
            &format!("{}/{}", SENTIMENT_HF_URL, SENTIMENT_MODEL_FILE),
            &sent_model_path,
            true,
        )
        .await?;
    }

    // --- Sentence embedding model (all-MiniLM-L6-v2) ---
    println!("\nSentence embedding model (all-MiniLM-L6-v2):");

    let embed_dir = embedding_model_dir(dir);
    std::fs::create_dir_all(&embed_dir).with_context(|| {
        format!(
            "Failed to create embedding model directory: {}",
            embed_dir.display()
        )
    })?;

    let embed_tokenizer_path = embed_dir.join("tokenizer.json");
    if embed_tokenizer_path.exists() {
        info!("Embedding tokenizer already exists, skipping");
        println!("  tokenizer.json (already exists)");
    } else {
        println!("  Downloading tokenizer.json...");
        download_file(
            &format!("{}/{}", EMBEDDING_HF_URL, EMBEDDING_TOKENIZER_FILE),
            &embed_tokenizer_path,
            false,
        )
        .await?;
    }

    let embed_model_path = embed_dir.join("model.onnx");
    if embed_model_path.exists() {
        info!("Embedding model already exists, skipping");
        println!("  model.onnx (already exists)");
    } else {
        println!("  Downloading model.onnx (~90 MB)...");
        download_file(
            &format!("{}/{}", EMBEDDING_HF_URL, EMBEDDING_MODEL_FILE),
            &embed_model_path,
            true,
        )
        .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let total_size = response.content_length();

    // Set up progress bar if requested and we know the size
    let pb = if show_progress {
        let pb = if let Some(size) = total_size {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .expect("valid template"),
            );
            pb
        };
        Some(pb)
    } else {
        None
    };

    // Stream the response body to disk
    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_is_under_threadlens() {
        let dir = default_model_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("threadlens") && path_str.contains("models"),
            "Expected path containing threadlens/models, got: {path_str}"
        );
    }

    #[test]
    fn test_model_dirs_are_subdirectories() {
        let base = PathBuf::from("/tmp/test-models");
        assert_eq!(sentiment_model_dir(&base), base.join("bert-sentiment"));
        assert_eq!(embedding_model_dir(&base), base.join("all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_sentiment_files_present_false_when_empty() {
        let dir = std::env::temp_dir().join("threadlens-test-nonexistent");
        assert!(!sentiment_files_present(&dir));
    }

    #[test]
    fn test_embedding_files_present_false_when_empty() {
        let dir = std::env::temp_dir().join("threadlens-test-nonexistent");
        assert!(!embedding_files_present(&dir));
    }

    #[test]
    fn test_embedding_files_present_true_when_files_exist() {
        let dir = std::env::temp_dir().join("threadlens-embed-test");
        let embed_dir = embedding_model_dir(&dir);
        std::fs::create_dir_all(&embed_dir).unwrap();
        std::fs::write(embed_dir.join("model.onnx"), b"fake").unwrap();
        std::fs::write(embed_dir.join("tokenizer.json"), b"fake").unwrap();

        assert!(embedding_files_present(&dir));

        // Cleanup
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
