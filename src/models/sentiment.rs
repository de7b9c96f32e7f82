// Ordinal sentiment via the multilingual 5-star BERT classifier
// (nlptown/bert-base-multilingual-uncased-sentiment, ONNX export).
//
// The model outputs five class logits, one per star rating. The score is
// argmax + 1, giving the 1..=5 scale with 3 neutral. Input longer than the
// model's 512-token window is truncated by the tokenizer, never rejected.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::traits::SentimentModel;

/// Model input window; longer texts are truncated here, not errored.
const MAX_TOKENS: usize = 512;

/// Star classes output by the model, in logit order (1 through 5 stars).
const CLASS_COUNT: usize = 5;

pub struct OnnxSentimentModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxSentimentModel {
    /// Load `model_quantized.onnx` and `tokenizer.json` from the directory,
    /// configuring 512-token truncation on the tokenizer.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model_quantized.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() || !tokenizer_path.exists() {
            anyhow::bail!(
                "Sentiment model files not found in {}\nRun `threadlens download-models` first.",
                model_dir.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!("Failed to load sentiment model from {}", model_path.display())
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load sentiment tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {e}"))?;

        debug!(dir = %model_dir.display(), "Loaded sentiment model");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentimentModel for OnnxSentimentModel {
    async fn score_text(&self, text: &str) -> Result<u8> {
        let mut scores = self.score_batch(&[text.to_string()]).await?;
        Ok(scores.remove(0))
    }

    /// True batch inference: one forward pass, one argmax per row, results
    /// in input order.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<u8>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || score_sync(&session, &tokenizer, &texts))
            .await
            .context("spawn_blocking panicked")?
    }
}

fn score_sync(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    texts: &[String],
) -> Result<Vec<u8>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0)
        .max(1);

    // BERT pad token id = 0; token_type_ids all zero for single sentences.
    let mut input_ids = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        input_ids.extend(ids.iter().map(|&id| id as i64));
        attention_mask.extend(enc.get_attention_mask().iter().map(|&m| m as i64));

        let pad = max_len - ids.len();
        input_ids.extend(std::iter::repeat_n(0i64, pad));
        attention_mask.extend(std::iter::repeat_n(0i64, pad));
    }
    let token_type_ids = vec![0i64; batch_size * max_len];

    let shape = [batch_size as i64, max_len as i64];
    let input_ids =
        Tensor::from_array((shape, input_ids)).context("Failed to create input_ids tensor")?;
    let attention_mask = Tensor::from_array((shape, attention_mask))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids = Tensor::from_array((shape, token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    // Output: [batch, 5] class logits.
    let logits = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {e}"))?;
        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            })
            .context("Sentiment ONNX inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract sentiment output tensor")?;
        data.to_vec()
    };

    let mut scores = Vec::with_capacity(batch_size);
    for i in 0..batch_size {
        let row = &logits[i * CLASS_COUNT..(i + 1) * CLASS_COUNT];
        scores.push(argmax_class(row));
    }
    Ok(scores)
}

/// Zero-based argmax over class logits, shifted to the 1..=5 scale.
fn argmax_class(logits: &[f32]) -> u8 {
    let mut best = 0usize;
    for (i, &v) in logits.iter().enumerate() {
        if v > logits[best] {
            best = i;
        }
    }
    (best + 1) as u8
}
