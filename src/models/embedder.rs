// Sentence embeddings via a local all-MiniLM-L6-v2 ONNX model.
//
// Texts become 384-dimensional vectors: tokenize, one forward pass over the
// padded batch, mean-pool the token embeddings under the attention mask,
// then L2-normalize (the model card's pooling recipe). Runs entirely on the
// local CPU.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::SentenceEncoder;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Local ONNX sentence encoder.
///
/// Session behind Arc<Mutex> because ort's run takes &mut self and the
/// blocking task needs 'static shared ownership. Inference is serialized
/// through spawn_blocking, so the lock is uncontended in practice.
pub struct OnnxSentenceEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxSentenceEncoder {
    /// Load `model.onnx` and `tokenizer.json` from the given directory.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() || !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding model files not found in {}\nRun `threadlens download-models` first.",
                model_dir.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!("Failed to load embedding model from {}", model_path.display())
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {e}"))?;

        debug!(dir = %model_dir.display(), "Loaded sentence embedding model");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentenceEncoder for OnnxSentenceEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || encode_sync(&session, &tokenizer, &texts))
            .await
            .context("spawn_blocking panicked")?
    }
}

/// Padded batch inputs for a BERT-family model. Pad token id 0,
/// token_type_ids all zero for single-sentence input.
struct PaddedBatch {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
    batch_size: usize,
    max_len: usize,
}

fn pad_batch(tokenizer: &Tokenizer, texts: &[String]) -> Result<PaddedBatch> {
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
        .unwrap_or(0);

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

    Ok(PaddedBatch {
        input_ids,
        attention_mask,
        token_type_ids,
        batch_size,
        max_len,
    })
}

fn encode_sync(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    let batch = pad_batch(tokenizer, texts)?;
    if batch.max_len == 0 {
        return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch.batch_size]);
    }

    let shape = [batch.batch_size as i64, batch.max_len as i64];
    let mask = batch.attention_mask.clone();

    let input_ids = Tensor::from_array((shape, batch.input_ids))
        .context("Failed to create input_ids tensor")?;
    let attention_mask = Tensor::from_array((shape, batch.attention_mask))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids = Tensor::from_array((shape, batch.token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    // Output: last_hidden_state [batch, seq_len, EMBEDDING_DIM]
    let hidden = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {e}"))?;
        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            })
            .context("Embedding ONNX inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract embedding output tensor")?;
        data.to_vec()
    };

    let mut embeddings = Vec::with_capacity(batch.batch_size);
    for i in 0..batch.batch_size {
        embeddings.push(mean_pool(&hidden, &mask, i, batch.max_len));
    }

    debug!(batch = batch.batch_size, dim = EMBEDDING_DIM, "Encoded texts");
    Ok(embeddings)
}

/// Mask-weighted mean over token embeddings for one batch row, followed by
/// L2 normalization.
fn mean_pool(hidden: &[f32], mask: &[i64], row: usize, max_len: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; EMBEDDING_DIM];
    let mut live_tokens = 0.0f32;

    for tok in 0..max_len {
        if mask[row * max_len + tok] == 0 {
            continue;
        }
        live_tokens += 1.0;
        let offset = (row * max_len + tok) * EMBEDDING_DIM;
        for (dst, src) in pooled.iter_mut().zip(&hidden[offset..offset + EMBEDDING_DIM]) {
            *dst += src;
        }
    }

    if live_tokens > 0.0 {
        for v in &mut pooled {
            *v /= live_tokens;
        }
    }

    l2_normalize(&mut pooled);
    pooled
}

fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity between two vectors.
///
/// Deliberately not clamped: relevance values are reported as computed,
/// nominally in [-1, 1]. Mismatched or empty inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
