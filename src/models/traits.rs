// Model boundary traits — swap-ready abstractions.
//
// The pipeline only ever talks to these. The default implementations run
// local ONNX models; tests substitute deterministic fakes. Implementations
// must preserve strict row-order correspondence between input and output —
// callers assign results back into table columns positionally.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sentinel topic id for documents that fit no cluster.
pub const OUTLIER_TOPIC: i32 = -1;

/// Maps text to fixed-length vectors for similarity comparison.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    /// Encode a batch of texts, one vector per text, in input order.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Maps text to an ordinal sentiment class: 1 (most negative) through
/// 5 (most positive), 3 neutral. Never errors on empty input.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn score_text(&self, text: &str) -> Result<u8>;

    /// Score multiple texts, returning classes in input order. Default is
    /// sequential; implementations override for true batching.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<u8>> {
        let mut scores = Vec::with_capacity(texts.len());
        for text in texts {
            scores.push(self.score_text(text).await?);
        }
        Ok(scores)
    }
}

/// A document's topic assignment after fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicAssignment {
    /// Topic id, or OUTLIER_TOPIC for documents that fit no cluster.
    pub topic_id: i32,
    /// Similarity of the document to its topic's centroid; 0.0 for outliers.
    pub probability: f64,
}

/// One row of the topic-info table: id, human-readable label, member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub topic_id: i32,
    pub label: String,
    pub count: usize,
}

/// Unsupervised topic model fit on one corpus. Topic ids are meaningful
/// only relative to the instance they came from — post topics and comment
/// topics live in different spaces and are never compared.
#[async_trait]
pub trait TopicModel: Send + Sync {
    /// Fit on the corpus and assign a topic to every document.
    async fn fit_and_assign(&mut self, docs: &[String]) -> Result<Vec<TopicAssignment>>;

    /// Re-cluster to at most `target` topics, remapping every document.
    /// Usage error when called before an initial fit.
    async fn reduce_topics(&mut self, target: usize) -> Result<Vec<TopicAssignment>>;

    /// The id -> label bijection plus member counts for the current fit.
    fn topic_info(&self) -> Result<Vec<TopicInfo>>;
}
