// Model wrappers — the external model boundary.
//
// Everything the pipeline needs from machine learning sits behind the traits
// in `traits`; the ONNX-backed implementations here are the defaults, but any
// implementation satisfying the contracts is interchangeable.

pub mod download;
pub mod embedder;
pub mod sentiment;
pub mod topic;
pub mod traits;

pub use embedder::{cosine_similarity, OnnxSentenceEncoder, EMBEDDING_DIM};
pub use sentiment::OnnxSentimentModel;
pub use topic::EmbeddingTopicModel;
pub use traits::{
    SentenceEncoder, SentimentModel, TopicAssignment, TopicInfo, TopicModel, OUTLIER_TOPIC,
};
