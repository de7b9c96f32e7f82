// Threadlens: topic, sentiment, and relevance analysis for subreddit discussions.
//
// This is the library root. Each module corresponds to a major subsystem
// of the analysis pipeline.

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod relevance;
