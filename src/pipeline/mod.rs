// The subreddit analysis pipeline.
//
// A strictly sequential stage chain over one scraped snapshot: preprocess
// both tables, fit and reduce a topic model per table, score sentiment,
// left-join comments onto posts, score relevance, and only then persist.
// A failure at any stage aborts the run with nothing written.

pub mod merge;
pub mod run;

pub use merge::{merge_left, select_post_text, PostTextSource};
pub use run::{run, run_and_persist, AnalysisArtifacts, AnalysisContext, PipelineConfig, Stage};
