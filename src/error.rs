// Usage errors — caller bugs, never retried.
//
// The pipeline distinguishes contract violations (these) from data-quality
// conditions (empty bodies, comment-less posts), which are handled as policy
// branches and never surface as errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// reduce_topics or topic_info called before fit_and_assign.
    #[error("topic model has not been fitted yet — call fit_and_assign first")]
    NotFitted,

    /// fit_and_assign called with zero documents.
    #[error("cannot model topics over an empty corpus")]
    EmptyCorpus,

    /// reduce_topics called with a target of zero.
    #[error("topic reduction target must be at least 1, got {0}")]
    BadReduceTarget(usize),
}
