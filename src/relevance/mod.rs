// Comment-to-post relevance scoring.
//
// Relevance is the cosine similarity between a comment's embedding and the
// embedding of a comparison target assembled from the post (and optionally
// the comment's parent). The target recipe is a closed enum so every mode
// is matched exhaustively.

pub mod compared;
pub mod scorer;

pub use compared::ComparedWith;
pub use scorer::RelevanceScorer;
