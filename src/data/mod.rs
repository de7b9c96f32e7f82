// Data model — raw scraper records, enriched records, merged rows, and the
// CSV-backed store that reads raw snapshots and writes run artifacts.

pub mod records;
pub mod store;

pub use records::{
    resolve_parent_comment, Comment, CommentRow, EnrichedComment, EnrichedPost, MergedRow, Post,
    PostRow, ResultRow, SortOrder,
};
pub use store::DataStore;
