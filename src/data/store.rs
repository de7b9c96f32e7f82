// CSV-backed storage for raw snapshots and run artifacts.
//
// Layout under the data root:
//   raw/{subreddit}_{sort}_posts.csv        scraper output (read-only here)
//   raw/{subreddit}_{sort}_comments.csv
//   results/{subreddit}_{sort}_posts.csv    enriched posts
//   results/{subreddit}_{sort}_comments.csv enriched comments
//   results/{subreddit}_{sort}_results.csv  merged + scored table
//   results/{subreddit}_{sort}_topics.json  topic tables for both sides
//
// Writes are idempotent replacement — a rerun for the same key overwrites
// the prior artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::records::{
    Comment, CommentRow, EnrichedComment, EnrichedPost, MergedRow, Post, PostRow, ResultRow,
    SortOrder,
};
use crate::models::TopicInfo;

pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn raw_path(&self, subreddit: &str, sort: SortOrder, kind: &str) -> PathBuf {
        self.root
            .join("raw")
            .join(format!("{subreddit}_{sort}_{kind}.csv"))
    }

    pub fn results_path(&self, subreddit: &str, sort: SortOrder, kind: &str) -> PathBuf {
        self.root
            .join("results")
            .join(format!("{subreddit}_{sort}_{kind}.csv"))
    }

    /// Load the raw posts snapshot for a subreddit.
    pub fn load_posts(&self, subreddit: &str, sort: SortOrder) -> Result<Vec<Post>> {
        let path = self.raw_path(subreddit, sort, "posts");
        read_rows(&path).with_context(|| format!("Failed to read posts from {}", path.display()))
    }

    /// Load the raw comments snapshot for a subreddit.
    pub fn load_comments(&self, subreddit: &str, sort: SortOrder) -> Result<Vec<Comment>> {
        let path = self.raw_path(subreddit, sort, "comments");
        read_rows(&path)
            .with_context(|| format!("Failed to read comments from {}", path.display()))
    }

    pub fn save_posts(
        &self,
        subreddit: &str,
        sort: SortOrder,
        posts: &[EnrichedPost],
    ) -> Result<()> {
        let rows: Vec<PostRow> = posts.iter().map(PostRow::from).collect();
        self.write_artifact(subreddit, sort, "posts", &rows)
    }

    pub fn save_comments(
        &self,
        subreddit: &str,
        sort: SortOrder,
        comments: &[EnrichedComment],
    ) -> Result<()> {
        let rows: Vec<CommentRow> = comments.iter().map(CommentRow::from).collect();
        self.write_artifact(subreddit, sort, "comments", &rows)
    }

    /// Persist the merged table under the final renamed schema.
    pub fn save_results(
        &self,
        subreddit: &str,
        sort: SortOrder,
        results: &[MergedRow],
    ) -> Result<()> {
        let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
        self.write_artifact(subreddit, sort, "results", &rows)
    }

    /// Persist the topic tables for both sides as one JSON document.
    pub fn save_topics(
        &self,
        subreddit: &str,
        sort: SortOrder,
        post_topics: &[TopicInfo],
        comment_topics: &[TopicInfo],
    ) -> Result<()> {
        let path = self
            .root
            .join("results")
            .join(format!("{subreddit}_{sort}_topics.json"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let doc = serde_json::json!({
            "post_topics": post_topics,
            "comment_topics": comment_topics,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&doc)?)
            .with_context(|| format!("Failed to write topics to {}", path.display()))?;
        info!(path = %path.display(), "Wrote topic tables");
        Ok(())
    }

    fn write_artifact<T: Serialize>(
        &self,
        subreddit: &str,
        sort: SortOrder,
        kind: &str,
        rows: &[T],
    ) -> Result<()> {
        let path = self.results_path(subreddit, sort, kind);
        write_rows(&path, rows)
            .with_context(|| format!("Failed to write {kind} artifact to {}", path.display()))?;
        info!(path = %path.display(), rows = rows.len(), "Wrote artifact");
        Ok(())
    }
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let posts = vec![Post {
            post_id: "p1".to_string(),
            title: "Cats".to_string(),
            body: Some("Cats are great".to_string()),
            score: 10,
            upvote_ratio: 0.97,
            url: "https://reddit.com/p1".to_string(),
            num_comments: 1,
            created: 1.0,
            flair: None,
        }];

        let path = store.raw_path("cats", SortOrder::Hot, "posts");
        write_rows(&path, &posts).unwrap();

        let loaded = store.load_posts("cats", SortOrder::Hot).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].post_id, "p1");
        assert_eq!(loaded[0].body.as_deref(), Some("Cats are great"));
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        assert!(store.load_posts("nope", SortOrder::New).is_err());
    }

    #[test]
    fn test_artifact_key_format() {
        let store = DataStore::new("/data");
        let p = store.results_path("Music", SortOrder::Hot, "results");
        assert!(p.ends_with("results/Music_hot_results.csv"));
    }
}
