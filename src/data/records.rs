// Record types for the analysis pipeline.
//
// Raw Post/Comment match the scraper's CSV schema. Enriched records carry
// the per-column normalization output as one typed struct instead of the
// name-suffix column convention the raw snapshots use elsewhere. The merged
// row is the pre-rename join product; PostRow/CommentRow/ResultRow are the
// flat serialized schemas, and ResultRow is the final, renamed table the
// dashboard reads.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::preprocess::{NormalizedText, PosTag};

/// Submission sort order used when the snapshot was scraped. Part of the
/// artifact key, so it is a closed enum rather than a free string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Hot,
    New,
    Top,
    Rising,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Hot => "hot",
            SortOrder::New => "new",
            SortOrder::Top => "top",
            SortOrder::Rising => "rising",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(SortOrder::Hot),
            "new" => Ok(SortOrder::New),
            "top" => Ok(SortOrder::Top),
            "rising" => Ok(SortOrder::Rising),
            other => Err(format!(
                "unknown sort order `{other}` (expected hot, new, top, or rising)"
            )),
        }
    }
}

/// A scraped submission. Immutable once scraped; enrichment never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvote_ratio: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub flair: Option<String>,
}

/// A scraped comment. `parent_id` carries a tier prefix: `t3_<post>` when
/// the parent is the submission itself, `t1_<comment>` when it is another
/// comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub post_id: String,
    pub parent_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub up_vote_count: i64,
    #[serde(default)]
    pub controversiality: i64,
    #[serde(default)]
    pub total_awards_received: i64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default)]
    pub is_submitter: bool,
    #[serde(default)]
    pub created_utc: f64,
}

/// Resolve the text of a comment's parent.
///
/// A `t3_` tier prefix means the parent is the post itself — empty string.
/// A `t1_X` prefix means the parent is the comment with id `X`; its text, or
/// empty string when that comment was not captured.
pub fn resolve_parent_comment(comment: &Comment, by_id: &HashMap<&str, &Comment>) -> String {
    match comment.parent_id.split_once('_') {
        Some(("t3", _)) => String::new(),
        Some(("t1", id)) => by_id
            .get(id)
            .and_then(|parent| parent.comment.clone())
            .unwrap_or_default(),
        _ => {
            debug!(
                comment_id = %comment.comment_id,
                parent_id = %comment.parent_id,
                "Unrecognized parent tier prefix, treating parent as post"
            );
            String::new()
        }
    }
}

/// A post with its normalization output, topic assignment, and sentiment.
#[derive(Debug, Clone)]
pub struct EnrichedPost {
    pub post: Post,
    pub text: NormalizedText,
    pub topic_id: i32,
    pub topic_label: String,
    pub sentiment: u8,
}

/// A comment with its normalization output, topic assignment, sentiment,
/// and resolved parent text.
#[derive(Debug, Clone)]
pub struct EnrichedComment {
    pub comment: Comment,
    pub text: NormalizedText,
    pub topic_id: i32,
    pub topic_label: String,
    pub sentiment: u8,
    pub parent_comment: String,
}

/// One row of the left join of enriched posts and enriched comments on
/// post_id. A post with zero captured comments appears once with `comment`
/// absent; its relevance stays at the 0.0 sentinel.
#[derive(Debug, Clone)]
pub struct MergedRow {
    pub post: EnrichedPost,
    pub comment: Option<EnrichedComment>,
    pub relevance: f64,
}

impl MergedRow {
    pub fn post_id(&self) -> &str {
        &self.post.post.post_id
    }

    /// The comment text as captured, before fill — None both for join-null
    /// rows and for comments scraped without a body.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment
            .as_ref()
            .and_then(|c| c.comment.comment.as_deref())
    }
}

fn join_tags(tags: &[PosTag]) -> String {
    tags.iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flat serialized schema for the enriched-posts artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRow {
    pub post_id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub url: String,
    pub num_comments: i64,
    pub created: f64,
    pub flair: String,
    pub tokens: String,
    pub tags: String,
    pub topic_id: i32,
    pub topic: String,
    pub sentiment: u8,
}

impl From<&EnrichedPost> for PostRow {
    fn from(p: &EnrichedPost) -> Self {
        Self {
            post_id: p.post.post_id.clone(),
            title: p.post.title.clone(),
            body: p.post.body.clone().unwrap_or_default(),
            score: p.post.score,
            upvote_ratio: p.post.upvote_ratio,
            url: p.post.url.clone(),
            num_comments: p.post.num_comments,
            created: p.post.created,
            flair: p.post.flair.clone().unwrap_or_default(),
            tokens: p.text.tokens.join(" "),
            tags: join_tags(&p.text.tags),
            topic_id: p.topic_id,
            topic: p.topic_label.clone(),
            sentiment: p.sentiment,
        }
    }
}

/// Flat serialized schema for the enriched-comments artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRow {
    pub comment_id: String,
    pub post_id: String,
    pub parent_id: String,
    pub comment: String,
    pub up_vote_count: i64,
    pub controversiality: i64,
    pub total_awards_received: i64,
    pub is_locked: bool,
    pub is_collapsed: bool,
    pub is_submitter: bool,
    pub created_utc: f64,
    pub tokens: String,
    pub tags: String,
    pub topic_id: i32,
    pub topic: String,
    pub sentiment: u8,
    pub parent_comment: String,
}

impl From<&EnrichedComment> for CommentRow {
    fn from(c: &EnrichedComment) -> Self {
        Self {
            comment_id: c.comment.comment_id.clone(),
            post_id: c.comment.post_id.clone(),
            parent_id: c.comment.parent_id.clone(),
            comment: c.comment.comment.clone().unwrap_or_default(),
            up_vote_count: c.comment.up_vote_count,
            controversiality: c.comment.controversiality,
            total_awards_received: c.comment.total_awards_received,
            is_locked: c.comment.is_locked,
            is_collapsed: c.comment.is_collapsed,
            is_submitter: c.comment.is_submitter,
            created_utc: c.comment.created_utc,
            tokens: c.text.tokens.join(" "),
            tags: join_tags(&c.text.tags),
            topic_id: c.topic_id,
            topic: c.topic_label.clone(),
            sentiment: c.sentiment,
            parent_comment: c.parent_comment.clone(),
        }
    }
}

/// The final, renamed results schema — the only table the dashboard reads.
///
/// This mapping is fixed and exhaustive: every ambiguous or side-suffixed
/// name from the merge becomes an explicit `post_*` / `comment_*` field.
/// The rename is one-way; nothing downstream sees the pre-rename schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub post_id: String,
    pub post_title: String,
    pub post_body: String,
    pub post_score: i64,
    pub post_upvote_ratio: f64,
    pub post_url: String,
    pub post_num_comments: i64,
    pub post_created: f64,
    pub post_flair: String,
    pub post_topic: String,
    pub post_sentiment: u8,
    pub comment_id: Option<String>,
    pub comment_parent_id: Option<String>,
    pub comment: Option<String>,
    pub comment_score: Option<i64>,
    pub comment_controversiality: Option<i64>,
    pub comment_total_awards: Option<i64>,
    pub comment_is_submitter: Option<bool>,
    pub comment_created_utc: Option<f64>,
    pub comment_topic: Option<String>,
    pub comment_sentiment: Option<u8>,
    pub parent_comment: Option<String>,
    pub comment_relevance: f64,
}

impl From<&MergedRow> for ResultRow {
    fn from(row: &MergedRow) -> Self {
        let p = &row.post;
        let c = row.comment.as_ref();
        Self {
            post_id: p.post.post_id.clone(),
            post_title: p.post.title.clone(),
            post_body: p.post.body.clone().unwrap_or_default(),
            post_score: p.post.score,
            post_upvote_ratio: p.post.upvote_ratio,
            post_url: p.post.url.clone(),
            post_num_comments: p.post.num_comments,
            post_created: p.post.created,
            post_flair: p.post.flair.clone().unwrap_or_default(),
            post_topic: p.topic_label.clone(),
            post_sentiment: p.sentiment,
            comment_id: c.map(|c| c.comment.comment_id.clone()),
            comment_parent_id: c.map(|c| c.comment.parent_id.clone()),
            comment: c.map(|c| c.comment.comment.clone().unwrap_or_default()),
            comment_score: c.map(|c| c.comment.up_vote_count),
            comment_controversiality: c.map(|c| c.comment.controversiality),
            comment_total_awards: c.map(|c| c.comment.total_awards_received),
            comment_is_submitter: c.map(|c| c.comment.is_submitter),
            comment_created_utc: c.map(|c| c.comment.created_utc),
            comment_topic: c.map(|c| c.topic_label.clone()),
            comment_sentiment: c.map(|c| c.sentiment),
            parent_comment: c.map(|c| c.parent_comment.clone()),
            comment_relevance: row.relevance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, parent_id: &str, text: Option<&str>) -> Comment {
        Comment {
            comment_id: id.to_string(),
            post_id: "p1".to_string(),
            parent_id: parent_id.to_string(),
            comment: text.map(|t| t.to_string()),
            up_vote_count: 0,
            controversiality: 0,
            total_awards_received: 0,
            is_locked: false,
            is_collapsed: false,
            is_submitter: false,
            created_utc: 0.0,
        }
    }

    #[test]
    fn test_parent_is_post() {
        let c = comment("c1", "t3_p1", Some("top level"));
        let by_id = HashMap::new();
        assert_eq!(resolve_parent_comment(&c, &by_id), "");
    }

    #[test]
    fn test_parent_is_comment() {
        let parent = comment("c1", "t3_p1", Some("the parent text"));
        let child = comment("c2", "t1_c1", Some("the reply"));
        let mut by_id: HashMap<&str, &Comment> = HashMap::new();
        by_id.insert("c1", &parent);
        assert_eq!(resolve_parent_comment(&child, &by_id), "the parent text");
    }

    #[test]
    fn test_parent_not_captured() {
        let child = comment("c2", "t1_missing", Some("orphan"));
        let by_id = HashMap::new();
        assert_eq!(resolve_parent_comment(&child, &by_id), "");
    }

    #[test]
    fn test_unknown_tier_prefix() {
        let c = comment("c1", "t5_weird", Some("award?"));
        let by_id = HashMap::new();
        assert_eq!(resolve_parent_comment(&c, &by_id), "");
    }

    #[test]
    fn test_sort_order_round_trip() {
        for s in ["hot", "new", "top", "rising"] {
            let order: SortOrder = s.parse().unwrap();
            assert_eq!(order.as_str(), s);
        }
        assert!("best".parse::<SortOrder>().is_err());
    }
}
