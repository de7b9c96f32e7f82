// Post text selection and the post-comment left join.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::data::{EnrichedComment, EnrichedPost, MergedRow, Post};
use crate::preprocess::TextNormalizer;

/// Which post column feeds normalization and the models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTextSource {
    Body,
    Title,
}

/// Posts are analyzed on their body text, except when every body in the
/// snapshot is empty (link-only subreddits) — then titles carry the signal.
pub fn select_post_text(posts: &[Post]) -> PostTextSource {
    let all_bodies_empty = posts
        .iter()
        .all(|p| TextNormalizer::fill_missing(p.body.as_deref()).is_empty());

    if all_bodies_empty {
        warn!("Every post body is empty, falling back to titles for analysis");
        PostTextSource::Title
    } else {
        PostTextSource::Body
    }
}

impl PostTextSource {
    pub fn extract(&self, post: &Post) -> String {
        match self {
            PostTextSource::Body => TextNormalizer::fill_missing(post.body.as_deref()),
            PostTextSource::Title => post.title.clone(),
        }
    }
}

/// Left join of enriched posts and enriched comments on post_id.
///
/// Posts keep their input order; within a post, comments keep theirs. A
/// post with no captured comments yields exactly one row with the comment
/// side absent and the relevance sentinel. Comments whose post was not
/// captured are dropped.
pub fn merge_left(posts: Vec<EnrichedPost>, comments: Vec<EnrichedComment>) -> Vec<MergedRow> {
    let mut by_post: HashMap<String, Vec<EnrichedComment>> = HashMap::new();
    let known: std::collections::HashSet<&str> =
        posts.iter().map(|p| p.post.post_id.as_str()).collect();

    let mut orphaned = 0usize;
    for comment in comments {
        if known.contains(comment.comment.post_id.as_str()) {
            by_post
                .entry(comment.comment.post_id.clone())
                .or_default()
                .push(comment);
        } else {
            orphaned += 1;
        }
    }
    if orphaned > 0 {
        debug!(orphaned, "Dropped comments with no matching post");
    }

    let mut rows = Vec::new();
    for post in posts {
        match by_post.remove(&post.post.post_id) {
            Some(post_comments) => {
                for comment in post_comments {
                    rows.push(MergedRow {
                        post: post.clone(),
                        comment: Some(comment),
                        relevance: 0.0,
                    });
                }
            }
            None => rows.push(MergedRow {
                post,
                comment: None,
                relevance: 0.0,
            }),
        }
    }
    rows
}
