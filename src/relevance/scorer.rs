// Relevance assignment over the merged table.
//
// Rows are grouped by post_id in first-appearance order. Each group gets
// either one shared comparison target (simple modes) or a per-row target
// (parent modes), and every comment in the group is scored by cosine
// similarity against its target. Groups with no captured comment keep the
// 0.0 sentinel and never touch the encoder.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::data::{MergedRow, Post};
use crate::models::{cosine_similarity, SentenceEncoder};

use super::ComparedWith;

pub struct RelevanceScorer {
    encoder: Arc<dyn SentenceEncoder>,
}

impl RelevanceScorer {
    pub fn new(encoder: Arc<dyn SentenceEncoder>) -> Self {
        Self { encoder }
    }

    /// Assign a relevance value to every row, in place.
    ///
    /// Similarities are reported as computed, not clamped. Row order within
    /// each group is preserved: the nth comment gets the nth similarity.
    pub async fn generate_relevance(
        &self,
        rows: &mut [MergedRow],
        compared_with: ComparedWith,
    ) -> Result<()> {
        for (post_id, indices) in group_by_post(rows) {
            let live: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&i| rows[i].comment.is_some())
                .collect();

            if live.is_empty() {
                // Comment-less post: sentinel, no embedding work.
                for i in indices {
                    rows[i].relevance = 0.0;
                }
                continue;
            }

            let similarities = if compared_with.includes_parent() {
                self.score_per_row(rows, &live, compared_with).await?
            } else {
                self.score_shared_target(rows, &live, compared_with).await?
            };

            for (&i, sim) in live.iter().zip(similarities) {
                rows[i].relevance = sim;
            }
            debug!(post_id = %post_id, comments = live.len(), "Scored relevance group");
        }
        Ok(())
    }

    /// Simple modes: one target per group. Batch is every comment in the
    /// group plus the target as the final element.
    async fn score_shared_target(
        &self,
        rows: &[MergedRow],
        live: &[usize],
        compared_with: ComparedWith,
    ) -> Result<Vec<f64>> {
        let target = build_target(&rows[live[0]].post.post, "", compared_with);

        let mut batch: Vec<String> = live.iter().map(|&i| comment_text(&rows[i])).collect();
        batch.push(target);

        let embeddings = self.encoder.encode(&batch).await?;
        let target_emb = &embeddings[embeddings.len() - 1];

        Ok(embeddings[..live.len()]
            .iter()
            .map(|e| cosine_similarity(e, target_emb))
            .collect())
    }

    /// Parent modes: each row has its own target because each comment has
    /// its own parent. Pairs are flattened into one encode call per group:
    /// [comment0, target0, comment1, target1, ...].
    async fn score_per_row(
        &self,
        rows: &[MergedRow],
        live: &[usize],
        compared_with: ComparedWith,
    ) -> Result<Vec<f64>> {
        let mut batch = Vec::with_capacity(live.len() * 2);
        for &i in live {
            let parent = rows[i]
                .comment
                .as_ref()
                .map(|c| c.parent_comment.as_str())
                .unwrap_or_default();
            batch.push(comment_text(&rows[i]));
            batch.push(build_target(&rows[i].post.post, parent, compared_with));
        }

        let embeddings = self.encoder.encode(&batch).await?;

        Ok(embeddings
            .chunks_exact(2)
            .map(|pair| cosine_similarity(&pair[0], &pair[1]))
            .collect())
    }
}

/// Group row indices by post_id, preserving first-appearance order of posts
/// and row order within each group.
fn group_by_post(rows: &[MergedRow]) -> Vec<(String, Vec<usize>)> {
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let post_id = row.post_id();
        match seen.get(post_id) {
            Some(&slot) => order[slot].1.push(i),
            None => {
                seen.insert(post_id.to_string(), order.len());
                order.push((post_id.to_string(), vec![i]));
            }
        }
    }
    order
}

/// The comment text that gets embedded: the cleaned string, empty when the
/// comment was captured without a body.
fn comment_text(row: &MergedRow) -> String {
    row.comment
        .as_ref()
        .map(|c| c.text.cleaned.clone())
        .unwrap_or_default()
}

/// Assemble the comparison target: the selected post fields, plus the
/// resolved parent comment for parent modes, joined with single spaces.
/// Empty components are dropped rather than joined as blanks.
fn build_target(post: &Post, parent_comment: &str, compared_with: ComparedWith) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if compared_with.includes_title() {
        parts.push(post.title.as_str());
    }
    if compared_with.includes_body() {
        if let Some(body) = post.body.as_deref() {
            parts.push(body);
        }
    }
    if compared_with.includes_parent() {
        parts.push(parent_comment);
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, title: &str, body: Option<&str>) -> Post {
        Post {
            post_id: id.to_string(),
            title: title.to_string(),
            body: body.map(|b| b.to_string()),
            score: 0,
            upvote_ratio: 0.0,
            url: String::new(),
            num_comments: 0,
            created: 0.0,
            flair: None,
        }
    }

    #[test]
    fn test_build_target_title_body() {
        let p = post("p1", "the title", Some("the body"));
        assert_eq!(
            build_target(&p, "", ComparedWith::TitleBody),
            "the title the body"
        );
    }

    #[test]
    fn test_build_target_drops_empty_body() {
        let p = post("p1", "the title", None);
        assert_eq!(build_target(&p, "", ComparedWith::TitleBody), "the title");
    }

    #[test]
    fn test_build_target_parent_only() {
        let p = post("p1", "the title", Some("the body"));
        assert_eq!(
            build_target(&p, "parent text", ComparedWith::Parent),
            "parent text"
        );
    }

    #[test]
    fn test_build_target_all_components() {
        let p = post("p1", "t", Some("b"));
        assert_eq!(
            build_target(&p, "pc", ComparedWith::TitleBodyParent),
            "t b pc"
        );
    }

    #[test]
    fn test_build_target_empty_parent_dropped() {
        let p = post("p1", "t", None);
        assert_eq!(build_target(&p, "", ComparedWith::TitleParent), "t");
    }
}
