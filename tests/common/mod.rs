// Shared fixtures for integration tests: deterministic model fakes and
// record builders. The fakes satisfy the model traits without ONNX so the
// pipeline logic is testable on any machine.

#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use async_trait::async_trait;

use threadlens::data::{Comment, EnrichedComment, EnrichedPost, MergedRow, Post};
use threadlens::models::{SentenceEncoder, SentimentModel};
use threadlens::preprocess::NormalizedText;

/// Hashed bag-of-words encoder: each lowercased word increments one of 64
/// buckets. Texts sharing words get positive cosine similarity; identical
/// texts get 1.0. Deterministic, no model files.
pub struct FakeEncoder;

const FAKE_DIM: usize = 64;

#[async_trait]
impl SentenceEncoder for FakeEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; FAKE_DIM];
                for word in t.to_lowercase().split_whitespace() {
                    let mut hasher = DefaultHasher::new();
                    word.hash(&mut hasher);
                    v[(hasher.finish() as usize) % FAKE_DIM] += 1.0;
                }
                v
            })
            .collect())
    }
}

/// Word-list sentiment: texts with clearly positive words score 5, clearly
/// negative words score 1, everything else neutral 3.
pub struct FakeSentiment;

#[async_trait]
impl SentimentModel for FakeSentiment {
    async fn score_text(&self, text: &str) -> Result<u8> {
        let lower = text.to_lowercase();
        if ["love", "great", "wonderful"].iter().any(|w| lower.contains(w)) {
            Ok(5)
        } else if ["hate", "awful", "terrible"].iter().any(|w| lower.contains(w)) {
            Ok(1)
        } else {
            Ok(3)
        }
    }
}

pub fn make_post(id: &str, title: &str, body: Option<&str>) -> Post {
    Post {
        post_id: id.to_string(),
        title: title.to_string(),
        body: body.map(|b| b.to_string()),
        score: 42,
        upvote_ratio: 0.9,
        url: format!("https://reddit.com/{id}"),
        num_comments: 0,
        created: 1_700_000_000.0,
        flair: None,
    }
}

pub fn make_comment(id: &str, post_id: &str, parent_id: &str, text: Option<&str>) -> Comment {
    Comment {
        comment_id: id.to_string(),
        post_id: post_id.to_string(),
        parent_id: parent_id.to_string(),
        comment: text.map(|t| t.to_string()),
        up_vote_count: 7,
        controversiality: 0,
        total_awards_received: 0,
        is_locked: false,
        is_collapsed: false,
        is_submitter: false,
        created_utc: 1_700_000_100.0,
    }
}

/// An enriched post whose cleaned text is given directly, bypassing
/// normalization.
pub fn enriched_post(id: &str, title: &str, body: Option<&str>) -> EnrichedPost {
    EnrichedPost {
        post: make_post(id, title, body),
        text: cleaned_text(body.unwrap_or(title)),
        topic_id: 0,
        topic_label: "0_test".to_string(),
        sentiment: 3,
    }
}

/// An enriched comment whose cleaned text and parent text are given directly.
pub fn enriched_comment(id: &str, post_id: &str, text: &str, parent: &str) -> EnrichedComment {
    EnrichedComment {
        comment: make_comment(id, post_id, &format!("t3_{post_id}"), Some(text)),
        text: cleaned_text(text),
        topic_id: 0,
        topic_label: "0_test".to_string(),
        sentiment: 3,
        parent_comment: parent.to_string(),
    }
}

pub fn merged_row(post: EnrichedPost, comment: Option<EnrichedComment>) -> MergedRow {
    MergedRow {
        post,
        comment,
        relevance: 0.0,
    }
}

fn cleaned_text(text: &str) -> NormalizedText {
    NormalizedText {
        cleaned: text.to_string(),
        tokens: text.split_whitespace().map(str::to_string).collect(),
        tags: Vec::new(),
        joined: text.to_string(),
    }
}
