// Unit tests for relevance scoring over merged rows.
//
// The fake encoder maps shared vocabulary to positive cosine similarity,
// so a comment repeating its target's words scores near 1.0 and a comment
// with disjoint vocabulary scores near 0.0.

mod common;

use std::sync::Arc;

use threadlens::relevance::{ComparedWith, RelevanceScorer};

use common::{enriched_comment, enriched_post, merged_row, FakeEncoder};

fn scorer() -> RelevanceScorer {
    RelevanceScorer::new(Arc::new(FakeEncoder))
}

// ============================================================
// Sentinel and grouping
// ============================================================

#[tokio::test]
async fn commentless_post_keeps_sentinel() {
    let mut rows = vec![merged_row(
        enriched_post("p1", "cats are fluffy", Some("body text")),
        None,
    )];
    rows[0].relevance = 9.9; // must be reset, not left over

    scorer()
        .generate_relevance(&mut rows, ComparedWith::TitleBody)
        .await
        .unwrap();

    assert_eq!(rows[0].relevance, 0.0);
}

#[tokio::test]
async fn rows_scored_against_their_own_post() {
    // Interleaved rows from two posts — grouping must follow post_id, not
    // adjacency.
    let p1 = enriched_post("p1", "alpha beta gamma", None);
    let p2 = enriched_post("p2", "delta epsilon zeta", None);
    let mut rows = vec![
        merged_row(p1.clone(), Some(enriched_comment("c1", "p1", "alpha beta gamma", ""))),
        merged_row(p2.clone(), Some(enriched_comment("c2", "p2", "delta epsilon zeta", ""))),
        merged_row(p1, Some(enriched_comment("c3", "p1", "unrelated vocabulary entirely", ""))),
    ];

    scorer()
        .generate_relevance(&mut rows, ComparedWith::Title)
        .await
        .unwrap();

    assert!(rows[0].relevance > 0.99, "exact match: {}", rows[0].relevance);
    assert!(rows[1].relevance > 0.99, "exact match: {}", rows[1].relevance);
    assert!(rows[2].relevance < 0.5, "disjoint: {}", rows[2].relevance);
}

// ============================================================
// Comparison modes
// ============================================================

#[tokio::test]
async fn title_mode_ignores_body() {
    let post = enriched_post("p1", "cats cats cats", Some("finance stock market"));
    let mut rows = vec![merged_row(
        post,
        Some(enriched_comment("c1", "p1", "finance stock market", "")),
    )];

    scorer()
        .generate_relevance(&mut rows, ComparedWith::Title)
        .await
        .unwrap();
    let title_only = rows[0].relevance;

    scorer()
        .generate_relevance(&mut rows, ComparedWith::Body)
        .await
        .unwrap();
    let body_only = rows[0].relevance;

    assert!(title_only < 0.5, "title mode: {title_only}");
    assert!(body_only > 0.99, "body mode: {body_only}");
}

#[tokio::test]
async fn parent_mode_uses_per_row_parent() {
    let post = enriched_post("p1", "post title words", None);
    let mut rows = vec![
        merged_row(
            post.clone(),
            Some(enriched_comment("c1", "p1", "agree with parent", "agree with parent")),
        ),
        merged_row(
            post,
            Some(enriched_comment("c2", "p1", "agree with parent", "something else wholly")),
        ),
    ];

    scorer()
        .generate_relevance(&mut rows, ComparedWith::Parent)
        .await
        .unwrap();

    assert!(rows[0].relevance > 0.99, "matching parent: {}", rows[0].relevance);
    assert!(
        rows[1].relevance < rows[0].relevance,
        "differing parent must score lower: {} vs {}",
        rows[1].relevance,
        rows[0].relevance
    );
}

#[tokio::test]
async fn parent_mode_with_empty_parent_scores_zero() {
    // Parent resolved to empty (top-level comment): the target embeds to the
    // zero vector, so cosine is 0.
    let post = enriched_post("p1", "post title words", None);
    let mut rows = vec![merged_row(
        post,
        Some(enriched_comment("c1", "p1", "some comment text", "")),
    )];

    scorer()
        .generate_relevance(&mut rows, ComparedWith::Parent)
        .await
        .unwrap();

    assert_eq!(rows[0].relevance, 0.0);
}

#[tokio::test]
async fn combined_mode_sees_all_components() {
    let post = enriched_post("p1", "alpha", Some("beta"));
    let mut rows = vec![merged_row(
        post,
        Some(enriched_comment("c1", "p1", "alpha beta gamma", "gamma")),
    )];

    scorer()
        .generate_relevance(&mut rows, ComparedWith::TitleBodyParent)
        .await
        .unwrap();

    // Target is "alpha beta gamma" — identical vocabulary to the comment.
    assert!(rows[0].relevance > 0.99, "got {}", rows[0].relevance);
}

#[tokio::test]
async fn missing_comment_body_embeds_empty() {
    // A captured comment with no text inside a live group: scored as the
    // empty string, cosine 0, no panic.
    let post = enriched_post("p1", "alpha beta", None);
    let mut empty_comment = enriched_comment("c1", "p1", "x", "");
    empty_comment.comment.comment = None;
    empty_comment.text = Default::default();

    let mut rows = vec![
        merged_row(post.clone(), Some(enriched_comment("c2", "p1", "alpha beta", ""))),
        merged_row(post, Some(empty_comment)),
    ];

    scorer()
        .generate_relevance(&mut rows, ComparedWith::Title)
        .await
        .unwrap();

    assert!(rows[0].relevance > 0.99);
    assert_eq!(rows[1].relevance, 0.0);
}
