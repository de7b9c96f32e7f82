// Unit tests for embedding-based topic inference.
//
// Uses the deterministic bag-of-words fake encoder: documents sharing most
// of their words cluster together, documents with disjoint vocabulary do
// not. Covers fitting, outlier handling, labels, reduction, and the usage
// errors for out-of-order calls.

mod common;

use std::sync::Arc;

use threadlens::error::UsageError;
use threadlens::models::{EmbeddingTopicModel, TopicModel, OUTLIER_TOPIC};

use common::FakeEncoder;

fn corpus() -> Vec<String> {
    [
        "cat kitten whiskers purr",
        "cat kitten whiskers meow",
        "cat kitten purr meow",
        "stock market invest money",
        "stock market invest trade",
        "stock invest money trade",
        "zebra",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn model() -> EmbeddingTopicModel {
    let mut m = EmbeddingTopicModel::new(Arc::new(FakeEncoder));
    // Tightened so a single hashed-word collision cannot bridge clusters.
    m.similarity_threshold = 0.6;
    m
}

// ============================================================
// Fitting and assignment
// ============================================================

#[tokio::test]
async fn fit_separates_disjoint_vocabularies() {
    let mut m = model();
    let assignments = m.fit_and_assign(&corpus()).await.unwrap();

    // Three cat docs share one topic, three finance docs another.
    assert_eq!(assignments[0].topic_id, assignments[1].topic_id);
    assert_eq!(assignments[0].topic_id, assignments[2].topic_id);
    assert_eq!(assignments[3].topic_id, assignments[4].topic_id);
    assert_eq!(assignments[3].topic_id, assignments[5].topic_id);
    assert_ne!(assignments[0].topic_id, assignments[3].topic_id);

    // Members sit close to their centroid.
    for a in &assignments[..6] {
        assert!(a.probability > 0.5, "probability {}", a.probability);
    }
}

#[tokio::test]
async fn lone_document_becomes_outlier() {
    let mut m = model();
    let assignments = m.fit_and_assign(&corpus()).await.unwrap();

    assert_eq!(assignments[6].topic_id, OUTLIER_TOPIC);
    assert_eq!(assignments[6].probability, 0.0);
}

#[tokio::test]
async fn topic_info_labels_and_counts() {
    let mut m = model();
    m.fit_and_assign(&corpus()).await.unwrap();
    let info = m.topic_info().unwrap();

    // Outlier row first, then the two real topics.
    assert_eq!(info.len(), 3);
    assert_eq!(info[0].topic_id, OUTLIER_TOPIC);
    assert_eq!(info[0].label, "-1_outliers");
    assert_eq!(info[0].count, 1);

    for (row, expected_id) in info[1..].iter().zip([0, 1]) {
        assert_eq!(row.topic_id, expected_id);
        assert_eq!(row.count, 3);
        assert!(
            row.label.starts_with(&format!("{expected_id}_")),
            "label: {}",
            row.label
        );
        assert!(row.label.len() > 2, "label should carry keywords: {}", row.label);
    }
}

// ============================================================
// Reduction
// ============================================================

#[tokio::test]
async fn reduce_merges_down_to_target() {
    let mut m = model();
    m.fit_and_assign(&corpus()).await.unwrap();
    let assignments = m.reduce_topics(1).await.unwrap();

    // All clustered docs collapse into topic 0; the outlier stays out.
    for a in &assignments[..6] {
        assert_eq!(a.topic_id, 0);
    }
    assert_eq!(assignments[6].topic_id, OUTLIER_TOPIC);

    let info = m.topic_info().unwrap();
    assert_eq!(info.len(), 2);
    assert_eq!(info[1].topic_id, 0);
    assert_eq!(info[1].count, 6);
    assert!(info[1].label.starts_with("0_"), "label: {}", info[1].label);
}

#[tokio::test]
async fn reduce_with_large_target_keeps_topics() {
    let mut m = model();
    m.fit_and_assign(&corpus()).await.unwrap();
    let assignments = m.reduce_topics(10).await.unwrap();

    let topics: std::collections::HashSet<i32> = assignments
        .iter()
        .map(|a| a.topic_id)
        .filter(|&id| id != OUTLIER_TOPIC)
        .collect();
    assert_eq!(topics.len(), 2);
}

// ============================================================
// Usage errors
// ============================================================

#[tokio::test]
async fn fit_on_empty_corpus_is_an_error() {
    let mut m = model();
    let err = m.fit_and_assign(&[]).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<UsageError>(),
        Some(&UsageError::EmptyCorpus)
    );
}

#[tokio::test]
async fn reduce_before_fit_is_an_error() {
    let mut m = model();
    let err = m.reduce_topics(5).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<UsageError>(),
        Some(&UsageError::NotFitted)
    );
}

#[tokio::test]
async fn topic_info_before_fit_is_an_error() {
    let m = model();
    assert!(m.topic_info().is_err());
}

#[tokio::test]
async fn reduce_to_zero_is_an_error() {
    let mut m = model();
    m.fit_and_assign(&corpus()).await.unwrap();
    let err = m.reduce_topics(0).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<UsageError>(),
        Some(&UsageError::BadReduceTarget(0))
    );
}
