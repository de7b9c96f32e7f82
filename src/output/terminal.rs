// Colored terminal output for analysis run summaries.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs display functions delegate here.

use colored::Colorize;

use crate::models::{TopicInfo, OUTLIER_TOPIC};
use crate::pipeline::{AnalysisArtifacts, PipelineConfig};

/// Display the summary of a finished analysis run.
pub fn display_run_summary(artifacts: &AnalysisArtifacts, cfg: &PipelineConfig) {
    println!(
        "\n{}",
        format!(
            "=== r/{} ({}) — {} posts, {} comments, {} result rows ===",
            cfg.subreddit,
            cfg.sort_order,
            artifacts.posts.len(),
            artifacts.comments.len(),
            artifacts.results.len()
        )
        .bold()
    );

    display_topic_table("Post topics", &artifacts.post_topics);
    if artifacts.comment_topics.is_empty() {
        println!("\n  {}", "No comments captured for this snapshot".dimmed());
    } else {
        display_topic_table("Comment topics", &artifacts.comment_topics);
    }

    display_sentiment_histogram(artifacts);
    display_relevance_summary(artifacts, cfg);
    println!();
}

/// One topic table: id, member count, label.
fn display_topic_table(heading: &str, topics: &[TopicInfo]) {
    println!("\n{}", heading.bold());
    println!(
        "  {:>6}  {:>6}  {}",
        "Topic".dimmed(),
        "Docs".dimmed(),
        "Label".dimmed()
    );
    println!("  {}", "-".repeat(60).dimmed());

    for topic in topics {
        let label = super::truncate_chars(&topic.label, 48);
        if topic.topic_id == OUTLIER_TOPIC {
            println!(
                "  {:>6}  {:>6}  {}",
                topic.topic_id,
                topic.count,
                label.dimmed()
            );
        } else {
            println!("  {:>6}  {:>6}  {}", topic.topic_id, topic.count, label);
        }
    }
}

fn display_sentiment_histogram(artifacts: &AnalysisArtifacts) {
    let mut counts = [0usize; 5];
    for post in &artifacts.posts {
        if (1..=5).contains(&post.sentiment) {
            counts[post.sentiment as usize - 1] += 1;
        }
    }
    for comment in &artifacts.comments {
        if (1..=5).contains(&comment.sentiment) {
            counts[comment.sentiment as usize - 1] += 1;
        }
    }

    println!("\n{}", "Sentiment (1 negative .. 5 positive)".bold());
    for (i, count) in counts.iter().enumerate() {
        let class = i + 1;
        let bar = "#".repeat(*count.min(&60));
        let bar = match class {
            1 | 2 => bar.red(),
            3 => bar.yellow(),
            _ => bar.green(),
        };
        println!("  {class}  {:>5}  {bar}", count);
    }
}

fn display_relevance_summary(artifacts: &AnalysisArtifacts, cfg: &PipelineConfig) {
    let scored: Vec<f64> = artifacts
        .results
        .iter()
        .filter(|r| r.comment.is_some())
        .map(|r| r.relevance)
        .collect();

    if scored.is_empty() {
        return;
    }

    let mean = scored.iter().sum::<f64>() / scored.len() as f64;
    let min = scored.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = scored.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    println!(
        "\n{}",
        format!("Relevance vs {}", cfg.compared_with).bold()
    );
    println!(
        "  scored: {}  mean: {mean:.3}  min: {min:.3}  max: {max:.3}",
        scored.len()
    );
}
