// Stage driver for one subreddit analysis run.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::data::{
    resolve_parent_comment, Comment, DataStore, EnrichedComment, EnrichedPost, MergedRow, Post,
    SortOrder,
};
use crate::models::{
    EmbeddingTopicModel, SentenceEncoder, SentimentModel, TopicAssignment, TopicInfo, TopicModel,
    OUTLIER_TOPIC,
};
use crate::preprocess::{NormalizedText, StemMode, TextNormalizer};
use crate::relevance::{ComparedWith, RelevanceScorer};

use super::merge::{merge_left, select_post_text};

/// Everything a run needs that outlives it: the normalizer and the model
/// handles. Passed by reference into each stage; no process-wide state.
pub struct AnalysisContext {
    pub normalizer: TextNormalizer,
    pub sentiment: Arc<dyn SentimentModel>,
    pub encoder: Arc<dyn SentenceEncoder>,
}

/// Per-run knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub subreddit: String,
    pub sort_order: SortOrder,
    pub compared_with: ComparedWith,
    /// Topic count ceiling after reduction, per table.
    pub reduce_to: usize,
    pub max_posts: usize,
    pub max_comments: usize,
    pub stem_mode: StemMode,
}

impl PipelineConfig {
    pub fn new(subreddit: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            subreddit: subreddit.into(),
            sort_order,
            compared_with: ComparedWith::default(),
            reduce_to: 10,
            max_posts: 500,
            max_comments: 500,
            stem_mode: StemMode::default(),
        }
    }
}

/// Pipeline stages, in execution order. Logged as each stage completes so a
/// failed run shows exactly how far it got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    PostsPreprocessed,
    PostsTopicModeled,
    PostsTopicsReduced,
    PostsSentimentScored,
    CommentsPreprocessed,
    CommentsTopicModeled,
    CommentsTopicsReduced,
    CommentsSentimentScored,
    Merged,
    RelevanceScored,
    ColumnsRenamed,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Raw => "raw",
            Stage::PostsPreprocessed => "posts_preprocessed",
            Stage::PostsTopicModeled => "posts_topic_modeled",
            Stage::PostsTopicsReduced => "posts_topics_reduced",
            Stage::PostsSentimentScored => "posts_sentiment_scored",
            Stage::CommentsPreprocessed => "comments_preprocessed",
            Stage::CommentsTopicModeled => "comments_topic_modeled",
            Stage::CommentsTopicsReduced => "comments_topics_reduced",
            Stage::CommentsSentimentScored => "comments_sentiment_scored",
            Stage::Merged => "merged",
            Stage::RelevanceScored => "relevance_scored",
            Stage::ColumnsRenamed => "columns_renamed",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// Everything one run produces, pre-persistence.
pub struct AnalysisArtifacts {
    pub posts: Vec<EnrichedPost>,
    pub comments: Vec<EnrichedComment>,
    pub results: Vec<MergedRow>,
    pub post_topics: Vec<TopicInfo>,
    pub comment_topics: Vec<TopicInfo>,
}

/// Run the full stage chain over an in-memory snapshot.
///
/// Fails fast: the first stage error aborts the run and nothing downstream
/// executes. An empty posts table is an error; an empty comments table is
/// not — the comment-side model stages are skipped and every post comes out
/// as a comment-less row with the relevance sentinel.
pub async fn run(
    ctx: &AnalysisContext,
    cfg: &PipelineConfig,
    mut posts: Vec<Post>,
    mut comments: Vec<Comment>,
) -> Result<AnalysisArtifacts> {
    if posts.is_empty() {
        anyhow::bail!(
            "No posts in the {} snapshot for r/{}",
            cfg.sort_order,
            cfg.subreddit
        );
    }
    posts.truncate(cfg.max_posts);
    comments.truncate(cfg.max_comments);
    info!(
        stage = %Stage::Raw,
        posts = posts.len(),
        comments = comments.len(),
        "Loaded snapshot"
    );

    // --- Post side ---
    let source = select_post_text(&posts);
    let post_texts: Vec<NormalizedText> = posts
        .iter()
        .map(|p| {
            let text = source.extract(p);
            ctx.normalizer.normalize(Some(&text), cfg.stem_mode)
        })
        .collect();
    info!(stage = %Stage::PostsPreprocessed, source = ?source, "Posts normalized");

    let mut post_model = EmbeddingTopicModel::new(Arc::clone(&ctx.encoder));
    let post_docs: Vec<String> = post_texts.iter().map(|t| t.joined.clone()).collect();
    post_model
        .fit_and_assign(&post_docs)
        .await
        .context("Post topic modeling failed")?;
    info!(stage = %Stage::PostsTopicModeled, "Post topics fitted");

    let post_assignments = post_model
        .reduce_topics(cfg.reduce_to)
        .await
        .context("Post topic reduction failed")?;
    let post_topics = post_model.topic_info()?;
    info!(
        stage = %Stage::PostsTopicsReduced,
        topics = post_topics.len(),
        "Post topics reduced"
    );

    let post_cleaned: Vec<String> = post_texts.iter().map(|t| t.cleaned.clone()).collect();
    let post_sentiments = ctx
        .sentiment
        .score_batch(&post_cleaned)
        .await
        .context("Post sentiment scoring failed")?;
    info!(stage = %Stage::PostsSentimentScored, "Post sentiment scored");

    let post_labels = label_map(&post_topics);
    let enriched_posts: Vec<EnrichedPost> = posts
        .into_iter()
        .zip(post_texts)
        .zip(post_assignments.iter().zip(post_sentiments))
        .map(|((post, text), (assignment, sentiment))| EnrichedPost {
            post,
            text,
            topic_id: assignment.topic_id,
            topic_label: label_for(&post_labels, assignment),
            sentiment,
        })
        .collect();

    // --- Comment side ---
    let (enriched_comments, comment_topics) = if comments.is_empty() {
        warn!(
            "No comments in the {} snapshot for r/{}, skipping comment analysis",
            cfg.sort_order, cfg.subreddit
        );
        (Vec::new(), Vec::new())
    } else {
        enrich_comments(ctx, cfg, comments).await?
    };

    // --- Join, relevance, rename ---
    let mut results = merge_left(enriched_posts.clone(), enriched_comments.clone());
    info!(stage = %Stage::Merged, rows = results.len(), "Merged tables");

    RelevanceScorer::new(Arc::clone(&ctx.encoder))
        .generate_relevance(&mut results, cfg.compared_with)
        .await
        .context("Relevance scoring failed")?;
    info!(
        stage = %Stage::RelevanceScored,
        mode = %cfg.compared_with,
        "Relevance scored"
    );

    // The rename to the final schema happens in serialization (ResultRow);
    // from here on only the renamed shape is visible.
    info!(stage = %Stage::ColumnsRenamed, "Result schema fixed");

    Ok(AnalysisArtifacts {
        posts: enriched_posts,
        comments: enriched_comments,
        results,
        post_topics,
        comment_topics,
    })
}

/// Load the raw snapshot from the store, run the chain, persist all three
/// artifacts. Nothing is written unless every stage succeeded.
pub async fn run_and_persist(
    ctx: &AnalysisContext,
    cfg: &PipelineConfig,
    store: &DataStore,
) -> Result<AnalysisArtifacts> {
    let posts = store.load_posts(&cfg.subreddit, cfg.sort_order)?;
    let comments = store.load_comments(&cfg.subreddit, cfg.sort_order)?;

    let artifacts = run(ctx, cfg, posts, comments).await?;

    store.save_posts(&cfg.subreddit, cfg.sort_order, &artifacts.posts)?;
    store.save_comments(&cfg.subreddit, cfg.sort_order, &artifacts.comments)?;
    store.save_results(&cfg.subreddit, cfg.sort_order, &artifacts.results)?;
    store.save_topics(
        &cfg.subreddit,
        cfg.sort_order,
        &artifacts.post_topics,
        &artifacts.comment_topics,
    )?;
    info!(stage = %Stage::Persisted, "Run persisted");

    Ok(artifacts)
}

async fn enrich_comments(
    ctx: &AnalysisContext,
    cfg: &PipelineConfig,
    comments: Vec<Comment>,
) -> Result<(Vec<EnrichedComment>, Vec<TopicInfo>)> {
    let by_id: HashMap<&str, &Comment> = comments
        .iter()
        .map(|c| (c.comment_id.as_str(), c))
        .collect();
    let parents: Vec<String> = comments
        .iter()
        .map(|c| resolve_parent_comment(c, &by_id))
        .collect();

    let texts: Vec<NormalizedText> = comments
        .iter()
        .map(|c| ctx.normalizer.normalize(c.comment.as_deref(), cfg.stem_mode))
        .collect();
    info!(stage = %Stage::CommentsPreprocessed, "Comments normalized");

    let mut comment_model = EmbeddingTopicModel::new(Arc::clone(&ctx.encoder));
    let docs: Vec<String> = texts.iter().map(|t| t.joined.clone()).collect();
    comment_model
        .fit_and_assign(&docs)
        .await
        .context("Comment topic modeling failed")?;
    info!(stage = %Stage::CommentsTopicModeled, "Comment topics fitted");

    let assignments = comment_model
        .reduce_topics(cfg.reduce_to)
        .await
        .context("Comment topic reduction failed")?;
    let topics = comment_model.topic_info()?;
    info!(
        stage = %Stage::CommentsTopicsReduced,
        topics = topics.len(),
        "Comment topics reduced"
    );

    let cleaned: Vec<String> = texts.iter().map(|t| t.cleaned.clone()).collect();
    let sentiments = ctx
        .sentiment
        .score_batch(&cleaned)
        .await
        .context("Comment sentiment scoring failed")?;
    info!(stage = %Stage::CommentsSentimentScored, "Comment sentiment scored");

    let labels = label_map(&topics);
    let enriched = comments
        .into_iter()
        .zip(texts)
        .zip(parents)
        .zip(assignments.iter().zip(sentiments))
        .map(
            |(((comment, text), parent_comment), (assignment, sentiment))| EnrichedComment {
                comment,
                text,
                topic_id: assignment.topic_id,
                topic_label: label_for(&labels, assignment),
                sentiment,
                parent_comment,
            },
        )
        .collect();

    Ok((enriched, topics))
}

fn label_map(topics: &[TopicInfo]) -> HashMap<i32, String> {
    topics
        .iter()
        .map(|t| (t.topic_id, t.label.clone()))
        .collect()
}

fn label_for(labels: &HashMap<i32, String>, assignment: &TopicAssignment) -> String {
    labels
        .get(&assignment.topic_id)
        .cloned()
        .unwrap_or_else(|| format!("{OUTLIER_TOPIC}_outliers"))
}
