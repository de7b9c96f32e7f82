// Embedding-based topic inference.
//
// Documents are embedded with the sentence encoder, then clustered greedily:
// each unassigned document seeds a cluster and pulls in every other
// unassigned document whose embedding clears the similarity threshold.
// Clusters below the minimum size collapse into the outlier bucket (-1).
// Labels are TF-IDF keywords over each cluster's member documents, in the
// `{id}_{kw}_{kw}_{kw}` shape reporting expects.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};
use tracing::{debug, info};

use super::embedder::cosine_similarity;
use super::traits::{SentenceEncoder, TopicAssignment, TopicInfo, TopicModel, OUTLIER_TOPIC};
use crate::error::UsageError;

pub struct EmbeddingTopicModel {
    encoder: Arc<dyn SentenceEncoder>,
    /// Minimum cosine similarity to join a cluster seed.
    pub similarity_threshold: f64,
    /// Clusters smaller than this become outliers.
    pub min_cluster_size: usize,
    /// Keywords per topic label.
    pub label_words: usize,
    stop_words: Vec<String>,
    state: Option<Fitted>,
}

struct Fitted {
    docs: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    assignments: Vec<TopicAssignment>,
    /// Index = topic id. Mean member embedding per kept cluster.
    centroids: Vec<Vec<f32>>,
    info: Vec<TopicInfo>,
}

impl EmbeddingTopicModel {
    pub fn new(encoder: Arc<dyn SentenceEncoder>) -> Self {
        Self {
            encoder,
            similarity_threshold: 0.5,
            min_cluster_size: 2,
            label_words: 3,
            stop_words: get(LANGUAGE::English),
            state: None,
        }
    }

    fn fitted(&self) -> Result<&Fitted, UsageError> {
        self.state.as_ref().ok_or(UsageError::NotFitted)
    }

    /// Rebuild assignments, centroids, and labeled info from a cluster
    /// member list. Clusters below min_cluster_size fall out as outliers.
    fn finalize(&self, docs: Vec<String>, embeddings: Vec<Vec<f32>>, clusters: Vec<Vec<usize>>) -> Fitted {
        let mut kept: Vec<Vec<usize>> = clusters
            .into_iter()
            .filter(|c| c.len() >= self.min_cluster_size)
            .collect();
        // Largest cluster gets topic id 0, and so on down.
        kept.sort_by_key(|c| std::cmp::Reverse(c.len()));

        let centroids: Vec<Vec<f32>> = kept
            .iter()
            .map(|members| centroid(&embeddings, members))
            .collect();

        let mut assignments = vec![
            TopicAssignment {
                topic_id: OUTLIER_TOPIC,
                probability: 0.0,
            };
            docs.len()
        ];
        for (id, members) in kept.iter().enumerate() {
            for &doc_idx in members {
                assignments[doc_idx] = TopicAssignment {
                    topic_id: id as i32,
                    probability: cosine_similarity(&embeddings[doc_idx], &centroids[id]),
                };
            }
        }

        let outlier_count = assignments
            .iter()
            .filter(|a| a.topic_id == OUTLIER_TOPIC)
            .count();

        let mut info = Vec::with_capacity(kept.len() + 1);
        if outlier_count > 0 {
            info.push(TopicInfo {
                topic_id: OUTLIER_TOPIC,
                label: format!("{OUTLIER_TOPIC}_outliers"),
                count: outlier_count,
            });
        }
        for (id, members) in kept.iter().enumerate() {
            let member_docs: Vec<String> =
                members.iter().map(|&i| docs[i].clone()).collect();
            info.push(TopicInfo {
                topic_id: id as i32,
                label: self.label_cluster(id as i32, &member_docs),
                count: members.len(),
            });
        }

        Fitted {
            docs,
            embeddings,
            assignments,
            centroids,
            info,
        }
    }

    /// TF-IDF keywords over the cluster's documents, joined into the label.
    /// Falls back to raw term frequency when TF-IDF has nothing to rank
    /// (single-document clusters have a degenerate IDF).
    fn label_cluster(&self, id: i32, member_docs: &[String]) -> String {
        let params = TfIdfParams::UnprocessedDocuments(member_docs, &self.stop_words, None);
        let tfidf = TfIdf::new(params);
        let ranked: Vec<(String, f32)> = tfidf.get_ranked_word_scores(self.label_words);

        let keywords: Vec<String> = if ranked.iter().any(|(_, s)| *s > 0.0) {
            ranked.into_iter().map(|(w, _)| w).collect()
        } else {
            top_frequency_words(member_docs, &self.stop_words, self.label_words)
        };

        if keywords.is_empty() {
            return format!("{id}_topic");
        }
        format!("{id}_{}", keywords.join("_"))
    }
}

#[async_trait]
impl TopicModel for EmbeddingTopicModel {
    async fn fit_and_assign(&mut self, docs: &[String]) -> Result<Vec<TopicAssignment>> {
        if docs.is_empty() {
            return Err(UsageError::EmptyCorpus.into());
        }

        let embeddings = self.encoder.encode(docs).await?;
        let clusters = grow_clusters(&embeddings, self.similarity_threshold);
        debug!(
            docs = docs.len(),
            raw_clusters = clusters.len(),
            "Greedy clustering complete"
        );

        let fitted = self.finalize(docs.to_vec(), embeddings, clusters);
        info!(
            topics = fitted.centroids.len(),
            outliers = fitted
                .assignments
                .iter()
                .filter(|a| a.topic_id == OUTLIER_TOPIC)
                .count(),
            "Topic model fitted"
        );

        let assignments = fitted.assignments.clone();
        self.state = Some(fitted);
        Ok(assignments)
    }

    async fn reduce_topics(&mut self, target: usize) -> Result<Vec<TopicAssignment>> {
        if target == 0 {
            return Err(UsageError::BadReduceTarget(target).into());
        }
        let fitted = self.state.take().ok_or(UsageError::NotFitted)?;

        // Recover member lists per kept topic.
        let mut clusters: Vec<Vec<usize>> = fitted
            .centroids
            .iter()
            .enumerate()
            .map(|(id, _)| {
                fitted
                    .assignments
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| a.topic_id == id as i32)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        let mut centroids = fitted.centroids.clone();

        // Merge the two most similar clusters until the target is met.
        while clusters.len() > target {
            let (a, b) = closest_pair(&centroids);
            let absorbed = clusters.remove(b);
            centroids.remove(b);
            clusters[a].extend(absorbed);
            centroids[a] = centroid(&fitted.embeddings, &clusters[a]);
        }

        // Re-cluster bookkeeping runs even when no merge happened, so ids,
        // labels, and probabilities are always freshly derived.
        let fitted = self.finalize(fitted.docs, fitted.embeddings, clusters);
        info!(topics = fitted.centroids.len(), target, "Topics reduced");

        let assignments = fitted.assignments.clone();
        self.state = Some(fitted);
        Ok(assignments)
    }

    fn topic_info(&self) -> Result<Vec<TopicInfo>> {
        Ok(self.fitted()?.info.clone())
    }
}

/// Greedy seed-and-grow clustering over embeddings: each unassigned document
/// seeds a cluster and claims every other unassigned document whose cosine
/// similarity to the seed clears the threshold.
fn grow_clusters(embeddings: &[Vec<f32>], threshold: f64) -> Vec<Vec<usize>> {
    let n = embeddings.len();
    let mut assigned = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];

        for other in seed + 1..n {
            if assigned[other] {
                continue;
            }
            if cosine_similarity(&embeddings[seed], &embeddings[other]) >= threshold {
                assigned[other] = true;
                members.push(other);
            }
        }
        clusters.push(members);
    }

    clusters
}

fn centroid(embeddings: &[Vec<f32>], members: &[usize]) -> Vec<f32> {
    let dim = members
        .first()
        .map(|&i| embeddings[i].len())
        .unwrap_or_default();
    let mut mean = vec![0.0f32; dim];
    for &i in members {
        for (dst, src) in mean.iter_mut().zip(&embeddings[i]) {
            *dst += src;
        }
    }
    let n = members.len().max(1) as f32;
    for v in &mut mean {
        *v /= n;
    }
    mean
}

/// Indices of the two most similar centroids. Caller guarantees len >= 2.
fn closest_pair(centroids: &[Vec<f32>]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_sim = f64::NEG_INFINITY;
    for i in 0..centroids.len() {
        for j in i + 1..centroids.len() {
            let sim = cosine_similarity(&centroids[i], &centroids[j]);
            if sim > best_sim {
                best_sim = sim;
                best = (i, j);
            }
        }
    }
    best
}

fn top_frequency_words(docs: &[String], stop_words: &[String], limit: usize) -> Vec<String> {
    use std::collections::HashMap;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for doc in docs {
        for word in doc
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 1)
        {
            if stop_words.iter().any(|s| s == word) {
                continue;
            }
            *counts.entry(word.to_string()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(w, _)| w).collect()
}
