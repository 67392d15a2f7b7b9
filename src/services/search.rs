//! Post search
//!
//! Ranked full-text search over post title and body. The repository
//! narrows to published candidates containing any query term; the rank
//! is computed here and gated by a fixed relevance threshold.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::db::repositories::PostRepository;
use crate::models::Post;

/// Minimum rank for a candidate to count as a result.
pub const RANK_THRESHOLD: f32 = 0.3;

/// Field weights. Title and body sit in the same (highest) tier.
const WEIGHT_TITLE: f32 = 1.0;
const WEIGHT_BODY: f32 = 1.0;

/// A post with its computed relevance rank
#[derive(Debug, Clone, Serialize)]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: Post,
    pub rank: f32,
}

/// Search service
pub struct SearchService {
    posts: Arc<dyn PostRepository>,
}

impl SearchService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Run a ranked search. An empty or blank query yields no results.
    pub async fn search(&self, query: &str) -> Result<Vec<RankedPost>> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.posts.search_candidates(&terms).await?;

        let mut results: Vec<RankedPost> = candidates
            .into_iter()
            .map(|post| {
                let rank = rank(&terms, &post.title, &post.body);
                RankedPost { post, rank }
            })
            .filter(|r| r.rank >= RANK_THRESHOLD)
            .collect();

        results.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.post.publish.cmp(&a.post.publish))
        });

        Ok(results)
    }
}

/// Lowercased alphanumeric terms of a query or document.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Relevance rank of a document for a set of query terms.
///
/// Each term contributes a saturating score `w / (w + 1)` of its
/// weighted occurrence count across title and body; the rank is the
/// mean contribution over all query terms. One title hit of a
/// single-term query ranks 0.5; a term absent everywhere contributes 0.
fn rank(terms: &[String], title: &str, body: &str) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }

    let title_tokens = tokenize(title);
    let body_tokens = tokenize(body);

    let mut sum = 0.0f32;
    for term in terms {
        let tf_title = title_tokens.iter().filter(|t| *t == term).count() as f32;
        let tf_body = body_tokens.iter().filter(|t| *t == term).count() as f32;
        let w = WEIGHT_TITLE * tf_title + WEIGHT_BODY * tf_body;
        sum += w / (w + 1.0);
    }
    sum / terms.len() as f32
}
