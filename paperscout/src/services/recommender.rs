use std::sync::Arc;

use crate::archive::PaperCatalog;
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::{PaperscoutError, Result};
use crate::llm::{prompts, LlmProvider};
use crate::models::{Confidence, Recommendation};
use crate::vector::VectorIndex;

/// The recommendation pipeline: plurality vote over a deep search, a
/// shallower scoring search, and a document-stuffed summary.
#[derive(Clone)]
pub struct RecommenderService {
    index: Arc<dyn VectorIndex>,
    embeddings: EmbeddingProvider,
    llm: LlmProvider,
    catalog: Arc<PaperCatalog>,
    combined_collection: String,
    paper_collection_prefix: String,
    recommend_top_k: u32,
    score_top_k: u32,
    summary_top_k: u32,
}

impl RecommenderService {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
        catalog: Arc<PaperCatalog>,
        config: &Config,
    ) -> Self {
        Self {
            index,
            embeddings,
            llm,
            catalog,
            combined_collection: config.vector.combined_collection.clone(),
            paper_collection_prefix: config.vector.paper_collection_prefix.clone(),
            recommend_top_k: config.recommender.recommend_top_k,
            score_top_k: config.recommender.score_top_k,
            summary_top_k: config.recommender.summary_top_k,
        }
    }

    fn paper_collection(&self, pmid: &str) -> String {
        format!("{}{}", self.paper_collection_prefix, pmid)
    }

    /// Title of the paper whose chunks dominate the top hits for `query`.
    ///
    /// Zero hits, or hits that all lack a title tag, surface as
    /// `NoSearchResults` rather than a silent default.
    pub async fn recommend_title(&self, query: &str) -> Result<String> {
        let vector = self.embeddings.embed_query(query).await?;
        let hits = self
            .index
            .search(&self.combined_collection, &vector, self.recommend_top_k)
            .await?;

        let mut titles = Vec::with_capacity(hits.len());
        for hit in hits {
            match hit.title {
                Some(title) => titles.push(title),
                None => tracing::warn!("Skipping search hit with no title metadata"),
            }
        }

        most_frequent_title(&titles).ok_or(PaperscoutError::NoSearchResults)
    }

    /// Mean relevance of the scoring search's hits for the recommended paper.
    ///
    /// The scoring search is shallower than the recommendation search, so it
    /// may not reconsult the recommended paper at all; that case is a
    /// defined `EmptyScoreSet` error, never a NaN.
    pub async fn score(&self, query: &str, recommended_title: &str) -> Result<f64> {
        let vector = self.embeddings.embed_query(query).await?;
        let hits = self
            .index
            .search(&self.combined_collection, &vector, self.score_top_k)
            .await?;

        let scores: Vec<f64> = hits
            .iter()
            .filter(|hit| hit.title.as_deref() == Some(recommended_title))
            .map(|hit| hit.score as f64)
            .collect();

        mean_score(&scores).ok_or_else(|| {
            PaperscoutError::EmptyScoreSet(recommended_title.to_string())
        })
    }

    /// Document-stuffed summary from the paper's own collection.
    pub async fn summarize(&self, pmid: &str) -> Result<String> {
        let vector = self.embeddings.embed_query(prompts::SUMMARY_QUERY).await?;
        let hits = self
            .index
            .search(&self.paper_collection(pmid), &vector, self.summary_top_k)
            .await?;

        if hits.is_empty() {
            return Err(PaperscoutError::NoSearchResults);
        }

        let chunks: Vec<String> = hits.into_iter().map(|hit| hit.content).collect();
        let prompt = prompts::summary_prompt(&chunks);

        self.llm.complete(&prompt, None).await
    }

    /// Full pipeline: vote, catalog lookup, then scoring and summarization
    /// concurrently (both depend only on the already-resolved identity).
    pub async fn recommend(&self, query: &str) -> Result<Recommendation> {
        let title = self.recommend_title(query).await?;

        let paper = self
            .catalog
            .by_title(&title)
            .ok_or_else(|| PaperscoutError::MetadataNotFound(title.clone()))?;

        let (score, summary) = tokio::join!(self.score(query, &title), self.summarize(&paper.pmid));

        let confidence = Confidence::from_score(score?);

        Ok(Recommendation::new(paper, confidence, summary?))
    }
}

/// Plurality vote over hit titles. Ties resolve to the title seen first in
/// search-ranking order, deterministically.
fn most_frequent_title(titles: &[String]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for title in titles {
        match counts.iter_mut().find(|(seen, _)| *seen == title.as_str()) {
            Some(entry) => entry.1 += 1,
            None => counts.push((title, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (title, count) in counts {
        // Strictly-greater keeps the first-seen title on ties.
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((title, count));
        }
    }

    best.map(|(title, _)| title.to_string())
}

/// Arithmetic mean, `None` for an empty set rather than a NaN.
fn mean_score(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plurality_wins() {
        let result = most_frequent_title(&titles(&["A", "A", "B"]));
        assert_eq!(result.as_deref(), Some("A"));
    }

    #[test]
    fn plurality_wins_regardless_of_position() {
        let result = most_frequent_title(&titles(&["B", "A", "A", "C", "A", "B"]));
        assert_eq!(result.as_deref(), Some("A"));
    }

    #[test]
    fn tie_resolves_to_first_seen() {
        let result = most_frequent_title(&titles(&["B", "A", "A", "B"]));
        assert_eq!(result.as_deref(), Some("B"));

        let result = most_frequent_title(&titles(&["A", "B", "B", "A"]));
        assert_eq!(result.as_deref(), Some("A"));
    }

    #[test]
    fn empty_hit_list_has_no_winner() {
        assert!(most_frequent_title(&[]).is_none());
    }

    #[test]
    fn single_hit_wins() {
        let result = most_frequent_title(&titles(&["Only paper"]));
        assert_eq!(result.as_deref(), Some("Only paper"));
    }

    #[test]
    fn mean_score_matches_confidence_fixtures() {
        use crate::models::Confidence;

        let mean = mean_score(&[0.7, 0.68, 0.66]).unwrap();
        assert_eq!(Confidence::from_score(mean).render(), "High: 0.68");

        let mean = mean_score(&[0.61, 0.62]).unwrap();
        assert_eq!(Confidence::from_score(mean).render(), "Medium: 0.615");

        let mean = mean_score(&[0.4]).unwrap();
        assert_eq!(Confidence::from_score(mean).render(), "Extremely Low: 0.4");
    }

    #[test]
    fn empty_score_set_has_no_mean() {
        assert!(mean_score(&[]).is_none());
    }
}
