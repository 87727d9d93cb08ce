use std::sync::Arc;

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::llm::{prompts, LlmProvider};
use crate::models::ConversationTurn;
use crate::vector::VectorIndex;

/// Retrieval-augmented chat with the recommended paper.
///
/// Each turn retrieves fresh context for the question from the paper's own
/// collection and resends the prior transcript. Unset `max_history` resends
/// every turn, reproducing the unbounded original; setting it bounds the
/// resent window deliberately.
#[derive(Clone)]
pub struct ConversationService {
    index: Arc<dyn VectorIndex>,
    embeddings: EmbeddingProvider,
    llm: LlmProvider,
    paper_collection_prefix: String,
    chat_top_k: u32,
    max_history: Option<usize>,
}

impl ConversationService {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
        config: &Config,
    ) -> Self {
        Self {
            index,
            embeddings,
            llm,
            paper_collection_prefix: config.vector.paper_collection_prefix.clone(),
            chat_top_k: config.recommender.chat_top_k,
            max_history: config.recommender.max_history,
        }
    }

    /// One turn against the paper `pmid`: retrieve, stuff, complete.
    pub async fn ask(
        &self,
        pmid: &str,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<ConversationTurn> {
        let collection = format!("{}{}", self.paper_collection_prefix, pmid);

        let vector = self.embeddings.embed_query(question).await?;
        let hits = self.index.search(&collection, &vector, self.chat_top_k).await?;

        let chunks: Vec<String> = hits.into_iter().map(|hit| hit.content).collect();
        let system_prompt = prompts::chat_system_prompt(&chunks);

        let window = bounded_history(history, self.max_history);
        let answer = self.llm.chat(&system_prompt, window, question, None).await?;

        Ok(ConversationTurn::new(question, answer))
    }
}

/// The most recent `max` turns, or the whole transcript when unbounded.
fn bounded_history(history: &[ConversationTurn], max: Option<usize>) -> &[ConversationTurn] {
    match max {
        Some(max) => &history[history.len().saturating_sub(max)..],
        None => history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .map(|i| ConversationTurn::new(format!("q{i}"), format!("a{i}")))
            .collect()
    }

    #[test]
    fn unbounded_history_resends_everything() {
        let history = transcript(5);
        let window = bounded_history(&history, None);
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn bounded_history_keeps_most_recent_turns() {
        let history = transcript(5);
        let window = bounded_history(&history, Some(2));
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].question, "q3");
        assert_eq!(window[1].question, "q4");
    }

    #[test]
    fn bound_larger_than_transcript_is_harmless() {
        let history = transcript(2);
        let window = bounded_history(&history, Some(10));
        assert_eq!(window.len(), 2);
    }
}
