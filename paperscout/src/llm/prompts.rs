//! Prompt templates for summarization and paper chat.
//!
//! Templates use `format!()` interpolation; retrieved chunks are stuffed
//! into a single prompt rather than summarized map-reduce style.

/// The fixed query used both to retrieve summary chunks and as the question
/// posed to the model.
pub const SUMMARY_QUERY: &str =
    "Please summarize the main findings and key experiments done in this paper";

/// Build the document-stuffed summarization prompt.
///
/// All retrieved chunks are concatenated into one prompt. There is no
/// fallback when the stuffed context exceeds the model's window; that
/// failure surfaces as the LLM API's own error.
///
/// # Arguments
/// * `chunks` - Retrieved chunk texts from the paper's own collection
///
/// # Example
/// ```
/// use paperscout::llm::prompts::summary_prompt;
///
/// let prompt = summary_prompt(&["We profiled 10,000 cells.".to_string()]);
/// assert!(prompt.contains("10,000 cells"));
/// ```
pub fn summary_prompt(chunks: &[String]) -> String {
    let context = chunks.join("\n\n");
    format!(
        r#"Use the following excerpts from a scientific paper to answer the question at the end.
If the excerpts do not contain the answer, say that you don't know rather than guessing.

Excerpts:
{context}

Question: {SUMMARY_QUERY}
Answer:"#
    )
}

/// Build the system prompt for a retrieval-augmented chat turn, stuffing the
/// chunks retrieved for the current question.
pub fn chat_system_prompt(chunks: &[String]) -> String {
    let context = chunks.join("\n\n");
    format!(
        r#"You are answering questions about a single scientific paper.
Base every answer on the excerpts below and the conversation so far.
If the excerpts do not contain the answer, say so rather than guessing.

Excerpts:
{context}"#
    )
}
