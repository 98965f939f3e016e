//! Summarization orchestrator: one fixed prompt over the extracted
//! documents, word-count metrics computed from the result.

use briefly_core::{Document, Error, Result, SummaryResult, TextGenerator};

const PROMPT_HEADER: &str =
    "Provide a comprehensive and well-structured summary of the following content \
     in approximately 300 words:";
const PROMPT_FOOTER: &str = "Focus on:\n\
     - Main points and key insights\n\
     - Important details and context\n\
     - Clear, organized structure\n\
     - Actionable information if applicable";

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn render_prompt(documents: &[Document]) -> String {
    let content = documents
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{PROMPT_HEADER}\n\nContent: {content}\n\n{PROMPT_FOOTER}")
}

/// Produce a summary plus metrics from a non-empty document sequence.
///
/// A whitespace-only completion is a failure even when the call itself
/// succeeded: the contract requires non-empty output.
pub async fn summarize(
    documents: &[Document],
    generator: &dyn TextGenerator,
) -> Result<SummaryResult> {
    if documents.is_empty() {
        return Err(Error::InvalidInput("no documents to summarize".to_string()));
    }

    let completion = generator.generate(&render_prompt(documents)).await?;
    let text = completion.trim().to_string();
    if text.is_empty() {
        return Err(Error::Summary("model returned an empty summary".to_string()));
    }

    let source = documents
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(SummaryResult {
        source_document_count: documents.len(),
        source_word_count: word_count(&source),
        summary_word_count: word_count(&text),
        text,
    })
}
