use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("summary generation failed: {0}")]
    Summary(String),
    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    /// One-line remediation hint shown to the user alongside the message.
    ///
    /// The CLI never prints internal detail or backtraces; this is the whole
    /// user-facing error surface besides `Display`.
    pub fn hint(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "check the URL or file path and try again",
            Error::MissingCredential(_) => "set GROQ_API_KEY in the environment or in .env",
            Error::Extraction(_) => {
                "try a different source; for YouTube, check that captions exist; \
                 for PDFs, check the file is not protected"
            }
            Error::Summary(_) => "the model returned nothing useful; try again or pick another model",
            Error::Io(_) => "check network connectivity and local disk access",
        }
    }

    /// Stable machine-readable kind for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::MissingCredential(_) => "missing_credential",
            Error::Extraction(_) => "extraction_failed",
            Error::Summary(_) => "summary_generation_failed",
            Error::Io(_) => "io_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// One unit of content to summarize. Exactly one variant per run.
#[derive(Debug, Clone)]
pub enum ContentRequest {
    Youtube { url: String },
    Web { url: String },
    Pdf { bytes: Vec<u8>, filename: String },
}

impl ContentRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentRequest::Youtube { .. } => "youtube",
            ContentRequest::Web { .. } => "web",
            ContentRequest::Pdf { .. } => "pdf",
        }
    }
}

/// A unit of extracted text plus source metadata.
///
/// Every extraction strategy, regardless of content kind, produces a sequence
/// of these; the summarizer consumes only this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn has_text(&self) -> bool {
        self.text.chars().any(|c| !c.is_whitespace())
    }
}

/// Which fallback level produced the documents. Informational only; nothing
/// downstream branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTag {
    Transcript,
    BasicInfo,
    FullText,
    Chunked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub documents: Vec<Document>,
    pub method: MethodTag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub source_document_count: usize,
    pub source_word_count: usize,
    pub summary_word_count: usize,
}

/// Seam between the orchestrator and a concrete LLM backend.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
