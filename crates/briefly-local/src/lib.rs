//! Local extraction strategies (reqwest) and Groq summarization.

use std::time::Duration;

use briefly_core::{ContentRequest, Error, ExtractionOutcome, Result};

pub mod chunk;
pub mod extract;
pub mod groq;
pub mod pdf;
pub mod summarize;
pub mod website;
pub mod youtube;

/// Browser-like user-agent sent on scrape-style requests; some hosts serve
/// reduced or blocked pages to default client agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        // Safety defaults: avoid "hang forever" on DNS/TLS/body stalls.
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
}

pub fn http_client() -> Result<reqwest::Client> {
    client_builder()
        .build()
        .map_err(|e| Error::Io(e.to_string()))
}

/// Client for website extraction only: certificate verification is off to
/// keep extraction working against misconfigured sites.
pub fn insecure_http_client() -> Result<reqwest::Client> {
    client_builder()
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|e| Error::Io(e.to_string()))
}

/// One extractor per run: turns a `ContentRequest` into an
/// `ExtractionOutcome` via one adapter per content kind.
#[derive(Debug, Clone)]
pub struct Extractor {
    youtube: youtube::YoutubeLoader,
    website: website::WebsiteLoader,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            youtube: youtube::YoutubeLoader::new(http_client()?),
            website: website::WebsiteLoader::new(insecure_http_client()?),
        })
    }

    pub async fn extract(&self, req: &ContentRequest) -> Result<ExtractionOutcome> {
        match req {
            ContentRequest::Youtube { url } => self.youtube.load(url).await,
            ContentRequest::Web { url } => self.website.load(url).await,
            ContentRequest::Pdf { bytes, filename } => {
                let bytes = bytes.clone();
                let filename = filename.clone();
                tokio::task::spawn_blocking(move || pdf::load_pdf(&bytes, &filename))
                    .await
                    .map_err(|e| Error::Io(format!("pdf task join failed: {e}")))?
            }
        }
    }
}
