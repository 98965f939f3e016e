//! Website extraction: one strategy, no fallback tier.
//!
//! The loader trades strictness for success rate against misconfigured or
//! bot-hostile sites: TLS verification is disabled on the client it is
//! handed, and requests carry a browser-like user-agent.

use briefly_core::{Document, Error, ExtractionOutcome, MethodTag, Result};
use tracing::debug;

use crate::extract;
use crate::BROWSER_USER_AGENT;

const TEXT_WIDTH: usize = 100;

#[derive(Debug, Clone)]
pub struct WebsiteLoader {
    client: reqwest::Client,
}

impl WebsiteLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn load(&self, url: &str) -> Result<ExtractionOutcome> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::InvalidInput(format!("invalid website url {url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "unsupported scheme {} for {url}",
                parsed.scheme()
            )));
        }

        let resp = self
            .client
            .get(parsed)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("could not fetch {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Extraction(format!(
                "could not fetch {url}: http status {status}"
            )));
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase());
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Extraction(format!("could not read {url}: {e}")))?;

        let is_html = content_type
            .as_deref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
            || extract::bytes_look_like_html(body.as_bytes());

        let (text, title) = if is_html {
            let text = match extract::html_main_to_text(&body) {
                Some(t) => t,
                None => {
                    debug!(url, "no main block scored; converting whole page");
                    extract::html_to_text(&body, TEXT_WIDTH)
                }
            };
            (text, extract::html_title(&body))
        } else {
            (body, None)
        };

        if !extract::has_any_text(&text) {
            return Err(Error::Extraction(format!(
                "no content extracted from {url}"
            )));
        }

        let mut doc = Document::new(text.trim()).with_meta("source", url);
        if let Some(title) = title {
            doc = doc.with_meta("title", title);
        }
        Ok(ExtractionOutcome {
            documents: vec![doc],
            method: MethodTag::FullText,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, routing::get, Router};
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn website_load_extracts_article_text() {
        let app = Router::new().route(
            "/article",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><head><title>An Article</title></head><body>\
                     <article><p>Body of the article with enough words to score.</p></article>\
                     </body></html>",
                )
            }),
        );
        let addr = serve(app).await;

        let loader = WebsiteLoader::new(reqwest::Client::new());
        let out = loader
            .load(&format!("http://{addr}/article"))
            .await
            .unwrap();
        assert_eq!(out.method, MethodTag::FullText);
        assert_eq!(out.documents.len(), 1);
        assert!(out.documents[0].text.contains("Body of the article"));
        assert_eq!(
            out.documents[0].metadata.get("title").map(String::as_str),
            Some("An Article")
        );
    }

    #[tokio::test]
    async fn website_load_fails_on_empty_body() {
        let app = Router::new().route(
            "/empty",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html><body> </body></html>") }),
        );
        let addr = serve(app).await;

        let loader = WebsiteLoader::new(reqwest::Client::new());
        let err = loader
            .load(&format!("http://{addr}/empty"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn website_load_fails_on_http_error_status() {
        let app = Router::new().route(
            "/gone",
            get(|| async { (axum::http::StatusCode::GONE, "gone") }),
        );
        let addr = serve(app).await;

        let loader = WebsiteLoader::new(reqwest::Client::new());
        let err = loader
            .load(&format!("http://{addr}/gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn website_load_rejects_non_http_schemes() {
        let loader = WebsiteLoader::new(reqwest::Client::new());
        let err = loader.load("ftp://example.com/x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn website_load_passes_plain_text_through() {
        let app = Router::new().route(
            "/text",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    "plain text body",
                )
            }),
        );
        let addr = serve(app).await;

        let loader = WebsiteLoader::new(reqwest::Client::new());
        let out = loader.load(&format!("http://{addr}/text")).await.unwrap();
        assert_eq!(out.documents[0].text, "plain text body");
    }
}
