//! Full pipeline runs against local fixture servers: a fake YouTube (watch
//! page + timedtext) and a fake Groq chat-completions endpoint.

use axum::{http::header, routing::get, routing::post, Json, Router};
use std::net::SocketAddr;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn groq_fixture() -> Router {
    Router::new().route(
        "/v1/chat/completions",
        post(|Json(body): Json<serde_json::Value>| async move {
            let prompt = body["messages"][0]["content"].as_str().unwrap_or("");
            assert!(prompt.contains("approximately 300 words"));
            Json(serde_json::json!({
                "choices": [{"message": {"role": "assistant",
                    "content": "A short fixture summary of the source."}}]
            }))
        }),
    )
}

fn run_briefly(input: &str, youtube_base: Option<&str>, groq_base: &str) -> std::process::Output {
    let bin = assert_cmd::cargo::cargo_bin!("briefly");
    let mut cmd = std::process::Command::new(bin);
    cmd.args(["summarize", input, "--output", "json"])
        .env("BRIEFLY_DOTENV", "0")
        .env("GROQ_API_KEY", "test-key")
        .env("GROQ_BASE_URL", groq_base);
    if let Some(base) = youtube_base {
        cmd.env("BRIEFLY_YOUTUBE_BASE_URL", base);
    }
    cmd.output().expect("run briefly")
}

#[tokio::test(flavor = "multi_thread")]
async fn youtube_transcript_end_to_end() {
    let yt = Router::new()
        .route(
            "/watch",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    r#"<html><body><script>{"videoDetails":{"title":"Clip"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"/api/timedtext","languageCode":"en"}]}}}</script></body></html>"#,
                )
            }),
        )
        .route(
            "/api/timedtext",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/xml")],
                    r#"<transcript><text start="0" dur="1">spoken words</text><text start="1" dur="1">more words</text></transcript>"#,
                )
            }),
        );
    let yt_addr = serve(yt).await;
    let groq_addr = serve(groq_fixture()).await;

    let out = run_briefly(
        "https://www.youtube.com/watch?v=abc123DEF45",
        Some(&format!("http://{yt_addr}")),
        &format!("http://{groq_addr}"),
    );

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&out.stdout)).expect("parse json");
    assert_eq!(v["ok"].as_bool(), Some(true));
    assert_eq!(v["method"].as_str(), Some("transcript"));
    assert_eq!(v["documents"].as_u64(), Some(1));
    assert_eq!(v["source_words"].as_u64(), Some(4));
    assert_eq!(v["summary_words"].as_u64(), Some(7));
    assert_eq!(
        v["summary"].as_str(),
        Some("A short fixture summary of the source.")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn website_article_end_to_end() {
    let site = Router::new().route(
        "/post",
        get(|| async {
            (
                [(header::CONTENT_TYPE, "text/html")],
                "<html><head><title>Post</title></head><body>\
                 <article><p>An article body long enough to be selected as main content.</p></article>\
                 </body></html>",
            )
        }),
    );
    let site_addr = serve(site).await;
    let groq_addr = serve(groq_fixture()).await;

    let out = run_briefly(
        &format!("http://{site_addr}/post"),
        None,
        &format!("http://{groq_addr}"),
    );

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&out.stdout)).expect("parse json");
    assert_eq!(v["ok"].as_bool(), Some(true));
    assert_eq!(v["method"].as_str(), Some("full_text"));
    assert!(v["source_words"].as_u64().unwrap_or(0) > 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_model_output_is_a_summary_failure() {
    let site = Router::new().route(
        "/post",
        get(|| async {
            (
                [(header::CONTENT_TYPE, "text/html")],
                "<html><body><article><p>Enough text to extract successfully here.</p></article></body></html>",
            )
        }),
    );
    let site_addr = serve(site).await;

    let groq = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "   "}}]
            }))
        }),
    );
    let groq_addr = serve(groq).await;

    let out = run_briefly(
        &format!("http://{site_addr}/post"),
        None,
        &format!("http://{groq_addr}"),
    );

    assert!(!out.status.success());
    let v: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&out.stdout)).expect("parse json");
    assert_eq!(v["ok"].as_bool(), Some(false));
    assert_eq!(
        v["error"]["kind"].as_str(),
        Some("summary_generation_failed")
    );
}
