use anyhow::Result;
use briefly_core::{ContentRequest, Error, MethodTag, SummaryResult};
use briefly_local::groq::{GroqClient, GroqConfig};
use briefly_local::{http_client, summarize, Extractor};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "briefly")]
#[command(about = "Summarize YouTube videos, web articles, and PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract text from a URL or PDF and produce a ~300 word summary.
    Summarize(SummarizeCmd),
    /// Diagnose configuration issues (json; no secrets).
    Doctor,
    /// Print version info.
    Version,
}

#[derive(clap::Args, Debug)]
struct SummarizeCmd {
    /// A YouTube URL, a website URL, or a path to a .pdf file.
    input: String,
    /// Model override (default: gemma2-9b-it; also BRIEFLY_MODEL).
    #[arg(long)]
    model: Option<String>,
    /// Output format.
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

/// Decide the content kind from the raw input string.
///
/// A readable `.pdf` path wins; YouTube hosts are routed to the transcript
/// chain even when the URL shape is off (the loader rejects those before any
/// network call); any other well-formed http(s) URL is a website.
fn detect_request(input: &str) -> std::result::Result<ContentRequest, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("empty input".to_string()));
    }

    let path = std::path::Path::new(trimmed);
    if path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Io(format!("could not read {trimmed}: {e}")))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(trimmed)
            .to_string();
        return Ok(ContentRequest::Pdf { bytes, filename });
    }

    if trimmed.contains("youtube.com") || trimmed.contains("youtu.be") {
        return Ok(ContentRequest::Youtube {
            url: trimmed.to_string(),
        });
    }

    match url::Url::parse(trimmed) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(ContentRequest::Web {
            url: trimmed.to_string(),
        }),
        _ => Err(Error::InvalidInput(format!(
            "not a recognized URL or .pdf path: {trimmed}"
        ))),
    }
}

fn render_text(result: &SummaryResult, method: MethodTag) {
    println!("{}\n", result.text);
    println!("documents:     {}", result.source_document_count);
    println!("summary words: {}", result.summary_word_count);
    println!("source words:  {}", result.source_word_count);
    println!(
        "method:        {}",
        serde_json::to_value(method)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default()
    );
}

async fn run_summarize(args: SummarizeCmd) -> std::result::Result<(), Error> {
    let request = detect_request(&args.input)?;

    // Credential check comes before any extraction work for every content
    // kind: a missing key should fail fast, not after a long fetch.
    let mut cfg = GroqConfig::from_env()?;
    if let Some(model) = args.model {
        cfg.model = model;
    }

    let extractor = Extractor::new()?;
    let outcome = extractor.extract(&request).await?;
    tracing::debug!(
        kind = request.kind(),
        documents = outcome.documents.len(),
        method = ?outcome.method,
        "extraction finished"
    );

    let generator = GroqClient::new(http_client()?, cfg);
    let result = summarize::summarize(&outcome.documents, &generator).await?;

    if args.output == "json" {
        let v = serde_json::json!({
            "ok": true,
            "method": outcome.method,
            "documents": result.source_document_count,
            "summary_words": result.summary_word_count,
            "source_words": result.source_word_count,
            "summary": result.text,
        });
        println!("{}", serde_json::to_string_pretty(&v).unwrap_or_default());
    } else {
        render_text(&result, outcome.method);
    }
    Ok(())
}

fn emit_error(e: &Error, json: bool) {
    if json {
        let v = serde_json::json!({
            "ok": false,
            "error": { "kind": e.kind(), "message": e.to_string(), "hint": e.hint() },
        });
        println!("{}", serde_json::to_string_pretty(&v).unwrap_or_default());
    } else {
        eprintln!("error: {e}");
        eprintln!("hint: {}", e.hint());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` autoload, disabled with BRIEFLY_DOTENV=0 so tests stay hermetic.
    // Process env always wins over the file.
    let dotenv_off = std::env::var("BRIEFLY_DOTENV").is_ok_and(|v| v.trim() == "0");
    if !dotenv_off {
        let _ = dotenvy::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Summarize(args) => {
            let json = args.output == "json";
            if let Err(e) = run_summarize(args).await {
                emit_error(&e, json);
                std::process::exit(1);
            }
        }
        Commands::Doctor => {
            let v = serde_json::json!({
                "kind": "doctor",
                "groq": GroqConfig::describe(),
                "youtube_base_url": std::env::var("BRIEFLY_YOUTUBE_BASE_URL")
                    .ok()
                    .unwrap_or_else(|| briefly_local::youtube::DEFAULT_BASE_URL.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
        Commands::Version => {
            let v = serde_json::json!({
                "schema_version": 1,
                "name": "briefly",
                "version": env!("CARGO_PKG_VERSION"),
            });
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
    }
    Ok(())
}
