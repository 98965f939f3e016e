//! PDF extraction: scoped temp file, one document per page, size-gated
//! chunking.

use std::io::Write;

use briefly_core::{Document, Error, ExtractionOutcome, MethodTag, Result};
use tracing::debug;

use crate::chunk::{
    split_with_overlap, CHUNK_OVERLAP_CHARS, CHUNK_SIZE_CHARS, CHUNK_THRESHOLD_CHARS,
};
use crate::extract::has_any_text;

/// Parse uploaded PDF bytes into per-page (or chunked) documents.
///
/// The bytes go through a named temp file that is removed on every exit
/// path, including errors, when the guard drops.
pub fn load_pdf(bytes: &[u8], filename: &str) -> Result<ExtractionOutcome> {
    let mut tmp = tempfile::Builder::new()
        .prefix("briefly-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Error::Io(format!("could not create temp file: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Error::Io(format!("could not write temp file: {e}")))?;

    let pages = pdf_extract::extract_text_by_pages(tmp.path())
        .map_err(|e| Error::Extraction(format!("could not process PDF {filename}: {e}")))?;

    let pages: Vec<(usize, String)> = pages
        .into_iter()
        .enumerate()
        .filter(|(_, t)| has_any_text(t))
        .map(|(i, t)| (i + 1, t.trim().to_string()))
        .collect();
    if pages.is_empty() {
        return Err(Error::Extraction(format!(
            "no content extracted from PDF {filename}"
        )));
    }

    Ok(assemble(pages, filename))
}

/// Chunk decision over already-extracted page texts.
///
/// Split from the parse step so the threshold and overlap behavior is
/// testable without real PDF bytes.
fn assemble(pages: Vec<(usize, String)>, filename: &str) -> ExtractionOutcome {
    let combined_chars: usize = pages
        .iter()
        .map(|(_, t)| t.chars().count())
        .sum::<usize>()
        // Pages are joined with blank lines when measuring total size.
        + pages.len().saturating_sub(1) * 2;

    if combined_chars <= CHUNK_THRESHOLD_CHARS {
        let documents = pages
            .into_iter()
            .map(|(page, text)| {
                Document::new(text)
                    .with_meta("source", filename)
                    .with_meta("page", page.to_string())
            })
            .collect();
        return ExtractionOutcome {
            documents,
            method: MethodTag::FullText,
        };
    }

    debug!(combined_chars, "pdf exceeds chunk threshold; splitting pages");
    let mut documents = Vec::new();
    for (page, text) in pages {
        for (i, window) in split_with_overlap(&text, CHUNK_SIZE_CHARS, CHUNK_OVERLAP_CHARS)
            .into_iter()
            .enumerate()
        {
            documents.push(
                Document::new(window)
                    .with_meta("source", filename)
                    .with_meta("page", page.to_string())
                    .with_meta("chunk", i.to_string()),
            );
        }
    }
    ExtractionOutcome {
        documents,
        method: MethodTag::Chunked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages_of(sizes: &[usize]) -> Vec<(usize, String)> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, n)| (i + 1, "x".repeat(*n)))
            .collect()
    }

    #[test]
    fn small_pdf_keeps_one_document_per_page() {
        let out = assemble(pages_of(&[3_000, 3_000, 3_000]), "small.pdf");
        assert_eq!(out.method, MethodTag::FullText);
        assert_eq!(out.documents.len(), 3);
        assert_eq!(
            out.documents[2].metadata.get("page").map(String::as_str),
            Some("3")
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        // Two pages joined with a blank line: 4_999 + 2 + 4_999 = 10_000.
        let out = assemble(pages_of(&[4_999, 4_999]), "edge.pdf");
        assert_eq!(out.method, MethodTag::FullText);
        assert_eq!(out.documents.len(), 2);
    }

    #[test]
    fn large_pdf_is_chunked_with_overlap() {
        let out = assemble(pages_of(&[9_000, 9_000]), "big.pdf");
        assert_eq!(out.method, MethodTag::Chunked);
        for d in &out.documents {
            assert!(d.text.chars().count() <= CHUNK_SIZE_CHARS);
        }
        // Consecutive chunks of the same page share the overlap region.
        let page1: Vec<&Document> = out
            .documents
            .iter()
            .filter(|d| d.metadata.get("page").map(String::as_str) == Some("1"))
            .collect();
        assert!(page1.len() > 1);
        for pair in page1.windows(2) {
            let prev = &pair[0].text;
            let next = &pair[1].text;
            let tail: String = prev
                .chars()
                .skip(prev.chars().count() - CHUNK_OVERLAP_CHARS)
                .collect();
            assert!(next.starts_with(&tail));
        }
    }

    #[test]
    fn garbage_bytes_fail_with_extraction_error() {
        let err = load_pdf(b"not a pdf at all", "junk.pdf").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)), "got {err:?}");
    }
}
