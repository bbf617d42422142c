//! Document text extraction (PDF, plain text, markdown)

use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{Document, FileType};

use super::cleaner::repair_extraction_artifacts;

/// Upper bound for the whole-document pdf-extract fallback
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Raw text of a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Extracted text, artifacts repaired but not normalized
    pub content: String,
}

/// A document together with its per-page raw text
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub document: Document,
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// Page texts in page order
    pub fn page_texts(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.content.as_str()).collect()
    }
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Read a file and extract its pages; PDF parsing runs on the blocking pool
    pub async fn extract_pages(path: impl AsRef<Path>) -> Result<ExtractedDocument> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::info!("Extracting text from {} ({} bytes)", filename, data.len());

        tokio::task::spawn_blocking(move || Self::parse(&filename, &data))
            .await
            .map_err(|e| Error::internal(format!("extraction task failed: {}", e)))?
    }

    /// Parse in-memory file contents based on the filename extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ExtractedDocument> {
        let file_type = FileType::from_filename(filename);
        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(format!(
                "{} (supported: pdf, txt, md)",
                filename
            )));
        }

        let raw_pages = match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data)?,
            FileType::Txt | FileType::Markdown => vec![String::from_utf8_lossy(data).into_owned()],
            FileType::Unknown => {
                return Err(Error::UnsupportedFileType(filename.to_string()));
            }
        };

        let pages: Vec<PageContent> = raw_pages
            .iter()
            .enumerate()
            .map(|(i, raw)| PageContent {
                page_number: i as u32 + 1,
                content: repair_extraction_artifacts(raw),
            })
            .collect();

        let mut document = Document::new(
            filename.to_string(),
            file_type,
            hash_content(data),
            data.len() as u64,
        );
        document.page_count = pages.len() as u32;

        Ok(ExtractedDocument { document, pages })
    }

    /// Per-page extraction with lopdf, whole-document pdf-extract as fallback
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        match Self::extract_pdf_pages(data) {
            Ok(pages) if pages.iter().any(|p| !p.trim().is_empty()) => return Ok(pages),
            Ok(_) => tracing::warn!("{}: per-page extraction found no text, trying fallback", filename),
            Err(e) => tracing::warn!("{}: per-page extraction failed ({}), trying fallback", filename, e),
        }

        let text = Self::extract_pdf_with_timeout(data)
            .map_err(|e| Error::file_parse(filename, e))?;

        if text.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted; the PDF may be image-based",
            ));
        }

        Ok(vec![text])
    }

    fn extract_pdf_pages(data: &[u8]) -> std::result::Result<Vec<String>, lopdf::Error> {
        let doc = lopdf::Document::load_mem(data)?;
        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    tracing::debug!("Could not extract text of page {}: {}", page_number, e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }

    /// Run pdf-extract on a separate thread; some fonts make it hang
    fn extract_pdf_with_timeout(data: &[u8]) -> std::result::Result<String, String> {
        use std::sync::mpsc;
        use std::thread;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(PDF_EXTRACT_TIMEOUT) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Ok(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(format!("pdf-extract failed: {}", e))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!("PDF extraction timeout after {:?}", PDF_EXTRACT_TIMEOUT);
                Err(format!("extraction timed out after {:?}", PDF_EXTRACT_TIMEOUT))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed");
                Err("extraction thread crashed".to_string())
            }
        }
    }
}

/// Hash content for identification
fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
