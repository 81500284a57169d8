//! Multi-format text extraction.
//!
//! The gateway supplies raw bytes plus the declared media type; this module
//! returns plain UTF-8 text. Truncation is the gateway's responsibility;
//! extraction always returns the full text.

use std::io::Read;

/// Media types the extractor understands.
pub const MEDIA_TEXT: &str = "text/plain";
pub const MEDIA_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MEDIA_PDF: &str = "application/pdf";

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extraction failure. `UnsupportedType` and `Failed` are expected outcomes
/// the gateway converts into a structured [`crate::models::ContentError`].
#[derive(Debug)]
pub enum ExtractError {
    UnsupportedType(String),
    Failed(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::UnsupportedType(mt) => {
                write!(f, "Unsupported file type: {}", mt)
            }
            ExtractError::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extracts plain text from document bytes.
///
/// - `text/plain`: lossy UTF-8 decode, never fails.
/// - docx: non-blank paragraph texts joined with `\n`.
/// - PDF: page text joined with `\n` (via `pdf-extract`).
/// - anything else: `UnsupportedType`.
pub fn extract_text(bytes: &[u8], media_type: &str) -> Result<String, ExtractError> {
    match media_type {
        MEDIA_TEXT => Ok(String::from_utf8_lossy(bytes).into_owned()),
        MEDIA_DOCX => extract_docx(bytes),
        MEDIA_PDF => extract_pdf(bytes),
        _ => Err(ExtractError::UnsupportedType(media_type.to_string())),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Failed(format!("Cannot extract PDF content: {}", e)))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Failed(format!("Cannot extract docx content: {}", e)))?;
    let mut doc_xml = Vec::new();
    let mut found = false;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| ExtractError::Failed(format!("Cannot extract docx content: {}", e)))?;
        if entry.name() == "word/document.xml" {
            entry
                .take(MAX_XML_ENTRY_BYTES)
                .read_to_end(&mut doc_xml)
                .map_err(|e| ExtractError::Failed(format!("Cannot extract docx content: {}", e)))?;
            if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
                return Err(ExtractError::Failed(
                    "Cannot extract docx content: word/document.xml exceeds size limit".to_string(),
                ));
            }
            found = true;
            break;
        }
    }
    if !found {
        return Err(ExtractError::Failed(
            "Cannot extract docx content: word/document.xml not found".to_string(),
        ));
    }
    extract_paragraphs(&doc_xml)
}

/// Walks `word/document.xml`, collecting `w:t` runs into paragraphs at
/// `w:p` boundaries. Blank paragraphs are dropped; the rest are joined
/// with a newline.
fn extract_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    // Whitespace inside `w:t` runs is significant; no text trimming.
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        current.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"p" {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Failed(format!(
                    "Cannot extract docx content: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    // Text from an unclosed trailing paragraph still counts.
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}
