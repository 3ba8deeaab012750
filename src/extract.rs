use std::{io::Read, path::Path, process::Command};

use tracing::{debug, warn};

use crate::crawler::normalized_extension;

const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md", ".rst"];

/// Interface to an OCR engine used as the last-resort PDF strategy.
///
/// `recognize` returns the recognized text lines in the order the engine
/// reports them, or `None` when the engine is unavailable or fails.
pub trait OcrBackend: Sync {
    fn name(&self) -> &'static str;
    fn recognize(&self, path: &Path) -> Option<Vec<String>>;
}

/// Map a backend name from the CLI to an implementation.
pub fn resolve_ocr(name: &str) -> Option<Box<dyn OcrBackend>> {
    match name {
        "tesseract" => Some(Box::new(TesseractOcr)),
        other => {
            warn!("unknown OCR backend '{other}'; continuing without OCR");
            None
        }
    }
}

/// OCR via the `tesseract` executable, when present on PATH.
struct TesseractOcr;

impl OcrBackend for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, path: &Path) -> Option<Vec<String>> {
        let output = match Command::new("tesseract")
            .arg(path)
            .arg("stdout")
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("tesseract unavailable: {e}");
                return None;
            }
        };
        if !output.status.success() {
            debug!("tesseract failed on {}", path.display());
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Some(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.to_string())
                .collect(),
        )
    }
}

/// Extract best-effort plain text from a file.
///
/// Total by contract: any read, decode, or container failure yields an
/// empty string so one malformed document never aborts an index build.
/// Unsupported extensions yield an empty string as well.
pub fn extract(path: &Path, ocr: Option<&dyn OcrBackend>) -> String {
    match normalized_extension(path).as_str() {
        ext if TEXT_EXTENSIONS.contains(&ext) => read_text_file(path),
        ".docx" => read_docx(path),
        ".pdf" => read_pdf(path, ocr),
        ext => {
            debug!("unsupported extension '{ext}'; returning empty text");
            String::new()
        }
    }
}

/// UTF-8 first; invalid UTF-8 falls back to a Latin-1 reinterpretation so
/// legacy text files still produce searchable terms.
fn read_text_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes)
            .unwrap_or_else(|e| latin1(&e.into_bytes())),
        Err(e) => {
            warn!("failed to read text file {}: {e}", path.display());
            String::new()
        }
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Non-empty paragraphs of the OOXML main document part, in document order,
/// joined by newline.
fn read_docx(path: &Path) -> String {
    match docx_document_xml(path) {
        Ok(xml) => docx_paragraphs(&xml).join("\n"),
        Err(e) => {
            warn!("failed to parse DOCX {}: {e}", path.display());
            String::new()
        }
    }
}

fn docx_document_xml(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let mut part = archive
        .by_name("word/document.xml")
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Pull the text runs (`<w:t>`) out of each paragraph (`<w:p>`) without a
/// full XML parse; WordprocessingML nests text exclusively in those runs.
fn docx_paragraphs(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for chunk in xml.split("</w:p>") {
        let mut text = String::new();
        let mut rest = chunk;
        while let Some(start) = rest.find("<w:t") {
            let after_tag = &rest[start + 4..];
            // Distinguish a text run from <w:tbl>, <w:tr> and friends.
            if !matches!(after_tag.as_bytes().first(), Some(b'>' | b' ' | b'/')) {
                rest = after_tag;
                continue;
            }
            let Some(close) = after_tag.find('>') else {
                break;
            };
            if after_tag[..close].ends_with('/') {
                rest = &after_tag[close + 1..];
                continue;
            }
            let body = &after_tag[close + 1..];
            let Some(end) = body.find("</w:t>") else {
                break;
            };
            text.push_str(&decode_entities(&body[..end]));
            rest = &body[end..];
        }
        let text = text.trim();
        if !text.is_empty() {
            paragraphs.push(text.to_string());
        }
    }
    paragraphs
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Ordered strategy chain: native text layer first, then OCR when a backend
/// was supplied. The first strategy yielding non-blank text wins.
fn read_pdf(path: &Path, ocr: Option<&dyn OcrBackend>) -> String {
    let native = |path: &Path| pdf_text_layer(path);
    let ocr_fallback = |path: &Path| {
        let backend = ocr?;
        debug!("falling back to {} OCR for {}", backend.name(), path.display());
        backend.recognize(path).map(|lines| lines.join("\n"))
    };
    let strategies: [&dyn Fn(&Path) -> Option<String>; 2] =
        [&native, &ocr_fallback];

    for strategy in strategies {
        if let Some(text) = strategy(path)
            && !text.trim().is_empty()
        {
            return text;
        }
    }
    String::new()
}

fn pdf_text_layer(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    // pdf-extract can panic on malformed documents; contain it.
    match std::panic::catch_unwind(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    }) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            debug!("no text layer in {}: {e}", path.display());
            None
        }
        Err(_) => {
            warn!("PDF extraction panicked on {}", path.display());
            None
        }
    }
}
