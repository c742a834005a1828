use crate::error::TasdeedError;
use crate::extraction::{BBox, PageContent, PdfDocument, PdfExtractor, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout`, which reports every word with its bounding
/// box in points, origin top-left.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, TasdeedError> {
        // pdftotext reads from a path; the temp file lives only for this call.
        let mut tmpfile = tempfile::NamedTempFile::new()?;
        tmpfile.write_all(pdf_bytes)?;
        tmpfile.flush()?;

        let output = Command::new("pdftotext")
            .arg("-bbox-layout")
            .arg(tmpfile.path())
            .arg("-")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TasdeedError::PdftotextNotFound
                } else {
                    TasdeedError::InvalidDocument(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TasdeedError::InvalidDocument(format!(
                "pdftotext exited with code {}: {}",
                code,
                stderr.trim()
            )));
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let pages = parse_bbox_xml(&xml)?;
        if pages.is_empty() {
            return Err(TasdeedError::InvalidDocument("document has no pages".into()));
        }

        log::debug!("pdftotext read {} page(s)", pages.len());
        Ok(Box::new(PdftotextDocument { pages }))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Pages parsed from one pdftotext run. A page that could not be parsed keeps
/// the reason instead of its content.
struct PdftotextDocument {
    pages: Vec<Result<PageContent, String>>,
}

impl PdfDocument for PdftotextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageContent, TasdeedError> {
        match self.pages.get(index) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(reason)) => Err(TasdeedError::PageProcessing {
                page: index,
                reason: reason.clone(),
            }),
            None => Err(TasdeedError::PageProcessing {
                page: index,
                reason: format!("page index out of range ({} pages)", self.pages.len()),
            }),
        }
    }
}

struct PageBuilder {
    page: PageContent,
    error: Option<String>,
}

impl PageBuilder {
    fn new(page_index: usize, tag: &BytesStart) -> Self {
        match page_size(tag) {
            Ok((width, height)) => PageBuilder {
                page: PageContent::new(page_index, width, height),
                error: None,
            },
            Err(reason) => PageBuilder {
                page: PageContent::new(page_index, 0.0, 0.0),
                error: Some(reason),
            },
        }
    }

    fn fail(&mut self, reason: String) {
        // Keep the first problem; later ones are usually consequences.
        if self.error.is_none() {
            self.error = Some(reason);
        }
    }

    fn finish(self) -> Result<PageContent, String> {
        match self.error {
            Some(reason) => Err(reason),
            None => Ok(self.page),
        }
    }
}

/// Parse `pdftotext -bbox-layout` output into pages of positioned words.
///
/// Malformed XML fails the whole document; a bad attribute or undecodable
/// text only fails the page it belongs to.
fn parse_bbox_xml(xml: &str) -> Result<Vec<Result<PageContent, String>>, TasdeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages = Vec::new();
    let mut current: Option<PageBuilder> = None;
    let mut line: Option<Vec<Word>> = None;
    let mut word: Option<(Result<BBox, String>, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            TasdeedError::InvalidDocument(format!(
                "malformed pdftotext output at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => current = Some(PageBuilder::new(pages.len(), &e)),
                b"line" => line = Some(Vec::new()),
                b"word" => word = Some((parse_bbox(&e), String::new())),
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, text)) = word.as_mut() {
                    match t.unescape() {
                        Ok(s) => text.push_str(&s),
                        Err(e) => {
                            if let Some(builder) = current.as_mut() {
                                builder.fail(format!("undecodable word text: {}", e));
                            }
                        }
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"word" => {
                    if let Some((bbox, text)) = word.take() {
                        match bbox {
                            Ok(bbox) => {
                                let text = text.trim();
                                match line.as_mut() {
                                    Some(words) if !text.is_empty() => {
                                        words.push(Word::new(text, bbox))
                                    }
                                    _ => {}
                                }
                            }
                            Err(reason) => {
                                if let Some(builder) = current.as_mut() {
                                    builder.fail(reason);
                                }
                            }
                        }
                    }
                }
                b"line" => {
                    if let (Some(words), Some(builder)) = (line.take(), current.as_mut()) {
                        if !words.is_empty() {
                            builder.page.push_line(words);
                        }
                    }
                }
                b"page" => {
                    if let Some(builder) = current.take() {
                        pages.push(builder.finish());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn page_size(tag: &BytesStart) -> Result<(f64, f64), String> {
    Ok((parse_attr_f64(tag, "width")?, parse_attr_f64(tag, "height")?))
}

fn parse_bbox(tag: &BytesStart) -> Result<BBox, String> {
    Ok(BBox {
        x_min: parse_attr_f64(tag, "xMin")?,
        y_min: parse_attr_f64(tag, "yMin")?,
        x_max: parse_attr_f64(tag, "xMax")?,
        y_max: parse_attr_f64(tag, "yMax")?,
    })
}

fn parse_attr_f64(tag: &BytesStart, name: &str) -> Result<f64, String> {
    let attr = tag
        .try_get_attribute(name)
        .map_err(|e| format!("bad attributes on <{}>: {}", tag_name(tag), e))?
        .ok_or_else(|| format!("<{}> is missing '{}'", tag_name(tag), name))?;
    let raw = String::from_utf8_lossy(&attr.value);
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("<{}> has invalid {}=\"{}\"", tag_name(tag), name, raw))
}

fn tag_name(tag: &BytesStart) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
}
