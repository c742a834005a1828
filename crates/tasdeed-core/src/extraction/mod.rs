pub mod pdftotext;

use crate::error::TasdeedError;
use crate::model::Region;

#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// True when the box and the region share a non-empty area.
    pub fn intersects(&self, region: &Region) -> bool {
        self.x_min < region.right
            && self.x_max > region.left
            && self.y_min < region.bottom
            && self.y_max > region.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Word {
            text: text.into(),
            bbox,
        }
    }
}

/// Words the backend grouped into one visual line, in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub words: Vec<Word>,
}

/// Positioned text of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub page_index: usize,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<TextLine>,
}

impl PageContent {
    pub fn new(page_index: usize, width: f64, height: f64) -> Self {
        PageContent {
            page_index,
            width,
            height,
            lines: Vec::new(),
        }
    }

    /// Add a line of words in reading order.
    ///
    /// A horizontal gap wider than the taller of its two neighbouring words
    /// separates text runs that only share a baseline, such as table cells;
    /// each run becomes its own line.
    pub fn push_line(&mut self, words: Vec<Word>) {
        let mut run: Vec<Word> = Vec::new();
        for word in words {
            if let Some(prev) = run.last() {
                let gap = word.bbox.x_min - prev.bbox.x_max;
                if gap > prev.bbox.height().max(word.bbox.height()) {
                    self.lines.push(TextLine {
                        words: std::mem::take(&mut run),
                    });
                }
            }
            run.push(word);
        }
        if !run.is_empty() {
            self.lines.push(TextLine { words: run });
        }
    }

    /// Text of every word whose box intersects `region`.
    ///
    /// Words of one line are joined by a space, lines by `\n`. Lines with no
    /// word inside the region are left out.
    pub fn text_in(&self, region: &Region) -> Result<String, TasdeedError> {
        if !region.is_finite() || region.is_inverted() {
            return Err(TasdeedError::InvalidRegion(*region));
        }

        let lines: Vec<String> = self
            .lines
            .iter()
            .map(|line| {
                line.words
                    .iter()
                    .filter(|w| w.bbox.intersects(region))
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|l| !l.is_empty())
            .collect();

        Ok(lines.join("\n"))
    }
}

/// An opened PDF. Dropping it releases everything the backend holds for it.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Content of the page at `index` (0-based), or the reason it is unreadable.
    fn page(&self, index: usize) -> Result<PageContent, TasdeedError>;
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Open a PDF from its bytes. Fails with `InvalidDocument` when the bytes
    /// are not a readable PDF.
    fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, TasdeedError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
