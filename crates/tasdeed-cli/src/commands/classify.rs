use std::path::PathBuf;

use tasdeed_core::error::TasdeedError;
use tasdeed_core::extraction::pdftotext::PdftotextExtractor;

pub fn run(pdf_file: PathBuf, templates: Option<PathBuf>) -> Result<(), TasdeedError> {
    let templates = super::load_template_set(templates)?;
    let extractor = PdftotextExtractor::new();
    let layouts = tasdeed_core::classify_pdf(&pdf_file, &extractor, &templates)?;

    for (index, layout) in layouts.iter().enumerate() {
        match layout {
            Ok(layout) => println!("  page {:<3} {}", index, layout),
            Err(e) => println!("  page {:<3} unreadable ({})", index, e),
        }
    }
    Ok(())
}
