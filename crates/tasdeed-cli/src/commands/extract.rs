use std::path::PathBuf;

use tasdeed_core::error::TasdeedError;
use tasdeed_core::extraction::pdftotext::PdftotextExtractor;
use tasdeed_core::sink;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    account: Option<String>,
    templates: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), TasdeedError> {
    let templates = super::load_template_set(templates)?;
    let extractor = PdftotextExtractor::new();
    let result =
        tasdeed_core::extract_document(&pdf_file, account.as_deref(), &extractor, &templates)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&result)?;
            std::fs::write(&path, json)?;
            let degraded = result.pages.values().filter(|p| p.is_placeholder()).count();
            eprintln!(
                "Extracted {} page(s), written to {}",
                result.len(),
                path.display()
            );
            if degraded > 0 {
                eprintln!("  {} page(s) replaced by placeholders", degraded);
            }
        }
        None => match output_format {
            "json" => output::json::print(&result)?,
            "csv" => print!("{}", sink::records_to_csv_string(&sink::page_rows(&result))?),
            _ => output::table::print_document(&result),
        },
    }

    Ok(())
}
