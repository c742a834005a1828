use std::path::PathBuf;

use chrono::{Datelike, Local};
use tasdeed_core::accounts::load_accounts;
use tasdeed_core::batch::{run_batch, BatchOptions};
use tasdeed_core::error::TasdeedError;
use tasdeed_core::extraction::pdftotext::PdftotextExtractor;

pub fn run(
    accounts_file: PathBuf,
    pdf_dir: PathBuf,
    out_dir: PathBuf,
    subtype: Option<String>,
    templates: Option<PathBuf>,
    xlsx: bool,
) -> Result<(), TasdeedError> {
    if !pdf_dir.is_dir() {
        return Err(TasdeedError::NotFound(pdf_dir));
    }
    // Without pdftotext every account would end up a placeholder row.
    if !PdftotextExtractor::is_available() {
        return Err(TasdeedError::PdftotextNotFound);
    }

    let templates = super::load_template_set(templates)?;
    let batch = load_accounts(&accounts_file, subtype.as_deref())?;
    std::fs::create_dir_all(&out_dir)?;

    let now = Local::now();
    let options = BatchOptions {
        pdf_dir,
        output_dir: out_dir,
        run_id: now.format("%Y%m%d%H%M%S").to_string(),
        month: now.month(),
        year: now.year(),
        export_xlsx: xlsx,
    };

    let extractor = PdftotextExtractor::new();
    let summary = run_batch(&batch, &options, &extractor, &templates)?;

    println!(
        "{}: {} of {} bill(s) extracted",
        summary.subtype, summary.succeeded, summary.total
    );
    if !summary.failed.is_empty() {
        println!("  failed: {}", summary.failed.join(", "));
    }
    println!("  csv:  {}", summary.csv_path.display());
    if let Some(ref path) = summary.xlsx_path {
        println!("  xlsx: {}", path.display());
    }
    Ok(())
}
