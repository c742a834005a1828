use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::accounts::AccountBatch;
use crate::error::TasdeedError;
use crate::extraction::PdfExtractor;
use crate::model::FieldMap;
use crate::sink;
use crate::templates::schema::TemplateSet;

/// Where a batch reads bills from and writes its rows to.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory holding one `<ACCOUNTNO>.pdf` per account.
    pub pdf_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Distinguishes the working file of concurrent runs.
    pub run_id: String,
    pub month: u32,
    pub year: i32,
    pub export_xlsx: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub subtype: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<String>,
    pub csv_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xlsx_path: Option<PathBuf>,
}

/// Extract one row per account into `<SUBTYPE>_<month>-<year>.csv`.
///
/// An account whose PDF is missing or unreadable still gets a row, filled
/// with placeholders, and is listed in `failed`. Only sink errors abort the
/// run.
pub fn run_batch(
    batch: &AccountBatch,
    options: &BatchOptions,
    extractor: &dyn PdfExtractor,
    templates: &TemplateSet,
) -> Result<BatchSummary, TasdeedError> {
    let working = options
        .output_dir
        .join(format!("output_{}.csv", options.run_id));
    let mut failed = Vec::new();

    for (i, account) in batch.accounts.iter().enumerate() {
        let document = pdf_path(&options.pdf_dir, account)
            .and_then(|path| crate::extract_document(&path, Some(account), extractor, templates));
        let row = match document {
            Ok(document) => {
                log::info!("[{}/{}] extracted {}", i + 1, batch.accounts.len(), account);
                sink::flatten(&document, account)
            }
            Err(e) => {
                log::warn!("[{}/{}] {}: {}", i + 1, batch.accounts.len(), account, e);
                failed.push(account.clone());
                FieldMap::placeholder(account)
            }
        };
        sink::append_csv_row(&working, &row)?;
    }

    let csv_path = finalize(&working, &options.output_dir, &batch.subtype, options.month, options.year)?;

    let xlsx_path = if options.export_xlsx {
        let path = csv_path.with_extension("xlsx");
        let rows = sink::read_csv_rows(&csv_path)?;
        sink::write_xlsx(&path, &rows)?;
        Some(path)
    } else {
        None
    };

    Ok(BatchSummary {
        subtype: batch.subtype.clone(),
        total: batch.accounts.len(),
        succeeded: batch.accounts.len() - failed.len(),
        failed,
        csv_path,
        xlsx_path,
    })
}

/// `<pdf_dir>/<account>.pdf`. Ids that could name a file outside `pdf_dir`
/// are refused.
fn pdf_path(pdf_dir: &Path, account: &str) -> Result<PathBuf, TasdeedError> {
    if account.contains(['/', '\\']) || account == "." || account == ".." {
        return Err(TasdeedError::AccountList(format!(
            "account id '{}' is not a plain file name",
            account
        )));
    }
    Ok(pdf_dir.join(format!("{}.pdf", account)))
}

/// File name of a finished run, e.g. `GOV_5-2024.csv`.
pub fn output_file_name(subtype: &str, month: u32, year: i32) -> String {
    format!("{}_{}-{}.csv", subtype.to_uppercase(), month, year)
}

fn finalize(
    working: &Path,
    output_dir: &Path,
    subtype: &str,
    month: u32,
    year: i32,
) -> Result<PathBuf, TasdeedError> {
    let renamed = output_dir.join(output_file_name(subtype, month, year));
    if renamed.exists() {
        std::fs::remove_file(&renamed)?;
    }
    std::fs::rename(working, &renamed)?;
    log::info!("output written to {}", renamed.display());
    Ok(renamed)
}
