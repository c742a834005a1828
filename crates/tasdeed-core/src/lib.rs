pub mod accounts;
pub mod batch;
pub mod classify;
pub mod error;
pub mod extraction;
pub mod fields;
pub mod handlers;
pub mod model;
pub mod sink;
pub mod templates;

use std::path::Path;

use error::TasdeedError;
use extraction::{PdfDocument, PdfExtractor};
use fields::PageFields;
use model::{DocumentResult, LayoutId, PageRecord, PageStatus, ACCOUNT_FIELD, PLACEHOLDER_VALUE};
use templates::schema::TemplateSet;

/// Main API entry point: extract every page of a bill PDF.
///
/// `account` is the account id the bill was fetched for; it is written into
/// placeholder records for pages that cannot be processed. Without one, the
/// account number read from an earlier page is used instead.
///
/// Fails only when the file is missing, is not a readable PDF or has no
/// pages. Problems with a single page or field degrade that page or field
/// and processing continues.
pub fn extract_document(
    path: &Path,
    account: Option<&str>,
    extractor: &dyn PdfExtractor,
    templates: &TemplateSet,
) -> Result<DocumentResult, TasdeedError> {
    let bytes = read_pdf(path)?;
    extract_document_bytes(&bytes, account, extractor, templates)
}

/// Same as [`extract_document`], for a PDF already in memory.
pub fn extract_document_bytes(
    pdf_bytes: &[u8],
    account: Option<&str>,
    extractor: &dyn PdfExtractor,
    templates: &TemplateSet,
) -> Result<DocumentResult, TasdeedError> {
    let document = extractor.open(pdf_bytes)?;
    if document.page_count() == 0 {
        return Err(TasdeedError::InvalidDocument("document has no pages".into()));
    }
    log::debug!(
        "opened document with {} page(s) using {}",
        document.page_count(),
        extractor.backend_name()
    );

    let mut result = DocumentResult::default();
    let mut best_account = account.map(str::to_owned);

    for index in 0..document.page_count() {
        let record = match process_page(document.as_ref(), index, templates) {
            Ok((layout, page)) => {
                if best_account.is_none() {
                    best_account = page.fields.value(ACCOUNT_FIELD).map(str::to_owned);
                }
                PageRecord {
                    layout: Some(layout),
                    status: PageStatus::Extracted,
                    fields: page.fields,
                    field_failures: page.failures,
                }
            }
            Err(e) => {
                log::warn!("page {} replaced by placeholder: {}", index, e);
                PageRecord::placeholder(
                    best_account.as_deref().unwrap_or(PLACEHOLDER_VALUE),
                    e.to_string(),
                )
            }
        };
        result.pages.insert(index, record);
    }

    Ok(result)
}

/// Layout of each page of a bill PDF, without extracting fields.
pub fn classify_pdf(
    path: &Path,
    extractor: &dyn PdfExtractor,
    templates: &TemplateSet,
) -> Result<Vec<Result<LayoutId, TasdeedError>>, TasdeedError> {
    let bytes = read_pdf(path)?;
    let document = extractor.open(&bytes)?;
    Ok(classify::classify_document(
        document.as_ref(),
        &templates.classifier,
    ))
}

fn process_page(
    document: &dyn PdfDocument,
    index: usize,
    templates: &TemplateSet,
) -> Result<(LayoutId, PageFields), TasdeedError> {
    let page = document.page(index)?;
    let layout = classify::classify_page(&page, &templates.classifier);
    log::debug!("page {} classified as {}", index, layout);

    let template = templates.template(layout)?;
    Ok((layout, fields::extract_fields(&page, template)))
}

fn read_pdf(path: &Path) -> Result<Vec<u8>, TasdeedError> {
    if !path.exists() {
        return Err(TasdeedError::NotFound(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TasdeedError::NotFound(path.to_path_buf()),
        _ => TasdeedError::InvalidDocument(format!("cannot read {}: {}", path.display(), e)),
    })
}
