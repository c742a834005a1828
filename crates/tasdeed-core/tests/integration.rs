//! Integration tests for the document driver and batch run.
//!
//! Uses a MockExtractor that returns pre-built PageContent without
//! invoking pdftotext, so these tests run without poppler-utils.

use std::path::Path;

use tasdeed_core::accounts::AccountBatch;
use tasdeed_core::batch::{run_batch, BatchOptions};
use tasdeed_core::error::TasdeedError;
use tasdeed_core::extraction::{BBox, PageContent, PdfDocument, PdfExtractor, Word};
use tasdeed_core::model::{LayoutId, FIELD_NAMES};
use tasdeed_core::templates::builtin::load_builtin;
use tasdeed_core::templates::parse_templates_str;
use tasdeed_core::{classify_pdf, extract_document, extract_document_bytes};

struct MockExtractor {
    pages: Vec<Result<PageContent, String>>,
    open_error: Option<String>,
}

impl MockExtractor {
    fn new(pages: Vec<Result<PageContent, String>>) -> Self {
        MockExtractor {
            pages,
            open_error: None,
        }
    }
}

struct MockDocument {
    pages: Vec<Result<PageContent, String>>,
}

impl PdfDocument for MockDocument {
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
                reason: "out of range".into(),
            }),
        }
    }
}

impl PdfExtractor for MockExtractor {
    fn open(&self, _pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, TasdeedError> {
        if let Some(reason) = &self.open_error {
            return Err(TasdeedError::InvalidDocument(reason.clone()));
        }
        Ok(Box::new(MockDocument {
            pages: self.pages.clone(),
        }))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn word(text: &str, x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Word {
    Word::new(text, BBox::new(x_min, y_min, x_max, y_max))
}

/// A page carrying the new-layout marker, a due date and an account number.
fn new_nama_page(index: usize, account: &str) -> PageContent {
    let mut page = PageContent::new(index, 595.0, 842.0);
    page.push_line(vec![word("2024-05-01", 22.0, 60.0, 80.0, 70.0)]);
    page.push_line(vec![word(account, 30.0, 115.0, 90.0, 125.0)]);
    page.push_line(vec![word("Thabit", 20.0, 220.0, 80.0, 230.0)]);
    page
}

/// A page with the VAT id in its probe region and no marker.
fn old_nama_page(index: usize) -> PageContent {
    let mut page = PageContent::new(index, 595.0, 842.0);
    page.push_line(vec![word("1100004061", 60.0, 145.0, 120.0, 155.0)]);
    page.push_line(vec![word("RT1-Normal", 35.0, 359.0, 100.0, 367.0)]);
    page
}

fn blank_page(index: usize) -> PageContent {
    PageContent::new(index, 595.0, 842.0)
}

// ---------------------------------------------------------------------------
// Every page gets an entry carrying every declared field
// ---------------------------------------------------------------------------
#[test]
fn every_page_has_an_entry_with_all_fields() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![
        Ok(new_nama_page(0, "40012345")),
        Ok(old_nama_page(1)),
        Ok(blank_page(2)),
    ]);

    let result = extract_document_bytes(&[], Some("40012345"), &extractor, &templates).unwrap();

    assert_eq!(result.len(), 3);
    let layouts: Vec<Option<LayoutId>> = result.pages.values().map(|p| p.layout).collect();
    assert_eq!(
        layouts,
        vec![
            Some(LayoutId::NewNama),
            Some(LayoutId::OldNama),
            Some(LayoutId::Dofar)
        ]
    );
    for record in result.pages.values() {
        assert!(!record.is_placeholder());
        assert_eq!(record.fields.len(), FIELD_NAMES.len());
        for name in FIELD_NAMES {
            assert!(record.fields.contains(name), "missing {}", name);
        }
    }
}

#[test]
fn new_nama_due_date_is_stripped() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![Ok(new_nama_page(0, "40012345"))]);

    let result = extract_document_bytes(&[], None, &extractor, &templates).unwrap();
    let page = result.first().unwrap();

    assert_eq!(page.fields.value("Due_Date"), Some("2024-05-01"));
    assert_eq!(page.fields.value("Account_No"), Some("40012345"));
}

#[test]
fn old_nama_tariff_is_reading_type_formatted() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![Ok(old_nama_page(0))]);

    let result = extract_document_bytes(&[], None, &extractor, &templates).unwrap();
    let page = result.first().unwrap();

    assert_eq!(page.layout, Some(LayoutId::OldNama));
    assert_eq!(page.fields.value("Tariff_Type"), Some("RT1 - Normal"));
    // Rate_5 has no region in this layout
    assert!(page.fields.contains("Rate_5"));
    assert_eq!(page.fields.value("Rate_5"), None);
}

#[test]
fn old_nama_meter_row_splits_into_five_fields() {
    let templates = load_builtin().unwrap();
    let mut page = old_nama_page(0);
    // pdftotext reports the whole meter row as one line of words
    page.push_line(vec![
        word("M77", 418.0, 229.0, 436.0, 238.0),
        word("01/05/24", 448.0, 229.0, 468.0, 238.0),
        word("01/04/24", 480.0, 229.0, 500.0, 238.0),
        word("1520", 512.0, 229.0, 524.0, 238.0),
        word("1400", 537.0, 229.0, 550.0, 238.0),
    ]);
    let extractor = MockExtractor::new(vec![Ok(page)]);

    let result = extract_document_bytes(&[], None, &extractor, &templates).unwrap();
    let page = result.first().unwrap();

    assert_eq!(page.layout, Some(LayoutId::OldNama));
    assert_eq!(page.fields.value("Meter_No"), Some("M77"));
    assert_eq!(page.fields.value("Current_Reading_Date"), Some("01/05/24"));
    assert_eq!(page.fields.value("Previous_Reading_Date"), Some("01/04/24"));
    assert_eq!(page.fields.value("Current_Reading"), Some("1520"));
    assert_eq!(page.fields.value("Previous_Reading"), Some("1400"));
}

// ---------------------------------------------------------------------------
// A corrupt page is replaced, the rest of the document survives
// ---------------------------------------------------------------------------
#[test]
fn corrupt_second_page_becomes_placeholder() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![
        Ok(new_nama_page(0, "40012345")),
        Err("broken content stream".into()),
    ]);

    let result = extract_document_bytes(&[], Some("40012345"), &extractor, &templates).unwrap();

    assert_eq!(result.len(), 2);
    assert!(!result.pages[&0].is_placeholder());
    let second = &result.pages[&1];
    assert!(second.is_placeholder());
    assert_eq!(second.fields.value("Account_No"), Some("40012345"));
    assert_eq!(second.fields.value("Due_Date"), Some("null"));
    assert_eq!(second.fields.len(), FIELD_NAMES.len());
}

#[test]
fn placeholder_uses_account_read_from_earlier_page() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![
        Ok(new_nama_page(0, "40099999")),
        Err("broken content stream".into()),
    ]);

    let result = extract_document_bytes(&[], None, &extractor, &templates).unwrap();
    assert_eq!(result.pages[&1].fields.value("Account_No"), Some("40099999"));
}

#[test]
fn missing_template_degrades_page_only() {
    let templates = parse_templates_str(
        r#"{
            "name": "Dofar only",
            "version": "1.0",
            "classifier": {
                "marker_region": [16.98, 198.0, 169.96, 306.0],
                "marker_text": "Thabit",
                "vat_region": [57.1, 142.0, 133.6, 159.8],
                "vat_id": "1100004061"
            },
            "layouts": {
                "dofar": { "fields": [
                    { "name": "Account_No", "region": [13.6, 214.4, 106.9, 233.3],
                      "handler": { "kind": "indexed_split", "index": 0 } }
                ] }
            }
        }"#,
    )
    .unwrap();
    let extractor = MockExtractor::new(vec![Ok(new_nama_page(0, "1")), Ok(blank_page(1))]);

    let result = extract_document_bytes(&[], Some("555"), &extractor, &templates).unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.pages[&0].is_placeholder());
    assert_eq!(result.pages[&0].fields.value("Account_No"), Some("555"));
    assert!(!result.pages[&1].is_placeholder());
    assert_eq!(result.pages[&1].fields.len(), 1);
}

#[test]
fn rerun_yields_identical_result() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![
        Ok(new_nama_page(0, "40012345")),
        Err("bad xref".into()),
        Ok(old_nama_page(2)),
    ]);

    let first = extract_document_bytes(&[], Some("40012345"), &extractor, &templates).unwrap();
    let second = extract_document_bytes(&[], Some("40012345"), &extractor, &templates).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Document-level failures
// ---------------------------------------------------------------------------
#[test]
fn missing_file_is_not_found() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![]);
    let result = extract_document(
        Path::new("/nonexistent/40012345.pdf"),
        None,
        &extractor,
        &templates,
    );
    assert!(matches!(result, Err(TasdeedError::NotFound(_))));
}

#[test]
fn unreadable_document_is_invalid() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor {
        pages: vec![],
        open_error: Some("not a PDF".into()),
    };
    let result = extract_document_bytes(b"hello", None, &extractor, &templates);
    assert!(matches!(result, Err(TasdeedError::InvalidDocument(_))));
}

#[test]
fn document_without_pages_is_invalid() {
    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![]);
    let result = extract_document_bytes(b"%PDF-1.4", Some("1"), &extractor, &templates);
    assert!(matches!(result, Err(TasdeedError::InvalidDocument(_))));
}

#[test]
fn classify_pdf_reports_layout_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bill.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![
        Ok(old_nama_page(0)),
        Err("bad page".into()),
    ]);

    let layouts = classify_pdf(&path, &extractor, &templates).unwrap();
    assert_eq!(layouts.len(), 2);
    assert_eq!(*layouts[0].as_ref().unwrap(), LayoutId::OldNama);
    assert!(layouts[1].is_err());
}

// ---------------------------------------------------------------------------
// Batch run: one row per account, missing bills become placeholders
// ---------------------------------------------------------------------------
#[test]
fn batch_writes_one_row_per_account() {
    let pdf_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    std::fs::write(pdf_dir.path().join("40012345.pdf"), b"%PDF-1.4").unwrap();

    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![Ok(new_nama_page(0, "40012345"))]);
    let batch = AccountBatch {
        subtype: "GOV".into(),
        accounts: vec!["40012345".into(), "40054321".into()],
    };
    let options = BatchOptions {
        pdf_dir: pdf_dir.path().to_path_buf(),
        output_dir: out_dir.path().to_path_buf(),
        run_id: "test".into(),
        month: 5,
        year: 2024,
        export_xlsx: true,
    };

    let summary = run_batch(&batch, &options, &extractor, &templates).unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, vec!["40054321".to_string()]);
    assert_eq!(summary.csv_path, out_dir.path().join("GOV_5-2024.csv"));
    assert!(!out_dir.path().join("output_test.csv").exists());
    assert!(summary.xlsx_path.as_ref().unwrap().exists());

    let rows = tasdeed_core::sink::read_csv_rows(&summary.csv_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].value("Due_Date"), Some("2024-05-01"));
    assert_eq!(rows[1].value("Account_No"), Some("40054321"));
    assert_eq!(rows[1].value("Customer"), Some("null"));
}

#[test]
fn batch_refuses_account_ids_outside_pdf_dir() {
    let root = tempfile::tempdir().unwrap();
    let pdf_dir = root.path().join("bills");
    std::fs::create_dir(&pdf_dir).unwrap();
    std::fs::write(root.path().join("secret.pdf"), b"%PDF-1.4").unwrap();

    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![Ok(new_nama_page(0, "40012345"))]);
    let batch = AccountBatch {
        subtype: "GOV".into(),
        accounts: vec!["../secret".into()],
    };
    let options = BatchOptions {
        pdf_dir,
        output_dir: root.path().to_path_buf(),
        run_id: "test".into(),
        month: 5,
        year: 2024,
        export_xlsx: false,
    };

    let summary = run_batch(&batch, &options, &extractor, &templates).unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, vec!["../secret".to_string()]);
    let rows = tasdeed_core::sink::read_csv_rows(&summary.csv_path).unwrap();
    assert_eq!(rows[0].value("Due_Date"), Some("null"));
}

#[test]
fn batch_counts_empty_document_as_failed() {
    let pdf_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    std::fs::write(pdf_dir.path().join("40012345.pdf"), b"%PDF-1.4").unwrap();

    let templates = load_builtin().unwrap();
    let extractor = MockExtractor::new(vec![]);
    let batch = AccountBatch {
        subtype: "GOV".into(),
        accounts: vec!["40012345".into()],
    };
    let options = BatchOptions {
        pdf_dir: pdf_dir.path().to_path_buf(),
        output_dir: out_dir.path().to_path_buf(),
        run_id: "test".into(),
        month: 5,
        year: 2024,
        export_xlsx: false,
    };

    let summary = run_batch(&batch, &options, &extractor, &templates).unwrap();
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed.len(), 1);
}
