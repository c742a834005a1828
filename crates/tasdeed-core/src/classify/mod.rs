use crate::error::TasdeedError;
use crate::extraction::{PageContent, PdfDocument};
use crate::model::{LayoutId, Region};
use crate::templates::schema::ClassifierConfig;

/// Decide which bill layout a page uses.
///
/// First match wins:
/// 1. marker text in the marker region → `new_nama`
/// 2. VAT id in the VAT region, and no marker → `old_nama`
/// 3. anything else → `dofar`
///
/// The marker takes precedence over the VAT id, so a page showing both is
/// `new_nama`.
pub fn classify_page(page: &PageContent, config: &ClassifierConfig) -> LayoutId {
    let marker = probe(page, &config.marker_region);
    let vat = probe(page, &config.vat_region);
    let has_marker = marker.contains(config.marker_text.as_str());

    if has_marker {
        LayoutId::NewNama
    } else if vat.contains(config.vat_id.as_str()) && !has_marker {
        LayoutId::OldNama
    } else {
        LayoutId::Dofar
    }
}

/// Layout of every page of an opened document; unreadable pages keep their error.
pub fn classify_document(
    document: &dyn PdfDocument,
    config: &ClassifierConfig,
) -> Vec<Result<LayoutId, TasdeedError>> {
    (0..document.page_count())
        .map(|index| document.page(index).map(|page| classify_page(&page, config)))
        .collect()
}

fn probe(page: &PageContent, region: &Region) -> String {
    // Probe regions are validated when templates load; a bad one reads as empty.
    page.text_in(region).unwrap_or_default()
}
