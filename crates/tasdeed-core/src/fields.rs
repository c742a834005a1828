use crate::error::TasdeedError;
use crate::extraction::PageContent;
use crate::model::{FieldFailure, FieldMap};
use crate::templates::schema::{FieldDef, LayoutTemplate};

/// Field values of one page, plus the fields that could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFields {
    pub fields: FieldMap,
    pub failures: Vec<FieldFailure>,
}

/// Read every field of `template` from `page`.
///
/// A field that fails is recorded as null and listed in `failures`; the
/// remaining fields are still read.
pub fn extract_fields(page: &PageContent, template: &LayoutTemplate) -> PageFields {
    let mut fields = FieldMap::new();
    let mut failures = Vec::new();

    for field in &template.fields {
        match extract_field(page, field) {
            Ok(value) => fields.insert(field.name.as_str(), value),
            Err(e) => {
                log::warn!("page {}: {}", page.page_index, e);
                fields.insert(field.name.as_str(), None);
                failures.push(FieldFailure {
                    field: field.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    PageFields { fields, failures }
}

fn extract_field(page: &PageContent, field: &FieldDef) -> Result<Option<String>, TasdeedError> {
    if field.region.is_unmapped() {
        return Ok(None);
    }
    let raw = page
        .text_in(&field.region)
        .map_err(|e| TasdeedError::FieldExtraction {
            field: field.name.clone(),
            reason: e.to_string(),
        })?;
    Ok(field.handler.apply(&raw))
}
