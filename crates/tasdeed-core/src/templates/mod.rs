pub mod builtin;
pub mod schema;

use crate::error::TasdeedError;
use crate::model::is_known_field;
use schema::TemplateSet;
use std::collections::HashSet;
use std::path::Path;

/// Load a template set from a JSON file.
pub fn load_templates(path: &Path) -> Result<TemplateSet, TasdeedError> {
    let content = std::fs::read_to_string(path).map_err(|e| TasdeedError::TemplateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_templates(&content, path)
}

/// Parse a template set from a JSON string.
pub fn parse_templates(json: &str, source: &Path) -> Result<TemplateSet, TasdeedError> {
    let set: TemplateSet = serde_json::from_str(json).map_err(|e| TasdeedError::TemplateLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_templates(&set)?;
    Ok(set)
}

/// Parse a template set from a JSON string (no file path context).
pub fn parse_templates_str(json: &str) -> Result<TemplateSet, TasdeedError> {
    let set: TemplateSet = serde_json::from_str(json).map_err(TasdeedError::Json)?;
    validate_templates(&set)?;
    Ok(set)
}

/// Validate that a template set is well-formed.
///
/// Inverted regions pass: they only fail the field that uses them, at
/// extraction time.
pub fn validate_templates(set: &TemplateSet) -> Result<(), TasdeedError> {
    let classifier = &set.classifier;
    if classifier.marker_text.trim().is_empty() {
        return Err(TasdeedError::TemplateInvalid(
            "classifier marker_text must not be empty".into(),
        ));
    }
    if classifier.vat_id.trim().is_empty() {
        return Err(TasdeedError::TemplateInvalid(
            "classifier vat_id must not be empty".into(),
        ));
    }
    for (label, region) in [
        ("marker_region", &classifier.marker_region),
        ("vat_region", &classifier.vat_region),
    ] {
        if !region.is_finite() || region.is_inverted() || region.is_unmapped() {
            return Err(TasdeedError::TemplateInvalid(format!(
                "classifier {} {} is not a usable region",
                label, region
            )));
        }
    }

    if set.layouts.is_empty() {
        return Err(TasdeedError::TemplateInvalid("layouts must not be empty".into()));
    }

    for (layout, template) in &set.layouts {
        if template.fields.is_empty() {
            return Err(TasdeedError::TemplateInvalid(format!(
                "layout '{}' has no fields",
                layout
            )));
        }

        let mut seen = HashSet::new();
        for field in &template.fields {
            if !is_known_field(&field.name) {
                return Err(TasdeedError::TemplateInvalid(format!(
                    "layout '{}' references unknown field '{}'",
                    layout, field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(TasdeedError::TemplateInvalid(format!(
                    "layout '{}' declares field '{}' twice",
                    layout, field.name
                )));
            }
            if !field.region.is_finite() {
                return Err(TasdeedError::TemplateInvalid(format!(
                    "field '{}' in layout '{}' has a non-finite region",
                    field.name, layout
                )));
            }
        }
    }

    Ok(())
}
