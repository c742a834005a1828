use crate::error::TasdeedError;
use crate::handlers::Handler;
use crate::model::{LayoutId, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classifier probes plus one field table per bill layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub classifier: ClassifierConfig,
    pub layouts: BTreeMap<LayoutId, LayoutTemplate>,
}

impl TemplateSet {
    /// Field table for `layout`. A miss means the bill uses a layout nobody
    /// has mapped yet, so it is an error rather than a fallback.
    pub fn template(&self, layout: LayoutId) -> Result<&LayoutTemplate, TasdeedError> {
        self.layouts
            .get(&layout)
            .ok_or(TasdeedError::MissingTemplate(layout))
    }
}

/// Probe regions and literals used to tell the layouts apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Region holding the marker block of `new_nama` bills.
    pub marker_region: Region,
    pub marker_text: String,
    /// Region holding the issuer VAT number on `old_nama` bills.
    pub vat_region: Region,
    pub vat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutTemplate {
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered; extraction and output follow this order.
    pub fields: Vec<FieldDef>,
}

impl LayoutTemplate {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Where one field sits on the page and how its text is cleaned up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// `[left, top, right, bottom]`; all zeros when not located yet.
    pub region: Region,
    pub handler: Handler,
}
