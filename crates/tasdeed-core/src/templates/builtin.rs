use crate::error::TasdeedError;
use crate::templates::parse_templates_str;
use crate::templates::schema::TemplateSet;

const BILLS_JSON: &str = include_str!("../../../../templates/bills.json");

/// Load the template set shipped with the crate (`new_nama`, `old_nama`, `dofar`).
pub fn load_builtin() -> Result<TemplateSet, TasdeedError> {
    parse_templates_str(BILLS_JSON)
}
