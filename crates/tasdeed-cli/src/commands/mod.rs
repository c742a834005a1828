pub mod batch;
pub mod classify;
pub mod extract;
pub mod templates;

use std::path::PathBuf;

use tasdeed_core::error::TasdeedError;
use tasdeed_core::templates::builtin;
use tasdeed_core::templates::schema::TemplateSet;

/// The template file given with `--templates`, or the built-in set.
pub fn load_template_set(path: Option<PathBuf>) -> Result<TemplateSet, TasdeedError> {
    match path {
        Some(path) => tasdeed_core::templates::load_templates(&path),
        None => builtin::load_builtin(),
    }
}
