use std::path::Path;

use tasdeed_core::error::TasdeedError;
use tasdeed_core::model::LayoutId;
use tasdeed_core::templates::builtin;

use crate::output;

pub fn list() -> Result<(), TasdeedError> {
    let set = builtin::load_builtin()?;
    println!("{} (v{})\n", set.name, set.version);
    for (layout, template) in &set.layouts {
        println!("  {:<10} {} field(s)", layout, template.fields.len());
        if let Some(ref desc) = template.description {
            println!("             {}", desc);
        }
        println!();
    }
    println!(
        "Classifier: '{}' in {} -> new_nama, '{}' in {} -> old_nama, otherwise dofar",
        set.classifier.marker_text,
        set.classifier.marker_region,
        set.classifier.vat_id,
        set.classifier.vat_region
    );
    Ok(())
}

pub fn show(layout: &str) -> Result<(), TasdeedError> {
    let layout = LayoutId::from_name(layout).ok_or_else(|| {
        TasdeedError::TemplateInvalid(format!(
            "unknown layout '{}'. Available: new_nama, old_nama, dofar",
            layout
        ))
    })?;
    let set = builtin::load_builtin()?;
    let template = set.template(layout)?;
    println!("=== {} ===\n", layout);
    output::table::print_template(template);
    Ok(())
}

pub fn validate(path: &Path) -> Result<(), TasdeedError> {
    let set = tasdeed_core::templates::load_templates(path)?;
    let layouts: Vec<&str> = set.layouts.keys().map(LayoutId::as_str).collect();
    println!(
        "Valid: {} (v{}), layouts: {}",
        set.name,
        set.version,
        layouts.join(", ")
    );
    for layout in LayoutId::ALL {
        if !set.layouts.contains_key(&layout) {
            println!("  note: no template for {}; its pages will be placeholders", layout);
        }
    }
    Ok(())
}
