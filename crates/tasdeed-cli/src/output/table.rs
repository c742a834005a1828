use tasdeed_core::model::{DocumentResult, PageStatus};
use tasdeed_core::templates::schema::LayoutTemplate;

pub fn print_document(result: &DocumentResult) {
    for (i, (index, page)) in result.pages.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let layout = page.layout.map(|l| l.as_str()).unwrap_or("-");
        println!("=== Page {} ({}) ===\n", index, layout);

        if let PageStatus::Placeholder { ref reason } = page.status {
            println!("  placeholder: {}\n", reason);
        }

        let width = page
            .fields
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(10);
        for (name, value) in page.fields.iter() {
            println!("  {:<width$}  {}", name, value.unwrap_or("-"), width = width);
        }

        if !page.field_failures.is_empty() {
            println!();
            for failure in &page.field_failures {
                println!("  warning: {}: {}", failure.field, failure.reason);
            }
        }
    }
}

pub fn print_template(template: &LayoutTemplate) {
    if let Some(ref desc) = template.description {
        println!("{}\n", desc);
    }
    let width = template
        .fields
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(10);
    for field in &template.fields {
        let region = if field.region.is_unmapped() {
            "(not located)".to_string()
        } else {
            field.region.to_string()
        };
        println!(
            "  {:<width$}  {:<34}  {}",
            field.name,
            region,
            field.handler.describe(),
            width = width
        );
    }
}
