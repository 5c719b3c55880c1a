use injex_core::error::InjexError;
use injex_core::templates::schema::{FieldSpec, FieldSpecKind, TemplateDef};
use injex_core::templates::{builtin, load_template};
use std::path::Path;

pub fn list() -> Result<(), InjexError> {
    println!("Available built-in templates:\n");
    for name in builtin::PRESETS {
        let t = builtin::load_preset(name)?;
        let form_type = match t.form_type {
            Some(ft) => format!(" [{ft}]"),
            None => String::new(),
        };
        println!("  {:<18} {} schema (v{}){}", name, t.schema, t.version, form_type);
        if let Some(ref desc) = t.description {
            println!("                     {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(name: &str) -> Result<(), InjexError> {
    let t = builtin::find_preset(name)?;
    print_template(&t);
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), InjexError> {
    let t = load_template(file)?;
    println!(
        "{} is valid: '{}' ({} schema, {} fields, {} checkbox labels)",
        file.display(),
        t.name,
        t.schema,
        t.fields.len(),
        t.labels.len()
    );
    Ok(())
}

fn print_template(t: &TemplateDef) {
    println!("{} (version {})\n", t.name, t.version);
    if let Some(ref desc) = t.description {
        println!("{}\n", desc);
    }

    println!("Writes the {} column set.", t.schema);
    match t.expected_boxes {
        Some(n) => println!("Scanned PDFs must yield exactly {n} checkboxes; otherwise all checkbox columns stay empty."),
        None if t.labels.is_empty() => println!("Scanned PDFs are read from their text layer only."),
        None => println!("Scanned PDFs are read with {} checkbox labels.", t.labels.len()),
    }
    if !t.swaps.is_empty() {
        let swaps: Vec<String> = t.swaps.iter().map(|[p, from]| format!("{p}<-{from}")).collect();
        println!("Reading-order corrections: {}", swaps.join(", "));
    }
    println!("\nFields:\n");

    let width = t.fields.iter().map(|f| f.column.len()).max().unwrap_or(10);
    for spec in &t.fields {
        println!("  {:<width$}  {}", spec.column, describe(spec, t));
        if let Some(section) = &spec.section {
            let end = match (&section.end, section.paragraphs) {
                (Some(marker), _) => format!("until \"{marker}\""),
                (None, Some(n)) => format!("for {n} paragraph(s)"),
                (None, None) => "to the end".into(),
            };
            println!("  {:<width$}    Word: after \"{}\" {}", "", section.start, end);
        }
    }
    println!();
}

fn describe(spec: &FieldSpec, t: &TemplateDef) -> String {
    match spec.kind {
        FieldSpecKind::Text | FieldSpecKind::Date => {
            let kind = if spec.kind == FieldSpecKind::Date { "date" } else { "text" };
            let pdf = spec
                .text_rule
                .as_deref()
                .and_then(|key| t.text_rule(key))
                .map(|r| format!(", PDF: text after \"{}\"", r.start.trim()))
                .unwrap_or_default();
            format!("{kind}{pdf}")
        }
        FieldSpecKind::Checkboxes => {
            let mut parts = vec![format!("checkboxes, {}", spec.choice.describe())];
            if let Some([first, end]) = spec.boxes {
                let labels: Vec<&str> = (first..end).filter_map(|p| t.label(p)).collect();
                parts.push(format!("PDF boxes {first}-{}: {}", end - 1, labels.join(" | ")));
            }
            if let Some(detail) = &spec.detail_column {
                parts.push(format!("details -> {detail}"));
            }
            parts.join(", ")
        }
    }
}
