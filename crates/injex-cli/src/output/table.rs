use injex_core::Extraction;

pub fn print(extraction: &Extraction) {
    println!(
        "=== {} ({}) ===\n",
        extraction.form_type, extraction.template
    );

    let row = extraction.record.to_row();
    let width = row.iter().map(|(column, _)| column.len()).max().unwrap_or(10);
    for (column, value) in &row {
        if value.is_empty() {
            println!("  {:<width$}  -", column);
        } else {
            println!("  {:<width$}  {}", column, value);
        }
    }

    if !extraction.boxes.is_empty() {
        let checked = extraction.boxes.iter().filter(|b| b.detected.checked).count();
        println!(
            "\n  {} checkbox(es) detected, {} checked",
            extraction.boxes.len(),
            checked
        );
    }

    if !extraction.warnings.is_empty() {
        println!();
        for w in &extraction.warnings {
            println!("  warning: {w}");
        }
    }
}
