use super::document::{FieldCharKind, FormControl, Run, WordDocument};
use crate::model::{FieldKind, FormField};

/// Labels this short usually mean the editor split the label text into
/// the next paragraph.
const SHORT_LABEL_CHARS: usize = 2;
const LABEL_REPAIR_CHARS: usize = 30;

/// Displayed value of the text field whose begin marker sits in `runs[begin]`:
/// the first text of every run after `separate`, up to and including the
/// run carrying `end`.
pub fn display_text(runs: &[&Run], begin: usize) -> String {
    let mut value = String::new();
    let mut after_separate = false;
    for run in runs.iter().skip(begin + 1) {
        if after_separate {
            if let Some(t) = run.first_text() {
                value.push_str(t);
            }
            if run.has_field_char(FieldCharKind::End) {
                break;
            }
        }
        if run.has_field_char(FieldCharKind::Separate) {
            after_separate = true;
        }
    }
    value.trim().to_string()
}

/// Walk every paragraph and collect its legacy form fields in order.
pub fn extract_form_fields(doc: &WordDocument, paragraph_texts: &[String]) -> Vec<FormField> {
    let mut fields = Vec::new();

    for para_idx in 0..doc.paragraph_count() {
        let runs = doc.paragraph_runs(para_idx);
        for (i, run) in runs.iter().enumerate() {
            let Some(data) = run.begin_data() else {
                continue;
            };
            match data.control {
                Some(FormControl::TextInput) => fields.push(FormField {
                    name: data.name.clone(),
                    kind: FieldKind::TextInput {
                        value: display_text(&runs, i),
                    },
                    label: String::new(),
                    following_text: None,
                    position: para_idx,
                }),
                Some(FormControl::Checkbox { checked }) => {
                    let label = checkbox_label(&runs, i, paragraph_texts.get(para_idx + 1));
                    if data.name.is_none() && label.is_empty() {
                        continue;
                    }
                    fields.push(FormField {
                        name: data.name.clone(),
                        kind: FieldKind::Checkbox { checked },
                        label,
                        following_text: following_text(&runs, i),
                        position: para_idx,
                    });
                }
                None => {}
            }
        }
    }

    fields
}

/// Text right after the checkbox up to the next field, with the
/// split-label repair applied.
fn checkbox_label(runs: &[&Run], begin: usize, next_paragraph: Option<&String>) -> String {
    let mut label = String::new();
    for run in runs.iter().skip(begin + 1) {
        if run.has_field_char(FieldCharKind::Begin) {
            break;
        }
        if let Some(t) = run.first_text() {
            label.push_str(t);
        }
    }
    let mut label = label.trim().to_string();

    if label.chars().count() <= SHORT_LABEL_CHARS {
        if let Some(next) = next_paragraph.map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let prefix: String = next.chars().take(LABEL_REPAIR_CHARS).collect();
            label = format!("{label}{prefix}").trim().to_string();
        }
    }
    label
}

/// Displayed value of a text input that is the very next field after the
/// checkbox. Any other field in between means there is none.
fn following_text(runs: &[&Run], begin: usize) -> Option<String> {
    let (offset, run) = runs
        .iter()
        .enumerate()
        .skip(begin + 1)
        .find(|(_, run)| run.has_field_char(FieldCharKind::Begin))?;
    match run.begin_data()?.control {
        Some(FormControl::TextInput) => Some(display_text(runs, offset)),
        _ => None,
    }
}
