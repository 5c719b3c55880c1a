pub mod builtin;
pub mod schema;

use crate::error::InjexError;
use crate::model::{FormType, SchemaVersion};
use schema::{FieldSpecKind, TemplateDef};
use std::path::Path;

/// Load a template from a JSON file.
pub fn load_template(path: &Path) -> Result<TemplateDef, InjexError> {
    let content = std::fs::read_to_string(path).map_err(|e| InjexError::TemplateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_template(&content, path)
}

/// Parse a template from a JSON string read from `source`.
pub fn parse_template(json: &str, source: &Path) -> Result<TemplateDef, InjexError> {
    let template: TemplateDef =
        serde_json::from_str(json).map_err(|e| InjexError::TemplateLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_template(&template)?;
    Ok(template)
}

/// Parse a template from a JSON string (no file path context).
pub fn parse_template_str(json: &str) -> Result<TemplateDef, InjexError> {
    let template: TemplateDef = serde_json::from_str(json).map_err(InjexError::Json)?;
    validate_template(&template)?;
    Ok(template)
}

/// Built-in template for a schema and detected form type.
pub fn select_template(
    schema: SchemaVersion,
    form_type: FormType,
) -> Result<TemplateDef, InjexError> {
    let name = match (schema, form_type) {
        (SchemaVersion::Legacy, _) => "legacy",
        (SchemaVersion::Extended, FormType::Head) => "head",
        (SchemaVersion::Extended, FormType::Injury) => "injury",
        (SchemaVersion::Extended, FormType::Illness) => "illness",
        (SchemaVersion::Extended, FormType::Knee) => "knee",
        (SchemaVersion::Extended, FormType::LowerExtremities) => "lower_extremities",
        (SchemaVersion::Extended, FormType::Unknown) => "common",
    };
    builtin::load_preset(name)
}

/// Check that a template is internally consistent.
pub fn validate_template(template: &TemplateDef) -> Result<(), InjexError> {
    let invalid = |msg: String| Err(InjexError::TemplateInvalid(format!("{}: {msg}", template.name)));

    if template.fields.is_empty() {
        return invalid("fields must not be empty".into());
    }

    let label_count = template.labels.len();
    for (expected, &position) in (1..).zip(template.labels.keys()) {
        if position != expected {
            return invalid(format!(
                "labels must be numbered 1..{label_count} without gaps (found {position} where {expected} was expected)"
            ));
        }
    }

    if let Some(expected) = template.expected_boxes {
        if expected != label_count {
            return invalid(format!(
                "expected_boxes is {expected} but {label_count} labels are defined"
            ));
        }
    }

    for &[position, takes_from] in &template.swaps {
        for p in [position, takes_from] {
            if p == 0 || p > label_count {
                return invalid(format!("swap position {p} outside 1..{label_count}"));
            }
        }
    }

    let mut ranges: Vec<(usize, usize, &str)> = Vec::new();
    for spec in &template.fields {
        let column = spec.column.as_str();
        if !template.schema.has_column(column) {
            return invalid(format!(
                "column '{column}' is not part of the {} schema",
                template.schema
            ));
        }
        if let Some(detail) = &spec.detail_column {
            if !template.schema.has_column(detail) {
                return invalid(format!(
                    "detail column '{detail}' of '{column}' is not part of the {} schema",
                    template.schema
                ));
            }
        }

        if let Some(section) = &spec.section {
            if section.end.is_some() && section.paragraphs.is_some() {
                return invalid(format!(
                    "'{column}' section sets both an end marker and a paragraph count"
                ));
            }
            if section.start.trim().is_empty() {
                return invalid(format!("'{column}' section start marker is empty"));
            }
        }

        if let Some(rule) = &spec.text_rule {
            if spec.kind == FieldSpecKind::Checkboxes {
                return invalid(format!("'{column}' is a checkbox field but names a text rule"));
            }
            if template.text_rule(rule).is_none() {
                return invalid(format!("'{column}' names unknown text rule '{rule}'"));
            }
        }

        if let Some([first, end]) = spec.boxes {
            if spec.kind != FieldSpecKind::Checkboxes {
                return invalid(format!("'{column}' is not a checkbox field but has boxes"));
            }
            if first == 0 || end <= first || end > label_count + 1 {
                return invalid(format!(
                    "'{column}' boxes [{first}, {end}) outside labels 1..{label_count}"
                ));
            }
            if let Some((_, _, other)) = ranges.iter().find(|(f, e, _)| first < *e && *f < end) {
                return invalid(format!("'{column}' boxes overlap those of '{other}'"));
            }
            ranges.push((first, end, column));
        }

        for (&position, rule) in &spec.following {
            let inside = spec.boxes.is_some_and(|[first, end]| position >= first && position < end);
            if !inside {
                return invalid(format!(
                    "'{column}' following text for box {position} outside its box range"
                ));
            }
            if template.text_rule(rule).is_none() {
                return invalid(format!("'{column}' names unknown text rule '{rule}'"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "name": "minimal",
        "version": "1.0",
        "labels": { "1": "No", "2": "Yes" },
        "expected_boxes": 2,
        "text_rules": [ { "key": "name", "start": "Name:", "end": "\n" } ],
        "fields": [
            { "column": "NAME", "kind": "text", "section": { "start": "name", "end": "team" }, "text_rule": "name" },
            { "column": "SURGERY", "section": { "start": "surgery", "paragraphs": 2 }, "boxes": [1, 3], "choice": "one" }
        ]
    }"#;

    fn with(patch: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut v: serde_json::Value = serde_json::from_str(MINIMAL).unwrap();
        patch(&mut v);
        v.to_string()
    }

    #[test]
    fn test_parse_valid_template() {
        let t = parse_template_str(MINIMAL).unwrap();
        assert_eq!(t.schema, SchemaVersion::Legacy);
        assert_eq!(t.label(2), Some("Yes"));
        assert_eq!(t.fields[1].choice, crate::labels::Choice::One);
        assert_eq!(t.detector.dpi, 300);
    }

    #[test]
    fn test_label_gap_rejected() {
        let json = with(|v| {
            v["labels"] = serde_json::json!({ "1": "No", "3": "Yes" });
            v["expected_boxes"] = serde_json::Value::Null;
        });
        assert!(matches!(parse_template_str(&json), Err(InjexError::TemplateInvalid(_))));
    }

    #[test]
    fn test_expected_boxes_must_match_labels() {
        let json = with(|v| v["expected_boxes"] = serde_json::json!(96));
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_unknown_column_rejected() {
        let json = with(|v| v["fields"][0]["column"] = serde_json::json!("TYPE"));
        let err = parse_template_str(&json).unwrap_err().to_string();
        assert!(err.contains("legacy schema"), "{err}");
    }

    #[test]
    fn test_box_range_checks() {
        let json = with(|v| v["fields"][1]["boxes"] = serde_json::json!([1, 4]));
        assert!(parse_template_str(&json).is_err());
        let json = with(|v| v["fields"][1]["boxes"] = serde_json::json!([2, 2]));
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let json = with(|v| {
            let extra = serde_json::json!({ "column": "CONTACT", "boxes": [2, 3] });
            v["fields"].as_array_mut().unwrap().push(extra);
        });
        let err = parse_template_str(&json).unwrap_err().to_string();
        assert!(err.contains("overlap"), "{err}");
    }

    #[test]
    fn test_section_with_end_and_paragraphs_rejected() {
        let json = with(|v| v["fields"][1]["section"]["end"] = serde_json::json!("menstrual"));
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_following_must_name_rule_inside_range() {
        let json = with(|v| v["fields"][1]["following"] = serde_json::json!({ "2": "missing" }));
        assert!(parse_template_str(&json).is_err());
        let json = with(|v| v["fields"][1]["following"] = serde_json::json!({ "5": "name" }));
        assert!(parse_template_str(&json).is_err());
        let json = with(|v| v["fields"][1]["following"] = serde_json::json!({ "2": "name" }));
        assert!(parse_template_str(&json).is_ok());
    }

    #[test]
    fn test_swap_out_of_range_rejected() {
        let json = with(|v| v["swaps"] = serde_json::json!([[1, 7]]));
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_load_template_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        match load_template(&path) {
            Err(InjexError::TemplateLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_select_template() {
        let t = select_template(SchemaVersion::Legacy, FormType::Head).unwrap();
        assert_eq!(t.name, "legacy");
        let t = select_template(SchemaVersion::Extended, FormType::Unknown).unwrap();
        assert_eq!(t.name, "common");
        let t = select_template(SchemaVersion::Extended, FormType::Knee).unwrap();
        assert_eq!(t.form_type, Some(FormType::Knee));
    }
}
