//! Answering a template's field list from either input kind.
//!
//! Both paths reduce a document to [`FormField`]s plus a way to bound each
//! question; checkbox answers then go through the same section query and
//! label rules, so a template reads a Word form and its scanned PDF alike.

use crate::checkbox::CheckboxMap;
use crate::labels::NOT_AVAILABLE;
use crate::model::{ExtractionWarning, FieldKind, FieldValue, FormField, FormType};
use crate::parsing::dates::{normalize_date, normalize_date_string};
use crate::parsing::split::apply_text_rules;
use crate::record::{InjuryRecord, FORM_TYPE_COLUMN};
use crate::section::{find_section_bounds, LabelOptions, SectionBounds, SectionQuery};
use crate::templates::schema::{FieldSpec, FieldSpecKind, TemplateDef};
use crate::word::FormModel;
use std::collections::BTreeMap;

/// A document reduced to positioned form fields.
pub trait FormSource {
    fn fields(&self) -> &[FormField];

    /// Span of a checkbox question, `None` when it cannot be located.
    fn checkbox_bounds(&self, spec: &FieldSpec) -> Option<SectionBounds>;

    /// Raw typed answer of a text or date question.
    fn text(&self, spec: &FieldSpec) -> String;

    /// Start marker of a question this document should have but lacks.
    fn missing_marker<'s>(&self, _spec: &'s FieldSpec) -> Option<&'s str> {
        None
    }
}

/// Word forms: questions are located by scanning paragraph texts.
pub struct WordSource<'a> {
    model: &'a FormModel,
}

impl<'a> WordSource<'a> {
    pub fn new(model: &'a FormModel) -> Self {
        WordSource { model }
    }

    fn bounds(&self, spec: &FieldSpec) -> Option<SectionBounds> {
        let section = spec.section.as_ref()?;
        find_section_bounds(&self.model.paragraph_texts, &section.start, &section.end())
    }
}

impl FormSource for WordSource<'_> {
    fn fields(&self) -> &[FormField] {
        &self.model.fields
    }

    fn checkbox_bounds(&self, spec: &FieldSpec) -> Option<SectionBounds> {
        self.bounds(spec)
    }

    fn text(&self, spec: &FieldSpec) -> String {
        SectionQuery::new(&self.model.fields).extract_display_text(self.bounds(spec), spec.first_only)
    }

    /// Only questions the template also places on the PDF layout are
    /// expected on this form; the rest are shared extras.
    fn missing_marker<'s>(&self, spec: &'s FieldSpec) -> Option<&'s str> {
        let section = spec.section.as_ref()?;
        let expected = spec.boxes.is_some() || spec.text_rule.is_some();
        (expected && self.bounds(spec).is_none()).then_some(section.start.as_str())
    }
}

/// Scanned PDFs: checkbox N takes label N, questions are box ranges and
/// typed text comes from the split rules.
pub struct PdfSource {
    fields: Vec<FormField>,
    captures: BTreeMap<String, String>,
}

impl PdfSource {
    pub fn new(template: &TemplateDef, map: &CheckboxMap, text: &str) -> Self {
        let captures = apply_text_rules(text, &template.text_rules);

        let fields = map
            .iter()
            .filter_map(|(position, checked)| {
                let Some(label) = template.label(position) else {
                    tracing::warn!(position, "no label for detected checkbox");
                    return None;
                };
                let following_text = template
                    .fields
                    .iter()
                    .find_map(|spec| spec.following.get(&position))
                    .and_then(|key| captures.get(key))
                    .cloned();
                Some(FormField {
                    name: None,
                    kind: FieldKind::Checkbox { checked },
                    label: label.to_string(),
                    following_text,
                    position,
                })
            })
            .collect();

        PdfSource { fields, captures }
    }
}

impl FormSource for PdfSource {
    fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// `[first, end)` becomes the section strictly after `first - 1`.
    fn checkbox_bounds(&self, spec: &FieldSpec) -> Option<SectionBounds> {
        let [first, end] = spec.boxes?;
        Some(SectionBounds {
            start: first.saturating_sub(1),
            end: Some(end),
        })
    }

    fn text(&self, spec: &FieldSpec) -> String {
        spec.text_rule
            .as_ref()
            .and_then(|key| self.captures.get(key))
            .cloned()
            .unwrap_or_default()
    }
}

/// Answer every field of `template` from `source` into one record.
///
/// Specs sharing a column are merged in template order. `FORM_TYPE` is
/// written only when the template's schema has that column.
pub fn build_record(
    template: &TemplateDef,
    source: &dyn FormSource,
    form_type: FormType,
) -> (InjuryRecord, Vec<ExtractionWarning>) {
    let mut record = InjuryRecord::new(template.schema);
    let mut warnings = Vec::new();

    if template.schema.has_column(FORM_TYPE_COLUMN) {
        record.set(FORM_TYPE_COLUMN, FieldValue::text(form_type.as_str()));
    }

    for spec in &template.fields {
        if let Some(marker) = source.missing_marker(spec) {
            tracing::debug!(column = %spec.column, marker, "section not found");
            warnings.push(ExtractionWarning::SectionNotFound {
                column: spec.column.clone(),
                marker: marker.to_string(),
            });
        }

        match spec.kind {
            FieldSpecKind::Checkboxes => answer_checkboxes(&mut record, spec, source),
            FieldSpecKind::Text => record.merge(&spec.column, FieldValue::text(source.text(spec).trim())),
            FieldSpecKind::Date => record.merge(&spec.column, normalize_date(&source.text(spec))),
        }
    }

    (record, warnings)
}

fn answer_checkboxes(record: &mut InjuryRecord, spec: &FieldSpec, source: &dyn FormSource) {
    let options = LabelOptions {
        collect_details: spec.detail_column.is_some(),
        specify_other: spec.specify_other,
    };
    let answer = SectionQuery::new(source.fields()).extract_checkbox_labels(
        source.checkbox_bounds(spec),
        &spec.choice,
        options,
    );

    let mut value = answer.value;
    let mut details: Vec<String> = answer
        .details
        .iter()
        .map(|d| {
            if d.kind.is_date() && d.value != NOT_AVAILABLE {
                normalize_date_string(&d.value)
            } else {
                d.value.clone()
            }
        })
        .filter(|v| !v.is_empty())
        .collect();

    if let Some(rewrite) = spec
        .rewrite
        .iter()
        .find(|r| value.as_text() == Some(r.from.as_str()))
    {
        value = FieldValue::text(rewrite.value.as_str());
        details.extend(rewrite.detail.clone());
    }

    record.merge(&spec.column, value);
    if let Some(detail_column) = &spec.detail_column {
        record.merge(detail_column, FieldValue::text(details.join(", ")));
    }
}
