//! Section-scoped queries over a form's fields.
//!
//! A section is a span of positions: paragraph indices on the Word path,
//! reading-order numbers on the PDF path. Checkboxes count when they sit
//! strictly inside the span. Text inputs also count on the header
//! position itself, since answers are often typed on the label's line.

use crate::labels::{resolve_label, Choice, Detail};
use crate::model::{FieldValue, FormField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEnd {
    /// First later paragraph containing this text.
    Marker(String),
    /// A fixed number of paragraphs after the start.
    Paragraphs(usize),
    /// To the end of the document.
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    pub start: usize,
    /// Exclusive. `None` runs to the end of the document.
    pub end: Option<usize>,
}

impl SectionBounds {
    fn before_end(&self, position: usize) -> bool {
        self.end.map_or(true, |end| position < end)
    }

    pub fn contains_checkbox(&self, position: usize) -> bool {
        position > self.start && self.before_end(position)
    }

    pub fn contains_text(&self, position: usize) -> bool {
        position >= self.start && self.before_end(position)
    }
}

/// Locate a section by case-insensitive substring search.
///
/// `None` when the start marker is nowhere in the document. An end marker
/// that never appears after the start leaves the section open-ended.
pub fn find_section_bounds(
    paragraph_texts: &[String],
    start_marker: &str,
    end: &SectionEnd,
) -> Option<SectionBounds> {
    let start_lower = start_marker.to_lowercase();
    let start = paragraph_texts
        .iter()
        .position(|t| t.to_lowercase().contains(&start_lower))?;

    let end = match end {
        SectionEnd::Marker(marker) => {
            let marker = marker.to_lowercase();
            paragraph_texts
                .iter()
                .enumerate()
                .skip(start + 1)
                .find(|(_, t)| t.to_lowercase().contains(&marker))
                .map(|(i, _)| i)
        }
        SectionEnd::Paragraphs(n) => Some(start + n + 1),
        SectionEnd::Open => None,
    };

    tracing::debug!(start_marker, start, ?end, "section bounds");
    Some(SectionBounds { start, end })
}

/// How a question's checked labels are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelOptions {
    /// Return side values separately instead of folding them into tokens.
    pub collect_details: bool,
    pub specify_other: bool,
}

/// Answer of one checkbox question before it is written to the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionAnswer {
    pub value: FieldValue,
    pub details: Vec<Detail>,
}

pub struct SectionQuery<'a> {
    fields: &'a [FormField],
}

impl<'a> SectionQuery<'a> {
    pub fn new(fields: &'a [FormField]) -> Self {
        SectionQuery { fields }
    }

    /// Checked boxes inside the section, in encounter order.
    pub fn checked(&self, bounds: SectionBounds) -> impl Iterator<Item = &'a FormField> + '_ {
        self.fields
            .iter()
            .filter(move |f| f.is_checked() && bounds.contains_checkbox(f.position))
    }

    /// Resolve every checked box in the section and combine the answers.
    ///
    /// With `collect_details`, side values (dates, minutes, free text)
    /// are returned separately; otherwise they are folded into the tokens.
    pub fn extract_checkbox_labels(
        &self,
        bounds: Option<SectionBounds>,
        choice: &Choice,
        options: LabelOptions,
    ) -> SectionAnswer {
        let Some(bounds) = bounds else {
            return SectionAnswer::default();
        };

        let mut answers = Vec::new();
        let mut details = Vec::new();
        for field in self.checked(bounds) {
            let resolved = resolve_label(
                &field.label,
                field.following_text.as_deref(),
                options.specify_other,
            );
            let token = if options.collect_details {
                details.extend(resolved.detail);
                resolved.token
            } else {
                resolved.inline()
            };
            if !token.is_empty() {
                answers.push(token);
            }
        }

        SectionAnswer {
            value: choice.combine(&answers),
            details,
        }
    }

    /// Values of the text inputs in the section, joined with `"; "`.
    pub fn extract_display_text(&self, bounds: Option<SectionBounds>, first_only: bool) -> String {
        let Some(bounds) = bounds else {
            return String::new();
        };
        let values = self
            .fields
            .iter()
            .filter(|f| bounds.contains_text(f.position))
            .filter_map(FormField::text_value)
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if first_only {
            values.take(1).collect()
        } else {
            values.collect::<Vec<_>>().join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::DetailKind;
    use crate::model::FieldKind;

    fn texts(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn checkbox(position: usize, label: &str, checked: bool) -> FormField {
        FormField {
            name: None,
            kind: FieldKind::Checkbox { checked },
            label: label.into(),
            following_text: None,
            position,
        }
    }

    fn text_input(position: usize, value: &str) -> FormField {
        FormField {
            name: Some(format!("Text{position}")),
            kind: FieldKind::TextInput {
                value: value.into(),
            },
            label: String::new(),
            following_text: None,
            position,
        }
    }

    const PARAGRAPHS: &[&str] = &[
        "Name: Jane",
        "Injury side",
        "Right",
        "Left",
        "Injury type",
        "Concussion",
        "Surgery",
    ];

    #[test]
    fn test_bounds_with_end_marker() {
        let b = find_section_bounds(
            &texts(PARAGRAPHS),
            "INJURY SIDE",
            &SectionEnd::Marker("injury type".into()),
        );
        assert_eq!(b, Some(SectionBounds { start: 1, end: Some(4) }));
    }

    #[test]
    fn test_bounds_with_paragraph_count() {
        let b = find_section_bounds(&texts(PARAGRAPHS), "injury side", &SectionEnd::Paragraphs(2));
        assert_eq!(b, Some(SectionBounds { start: 1, end: Some(4) }));
    }

    #[test]
    fn test_end_marker_searched_after_start_only() {
        let paras = texts(&["Surgery", "Injury side", "Right"]);
        let b = find_section_bounds(&paras, "injury side", &SectionEnd::Marker("surgery".into()));
        assert_eq!(b, Some(SectionBounds { start: 1, end: None }));
    }

    #[test]
    fn test_missing_start_marker() {
        let b = find_section_bounds(&texts(PARAGRAPHS), "menstrual phase", &SectionEnd::Open);
        assert_eq!(b, None);
        let fields = [checkbox(2, "Right", true)];
        let q = SectionQuery::new(&fields);
        assert_eq!(q.extract_checkbox_labels(b, &Choice::One, LabelOptions::default()), SectionAnswer::default());
        assert_eq!(q.extract_display_text(b, false), "");
    }

    #[test]
    fn test_checkbox_bounds_are_exclusive() {
        let fields = [
            checkbox(1, "Header box", true),
            checkbox(2, "Right", true),
            checkbox(3, "Left", false),
            checkbox(4, "Concussion", true),
        ];
        let q = SectionQuery::new(&fields);
        let bounds = Some(SectionBounds { start: 1, end: Some(4) });
        let answer = q.extract_checkbox_labels(bounds, &Choice::Many, LabelOptions::default());
        assert_eq!(answer.value, FieldValue::text("Right"));
    }

    #[test]
    fn test_only_one_policy() {
        let fields = [checkbox(7, "No", true), checkbox(8, "Yes", true)];
        let q = SectionQuery::new(&fields);
        let bounds = Some(SectionBounds { start: 6, end: None });
        assert_eq!(
            q.extract_checkbox_labels(bounds, &Choice::One, LabelOptions::default()).value,
            FieldValue::TooManyAnswers
        );
        let none: [FormField; 0] = [];
        assert_eq!(
            SectionQuery::new(&none).extract_checkbox_labels(bounds, &Choice::One, LabelOptions::default()).value,
            FieldValue::Empty
        );
    }

    #[test]
    fn test_details_collected_separately() {
        let mut mri = checkbox(3, "MRI (date):", true);
        mri.following_text = Some("01.02.2023".into());
        let fields = [checkbox(2, "Clinical only", true), mri];
        let q = SectionQuery::new(&fields);
        let bounds = Some(SectionBounds { start: 1, end: None });
        let options = LabelOptions {
            collect_details: true,
            specify_other: false,
        };
        let answer = q.extract_checkbox_labels(bounds, &Choice::Many, options);
        assert_eq!(answer.value, FieldValue::text("Clinical only, MRI"));
        assert_eq!(answer.details.len(), 1);
        assert_eq!(answer.details[0].kind, DetailKind::ExaminationDate);
        assert_eq!(answer.details[0].value, "01.02.2023");
    }

    #[test]
    fn test_display_text_includes_header_paragraph() {
        let fields = [
            text_input(0, "Jane Doe"),
            text_input(1, "  "),
            text_input(1, "FC Example"),
            text_input(2, "outside"),
        ];
        let q = SectionQuery::new(&fields);
        let bounds = Some(SectionBounds { start: 0, end: Some(2) });
        assert_eq!(q.extract_display_text(bounds, false), "Jane Doe; FC Example");
        assert_eq!(q.extract_display_text(bounds, true), "Jane Doe");
    }
}
