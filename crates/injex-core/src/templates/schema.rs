use crate::checkbox::DetectorConfig;
use crate::labels::Choice;
use crate::model::{FormType, SchemaVersion};
use crate::parsing::split::TextRule;
use crate::section::SectionEnd;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything needed to read one form template, from either input kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub schema: SchemaVersion,
    /// Written to `FORM_TYPE` on the extended schema.
    #[serde(default)]
    pub form_type: Option<FormType>,
    /// Checkbox labels by reading-order position, 1-based and contiguous.
    #[serde(default)]
    pub labels: BTreeMap<usize, String>,
    /// Total boxes a correctly scanned document must yield.
    #[serde(default)]
    pub expected_boxes: Option<usize>,
    /// `[position, takes_from]` corrections to the detected order.
    #[serde(default)]
    pub swaps: Vec<[usize; 2]>,
    #[serde(default)]
    pub text_rules: Vec<TextRule>,
    #[serde(default)]
    pub detector: DetectorConfig,
    pub fields: Vec<FieldSpec>,
}

impl TemplateDef {
    pub fn label(&self, position: usize) -> Option<&str> {
        self.labels.get(&position).map(String::as_str)
    }

    pub fn text_rule(&self, key: &str) -> Option<&TextRule> {
        self.text_rules.iter().find(|r| r.key == key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSpecKind {
    #[default]
    Checkboxes,
    Text,
    Date,
}

/// One output column and where to find its answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub column: String,
    #[serde(default)]
    pub kind: FieldSpecKind,
    /// Word locator.
    #[serde(default)]
    pub section: Option<SectionSpec>,
    /// PDF locator for checkboxes: positions `[first, end)`.
    #[serde(default)]
    pub boxes: Option<[usize; 2]>,
    /// PDF locator for text and dates.
    #[serde(default)]
    pub text_rule: Option<String>,
    #[serde(default)]
    pub choice: Choice,
    #[serde(default)]
    pub detail_column: Option<String>,
    /// Box position → text rule supplying that box's typed text on PDFs.
    #[serde(default)]
    pub following: BTreeMap<usize, String>,
    #[serde(default)]
    pub rewrite: Vec<Rewrite>,
    #[serde(default)]
    pub specify_other: bool,
    /// Keep only the first non-empty text input in the section.
    #[serde(default)]
    pub first_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub paragraphs: Option<usize>,
}

impl SectionSpec {
    pub fn end(&self) -> SectionEnd {
        match (&self.end, self.paragraphs) {
            (Some(marker), _) => SectionEnd::Marker(marker.clone()),
            (None, Some(n)) => SectionEnd::Paragraphs(n),
            (None, None) => SectionEnd::Open,
        }
    }
}

/// Replace an exact combined answer, optionally setting the detail column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub from: String,
    pub value: String,
    #[serde(default)]
    pub detail: Option<String>,
}
