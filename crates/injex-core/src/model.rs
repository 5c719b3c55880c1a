use serde::{Deserialize, Serialize};
use std::fmt;

/// Which UEFA form template a document was filled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormType {
    Head,
    Injury,
    Illness,
    Knee,
    LowerExtremities,
    Unknown,
}

/// Distinguishing phrases, checked in priority order. First match wins.
const FORM_TYPE_PHRASES: &[(&str, FormType)] = &[
    ("Location of impact on head and/or body", FormType::Head),
    ("Type of illness", FormType::Illness),
    ("Injury location", FormType::Injury),
    (
        "Location of injury (Check all that may apply)",
        FormType::LowerExtremities,
    ),
    ("Combination of injuries", FormType::Knee),
];

impl FormType {
    pub fn detect(text: &str) -> FormType {
        FORM_TYPE_PHRASES
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, form_type)| *form_type)
            .unwrap_or(FormType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Head => "HEAD",
            FormType::Injury => "INJURY",
            FormType::Illness => "ILLNESS",
            FormType::Knee => "KNEE",
            FormType::LowerExtremities => "LOWER_EXTREMITIES",
            FormType::Unknown => "UNKNOWN",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<FormType> {
        let upper = s.trim().to_uppercase().replace([' ', '-'], "_");
        match upper.as_str() {
            "HEAD" => Some(FormType::Head),
            "INJURY" => Some(FormType::Injury),
            "ILLNESS" => Some(FormType::Illness),
            "KNEE" => Some(FormType::Knee),
            "LOWER_EXTREMITIES" | "LOWER" => Some(FormType::LowerExtremities),
            "UNKNOWN" => Some(FormType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output column set. The extended schema is a superset of the legacy one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    #[default]
    Legacy,
    Extended,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Legacy => write!(f, "legacy"),
            SchemaVersion::Extended => write!(f, "extended"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Cached display value of a text input (the part after `separate`).
    TextInput { value: String },
    Checkbox { checked: bool },
}

/// One form control, anchored to a paragraph index (Word) or a
/// reading-order number (PDF). Identity is the position, not the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub label: String,
    pub following_text: Option<String>,
    pub position: usize,
}

impl FormField {
    pub fn is_checked(&self) -> bool {
        matches!(self.kind, FieldKind::Checkbox { checked: true })
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self.kind, FieldKind::Checkbox { .. })
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::TextInput { value } => Some(value),
            FieldKind::Checkbox { .. } => None,
        }
    }
}

/// A single output cell.
///
/// Ambiguous and unparseable outcomes stay tagged until export, where
/// `Display` renders the sentinel strings downstream sheets expect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    TooManyAnswers,
    WrongDateFormat,
}

pub const TOO_MANY_ANSWERS: &str = "Too many answers";
pub const WRONG_DATE_FORMAT: &str = "Wrong date format";

impl FieldValue {
    pub fn text(s: impl Into<String>) -> FieldValue {
        let s = s.into();
        if s.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::TooManyAnswers => f.write_str(TOO_MANY_ANSWERS),
            FieldValue::WrongDateFormat => f.write_str(WRONG_DATE_FORMAT),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Something went wrong enough to affect the record, but not enough to
/// fail the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// Detected checkbox total differs from the template's; checkbox
    /// columns were left empty.
    CheckboxCount { expected: usize, found: usize },
    /// A section start marker is missing from the document.
    SectionNotFound { column: String, marker: String },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::CheckboxCount { expected, found } => write!(
                f,
                "expected {expected} checkboxes, found {found}; checkbox columns left empty"
            ),
            ExtractionWarning::SectionNotFound { column, marker } => {
                write!(f, "{column}: section marker '{marker}' not found")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_priority_order() {
        // Head forms also mention an injury location; the head phrase wins.
        let text = "Location of impact on head and/or body\nInjury location";
        assert_eq!(FormType::detect(text), FormType::Head);
        assert_eq!(FormType::detect("Type of illness"), FormType::Illness);
        assert_eq!(FormType::detect("Injury location"), FormType::Injury);
        assert_eq!(
            FormType::detect("Location of injury (Check all that may apply)"),
            FormType::LowerExtremities
        );
        assert_eq!(FormType::detect("Combination of injuries"), FormType::Knee);
        assert_eq!(FormType::detect("something else"), FormType::Unknown);
    }

    #[test]
    fn test_detect_is_case_sensitive() {
        assert_eq!(FormType::detect("injury location"), FormType::Unknown);
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(
            FormType::from_str_loose("lower extremities"),
            Some(FormType::LowerExtremities)
        );
        assert_eq!(FormType::from_str_loose("knee"), Some(FormType::Knee));
        assert_eq!(FormType::from_str_loose("elbow"), None);
    }

    #[test]
    fn test_field_value_rendering() {
        assert_eq!(FieldValue::Empty.to_string(), "");
        assert_eq!(FieldValue::text("Knee").to_string(), "Knee");
        assert_eq!(FieldValue::text(""), FieldValue::Empty);
        assert_eq!(FieldValue::TooManyAnswers.to_string(), "Too many answers");
        assert_eq!(FieldValue::WrongDateFormat.to_string(), "Wrong date format");
    }

    #[test]
    fn test_field_value_serializes_as_string() {
        let json = serde_json::to_string(&FieldValue::TooManyAnswers).unwrap();
        assert_eq!(json, "\"Too many answers\"");
    }
}
