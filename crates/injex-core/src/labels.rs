//! Turning a checked box's label (plus any text typed next to it) into
//! the token written to the record.

use crate::model::{FieldValue, TOO_MANY_ANSWERS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid space-run pattern"));

const EXAMINATION_PREFIXES: &[&str] = &["Ultrasono", "Anthro", "X-ray", "MRI", "Arthroscopy"];
const GRAFT_PREFIXES: &[&str] = &["LET", "Allograft", "Synthetic"];
const PLAIN_OTHER_OPTIONS: &[&str] = &["Other training", "Other cup match", "Other player action"];
const KNEE_CARD_LABEL: &str = "Knee (please use separate card for ACL/MCL injuries)";
/// Placeholder recorded when a box that expects typed text has none.
pub const NOT_AVAILABLE: &str = "N/A";

/// Side value surfaced by a checked box instead of being inlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    MatchMinute,
    ExaminationDate,
    Specification,
    ReturnDate,
    SubstitutionTime,
}

impl DetailKind {
    /// Whether values of this kind are dates to be normalized on write.
    pub fn is_date(&self) -> bool {
        matches!(self, DetailKind::ExaminationDate | DetailKind::ReturnDate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    pub kind: DetailKind,
    /// As typed; dates are normalized only when written to a column.
    pub value: String,
}

impl Detail {
    fn new(kind: DetailKind, value: impl Into<String>) -> Self {
        Detail {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub token: String,
    pub detail: Option<Detail>,
}

impl Resolved {
    fn plain(token: impl Into<String>) -> Self {
        Resolved {
            token: token.into(),
            detail: None,
        }
    }

    fn with(token: impl Into<String>, detail: Option<Detail>) -> Self {
        Resolved {
            token: token.into(),
            detail,
        }
    }

    /// Token with the detail folded in, for fields without a detail column.
    pub fn inline(self) -> String {
        let Some(detail) = self.detail else {
            return self.token;
        };
        match detail.kind {
            DetailKind::MatchMinute if detail.value != NOT_AVAILABLE => {
                format!("{} (min. of injury: {})", self.token, detail.value)
            }
            DetailKind::ReturnDate | DetailKind::SubstitutionTime
                if detail.value != NOT_AVAILABLE =>
            {
                format!("{}, {}", self.token, detail.value)
            }
            _ => self.token,
        }
    }
}

/// Apply the label rules to one checked box. First matching rule wins.
///
/// `specify_other` marks questions whose "Other (specify)" box carries a
/// specification for a side column rather than the answer itself.
pub fn resolve_label(label: &str, following: Option<&str>, specify_other: bool) -> Resolved {
    let label = label.trim();
    let following = following.map(str::trim).filter(|t| !t.is_empty());

    let resolved = if label.starts_with("Match") {
        Resolved::with(
            "Match",
            Some(Detail::new(
                DetailKind::MatchMinute,
                following.unwrap_or(NOT_AVAILABLE),
            )),
        )
    } else if starts_with_any(label, EXAMINATION_PREFIXES) {
        Resolved::with(
            label.replace(" (date):", "").replace("(date):", ""),
            following.map(|t| Detail::new(DetailKind::ExaminationDate, t)),
        )
    } else if starts_with_any(label, GRAFT_PREFIXES) {
        Resolved::with(
            label.replace(" (specify):", ""),
            following.map(|t| Detail::new(DetailKind::Specification, t)),
        )
    } else if label == KNEE_CARD_LABEL {
        Resolved::plain("Knee")
    } else if label.starts_with("Mild Traumatic") {
        match following {
            Some(t) => Resolved::plain(format!("{label} {t}")),
            None => Resolved::plain(label),
        }
    } else if label.starts_with("Yes (If know") || label.starts_with("Yes (give date") {
        Resolved::with(
            "Yes",
            Some(Detail::new(
                DetailKind::ReturnDate,
                following.unwrap_or(NOT_AVAILABLE),
            )),
        )
    } else if label.starts_with("Yes, after") {
        Resolved::with(
            "Yes",
            following.map(|t| Detail::new(DetailKind::SubstitutionTime, t)),
        )
    } else if let (true, Some(t)) = (label.starts_with("Yes"), following) {
        Resolved::plain(format!("Yes, {t}"))
    } else if label.starts_with("Yes (specify)") || label.starts_with("Yes (give") {
        Resolved::plain("Yes")
    } else if specify_other && label.starts_with("Other (specify)") {
        Resolved::with(
            "Other",
            following.map(|t| Detail::new(DetailKind::Specification, t)),
        )
    } else if label.starts_with("Other") && !starts_with_any(label, PLAIN_OTHER_OPTIONS) {
        match following {
            Some(t) => Resolved::plain(t),
            None if label.starts_with("Other injury") => Resolved::plain("Other injury"),
            None => Resolved::plain("Other"),
        }
    } else {
        Resolved::plain(following.unwrap_or(label))
    };

    Resolved {
        token: collapse_spaces(resolved.token.trim()),
        detail: resolved.detail,
    }
}

fn starts_with_any(label: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| label.starts_with(p))
}

pub fn collapse_spaces(s: &str) -> String {
    MULTI_SPACE.replace_all(s, " ").into_owned()
}

/// How the answers of one question combine into a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    /// Every checked answer, joined with ", ".
    #[default]
    Many,
    /// At most one answer; more is flagged.
    One,
    /// Like `One`, except exactly two answers render the given text.
    OneOrBoth(String),
}

impl Choice {
    pub fn combine(&self, answers: &[String]) -> FieldValue {
        match (self, answers.len()) {
            (Choice::Many, _) => FieldValue::text(answers.join(", ")),
            (_, 0) => FieldValue::Empty,
            (_, 1) => FieldValue::text(answers[0].clone()),
            (Choice::OneOrBoth(both), 2) => FieldValue::text(both.clone()),
            _ => FieldValue::TooManyAnswers,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Choice::Many => "many".into(),
            Choice::One => format!("one (else \"{TOO_MANY_ANSWERS}\")"),
            Choice::OneOrBoth(both) => format!("one, or \"{both}\" for two"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(label: &str, following: Option<&str>) -> String {
        resolve_label(label, following, false).token
    }

    #[test]
    fn test_match_minute() {
        let r = resolve_label("Match (min. of injury):", Some("23"), false);
        assert_eq!(r.token, "Match");
        assert_eq!(r.detail, Some(Detail::new(DetailKind::MatchMinute, "23")));
        assert_eq!(r.inline(), "Match (min. of injury: 23)");

        let r = resolve_label("Match", None, false);
        assert_eq!(r.detail.as_ref().map(|d| d.value.as_str()), Some("N/A"));
        assert_eq!(r.inline(), "Match");
    }

    #[test]
    fn test_examination_date_stripped() {
        let r = resolve_label("MRI (date):", Some("3.4.2023"), true);
        assert_eq!(r.token, "MRI");
        assert_eq!(r.detail, Some(Detail::new(DetailKind::ExaminationDate, "3.4.2023")));
        let r = resolve_label("Ultrasonography(date):", None, true);
        assert_eq!(r.token, "Ultrasonography");
        assert_eq!(r.detail, None);
    }

    #[test]
    fn test_graft_specification() {
        let r = resolve_label("Allograft (specify):", Some("Achilles"), true);
        assert_eq!(r.token, "Allograft");
        assert_eq!(r.detail, Some(Detail::new(DetailKind::Specification, "Achilles")));
    }

    #[test]
    fn test_knee_card_and_tbi() {
        assert_eq!(token(KNEE_CARD_LABEL, None), "Knee");
        assert_eq!(
            token("Mild Traumatic Brain Injury (TBI) with abnormality on MRI:", Some("bleed")),
            "Mild Traumatic Brain Injury (TBI) with abnormality on MRI: bleed"
        );
    }

    #[test]
    fn test_return_date_variants() {
        let r = resolve_label("Yes (give date of return from previous injury):", Some("12-05-2021"), true);
        assert_eq!(r.token, "Yes");
        assert_eq!(r.detail, Some(Detail::new(DetailKind::ReturnDate, "12-05-2021")));

        let r = resolve_label("Yes (If known, date of return from previous injury)", None, true);
        assert_eq!(r.detail, Some(Detail::new(DetailKind::ReturnDate, "N/A")));
        assert_eq!(r.inline(), "Yes");
    }

    #[test]
    fn test_return_date_inline() {
        let r = resolve_label("Yes (give date of return from previous injury)", Some("12-05-2021"), false);
        assert_eq!(r.inline(), "Yes, 12-05-2021");
    }

    #[test]
    fn test_substitution_time() {
        let r = resolve_label("Yes, after", Some("35"), true);
        assert_eq!(r.token, "Yes");
        assert_eq!(r.detail, Some(Detail::new(DetailKind::SubstitutionTime, "35")));
        assert_eq!(resolve_label("Yes, after", None, true).detail, None);
    }

    #[test]
    fn test_generic_yes() {
        assert_eq!(token("Yes (specify):", Some("pill")), "Yes, pill");
        assert_eq!(token("Yes (specify)", None), "Yes");
        assert_eq!(token("Yes (give details)", None), "Yes");
        assert_eq!(token("Yes", None), "Yes");
    }

    #[test]
    fn test_other_variants() {
        assert_eq!(token("Other injury (please specify):", Some("cramp")), "cramp");
        assert_eq!(token("Other injury (please specify):", None), "Other injury");
        assert_eq!(token("Other:", None), "Other");
        assert_eq!(token("Other training", None), "Other training");
        assert_eq!(token("Other player action", None), "Other player action");

        let r = resolve_label("Other (specify):", Some("CT scan"), true);
        assert_eq!(r.token, "Other");
        assert_eq!(r.detail, Some(Detail::new(DetailKind::Specification, "CT scan")));
        assert_eq!(token("Other (specify):", Some("CT scan")), "CT scan");
    }

    #[test]
    fn test_default_prefers_following_text() {
        assert_eq!(token("Knee", None), "Knee");
        assert_eq!(token("Occipital  Other:", Some("temple")), "temple");
        assert_eq!(token("Lower leg  (incl. Achilles tendon)", None), "Lower leg (incl. Achilles tendon)");
    }

    #[test]
    fn test_choice_one() {
        let one = Choice::One;
        assert_eq!(one.combine(&[]), FieldValue::Empty);
        assert_eq!(one.combine(&["No".into()]), FieldValue::text("No"));
        assert_eq!(one.combine(&["No".into(), "Yes".into()]), FieldValue::TooManyAnswers);
    }

    #[test]
    fn test_choice_one_or_both() {
        let both = Choice::OneOrBoth("Both, Overuse and Trauma".into());
        let two = ["Overuse (repetitive mechanism)".into(), "Trauma (acute mechanism)".into()];
        assert_eq!(both.combine(&two), FieldValue::text("Both, Overuse and Trauma"));
        assert_eq!(both.combine(&two[..1]), FieldValue::text("Overuse (repetitive mechanism)"));
        let three = ["a".into(), "b".into(), "c".into()];
        assert_eq!(both.combine(&three), FieldValue::TooManyAnswers);
    }

    #[test]
    fn test_choice_many_and_serde() {
        assert_eq!(Choice::Many.combine(&["Head".into(), "Neck".into()]), FieldValue::text("Head, Neck"));
        assert_eq!(Choice::Many.combine(&[]), FieldValue::Empty);
        let c: Choice = serde_json::from_str(r#"{"one_or_both": "Both, Gradual and Sudden"}"#).unwrap();
        assert_eq!(c, Choice::OneOrBoth("Both, Gradual and Sudden".into()));
        let c: Choice = serde_json::from_str(r#""one""#).unwrap();
        assert_eq!(c, Choice::One);
    }
}
