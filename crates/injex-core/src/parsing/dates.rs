use crate::error::InjexError;
use crate::model::FieldValue;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Accepted layouts, tried in order after the ISO form. Day-first wins over
/// US ordering for ambiguous inputs like `05/06/2021`.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d %m %Y", "%d %b %Y", "%d %B %Y", "%Y/%m/%d",
    "%Y.%m.%d", "%m/%d/%Y", "%m-%d-%Y",
];

static LOOSE_DMY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[./\-](\d{1,2})[./\-](\d{2,4})$").expect("valid date regex")
});

/// Parse a hand-typed form date. Blank input is "no date", not an error.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, InjexError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            // chrono accepts short years for %Y; those belong to the fallback below.
            if date.year() >= 1000 {
                return Ok(Some(date));
            }
        }
    }

    if let Some(caps) = LOOSE_DMY.captures(s) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let year_str = &caps[3];
        let year: i32 = if year_str.len() == 2 {
            format!("20{year_str}").parse().unwrap_or(0)
        } else {
            year_str.parse().unwrap_or(0)
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(Some(date));
        }
    }

    Err(InjexError::DateFormat(s.to_string()))
}

/// Normalize to `YYYY-MM-DD` as a tagged cell value.
pub fn normalize_date(raw: &str) -> FieldValue {
    match parse_date(raw) {
        Ok(Some(date)) => FieldValue::Text(date.format("%Y-%m-%d").to_string()),
        Ok(None) => FieldValue::Empty,
        Err(e) => {
            tracing::warn!("{e}");
            FieldValue::WrongDateFormat
        }
    }
}

/// Same as [`normalize_date`] but rendered, for values embedded in lists.
pub fn normalize_date_string(raw: &str) -> String {
    normalize_date(raw).to_string()
}
