use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pulls one free-text answer out of a PDF's text layer by its
/// surrounding printed labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRule {
    pub key: String,
    pub start: String,
    /// `"\n"` means "rest of the line".
    pub end: String,
    /// Which occurrence of `start` anchors the capture (1 = first).
    #[serde(default = "default_occurrence")]
    pub occurrence: usize,
}

fn default_occurrence() -> usize {
    1
}

impl TextRule {
    pub fn new(key: &str, start: &str, end: &str) -> Self {
        TextRule {
            key: key.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            occurrence: 1,
        }
    }

    /// Apply to the full document text. Missing anchors yield `""`.
    pub fn capture(&self, text: &str) -> String {
        let Some(anchor) = nth_match(text, &self.start, self.occurrence.max(1)) else {
            return String::new();
        };
        let remainder = &text[anchor + self.start.len()..];

        let value = if self.end == "\n" {
            match remainder.find('\n') {
                Some(nl) => &remainder[..nl],
                None => remainder,
            }
        } else {
            match remainder.find(&self.end) {
                Some(end) => &remainder[..end],
                None => "",
            }
        };
        value.trim().to_string()
    }
}

fn nth_match(haystack: &str, needle: &str, n: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let mut from = 0;
    let mut found = None;
    for _ in 0..n {
        let idx = from + haystack[from..].find(needle)?;
        found = Some(idx);
        from = idx + needle.len();
    }
    found
}

/// Apply every rule; each key maps to its captured (possibly empty) value.
pub fn apply_text_rules(text: &str, rules: &[TextRule]) -> BTreeMap<String, String> {
    rules
        .iter()
        .map(|rule| (rule.key.clone(), rule.capture(text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "UEFA Injury card\nName: Jane Doe Team: FC Example\n\
Date of injury: 12.05.2021 Date of return to full participation: 02.06.2021 (Send card)\n\
Match 23 (min. of injury)\nOther comments: taped ankle\nOther (specify): CT scan\n";

    #[test]
    fn test_capture_until_end_token() {
        let rule = TextRule::new("name", "Name:", "Team:");
        assert_eq!(rule.capture(PAGE), "Jane Doe");
        let rule = TextRule::new("match", "Match", "(min. of injury)");
        assert_eq!(rule.capture(PAGE), "23");
    }

    #[test]
    fn test_capture_rest_of_line() {
        let rule = TextRule::new("other_comments", "Other comments:", "\n");
        assert_eq!(rule.capture(PAGE), "taped ankle");
    }

    #[test]
    fn test_rest_of_line_at_end_of_text() {
        let rule = TextRule::new("tail", "Tail:", "\n");
        assert_eq!(rule.capture("Head\nTail:  last words "), "last words");
    }

    #[test]
    fn test_missing_start_or_end_is_empty() {
        assert_eq!(TextRule::new("x", "Code no:", "\n").capture(PAGE), "");
        assert_eq!(TextRule::new("x", "Name:", "Nowhere").capture(PAGE), "");
    }

    #[test]
    fn test_second_occurrence() {
        let text = "Other: first\nOther: second\n";
        let mut rule = TextRule::new("other", "Other:", "\n");
        assert_eq!(rule.capture(text), "first");
        rule.occurrence = 2;
        assert_eq!(rule.capture(text), "second");
        rule.occurrence = 3;
        assert_eq!(rule.capture(text), "");
    }

    #[test]
    fn test_apply_text_rules_keeps_all_keys() {
        let rules = vec![
            TextRule::new("name", "Name:", "Team:"),
            TextRule::new("code", "Code no:", "\n"),
        ];
        let out = apply_text_rules(PAGE, &rules);
        assert_eq!(out["name"], "Jane Doe");
        assert_eq!(out["code"], "");
    }
}
