use crate::model::{FieldValue, SchemaVersion};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

pub const LEGACY_COLUMNS: &[&str] = &[
    "NAME",
    "TEAM",
    "CODE",
    "INJURY_DATE",
    "RETURN_DATE",
    "INJURY_LOCATION",
    "INJURY_SIDE",
    "INJURY_TYPE",
    "OCCURRENCE",
    "OVERUSE_TRAUMA",
    "ONSET",
    "CONTACT",
    "ACTION",
    "ACTION_DESCRIPTION",
    "RE_INJURY",
    "REFEREE_SANCTION",
    "DIAGNOSTIC_EXAMINATION",
    "DIAGNOSIS",
    "SURGERY",
    "MENSTRUAL_PHASE",
    "ORAL_CONTRACEPTIVES",
    "HORMONAL_CONTRACEPTIVES",
    "OTHER_COMMENTS",
];

/// Columns the extended schema adds after the legacy set.
pub const EXTENDED_EXTRA_COLUMNS: &[&str] = &[
    "TYPE",
    "INJURY_SITE",
    "INJURY_CLASSIFICATION",
    "ACL_GRADING",
    "MCL_GRADING",
    "AFFECTED_ORGAN",
    "OCCURRENCE_ONSET_TYPE",
    "OCCURRENCE_MATCH_MINUTE",
    "OCCURRENCE_CONTEXT",
    "HEADER_DUEL",
    "CONTACT_POINT",
    "PLAYER_SUBSTITUTION",
    "PLAYER_SUBSTITUTION_TIME",
    "REVIEW_SYSTEM",
    "CONCUSSION_DOMAINS",
    "RECURRENCE",
    "PREVIOUS_RETURN_DATE",
    "PREVIOUS_CONTRALATERAL_INJURY",
    "PREVIOUS_CONTRALATERAL_INJURY_RETURN_DATE",
    "DIAGNOSTIC_EXAMINATION_DATE",
    "BRACING",
    "ACL_REPAIR",
    "ACL_REPAIR_SPECIFICATION",
    "MCL_REPAIR",
    "MCL_REPAIR_SPECIFICATION",
];

pub const FORM_TYPE_COLUMN: &str = "FORM_TYPE";

/// Provenance columns prepended by the batch driver.
pub const PROVENANCE_COLUMNS: &[&str] = &["FILENAME", "SEX"];

impl SchemaVersion {
    /// Ordered column names for this schema.
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            SchemaVersion::Legacy => LEGACY_COLUMNS.to_vec(),
            SchemaVersion::Extended => std::iter::once(FORM_TYPE_COLUMN)
                .chain(LEGACY_COLUMNS.iter().copied())
                .chain(EXTENDED_EXTRA_COLUMNS.iter().copied())
                .collect(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        match self {
            SchemaVersion::Legacy => LEGACY_COLUMNS.contains(&column),
            SchemaVersion::Extended => {
                column == FORM_TYPE_COLUMN
                    || LEGACY_COLUMNS.contains(&column)
                    || EXTENDED_EXTRA_COLUMNS.contains(&column)
            }
        }
    }
}

/// One flat output row. Unset columns render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjuryRecord {
    schema: SchemaVersion,
    values: BTreeMap<String, FieldValue>,
}

impl InjuryRecord {
    pub fn new(schema: SchemaVersion) -> Self {
        InjuryRecord {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn get(&self, column: &str) -> &FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.values.get(column).unwrap_or(&EMPTY)
    }

    /// Convenience accessor for tests and table output.
    pub fn rendered(&self, column: &str) -> String {
        self.get(column).to_string()
    }

    pub fn set(&mut self, column: &str, value: FieldValue) {
        self.values.insert(column.to_string(), value);
    }

    /// Merge another answer into a column already holding one.
    ///
    /// Plain text answers are joined with `", "`; an empty incoming value
    /// leaves the cell untouched and a tagged value replaces an empty cell.
    pub fn merge(&mut self, column: &str, value: FieldValue) {
        if value.is_empty() {
            return;
        }
        let merged = match (self.values.remove(column), value) {
            (None | Some(FieldValue::Empty), incoming) => incoming,
            (Some(FieldValue::Text(existing)), FieldValue::Text(incoming)) => {
                FieldValue::Text(format!("{existing}, {incoming}"))
            }
            (Some(existing), _) => existing,
        };
        self.values.insert(column.to_string(), merged);
    }

    /// Column/value pairs in schema order, rendered for export.
    pub fn to_row(&self) -> Vec<(&'static str, String)> {
        self.schema
            .columns()
            .into_iter()
            .map(|c| (c, self.rendered(c)))
            .collect()
    }
}

impl Serialize for InjuryRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.schema.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(column, self.get(column))?;
        }
        map.end()
    }
}
