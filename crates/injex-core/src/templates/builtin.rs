use crate::error::InjexError;
use crate::model::{FormType, SchemaVersion};
use crate::templates::parse_template_str;
use crate::templates::schema::TemplateDef;

const LEGACY_JSON: &str = include_str!("../../../../templates/legacy.json");
const HEAD_JSON: &str = include_str!("../../../../templates/head.json");
const INJURY_JSON: &str = include_str!("../../../../templates/injury.json");
const ILLNESS_JSON: &str = include_str!("../../../../templates/illness.json");
const KNEE_JSON: &str = include_str!("../../../../templates/knee.json");
const LOWER_EXTREMITIES_JSON: &str = include_str!("../../../../templates/lower_extremities.json");
const COMMON_JSON: &str = include_str!("../../../../templates/common.json");

/// Available built-in templates.
pub const PRESETS: &[&str] = &[
    "legacy",
    "head",
    "injury",
    "illness",
    "knee",
    "lower_extremities",
    "common",
];

/// Load a built-in template by name.
pub fn load_preset(name: &str) -> Result<TemplateDef, InjexError> {
    let json = match name {
        "legacy" => LEGACY_JSON,
        "head" => HEAD_JSON,
        "injury" => INJURY_JSON,
        "illness" => ILLNESS_JSON,
        "knee" => KNEE_JSON,
        "lower_extremities" => LOWER_EXTREMITIES_JSON,
        "common" => COMMON_JSON,
        _ => {
            return Err(InjexError::TemplateInvalid(format!(
                "unknown template '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    parse_template_str(json)
}

/// A preset by exact name, or by form type written loosely
/// (`"HEAD"`, `"lower extremities"`).
pub fn find_preset(name: &str) -> Result<TemplateDef, InjexError> {
    if PRESETS.contains(&name) {
        return load_preset(name);
    }
    match FormType::from_str_loose(name) {
        Some(form_type) => super::select_template(SchemaVersion::Extended, form_type),
        None => load_preset(name),
    }
}
