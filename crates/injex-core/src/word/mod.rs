pub mod document;
pub mod fields;

use crate::error::InjexError;
use crate::extraction::docx::read_document_xml;
use crate::model::{FieldKind, FormField};
use std::collections::BTreeMap;

/// Everything the section queries need from a Word form.
#[derive(Debug, Clone, Default)]
pub struct FormModel {
    pub paragraph_texts: Vec<String>,
    pub fields: Vec<FormField>,
}

impl FormModel {
    pub fn from_document_xml(xml: &str) -> Result<FormModel, InjexError> {
        let doc = document::parse_document(xml)?;
        let paragraph_texts = doc.paragraph_texts();
        let fields = fields::extract_form_fields(&doc, &paragraph_texts);
        tracing::debug!(
            paragraphs = paragraph_texts.len(),
            fields = fields.len(),
            "built form model"
        );
        Ok(FormModel {
            paragraph_texts,
            fields,
        })
    }

    pub fn from_docx(docx_bytes: &[u8]) -> Result<FormModel, InjexError> {
        let xml = read_document_xml(docx_bytes)?;
        Self::from_document_xml(&xml)
    }

    /// Named text inputs and their displayed values. Later duplicates win.
    pub fn text_fields(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .filter_map(|f| match (&f.name, &f.kind) {
                (Some(name), FieldKind::TextInput { value }) => Some((name.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn checkboxes(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.is_checkbox())
    }

    /// Paragraph texts joined by newlines, for form-type detection.
    pub fn full_text(&self) -> String {
        self.paragraph_texts.join("\n")
    }
}
