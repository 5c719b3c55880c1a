//! Minimal WordprocessingML model: paragraphs, runs, and the legacy
//! form-field markers (`w:fldChar` + `w:ffData`) carried by runs.
//!
//! Only the `w:` prefix is matched, so DrawingML text (`a:p`, `a:r`)
//! never leaks into paragraph texts.

use crate::error::InjexError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCharKind {
    Begin,
    Separate,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormControl {
    TextInput,
    Checkbox { checked: bool },
}

/// Contents of `w:ffData` on a field's begin marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldData {
    pub name: Option<String>,
    pub control: Option<FormControl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChar {
    pub kind: FieldCharKind,
    pub data: Option<FieldData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    /// One entry per `w:t`, in order. Empty elements are kept as `""`.
    pub texts: Vec<String>,
    pub field_chars: Vec<FieldChar>,
}

impl Run {
    /// Text of the run's first `w:t`, if that element has any text.
    pub fn first_text(&self) -> Option<&str> {
        self.texts.first().map(String::as_str).filter(|t| !t.is_empty())
    }

    pub fn field_char(&self, kind: FieldCharKind) -> Option<&FieldChar> {
        self.field_chars.iter().find(|fc| fc.kind == kind)
    }

    pub fn has_field_char(&self, kind: FieldCharKind) -> bool {
        self.field_char(kind).is_some()
    }

    /// Form-field data attached to this run's begin marker.
    pub fn begin_data(&self) -> Option<&FieldData> {
        self.field_char(FieldCharKind::Begin)?.data.as_ref()
    }
}

/// Paragraphs in document order, each listing its runs (including runs of
/// nested paragraphs) by index into the shared run arena.
#[derive(Debug, Clone, Default)]
pub struct WordDocument {
    paragraphs: Vec<Vec<usize>>,
    runs: Vec<Run>,
}

impl WordDocument {
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_runs(&self, idx: usize) -> Vec<&Run> {
        self.paragraphs
            .get(idx)
            .map(|ids| ids.iter().map(|&r| &self.runs[r]).collect())
            .unwrap_or_default()
    }

    /// Concatenation of every `w:t` in the paragraph.
    pub fn paragraph_text(&self, idx: usize) -> String {
        self.paragraph_runs(idx)
            .iter()
            .flat_map(|run| run.texts.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn paragraph_texts(&self) -> Vec<String> {
        (0..self.paragraphs.len())
            .map(|i| self.paragraph_text(i))
            .collect()
    }
}

/// Parse `word/document.xml`.
pub fn parse_document(xml: &str) -> Result<WordDocument, InjexError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = Builder::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => builder.open(&e, false)?,
            Event::Empty(e) => builder.open(&e, true)?,
            Event::End(e) => builder.close(e.name().as_ref()),
            Event::Text(t) => {
                if builder.in_text {
                    let text = t.unescape().map_err(xml_err)?;
                    builder.push_text(&text);
                }
            }
            Event::CData(c) => {
                if builder.in_text {
                    builder.push_text(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    tracing::debug!(
        paragraphs = builder.doc.paragraphs.len(),
        runs = builder.doc.runs.len(),
        "parsed document body"
    );
    Ok(builder.doc)
}

#[derive(Default)]
struct Builder {
    doc: WordDocument,
    open_paragraphs: Vec<usize>,
    open_runs: Vec<usize>,
    in_text: bool,
    /// A `w:fldChar` whose children (`w:ffData`) are still being read.
    pending: Option<FieldChar>,
    in_checkbox: bool,
}

impl Builder {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), InjexError> {
        match e.name().as_ref() {
            b"w:p" => {
                let idx = self.doc.paragraphs.len();
                self.doc.paragraphs.push(Vec::new());
                if !empty {
                    self.open_paragraphs.push(idx);
                }
            }
            b"w:r" => {
                let id = self.doc.runs.len();
                self.doc.runs.push(Run::default());
                for &p in &self.open_paragraphs {
                    self.doc.paragraphs[p].push(id);
                }
                if !empty {
                    self.open_runs.push(id);
                }
            }
            b"w:t" => {
                if let Some(run) = self.current_run() {
                    run.texts.push(String::new());
                    self.in_text = !empty;
                }
            }
            b"w:fldChar" => {
                let kind = match attr(e, "w:fldCharType")?.as_deref() {
                    Some("begin") => FieldCharKind::Begin,
                    Some("separate") => FieldCharKind::Separate,
                    Some("end") => FieldCharKind::End,
                    _ => return Ok(()),
                };
                let fc = FieldChar { kind, data: None };
                if empty {
                    self.attach(fc);
                } else {
                    self.pending = Some(fc);
                }
            }
            b"w:ffData" => {
                if let Some(fc) = self.pending.as_mut() {
                    fc.data = Some(FieldData::default());
                }
            }
            b"w:name" => {
                if let Some(data) = self.pending_data() {
                    data.name = attr(e, "w:val")?;
                }
            }
            b"w:textInput" => {
                if let Some(data) = self.pending_data() {
                    if data.control.is_none() {
                        data.control = Some(FormControl::TextInput);
                    }
                }
            }
            b"w:checkBox" => {
                if let Some(data) = self.pending_data() {
                    data.control = Some(FormControl::Checkbox { checked: false });
                    self.in_checkbox = !empty;
                }
            }
            b"w:checked" => {
                if self.in_checkbox {
                    // A bare <w:checked/> means checked; otherwise only "1" does.
                    let checked = match attr(e, "w:val")? {
                        None => true,
                        Some(v) => v == "1",
                    };
                    if let Some(data) = self.pending_data() {
                        data.control = Some(FormControl::Checkbox { checked });
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:p" => {
                self.open_paragraphs.pop();
            }
            b"w:r" => {
                self.open_runs.pop();
                self.in_text = false;
            }
            b"w:t" => self.in_text = false,
            b"w:fldChar" => {
                if let Some(fc) = self.pending.take() {
                    self.attach(fc);
                }
            }
            b"w:checkBox" => self.in_checkbox = false,
            _ => {}
        }
    }

    fn current_run(&mut self) -> Option<&mut Run> {
        let id = *self.open_runs.last()?;
        self.doc.runs.get_mut(id)
    }

    fn pending_data(&mut self) -> Option<&mut FieldData> {
        self.pending.as_mut()?.data.as_mut()
    }

    fn attach(&mut self, fc: FieldChar) {
        if let Some(run) = self.current_run() {
            run.field_chars.push(fc);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(last) = self.current_run().and_then(|run| run.texts.last_mut()) {
            last.push_str(text);
        }
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, InjexError> {
    match e.try_get_attribute(name).map_err(xml_err)? {
        Some(a) => Ok(Some(a.unescape_value().map_err(xml_err)?.into_owned())),
        None => Ok(None),
    }
}

fn xml_err(e: impl std::fmt::Display) -> InjexError {
    InjexError::Xml(e.to_string())
}
