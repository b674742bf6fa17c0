use serde::{Deserialize, Serialize};

pub const PDF_MIME: &str = "application/pdf";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

/// One labeled field pulled out of a document line or table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    pub value: String,
}

impl Section {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Normalized form of one uploaded document.
///
/// `sections` keeps document order and duplicate keys. `raw` is the linear
/// text of page documents and always empty for tabular ones. Both are built
/// together by the normalizer and never mutated afterwards, so the fields are
/// only readable through accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    sections: Vec<Section>,
    raw: String,
}

impl ParsedDocument {
    pub fn new(sections: Vec<Section>, raw: impl Into<String>) -> Self {
        Self {
            sections,
            raw: raw.into(),
        }
    }

    /// The degraded result of a failed or unsupported decode.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True when the document carries at least one section or some raw text.
    pub fn has_content(&self) -> bool {
        !self.sections.is_empty() || !self.raw.is_empty()
    }

    /// Lower-cased raw text followed by every section rendered as `key value`,
    /// space-joined. Raw text and the rendered sections are concatenated with
    /// no separator between them.
    pub fn corpus(&self) -> String {
        let rendered = self
            .sections
            .iter()
            .map(|s| format!("{} {}", s.key, s.value))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}{}", self.raw, rendered).to_lowercase()
    }
}

/// The declared kind of an upload, decided from its mimetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PageText,
    Tabular,
    Unsupported,
}

impl DocumentKind {
    pub fn from_mime(mimetype: &str) -> Self {
        match mimetype {
            PDF_MIME => DocumentKind::PageText,
            XLSX_MIME | XLS_MIME => DocumentKind::Tabular,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// An uploaded file as handed over by the transport.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, mimetype: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_mime(&self.mimetype)
    }
}
