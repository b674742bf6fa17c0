use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    document::{DocumentKind, ParsedDocument, Section},
    error::{CareError, Result},
    reader::{PageTextReader, PdfTextReader, SheetRows, TabularReader, WorkbookReader},
};

const SEPARATOR: char = ':';

/// Turns uploaded bytes into a [`ParsedDocument`].
///
/// Normalization never fails: any decode error degrades to the empty document.
#[derive(Clone)]
pub struct Normalizer {
    page_reader: Arc<dyn PageTextReader>,
    tabular_reader: Arc<dyn TabularReader>,
}

impl Normalizer {
    pub fn new(
        page_reader: Arc<dyn PageTextReader>,
        tabular_reader: Arc<dyn TabularReader>,
    ) -> Self {
        Self {
            page_reader,
            tabular_reader,
        }
    }

    pub fn normalize(&self, bytes: &[u8], kind: DocumentKind) -> ParsedDocument {
        match self.try_normalize(bytes, kind) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, ?kind, "Document decode failed, using empty document");
                ParsedDocument::empty()
            }
        }
    }

    /// Runs [`Normalizer::normalize`] on the blocking pool. A decoder that
    /// panics is treated like any other decode failure.
    pub async fn normalize_blocking(&self, bytes: Vec<u8>, kind: DocumentKind) -> ParsedDocument {
        let normalizer = self.clone();
        match tokio::task::spawn_blocking(move || normalizer.normalize(&bytes, kind)).await {
            Ok(document) => document,
            Err(e) => {
                let err = CareError::TaskJoin(e.to_string());
                warn!(error = %err, ?kind, "Document decode aborted, using empty document");
                ParsedDocument::empty()
            }
        }
    }

    fn try_normalize(&self, bytes: &[u8], kind: DocumentKind) -> Result<ParsedDocument> {
        match kind {
            DocumentKind::PageText => {
                let text = self.page_reader.read_text(bytes)?;
                let sections = sections_from_text(&text);
                debug!(sections = sections.len(), chars = text.len(), "Parsed page document");
                Ok(ParsedDocument::new(sections, text))
            }
            DocumentKind::Tabular => {
                let sheets = self.tabular_reader.read_sheets(bytes)?;
                let sections = sections_from_sheets(&sheets);
                debug!(sections = sections.len(), sheets = sheets.len(), "Parsed tabular document");
                Ok(ParsedDocument::new(sections, ""))
            }
            DocumentKind::Unsupported => Err(CareError::UnsupportedKind(format!("{:?}", kind))),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(PdfTextReader), Arc::new(WorkbookReader))
    }
}

/// One section per line holding a separator with a non-empty key before it.
pub fn sections_from_text(text: &str) -> Vec<Section> {
    text.lines().filter_map(section_from_line).collect()
}

fn section_from_line(line: &str) -> Option<Section> {
    let (key, value) = line.split_once(SEPARATOR)?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some(Section::new(key, value.trim()))
}

/// One section per row with at least two cells and a non-empty first cell,
/// sheet by sheet, top to bottom.
pub fn sections_from_sheets(sheets: &[SheetRows]) -> Vec<Section> {
    sheets
        .iter()
        .flatten()
        .filter(|row| row.len() >= 2 && !row[0].is_empty())
        .map(|row| Section::new(row[0].clone(), row[1].clone()))
        .collect()
}
