// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application state owned by the command layer.

use std::path::PathBuf;

use scanshelf_bridge::CaptureOutput;
use scanshelf_core::types::{OutputDocument, PageImageSet, ScannedDocument};
use scanshelf_library::{AssemblyInput, search};

/// Everything the screens read; only the app layer mutates it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// All saved documents, newest first.
    pub documents: Vec<ScannedDocument>,
    /// `documents` narrowed by `query`.
    pub filtered: Vec<ScannedDocument>,
    pub query: String,
    /// Document currently open in the preview.
    pub selected: Option<ScannedDocument>,
    /// Page images of `selected`.
    pub pages: PageImageSet,
    /// Pages from the last capture session, in order.
    pub captured_pages: Vec<PathBuf>,
    /// Combined PDF from the last capture session, if one was produced.
    pub captured_pdf: Option<PathBuf>,
    /// Outputs of the last save.
    pub saved: Vec<OutputDocument>,
}

impl AppState {
    /// Empty state: no documents, no selection, no capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document list, re-applying the current query.
    pub fn set_documents(&mut self, documents: Vec<ScannedDocument>) {
        self.documents = documents;
        self.filtered = search(&self.documents, &self.query);
    }

    /// Narrow `filtered` to names containing `query` (case-insensitive).
    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        self.filtered = search(&self.documents, &self.query);
    }

    /// Open `document` with its rendered `pages`.
    pub fn select(&mut self, document: ScannedDocument, pages: PageImageSet) {
        self.selected = Some(document);
        self.pages = pages;
    }

    /// Hold the pages and combined PDF of a capture session until saved.
    pub fn set_capture(&mut self, output: CaptureOutput) {
        self.captured_pages = output.pages;
        self.captured_pdf = output.combined_pdf;
    }

    /// The captured material as save input.
    pub fn assembly_input(&self) -> AssemblyInput {
        AssemblyInput {
            images: self.captured_pages.clone(),
            existing_pdf: self.captured_pdf.clone(),
        }
    }

    /// Record the outputs of the last save.
    pub fn set_saved(&mut self, saved: Vec<OutputDocument>) {
        self.saved = saved;
    }

    /// Forget the last capture session once it has been saved.
    pub fn clear_scan_results(&mut self) {
        self.captured_pages.clear();
        self.captured_pdf = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanshelf_core::types::{DocumentFormat, Locator};

    fn doc(name: &str, modified: i64) -> ScannedDocument {
        ScannedDocument::new(
            DocumentFormat::Pdf,
            name,
            Locator::from_path(format!("/docs/{name}")),
            modified,
        )
    }

    #[test]
    fn query_survives_a_refresh() {
        let mut state = AppState::new();
        state.set_documents(vec![doc("Invoice.pdf", 2), doc("receipt.pdf", 1)]);
        assert_eq!(state.filtered.len(), 2);

        state.search("INVOICE");
        assert_eq!(state.filtered, vec![doc("Invoice.pdf", 2)]);

        state.set_documents(vec![
            doc("invoice 2.pdf", 3),
            doc("Invoice.pdf", 2),
            doc("receipt.pdf", 1),
        ]);
        assert_eq!(state.filtered.len(), 2);
        assert_eq!(state.filtered[0].display_name, "invoice 2.pdf");
    }

    #[test]
    fn blank_query_shows_everything() {
        let mut state = AppState::new();
        state.set_documents(vec![doc("a.pdf", 1)]);
        state.search("zzz");
        assert!(state.filtered.is_empty());
        state.search("  ");
        assert_eq!(state.filtered.len(), 1);
    }

    #[test]
    fn capture_feeds_save_input_until_cleared() {
        let mut state = AppState::new();
        state.set_capture(CaptureOutput {
            pages: vec![PathBuf::from("p1.png"), PathBuf::from("p2.png")],
            combined_pdf: Some(PathBuf::from("scan.pdf")),
        });

        let input = state.assembly_input();
        assert_eq!(input.images.len(), 2);
        assert_eq!(input.existing_pdf, Some(PathBuf::from("scan.pdf")));

        state.clear_scan_results();
        assert!(state.assembly_input().is_empty());
    }
}
