//! State of one import page: every pipeline stage, composed.
//!
//! Network calls happen outside. The caller takes a [`RequestTicket`] with
//! `begin_*`, performs the request and hands the outcome back with
//! `finish_*`. Only the newest ticket of a stage is applied; answers to
//! superseded requests are dropped, so the last request issued wins.

use crate::domain::a001_category::Category;

use super::category_detector::detect_from_filename;
use super::enrich::{enrich, KeywordHeuristics};
use super::error::{ApiFailure, FileSelectionError, GridError};
use super::file_rules::{FileSelector, SelectedFile};
use super::grid::{PreviewGrid, PreviewStats};
use super::preview::{FieldUpdate, PreviewProduct};
use super::request::ImportConfirmRequest;
use super::response::{ImportPreviewResponse, ImportResult};

/// Identifies one in-flight request of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// What `finish_*` did with an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request of the same stage was issued meanwhile
    Stale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Generation {
    latest: u64,
    in_flight: bool,
}

impl Generation {
    fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        self.in_flight = true;
        RequestTicket(self.latest)
    }

    /// True when `ticket` is the newest; marks the stage idle
    fn settle(&mut self, ticket: RequestTicket) -> bool {
        if ticket.0 != self.latest {
            return false;
        }
        self.in_flight = false;
        true
    }

    /// Make every ticket issued so far stale
    fn outdate(&mut self) {
        self.latest += 1;
        self.in_flight = false;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportSession {
    selector: FileSelector,
    categories: Vec<Category>,

    preview: Generation,
    /// File name captured by the newest preview request
    preview_file_name: Option<String>,
    raw_preview: Vec<PreviewProduct>,
    grid: PreviewGrid,
    preview_error: Option<String>,

    confirm: Generation,
    result: Option<ImportResult>,
    confirm_error: Option<String>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- categories ----

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    // ---- file selection ----

    pub fn select_file(
        &mut self,
        file: Option<SelectedFile>,
    ) -> Result<Option<&SelectedFile>, FileSelectionError> {
        self.selector.select(file)
    }

    pub fn clear_file(&mut self) {
        self.selector.clear();
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selector.file()
    }

    pub fn file_error(&self) -> Option<&FileSelectionError> {
        self.selector.error()
    }

    // ---- preview ----

    /// Start a preview upload for the selected file; `None` when nothing is selected
    pub fn begin_preview(&mut self) -> Option<RequestTicket> {
        let name = self.selector.file()?.name.clone();
        self.preview_file_name = Some(name);
        Some(self.preview.issue())
    }

    /// Apply the answer of a preview upload.
    ///
    /// On failure the rows of the previous successful preview stay visible
    /// next to the error.
    pub fn finish_preview(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<ImportPreviewResponse, ApiFailure>,
    ) -> Completion {
        if !self.preview.settle(ticket) {
            return Completion::Stale;
        }

        match outcome {
            Ok(response) => {
                self.raw_preview = response.into_rows();
                let fallback = self
                    .preview_file_name
                    .as_deref()
                    .and_then(detect_from_filename);
                let heuristics = KeywordHeuristics::new(&self.categories);
                self.grid = PreviewGrid::new(enrich(&self.raw_preview, fallback, &heuristics));
                self.preview_error = None;
            }
            Err(failure) => {
                self.preview_error = Some(failure.user_message());
            }
        }
        Completion::Applied
    }

    pub fn is_loading_preview(&self) -> bool {
        self.preview.in_flight
    }

    pub fn preview_error(&self) -> Option<&str> {
        self.preview_error.as_deref()
    }

    /// Rows exactly as the server sent them
    pub fn raw_preview(&self) -> &[PreviewProduct] {
        &self.raw_preview
    }

    // ---- grid ----

    pub fn grid(&self) -> &PreviewGrid {
        &self.grid
    }

    pub fn update_field(&mut self, index: usize, update: FieldUpdate) -> Result<(), GridError> {
        self.grid.update_field(index, update)
    }

    pub fn update_field_raw(
        &mut self,
        index: usize,
        field: &str,
        raw: &str,
    ) -> Result<(), GridError> {
        self.grid.update_field_raw(index, field, raw)
    }

    pub fn stats(&self) -> PreviewStats {
        self.grid.stats()
    }

    // ---- confirm ----

    /// Start a confirm with the whole current grid; `None` when it is empty
    pub fn begin_confirm(&mut self) -> Option<(RequestTicket, ImportConfirmRequest)> {
        if self.grid.is_empty() {
            return None;
        }
        let request = ImportConfirmRequest {
            products: self.grid.rows().to_vec(),
        };
        Some((self.confirm.issue(), request))
    }

    pub fn finish_confirm(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<ImportResult, ApiFailure>,
    ) -> Completion {
        if !self.confirm.settle(ticket) {
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                if result.is_success() {
                    self.selector.clear();
                }
                self.result = Some(result);
                self.confirm_error = None;
            }
            Err(failure) => {
                self.result = None;
                self.confirm_error = Some(failure.user_message());
            }
        }
        Completion::Applied
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm.in_flight
    }

    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn confirm_error(&self) -> Option<&str> {
        self.confirm_error.as_deref()
    }

    /// Forget the last confirm outcome without sending anything
    pub fn clear_result(&mut self) {
        self.result = None;
        self.confirm_error = None;
    }

    /// Back to an empty page, keeping the category list.
    ///
    /// Generations keep counting so answers to requests issued before the
    /// reset are still recognised as stale.
    pub fn reset(&mut self) {
        let categories = std::mem::take(&mut self.categories);
        let mut preview = self.preview;
        let mut confirm = self.confirm;
        preview.outdate();
        confirm.outdate();
        *self = Self {
            categories,
            preview,
            confirm,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_products::category_detector::{
        CATEGORY_CLOTHING, CATEGORY_FOOTWEAR,
    };
    use crate::usecases::u501_import_products::error::GENERIC_CONNECTION_ERROR;
    use crate::usecases::u501_import_products::response::RowError;

    fn session_with_file(name: &str) -> ImportSession {
        let mut s = ImportSession::new();
        s.set_categories(vec![
            Category::new(1, CATEGORY_CLOTHING),
            Category::new(2, CATEGORY_FOOTWEAR),
        ]);
        s.select_file(Some(SelectedFile::new(name, 1024))).unwrap();
        s
    }

    fn preview_of(names: &[&str]) -> ImportPreviewResponse {
        ImportPreviewResponse::new(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    let mut p = PreviewProduct::new(*n, format!("SKU-{i}"), 10.0);
                    p.stock_quantity = 9;
                    p
                })
                .collect(),
        )
    }

    #[test]
    fn test_preview_requires_file() {
        let mut s = ImportSession::new();
        assert!(s.begin_preview().is_none());
        assert!(!s.is_loading_preview());
    }

    #[test]
    fn test_preview_enriches_with_filename_fallback() {
        let mut s = session_with_file("zapatillas_verano.csv");
        let ticket = s.begin_preview().unwrap();
        assert!(s.is_loading_preview());

        let outcome = s.finish_preview(ticket, Ok(preview_of(&["Remera básica", "Modelo 2024"])));

        assert_eq!(outcome, Completion::Applied);
        assert!(!s.is_loading_preview());
        let rows = s.grid().rows();
        assert_eq!(rows[0].detected_category.as_deref(), Some(CATEGORY_CLOTHING));
        assert_eq!(rows[0].category_id, Some(1));
        assert_eq!(rows[1].detected_category.as_deref(), Some(CATEGORY_FOOTWEAR));
        assert_eq!(rows[1].category_id, Some(2));
        assert!(rows.iter().all(|r| r.stock_quantity == 0 && r.min_stock == 1));
        // server rows are kept as received
        assert!(s.raw_preview().iter().all(|r| r.stock_quantity == 9));
    }

    #[test]
    fn test_last_preview_request_wins() {
        let mut s = session_with_file("lista.csv");
        let first = s.begin_preview().unwrap();
        let second = s.begin_preview().unwrap();

        assert_eq!(
            s.finish_preview(second, Ok(preview_of(&["Nuevo"]))),
            Completion::Applied
        );
        assert_eq!(
            s.finish_preview(first, Ok(preview_of(&["Viejo", "Viejo 2"]))),
            Completion::Stale
        );
        assert_eq!(s.grid().len(), 1);
        assert_eq!(s.grid().rows()[0].name, "Nuevo");
    }

    #[test]
    fn test_stale_answer_does_not_end_loading() {
        let mut s = session_with_file("lista.csv");
        let first = s.begin_preview().unwrap();
        let second = s.begin_preview().unwrap();

        s.finish_preview(first, Err(ApiFailure::Transport("aborted".into())));
        assert!(s.is_loading_preview());
        assert!(s.preview_error().is_none());

        s.finish_preview(second, Ok(preview_of(&["A"])));
        assert!(!s.is_loading_preview());
    }

    #[test]
    fn test_preview_failure_keeps_previous_rows() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(preview_of(&["Buzo", "Taza"])));

        let t = s.begin_preview().unwrap();
        s.finish_preview(
            t,
            Err(ApiFailure::Http {
                status: 400,
                detail: Some("Columna 'sku' no encontrada".into()),
            }),
        );

        assert_eq!(s.preview_error(), Some("Columna 'sku' no encontrada"));
        assert_eq!(s.grid().len(), 2);
    }

    #[test]
    fn test_preview_success_clears_error() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Err(ApiFailure::Transport("offline".into())));
        assert_eq!(s.preview_error(), Some(GENERIC_CONNECTION_ERROR));

        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(ImportPreviewResponse::default()));
        assert!(s.preview_error().is_none());
        assert!(s.grid().is_empty());
    }

    #[test]
    fn test_confirm_sends_edited_rows() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(preview_of(&["Buzo", "Taza"])));
        s.update_field(1, FieldUpdate::Price(42.0)).unwrap();

        let (_, request) = s.begin_confirm().unwrap();
        assert_eq!(request.products.len(), 2);
        assert_eq!(request.products[1].price, 42.0);
        assert_eq!(request.products[0].price, 10.0);
        assert!(s.is_confirming());
    }

    #[test]
    fn test_confirm_needs_rows() {
        let mut s = session_with_file("lista.csv");
        assert!(s.begin_confirm().is_none());
    }

    #[test]
    fn test_partial_success_is_success() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(preview_of(&["A", "B", "C"])));
        let (ticket, _) = s.begin_confirm().unwrap();

        let result = ImportResult {
            import_log_id: Some(5),
            message: "ok".into(),
            total_rows: 3,
            successful_rows: 2,
            failed_rows: 1,
            errors: vec![RowError {
                row: 2,
                error: "SKU duplicado".into(),
            }],
            preview_data: None,
        };
        s.finish_confirm(ticket, Ok(result));

        let stored = s.result().unwrap();
        assert!(stored.is_success());
        assert_eq!(stored.errors.len(), 1);
        assert_eq!(stored.errors[0].error, "SKU duplicado");
        assert!(s.confirm_error().is_none());
        assert!(s.selected_file().is_none());
    }

    #[test]
    fn test_dropped_file_can_be_picked_again() {
        let mut s = session_with_file("lista.csv");
        assert!(s
            .select_file(Some(SelectedFile::new("foto.png", 10)))
            .is_err());
        assert!(s.selected_file().is_none());
        assert!(s.begin_preview().is_none());

        s.select_file(Some(SelectedFile::new("lista.csv", 1024)))
            .unwrap();
        s.reset();
        assert!(s.selected_file().is_none());

        s.select_file(Some(SelectedFile::new("lista.csv", 1024)))
            .unwrap();
        assert!(s.begin_preview().is_some());
    }

    #[test]
    fn test_total_failure_keeps_file() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(preview_of(&["A"])));
        let (ticket, _) = s.begin_confirm().unwrap();

        s.finish_confirm(
            ticket,
            Ok(ImportResult {
                total_rows: 1,
                failed_rows: 1,
                ..Default::default()
            }),
        );
        assert!(!s.result().unwrap().is_success());
        assert!(s.selected_file().is_some());
    }

    #[test]
    fn test_confirm_network_failure() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(preview_of(&["A"])));

        let (ticket, _) = s.begin_confirm().unwrap();
        s.finish_confirm(
            ticket,
            Ok(ImportResult {
                total_rows: 1,
                successful_rows: 1,
                ..Default::default()
            }),
        );
        let (ticket, _) = s.begin_confirm().unwrap();
        s.finish_confirm(ticket, Err(ApiFailure::Transport("Failed to fetch".into())));

        assert!(s.result().is_none());
        assert_eq!(s.confirm_error(), Some(GENERIC_CONNECTION_ERROR));
    }

    #[test]
    fn test_clear_result() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.finish_preview(t, Ok(preview_of(&["A"])));
        let (ticket, _) = s.begin_confirm().unwrap();
        s.finish_confirm(ticket, Err(ApiFailure::Transport("x".into())));

        s.clear_result();
        assert!(s.result().is_none());
        assert!(s.confirm_error().is_none());
        assert_eq!(s.grid().len(), 1);
    }

    #[test]
    fn test_reset_outdates_pending_requests() {
        let mut s = session_with_file("lista.csv");
        let t = s.begin_preview().unwrap();
        s.reset();

        assert!(!s.is_loading_preview());
        assert_eq!(s.categories().len(), 2);
        assert!(s.selected_file().is_none());
        assert_eq!(s.finish_preview(t, Ok(preview_of(&["A"]))), Completion::Stale);
        assert!(s.grid().is_empty());
    }
}
