//! High-level orchestrator: owns the credential list and the UI state, and
//! exposes one handler per user action. Every handler runs to completion
//! synchronously, except the file read of [`AuthenticatorService::import_file`].

use std::path::Path;

use serde::Serialize;

use crate::otp::import;
use crate::otp::list::{count_label, CredentialList, ListState};
use crate::otp::qr::{QrImage, QrRenderer};
use crate::otp::reader::FileReader;
use crate::otp::types::*;

/// Which panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Nothing shown yet.
    Hidden,
    ManualForm,
    ImportList,
}

/// The modal currently open over the panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Qr { uri: String, image: QrImage },
    Secret(String),
}

/// Everything a front-end needs to draw the import list.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub rows: Vec<ListedCredential>,
    pub state: ListState,
    pub count: usize,
    pub count_label: String,
}

/// Central service.
pub struct AuthenticatorService {
    list: CredentialList,
    renderer: Box<dyn QrRenderer>,
    view: ViewMode,
    modal: Option<Modal>,
    last_import: Option<ImportReport>,
}

impl AuthenticatorService {
    pub fn new(renderer: impl QrRenderer + 'static) -> Self {
        Self {
            list: CredentialList::new(),
            renderer: Box::new(renderer),
            view: ViewMode::Hidden,
            modal: None,
            last_import: None,
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Manual entry
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Switch to the manual-entry form (hides the import list).
    pub fn show_manual_form(&mut self) {
        self.view = ViewMode::ManualForm;
    }

    /// Validate the form, build its URI and open the QR modal.
    ///
    /// Nothing changes if the form is incomplete or rendering fails.
    pub fn create_manual_qr(&mut self, form: &ManualEntry) -> Result<&Modal, OtpError> {
        let uri = form.to_uri()?;
        self.open_qr(uri)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Import
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Replace the list with the credentials found in `text` and show it.
    pub fn import_text(&mut self, text: &str) -> &ImportReport {
        let report = import::import_otpauth_text(text);
        self.list.replace_all(report.credentials.iter().cloned());
        self.view = ViewMode::ImportList;
        log::info!("imported {}", count_label(self.list.count()));
        self.last_import.insert(report)
    }

    /// Read a file and import it. A read failure leaves the current list
    /// and view untouched.
    pub async fn import_file(
        &mut self,
        reader: &dyn FileReader,
        path: &Path,
    ) -> Result<&ImportReport, OtpError> {
        let text = reader.read_text(path).await?;
        Ok(self.import_text(&text))
    }

    pub fn last_import(&self) -> Option<&ImportReport> {
        self.last_import.as_ref()
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  List rows
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Remove a row. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        self.list.remove(id)
    }

    /// Rebuild the URI of a listed credential and open the QR modal.
    pub fn qr_for(&mut self, id: &str) -> Result<&Modal, OtpError> {
        let uri = self.lookup(id)?.to_uri();
        self.open_qr(uri)
    }

    /// Open the secret modal for a listed credential.
    pub fn reveal_secret(&mut self, id: &str) -> Result<&Modal, OtpError> {
        let secret = self.lookup(id)?.secret.clone();
        Ok(self.modal.insert(Modal::Secret(secret)))
    }

    /// Resolve a 1-based row number or an id to an id present in the list.
    pub fn resolve(&self, key: &str) -> Option<String> {
        if let Ok(row) = key.parse::<usize>() {
            return self.list.id_at(row).map(str::to_string);
        }
        self.list.get(key).map(|e| e.id.clone())
    }

    pub fn list(&self) -> &CredentialList {
        &self.list
    }

    /// Projection of the list for rendering.
    pub fn list_view(&self) -> ListView {
        ListView {
            rows: self.list.list().to_vec(),
            state: self.list.state(),
            count: self.list.count(),
            count_label: count_label(self.list.count()),
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  UI state
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Close whatever modal is open. Closing twice is harmless.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn lookup(&self, id: &str) -> Result<&Credential, OtpError> {
        self.list
            .get(id)
            .map(|e| &e.credential)
            .ok_or_else(|| OtpError::not_found(id))
    }

    fn open_qr(&mut self, uri: String) -> Result<&Modal, OtpError> {
        let image = self.renderer.render(&uri)?;
        Ok(self.modal.insert(Modal::Qr { uri, image }))
    }
}
