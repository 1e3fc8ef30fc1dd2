//! Core types for OTP credential handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issuer used when neither the `issuer` query parameter nor the label
/// prefix carries one.
pub const UNKNOWN_ISSUER: &str = "Unknown";

/// Message shown when the manual-entry form is submitted incomplete.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Credential
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An OTP credential as held in memory.
///
/// All fields are stored decoded (never percent-encoded); encoding only
/// happens when the credential is turned back into an `otpauth://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Account name (e.g. "alice@example.com").
    ///
    /// Empty when the URI label had no `issuer:` prefix separator.
    pub account_name: String,
    /// Issuer (e.g. "GitHub"). Never empty after parsing.
    pub issuer: String,
    /// Secret key, passed through untouched.
    pub secret: String,
}

impl Credential {
    pub fn new(
        account_name: impl Into<String>,
        issuer: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            issuer: issuer.into(),
            secret: secret.into(),
        }
    }

    /// Whether the URI this came from carried an account name at all.
    pub fn has_account_name(&self) -> bool {
        !self.account_name.is_empty()
    }

    /// Canonical `otpauth://` URI for this credential.
    pub fn to_uri(&self) -> String {
        crate::otp::uri::build_otpauth_uri(&self.account_name, &self.issuer, &self.secret)
    }
}

/// A credential held by a [`CredentialList`](crate::otp::list::CredentialList),
/// tagged with the identity it was given on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedCredential {
    /// Unique identifier, assigned on insertion.
    pub id: String,
    #[serde(flatten)]
    pub credential: Credential,
}

impl ListedCredential {
    pub(crate) fn assign(credential: Credential) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            credential,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Manual entry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Raw form input for a single manually created credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    pub account_name: String,
    pub issuer: String,
    pub secret: String,
}

impl ManualEntry {
    pub fn new(
        account_name: impl Into<String>,
        issuer: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            issuer: issuer.into(),
            secret: secret.into(),
        }
    }

    /// Trim every field and reject the form if any of them ends up empty.
    pub fn validate(&self) -> Result<Credential, OtpError> {
        let account_name = self.account_name.trim();
        let issuer = self.issuer.trim();
        let secret = self.secret.trim();

        let missing: Vec<&str> = [
            ("accountName", account_name),
            ("issuer", issuer),
            ("secret", secret),
        ]
        .iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(OtpError::new(OtpErrorKind::MissingField, MISSING_FIELDS_MESSAGE)
                .with_detail(missing.join(", ")));
        }

        Ok(Credential::new(account_name, issuer, secret))
    }

    /// Validate and build the URI in one step. No URI is produced for an
    /// incomplete form.
    pub fn to_uri(&self) -> Result<String, OtpError> {
        Ok(self.validate()?.to_uri())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Import / export
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A line of an import file that looked like a URI but failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line_no: usize,
    pub reason: String,
}

/// Summary of one batch import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Lines in the source text.
    pub total_lines: usize,
    /// Lines starting with `otpauth://`.
    pub candidates: usize,
    /// Successfully parsed credentials, in file order.
    pub credentials: Vec<Credential>,
    pub skipped: Vec<SkippedLine>,
    pub imported_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.credentials.len()
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// One `otpauth://` URI per line.
    OtpAuthUris,
    /// Pretty-printed JSON array of credentials.
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uris" | "uri" | "otpauth" | "otpauth_uris" => Ok(Self::OtpAuthUris),
            "json" => Ok(Self::Json),
            other => Err(OtpError::new(
                OtpErrorKind::InvalidInput,
                format!("Unknown export format: {}", other),
            )),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error kind for this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpErrorKind {
    /// A line could not be parsed as a URI.
    ParseFailure,
    /// A manual-entry field was blank.
    MissingField,
    NotFound,
    ReadFailed,
    QrEncodeFailed,
    ExportFailed,
    InvalidInput,
}

/// Crate-level error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpError {
    pub kind: OtpErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for OtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(d) = &self.detail {
            write!(f, " ({})", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for OtpError {}

impl OtpError {
    pub fn new(kind: OtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn parse_failure(msg: impl Into<String>) -> Self {
        Self::new(OtpErrorKind::ParseFailure, msg)
    }

    pub fn not_found(id: &str) -> Self {
        Self::new(OtpErrorKind::NotFound, format!("Entry not found: {}", id))
    }
}

impl From<OtpError> for String {
    fn from(e: OtpError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Credential ───────────────────────────────────────────────

    #[test]
    fn credential_to_uri() {
        let c = Credential::new("Alice", "ExampleCo", "JBSWY3DPEHPK3PXP");
        assert_eq!(
            c.to_uri(),
            "otpauth://totp/ExampleCo:Alice?secret=JBSWY3DPEHPK3PXP&issuer=ExampleCo"
        );
    }

    #[test]
    fn credential_serde_camel_case() {
        let c = Credential::new("alice", "Acme", "ABC");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"accountName\":\"alice\""));
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn listed_credential_flattens() {
        let listed = ListedCredential::assign(Credential::new("a", "b", "c"));
        let json = serde_json::to_value(&listed).unwrap();
        assert_eq!(json["id"], listed.id.as_str());
        assert_eq!(json["issuer"], "b");
    }

    #[test]
    fn assigned_ids_are_unique() {
        let a = ListedCredential::assign(Credential::new("a", "b", "c"));
        let b = ListedCredential::assign(Credential::new("a", "b", "c"));
        assert_ne!(a.id, b.id);
    }

    // ── ManualEntry ──────────────────────────────────────────────

    #[test]
    fn manual_entry_trims_fields() {
        let form = ManualEntry::new("  Alice ", "\tExampleCo", "JBSWY3DPEHPK3PXP\n");
        let c = form.validate().unwrap();
        assert_eq!(c, Credential::new("Alice", "ExampleCo", "JBSWY3DPEHPK3PXP"));
    }

    #[test]
    fn manual_entry_rejects_blank_field() {
        let form = ManualEntry::new("Alice", "   ", "SECRET");
        let err = form.validate().unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::MissingField);
        assert_eq!(err.message, MISSING_FIELDS_MESSAGE);
        assert_eq!(err.detail.as_deref(), Some("issuer"));
    }

    #[test]
    fn manual_entry_lists_every_missing_field() {
        let err = ManualEntry::default().to_uri().unwrap_err();
        assert_eq!(err.detail.as_deref(), Some("accountName, issuer, secret"));
    }

    // ── ExportFormat ─────────────────────────────────────────────

    #[test]
    fn export_format_from_str() {
        assert_eq!("uris".parse::<ExportFormat>().unwrap(), ExportFormat::OtpAuthUris);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    // ── Error ────────────────────────────────────────────────────

    #[test]
    fn error_display() {
        let err = OtpError::parse_failure("bad uri").with_detail("line 3");
        let s = err.to_string();
        assert!(s.contains("ParseFailure"));
        assert!(s.contains("bad uri"));
        assert!(s.contains("line 3"));
    }

    #[test]
    fn error_into_string() {
        let s: String = OtpError::not_found("abc").into();
        assert!(s.contains("NotFound"));
        assert!(s.contains("abc"));
    }
}
