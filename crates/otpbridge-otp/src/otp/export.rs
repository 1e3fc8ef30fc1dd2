//! Export the current credential list.
//!
//! Supported formats:
//! - otpauth:// URIs (one per line), readable again by [`import`](crate::otp::import)
//! - JSON (pretty-printed array of credentials)

use crate::otp::list::CredentialList;
use crate::otp::types::*;
use crate::otp::uri;

/// Export every listed credential in the requested format.
pub fn export(list: &CredentialList, format: ExportFormat) -> Result<String, OtpError> {
    match format {
        ExportFormat::OtpAuthUris => Ok(export_otpauth_uris(list)),
        ExportFormat::Json => export_json(list),
    }
}

fn export_otpauth_uris(list: &CredentialList) -> String {
    let mut out = uri::build_otpauth_uris(list.credentials());
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn export_json(list: &CredentialList) -> Result<String, OtpError> {
    let credentials: Vec<&Credential> = list.credentials().collect();
    serde_json::to_string_pretty(&credentials).map_err(|e| {
        OtpError::new(
            OtpErrorKind::ExportFailed,
            format!("JSON serialise error: {}", e),
        )
    })
}
