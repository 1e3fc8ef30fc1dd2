//! Batch import of `otpauth://` URI files.
//!
//! Every line that starts with `otpauth://` is parsed; everything else
//! (blank lines, comments, other schemes, indented text) is ignored
//! verbatim. A line that fails to parse is skipped and recorded, it never
//! aborts the batch.

use crate::otp::types::*;
use crate::otp::uri;

/// Prefix a line must start with to be considered a credential.
pub const OTPAUTH_PREFIX: &str = "otpauth://";

/// Parse the full text of an import file.
pub fn import_otpauth_text(text: &str) -> ImportReport {
    let mut credentials = Vec::new();
    let mut skipped = Vec::new();
    let mut total_lines = 0;
    let mut candidates = 0;

    // `lines()` splits on "\n" and strips a trailing "\r".
    for (idx, line) in text.lines().enumerate() {
        total_lines += 1;
        if !line.starts_with(OTPAUTH_PREFIX) {
            continue;
        }
        candidates += 1;

        match uri::parse_otpauth_uri(line) {
            Ok(credential) => credentials.push(credential),
            Err(e) => {
                log::warn!("Invalid OTP URI on line {}: {}", idx + 1, line);
                skipped.push(SkippedLine {
                    line_no: idx + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "import parsed {} of {} candidate lines ({} skipped)",
        credentials.len(),
        candidates,
        skipped.len()
    );

    ImportReport {
        total_lines,
        candidates,
        credentials,
        skipped,
        imported_at: chrono::Utc::now(),
    }
}
