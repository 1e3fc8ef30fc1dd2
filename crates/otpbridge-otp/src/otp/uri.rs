//! `otpauth://` URI parsing and generation.
//!
//! Format: `otpauth://totp/ISSUER:ACCOUNT?secret=SECRET&issuer=ISSUER`
//!
//! Issuer and account are percent-encoded with the same character set as
//! ECMAScript's `encodeURIComponent`, so generated URIs match what browser
//! based authenticator tooling produces byte-for-byte. The secret is
//! written verbatim.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::otp::types::*;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the canonical `otpauth://` URI for a credential.
///
/// The issuer appears twice, in the label and as the `issuer` parameter,
/// encoded identically. Empty inputs are accepted and yield a degenerate
/// URI; callers that need complete input validate it first
/// (see [`ManualEntry::validate`]).
pub fn build_otpauth_uri(account_name: &str, issuer: &str, secret: &str) -> String {
    let issuer = url_encode(issuer);
    let account = url_encode(account_name);
    format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}",
        issuer, account, secret, issuer
    )
}

/// Generate URIs for multiple credentials (one per line).
pub fn build_otpauth_uris<'a, I>(credentials: I) -> String
where
    I: IntoIterator<Item = &'a Credential>,
{
    credentials
        .into_iter()
        .map(Credential::to_uri)
        .collect::<Vec<_>>()
        .join("\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Parse
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse an `otpauth://` URI into a [`Credential`].
///
/// Only a syntactically invalid URI (or a malformed percent escape in the
/// label) is a failure. The scheme is not checked; a missing `secret`
/// yields an empty secret and a missing issuer falls back to the label
/// prefix, then to [`UNKNOWN_ISSUER`].
pub fn parse_otpauth_uri(uri: &str) -> Result<Credential, OtpError> {
    let url = url::Url::parse(uri)
        .map_err(|e| OtpError::parse_failure(format!("Invalid URI: {}", e)))?;

    // Path is "/ISSUER:ACCOUNT" or "/LABEL"
    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let (label_issuer, account_name) = split_label(path)?;

    let param = |name: &str| -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };

    let issuer = param("issuer")
        .or_else(|| Some(label_issuer).filter(|i| !i.is_empty()))
        .unwrap_or_else(|| UNKNOWN_ISSUER.to_string());
    let secret = param("secret").unwrap_or_default();

    Ok(Credential {
        account_name,
        issuer,
        secret,
    })
}

/// Split a raw (still encoded) label into `(issuer, account)`.
///
/// A literal `:` wins so that escaped colons inside either half survive;
/// otherwise the decoded label is split, which accepts `%3A` separators.
fn split_label(raw: &str) -> Result<(String, String), OtpError> {
    if let Some((issuer, account)) = raw.split_once(':') {
        return Ok((url_decode(issuer)?, url_decode(account)?));
    }

    let label = url_decode(raw)?;
    match label.split_once(':') {
        Some((issuer, account)) => Ok((issuer.to_string(), account.to_string())),
        None => Ok((label, String::new())),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  URL encoding helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn url_encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Strict percent-decoding: a `%` must be followed by two hex digits and
/// the result must be valid UTF-8.
fn url_decode(s: &str) -> Result<String, OtpError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while let Some(pos) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + pos;
        let well_formed = bytes
            .get(at + 1..at + 3)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(OtpError::parse_failure("Malformed percent escape in label")
                .with_detail(s.to_string()));
        }
        i = at + 3;
    }

    percent_decode_str(s)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| OtpError::parse_failure(format!("Label is not valid UTF-8: {}", e)))
}
