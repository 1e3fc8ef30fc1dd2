//! # otpbridge – OTP credential links
//!
//! Turns one-time-password credentials into `otpauth://` URIs and back:
//!
//! - **otpauth:// URIs** – Canonical generation and lenient parsing
//! - **Credential list** – The current import batch, with removal and live count
//! - **Batch import** – One URI per line, malformed lines skipped
//! - **Export** – URI lists and JSON
//! - **QR Codes** – Terminal, PNG and SVG rendering of any URI
//! - **Service** – One handler per user action, for front-ends to drive

pub mod otp;
