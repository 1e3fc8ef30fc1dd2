//! # otpbridge
//!
//! Command-line front-end for `otpbridge-otp`: create a QR code for a
//! manually entered credential, import a file of `otpauth://` URIs, and
//! work through the imported list (QR codes, secrets, removal, export).
//!
//! The binary in `main.rs` parses arguments and hands off to
//! [`commands`] for one-shot actions or [`session::Session`] for the
//! interactive loop.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
