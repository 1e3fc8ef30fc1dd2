//! OTP credential handling: sub-modules.

pub mod types;
pub mod uri;
pub mod list;
pub mod import;
pub mod export;
pub mod qr;
pub mod reader;
pub mod service;

// Re-export top-level items for convenience.
pub use types::*;
pub use list::{count_label, CredentialList, ListState};
pub use service::{AuthenticatorService, ListView, Modal, ViewMode};
