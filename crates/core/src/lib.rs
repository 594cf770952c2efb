//! Core types for the parcel file exchange.
//!
//! This crate defines what the other crates share:
//! - Configuration loaded at startup
//! - The content root layout (keys, drop and serve trees)
//! - Naming rules for stored uploads

pub mod config;
pub mod error;
pub mod layout;
pub mod naming;

pub use error::{Error, Result};
pub use layout::{Area, ContentLayout, SessionId};

/// Multipart field carrying uploaded files.
pub const UPLOAD_FIELD: &str = "files";

/// Write buffer used when streaming an upload to disk: 4 MiB
pub const UPLOAD_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Suffix of public key files in the keys directory.
pub const PUBLIC_KEY_SUFFIX: &str = ".public.asc";

/// Extension of files offered for download.
pub const SERVE_EXTENSION: &str = "gpg";

/// Content type of downloaded files.
pub const DOWNLOAD_CONTENT_TYPE: &str = "application/pgp-encrypted";
