//! HTTP server for the parcel file exchange.
//!
//! This crate provides:
//! - Public key listing
//! - Uploads into per-session drop folders
//! - Downloads and listings from per-session serve folders
//! - The periodic upload notification trigger

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod notifications;
pub mod routes;
pub mod state;
pub mod trace;

pub use error::{ApiError, ApiResult};
pub use notifications::spawn_notification_task;
pub use routes::create_router;
pub use state::AppState;
pub use trace::TraceId;
