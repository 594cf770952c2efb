//! HTTP request handlers.

pub mod common;
pub mod downloads;
pub mod health;
pub mod keys;
pub mod uploads;

pub use downloads::*;
pub use health::*;
pub use keys::*;
pub use uploads::*;
