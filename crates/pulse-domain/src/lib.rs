//! # pulse-domain
//!
//! Domain models for the Pulse community platform, decoupled from both the
//! wire DTOs (`pulse-api`) and the cache records (`pulse-store`), plus the
//! error taxonomy every repository returns.

pub mod error;
pub mod models;

pub use error::{DataError, Result};
pub use models::*;
