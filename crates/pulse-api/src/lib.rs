//! # pulse-api
//!
//! Typed REST client for the Pulse backend.  Every endpoint returns its body
//! wrapped in the envelope `{success, data, message, error}`; this crate
//! unwraps the envelope and translates HTTP/transport conditions into
//! [`ApiError`] variants the repositories can map onto the domain taxonomy.
//!
//! Authenticated requests carry `Authorization: Bearer <token>` when a token
//! is stored; without one the request goes out unauthenticated rather than
//! failing locally.

pub mod client;
pub mod config;
pub mod dto;
pub mod envelope;
pub mod token;

mod error;

pub use client::PulseApi;
pub use config::ApiConfig;
pub use envelope::{ApiResponse, Page};
pub use error::ApiError;
pub use token::{AuthTokens, TokenStore};
