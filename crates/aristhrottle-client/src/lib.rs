//! HTTP transport for the Aristhrottle REST API.
//!
//! [`ApiClient`] implements [`aristhrottle_core::api::EngagementApi`] over
//! `reqwest`, turning the API's loosely shaped responses into canonical
//! core types at the boundary.

mod client;
mod wire;

pub mod error;

pub use client::{ApiClient, ApiConfig, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
