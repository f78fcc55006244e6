//! TrimTool API client library
//!
//! An async client for the trim normalization backend: listings, canonical
//! trims, aliases, candidate suggestions and pipeline statistics.

pub mod api;
pub mod error;
pub mod model;

mod client;

pub use client::*;
pub use error::ApiError;
