//! Thin async client for the Socket REST API.
//!
//! - [`client`]: [`SocketClient`], one method per endpoint
//! - [`models`]: response and request shapes
//! - [`ndjson`]: line-by-line decoding of artifact streams
//! - [`manifest`]: local manifest discovery for uploads
//! - [`error`]: [`ApiError`] and the uniform [`Failure`] result

pub mod client;
pub mod error;
pub mod manifest;
pub mod models;
pub mod ndjson;

pub use client::{ClientOptions, SocketClient};
pub use error::{ApiError, Failure};
pub use manifest::{ManifestMatcher, discover_manifests};
pub use models::{Alert, Artifact, SecurityPolicy};
pub use ndjson::{NdjsonBatch, parse_ndjson, parse_scan_document};
