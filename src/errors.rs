//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching or rendering the map.
#[derive(Error, Debug)]
pub enum QuakemapError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed
    #[error("Failed to process JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Feed endpoint answered with a non-success status
    #[error("USGS feed error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response was valid JSON but not a feature collection
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A single feature is unusable
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// Writing the page or output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
