//! Error types for catalog loading.

/// Errors produced while fetching or decoding a catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog request to {url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed catalog: {0}")]
    Format(String),
}
