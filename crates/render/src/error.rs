//! Error types for rendering helpers.

/// Errors produced by the render helpers.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid colour: {0}")]
    InvalidColor(String),
}
