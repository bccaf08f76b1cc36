use thiserror::Error;

/// Failures surfaced synchronously by graph construction and simulation setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Duplicate node id or an unusable weight in the graph model.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Non-positive (or non-finite) viewport extent.
    #[error("invalid viewport: {width}x{height}, both extents must be positive")]
    InvalidViewport { width: f32, height: f32 },

    /// Out-of-range simulation tunable.
    #[error("config error: {0}")]
    Config(String),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
