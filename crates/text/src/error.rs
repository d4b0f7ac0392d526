/// Errors from font loading and text extrusion.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("typeface JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid font: {0}")]
    InvalidFont(String),
    #[error("tessellation failed: {0}")]
    Tessellation(String),
    #[error("text produced no geometry")]
    EmptyText,
}
