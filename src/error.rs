//! Error types shared by every stage of the chart pipeline

/// Result type for danmaku chart operations
pub type Result<T> = std::result::Result<T, DanmakuError>;

/// Error types for danmaku chart operations
#[derive(thiserror::Error, Debug)]
pub enum DanmakuError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to decompress response body: {0}")]
    Decompress(std::io::Error),

    #[error("{0}: Cannot match")]
    Extraction(&'static str),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Comment position {position}s is outside the chart range [0, {len})")]
    Index { position: i64, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_xml_rs::Error> for DanmakuError {
    fn from(e: serde_xml_rs::Error) -> Self {
        DanmakuError::Parse(format!("malformed comment XML: {}", e))
    }
}

impl From<std::num::ParseIntError> for DanmakuError {
    fn from(e: std::num::ParseIntError) -> Self {
        DanmakuError::Parse(e.to_string())
    }
}
