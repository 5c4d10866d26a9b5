use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Could not decode search response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache file is not valid JSON: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LookupError>;
