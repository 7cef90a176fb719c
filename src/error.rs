use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The input could not be classified as a supported video URL.
    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    /// Every slot on the wall is occupied.
    #[error("All {capacity} slots are occupied")]
    CapacityExhausted { capacity: usize },

    /// A slot id outside `0..capacity` was passed in.
    #[error("Slot {slot} is out of range (wall has {capacity} slots)")]
    InvalidSlot { slot: usize, capacity: usize },

    #[error("Downloader error: {0}")]
    Downloader(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    /// An upload whose content type is not a supported video container.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, TwillError>;
