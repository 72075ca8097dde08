use thiserror::Error;

/// Malformed structured input or an unparseable timecode string.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("cut list must be a non-empty JSON array")]
    NotACutList,

    #[error("cuts must have 'start' and 'end' fields")]
    MissingFields,

    #[error("invalid timecode format: {0}")]
    InvalidTimecode(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Conditions under which the builder refuses to emit a document.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("frame rate must be positive, got {0}")]
    NonPositiveFps(f64),

    #[error("no cuts with positive duration to place on the timeline")]
    NoUsableCuts,

    #[error("no video sources given")]
    NoVideoSources,
}
