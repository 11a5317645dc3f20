//! Unified error handling for the trip-segmenter library.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for trip-segmenter operations.
#[derive(Error, Debug)]
pub enum TrackError {
    /// Track file could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Track file is not valid GPX
    #[error("failed to parse GPX: {0}")]
    GpxParse(String),
    /// Track file could not be written
    #[error("failed to write GPX: {0}")]
    GpxWrite(String),
    /// Track contains no usable (timestamped) points
    #[error("track '{path}' contains no timestamped points")]
    MissingTimestamps { path: PathBuf },
    /// Point-of-interest lookup failed after bounded retries
    #[error("point-of-interest lookup failed: {0}")]
    PoiLookup(String),
}

/// Result type alias for trip-segmenter operations.
pub type Result<T> = std::result::Result<T, TrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackError::GpxParse("unexpected end of stream".to_string());
        assert!(err.to_string().contains("parse GPX"));

        let err = TrackError::MissingTimestamps {
            path: PathBuf::from("walk.gpx"),
        };
        assert!(err.to_string().contains("walk.gpx"));
    }
}
