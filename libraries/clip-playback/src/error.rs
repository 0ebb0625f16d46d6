//! Error types for the playback controller
//!
//! Only construction-time inputs can fail. Lifecycle hooks and the
//! session/sampler/watcher operations never return errors: an unplayable
//! resource or an unknown duration degrades to a progress of 0 instead.

use std::path::PathBuf;
use thiserror::Error;

/// Playback controller errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The resource locator could not be parsed as a URI
    #[error("Invalid resource locator {input:?}: {source}")]
    InvalidResource {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// The path cannot be expressed as a `file://` URI (relative or malformed)
    #[error("Invalid file path: {0:?}")]
    InvalidFilePath(PathBuf),

    /// Configuration document could not be decoded
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for playback controller operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_resource_message_names_input() {
        let source = url::Url::parse("not a uri").unwrap_err();
        let err = PlaybackError::InvalidResource {
            input: "not a uri".to_string(),
            source,
        };

        let message = err.to_string();
        assert!(message.contains("\"not a uri\""), "got: {message}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_error_converts_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        let err: PlaybackError = json_err.into();
        assert!(matches!(err, PlaybackError::Config(_)));
    }
}
