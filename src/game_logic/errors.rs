use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum ShootyError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to access file: {0}")]
    FileAccessFailed(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    // Arena-related errors
    #[error("Arena file not found at path: {path}")]
    ArenaFileNotFound { path: PathBuf },

    #[error("Corrupted arena file: {reason}")]
    CorruptedArenaFile { reason: String },

    #[error("Invalid arena data: {reason}")]
    InvalidArenaData { reason: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// Result type alias for all operations
pub type ShootyResult<T> = Result<T, ShootyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shooty_error_display() {
        let err = ShootyError::InvalidArenaData {
            reason: "no player spawn".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid arena data: no player spawn");

        let err = ShootyError::ConfigDirNotFound;
        assert_eq!(err.to_string(), "Failed to get config directory");
    }

    #[test]
    fn test_io_error_converts() {
        fn open_missing() -> ShootyResult<Vec<u8>> {
            Ok(std::fs::read("/definitely/not/here/arena.bin")?)
        }

        let err = open_missing().unwrap_err();
        assert!(matches!(err, ShootyError::FileAccessFailed(_)));
        assert!(err.to_string().starts_with("Failed to access file"));
    }
}
