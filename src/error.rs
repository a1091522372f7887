//! Error types for voicebank.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoicebankError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Capture errors
    #[error("Unsupported audio extension: {extension} (allowed: wav, mp3, m4a, mp4)")]
    UnsupportedExtension { extension: String },

    #[error("Invalid capture input: {message}")]
    Capture { message: String },

    // Audio device errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Persistence errors
    #[error("Failed to persist sample: {message}")]
    Persist { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Metadata ledger errors
    #[error("Metadata ledger error: {message}")]
    Ledger { message: String },

    // Publish errors
    #[error("Failed to publish to dataset repository: {message}")]
    Publish { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoicebankError>;
