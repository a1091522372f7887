//! Default configuration constants for voicebank.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Sample rate assumed for microphone recordings, in Hz.
///
/// Recorded PCM is captured and persisted at 44.1kHz. The capture path does
/// not resample or validate this assumption; the WAV header written by the
/// persister states this rate.
pub const RECORD_SAMPLE_RATE: u32 = 44_100;

/// Sample rate Whisper inference expects, in Hz.
///
/// Persisted audio is downmixed and resampled to 16kHz mono before being
/// handed to the model.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// File extensions accepted for uploaded audio, lower-case.
///
/// Content is never inspected; only the extension is checked.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "mp4"];

/// Default Whisper model name.
///
/// "base" (multilingual) supports auto-detection of any language.
/// Use "base.en" explicitly for English-only optimized transcription.
pub const DEFAULT_MODEL: &str = "base";

/// Default language code for transcription.
///
/// "auto" lets Whisper detect the spoken language automatically.
/// Set to a specific code (e.g., "en", "de") to force a language.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Filename of the metadata ledger inside the data directory.
pub const METADATA_FILENAME: &str = "metadata.csv";

/// Remote path the ledger is published under in the dataset repository.
pub const REMOTE_METADATA_PATH: &str = "metadata.csv";

/// Default HuggingFace Hub endpoint.
pub const HUB_ENDPOINT: &str = "https://huggingface.co";

/// Environment variable carrying the Hub bearer token.
pub const HUB_TOKEN_ENV: &str = "HF_TOKEN";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions_are_lowercase() {
        for ext in ALLOWED_UPLOAD_EXTENSIONS {
            assert_eq!(*ext, ext.to_lowercase());
        }
    }

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "hipblas") {
            "HipBLAS (AMD)"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }
}
