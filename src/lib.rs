//! voicebank - voice dataset collection
//!
//! Record or upload voice samples, transcribe them with Whisper, keep a CSV
//! metadata ledger, and mirror everything to a HuggingFace dataset repo.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod capture;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod hub;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod stt;

// Core seams (capture → transcribe → publish)
pub use audio::recorder::AudioSource;
pub use hub::api::DatasetHub;
pub use stt::transcriber::{TranscriptionOutcome, Transcriber};

// Pipeline
pub use capture::{CapturedAudio, SourceType};
pub use ledger::{MetadataLedger, MetadataRow};
pub use pipeline::{SampleOutcome, run_sample};
pub use store::{SampleStore, StoredSample};

// Error handling
pub use error::{Result, VoicebankError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
