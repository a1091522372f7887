use crate::error::{Result, VoicebankError};
use std::path::Path;
use std::sync::Arc;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
/// Implementations are loaded once per process and shared by reference.
pub trait Transcriber: Send + Sync {
    /// Transcribe a persisted audio file to text.
    ///
    /// # Arguments
    /// * `path` - Absolute path of the audio file to transcribe
    ///
    /// # Returns
    /// Transcribed text or error
    fn transcribe_file(&self, path: &Path) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across invocations.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe_file(&self, path: &Path) -> Result<String> {
        (**self).transcribe_file(path)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Explicit result of one transcription attempt.
///
/// The pipeline never propagates a transcription error: any failure from the
/// model call is converted into [`TranscriptionOutcome::Failed`], which the
/// orchestration layer reports and uses to skip the ledger append and the
/// publish step for that sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionOutcome {
    /// Transcription succeeded; the text may be empty.
    Text(String),
    /// The model call failed; the sample is skipped.
    Failed { reason: String },
}

impl TranscriptionOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            TranscriptionOutcome::Text(text) => Some(text),
            TranscriptionOutcome::Failed { .. } => None,
        }
    }
}

/// Run the model on a persisted file, converting any error into an outcome.
pub fn transcribe_sample(transcriber: &dyn Transcriber, path: &Path) -> TranscriptionOutcome {
    match transcriber.transcribe_file(path) {
        Ok(text) => TranscriptionOutcome::Text(text),
        Err(e) => TranscriptionOutcome::Failed {
            reason: e.to_string(),
        },
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
}

impl MockTranscriber {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe_file(&self, _path: &Path) -> Result<String> {
        if self.should_fail {
            Err(VoicebankError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
