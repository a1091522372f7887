//! Audio persister: writes captured samples under the local audio tree.
//!
//! Layout relative to the base directory:
//! - `audio/uploaded/<uuid>.<ext>`: uploads, bytes verbatim
//! - `audio/recorded/<uuid>.wav`: recordings, WAV-encoded
//! - `data/metadata.csv`: the metadata ledger (written by [`crate::ledger`])

use crate::capture::{CapturedAudio, SourceType};
use crate::defaults;
use crate::error::{Result, VoicebankError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A sample persisted to the local audio tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSample {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Bare filename (`<uuid>.<ext>`).
    pub filename: String,
    /// Provenance, determining the subdirectory.
    pub source: SourceType,
}

/// Local sample storage rooted at a base directory.
///
/// Files are content-addressed by a fresh UUIDv4 per sample; collisions are
/// treated as impossible. Samples are never mutated or deleted once written.
pub struct SampleStore {
    base_dir: PathBuf,
}

impl SampleStore {
    /// Open the store, creating the directory layout if absent.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            base_dir: base_dir.into(),
        };
        for dir in [
            store.source_dir(SourceType::Uploaded),
            store.source_dir(SourceType::Recorded),
            store.data_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(|e| VoicebankError::Persist {
                message: format!("failed to create {}: {e}", dir.display()),
            })?;
        }
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Root of the audio tree (`<base>/audio`).
    pub fn audio_dir(&self) -> PathBuf {
        self.base_dir.join("audio")
    }

    /// Subdirectory for one source type (`<base>/audio/uploaded` etc.).
    pub fn source_dir(&self, source: SourceType) -> PathBuf {
        self.audio_dir().join(source.dir_name())
    }

    /// Data directory holding the metadata ledger.
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Path of the metadata ledger file.
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir().join(defaults::METADATA_FILENAME)
    }

    /// Persist a captured sample, returning its storage location.
    ///
    /// Uploads are written verbatim with their lower-cased original
    /// extension. Recordings are WAV-encoded at 44.1kHz mono 16-bit.
    /// Write failures are fatal to the pipeline invocation; nothing retries.
    pub fn save(&self, captured: &CapturedAudio) -> Result<StoredSample> {
        let id = Uuid::new_v4();
        let source = captured.source();

        let filename = match captured.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => format!("{id}.wav"),
        };
        let path = self.source_dir(source).join(&filename);

        match source {
            SourceType::Uploaded => {
                fs::write(&path, captured.bytes()).map_err(|e| VoicebankError::Persist {
                    message: format!("failed to write {}: {e}", path.display()),
                })?;
            }
            SourceType::Recorded => {
                let samples = captured.pcm_samples()?;
                write_wav(&path, &samples)?;
            }
        }

        Ok(StoredSample {
            path,
            filename,
            source,
        })
    }
}

/// Encode PCM samples into an uncompressed WAV container at the recording rate.
fn write_wav(path: &Path, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: defaults::RECORD_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| VoicebankError::Persist {
        message: format!("failed to create {}: {e}", path.display()),
    })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| VoicebankError::Persist {
                message: format!("failed to write sample to {}: {e}", path.display()),
            })?;
    }

    writer.finalize().map_err(|e| VoicebankError::Persist {
        message: format!("failed to finalize {}: {e}", path.display()),
    })
}
