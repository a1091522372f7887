//! Capture adapter: normalizes the two input modes into one shape.
//!
//! Uploads arrive as named file bytes; recordings arrive as raw PCM samples.
//! Both become a [`CapturedAudio`] carrying the bytes and their provenance.
//! This module performs no I/O and never inspects audio content.

use crate::defaults::ALLOWED_UPLOAD_EXTENSIONS;
use crate::error::{Result, VoicebankError};
use std::path::Path;

/// Provenance of a captured sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Uploaded,
    Recorded,
}

impl SourceType {
    /// Directory name for this source type inside the audio tree.
    pub fn dir_name(&self) -> &'static str {
        match self {
            SourceType::Uploaded => "uploaded",
            SourceType::Recorded => "recorded",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One captured audio clip, normalized from either input mode.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    bytes: Vec<u8>,
    source: SourceType,
    /// Lower-cased extension of the original file. Present for uploads only;
    /// recordings are always persisted as WAV.
    extension: Option<String>,
}

impl CapturedAudio {
    /// Capture an uploaded file.
    ///
    /// The extension is taken from `filename`, lower-cased, and checked
    /// against the allowed set. The bytes are kept verbatim; the actual
    /// encoding is never inspected.
    pub fn from_upload(filename: &str, bytes: Vec<u8>) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| VoicebankError::Capture {
                message: format!("filename '{}' has no extension", filename),
            })?;

        if !ALLOWED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
            return Err(VoicebankError::UnsupportedExtension { extension });
        }

        Ok(Self {
            bytes,
            source: SourceType::Uploaded,
            extension: Some(extension),
        })
    }

    /// Capture a live recording.
    ///
    /// Samples are assumed to be 16-bit signed PCM at 44.1kHz mono. No
    /// resampling or validation happens here; if the actual stream differs,
    /// the WAV written downstream will misrepresent the data.
    pub fn from_recording(samples: &[i16]) -> Self {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        Self {
            bytes,
            source: SourceType::Recorded,
            extension: None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source(&self) -> SourceType {
        self.source
    }

    /// Lower-cased original extension (uploads only).
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Decode the captured bytes as 16-bit little-endian PCM samples.
    ///
    /// A buffer that is not a whole number of 16-bit frames cannot be
    /// interpreted under the capture contract and is rejected.
    pub fn pcm_samples(&self) -> Result<Vec<i16>> {
        if self.bytes.len() % 2 != 0 {
            return Err(VoicebankError::Capture {
                message: format!(
                    "recording buffer of {} bytes is not a whole number of 16-bit samples",
                    self.bytes.len()
                ),
            });
        }

        Ok(self
            .bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_dir_names() {
        assert_eq!(SourceType::Uploaded.dir_name(), "uploaded");
        assert_eq!(SourceType::Recorded.dir_name(), "recorded");
    }

    #[test]
    fn source_type_display_matches_dir_name() {
        assert_eq!(SourceType::Uploaded.to_string(), "uploaded");
        assert_eq!(SourceType::Recorded.to_string(), "recorded");
    }

    #[test]
    fn from_upload_accepts_allowed_extensions() {
        for ext in ["wav", "mp3", "m4a", "mp4"] {
            let captured =
                CapturedAudio::from_upload(&format!("clip.{ext}"), vec![1, 2, 3]).unwrap();
            assert_eq!(captured.source(), SourceType::Uploaded);
            assert_eq!(captured.extension(), Some(ext));
        }
    }

    #[test]
    fn from_upload_lowercases_extension() {
        let captured = CapturedAudio::from_upload("clip.MP3", vec![0u8; 4]).unwrap();
        assert_eq!(captured.extension(), Some("mp3"));
    }

    #[test]
    fn from_upload_keeps_bytes_verbatim() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        let captured = CapturedAudio::from_upload("clip.wav", bytes.clone()).unwrap();
        assert_eq!(captured.bytes(), bytes.as_slice());
    }

    #[test]
    fn from_upload_rejects_unknown_extension() {
        let result = CapturedAudio::from_upload("clip.ogg", vec![1]);
        match result {
            Err(VoicebankError::UnsupportedExtension { extension }) => {
                assert_eq!(extension, "ogg");
            }
            other => panic!("Expected UnsupportedExtension, got {:?}", other),
        }
    }

    #[test]
    fn from_upload_rejects_missing_extension() {
        let result = CapturedAudio::from_upload("clip", vec![1]);
        match result {
            Err(VoicebankError::Capture { message }) => {
                assert!(message.contains("no extension"), "got: {}", message);
            }
            other => panic!("Expected Capture error, got {:?}", other),
        }
    }

    #[test]
    fn from_recording_encodes_little_endian() {
        let captured = CapturedAudio::from_recording(&[1, -2]);
        assert_eq!(captured.source(), SourceType::Recorded);
        assert_eq!(captured.extension(), None);
        assert_eq!(captured.bytes(), &[0x01, 0x00, 0xfe, 0xff]);
    }

    #[test]
    fn pcm_samples_round_trips_recording() {
        let samples = vec![0i16, 1000, -1000, i16::MAX, i16::MIN];
        let captured = CapturedAudio::from_recording(&samples);
        assert_eq!(captured.pcm_samples().unwrap(), samples);
    }

    #[test]
    fn pcm_samples_rejects_odd_length_buffer() {
        let captured = CapturedAudio {
            bytes: vec![0u8; 3],
            source: SourceType::Recorded,
            extension: None,
        };
        assert!(matches!(
            captured.pcm_samples(),
            Err(VoicebankError::Capture { .. })
        ));
    }

    #[test]
    fn pcm_samples_of_empty_recording_is_empty() {
        let captured = CapturedAudio::from_recording(&[]);
        assert_eq!(captured.pcm_samples().unwrap(), Vec::<i16>::new());
    }
}
