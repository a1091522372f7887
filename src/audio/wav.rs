//! WAV decoding for transcription.
//!
//! Persisted samples are stored at their capture rate; Whisper inference
//! expects 16kHz mono. This module loads a WAV file, downmixes to mono, and
//! resamples to the inference rate.

use crate::defaults::WHISPER_SAMPLE_RATE;
use crate::error::{Result, VoicebankError};
use std::path::Path;

/// Load a WAV file as 16kHz mono PCM ready for inference.
///
/// Supports arbitrary source rates and channel counts. Non-WAV content fails
/// to parse here, which the transcription adapter reports as a transcription
/// failure.
pub fn load_for_inference(path: &Path) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path).map_err(|e| VoicebankError::Transcription {
        message: format!("Failed to parse WAV file {}: {}", path.display(), e),
    })?;

    let spec = reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels as usize;

    let raw_samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| VoicebankError::Transcription {
            message: format!("Failed to read WAV samples from {}: {}", path.display(), e),
        })?;

    // Mix to mono by averaging channels
    let mono_samples: Vec<i16> = if source_channels <= 1 {
        raw_samples
    } else {
        raw_samples
            .chunks_exact(source_channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / source_channels as i32) as i16
            })
            .collect()
    };

    Ok(resample(&mono_samples, source_rate, WHISPER_SAMPLE_RATE))
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
