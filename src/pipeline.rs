//! The per-sample pipeline: persist → transcribe → append → publish.
//!
//! One invocation handles exactly one submitted sample, with each step
//! completing before the next starts. Only transcription failure is
//! recovered: it ends the invocation for that sample without a ledger row
//! and without publishing. Every other error is fatal to the invocation.

use crate::capture::CapturedAudio;
use crate::error::Result;
use crate::hub::api::DatasetHub;
use crate::hub::publisher::publish;
use crate::ledger::MetadataLedger;
use crate::store::{SampleStore, StoredSample};
use crate::stt::transcriber::{TranscriptionOutcome, Transcriber, transcribe_sample};

/// Result of one pipeline invocation.
#[derive(Debug)]
pub enum SampleOutcome {
    /// The sample was transcribed, recorded in the ledger, and published.
    Published {
        sample: StoredSample,
        transcript: String,
    },
    /// The model call failed; the audio file is kept on disk but no ledger
    /// row was written and nothing was published.
    TranscriptionFailed {
        sample: StoredSample,
        reason: String,
    },
}

/// Run one sample through the full pipeline.
pub async fn run_sample(
    captured: &CapturedAudio,
    store: &SampleStore,
    ledger: &MetadataLedger,
    transcriber: &dyn Transcriber,
    hub: &dyn DatasetHub,
) -> Result<SampleOutcome> {
    let sample = store.save(captured)?;

    match transcribe_sample(transcriber, &sample.path) {
        TranscriptionOutcome::Text(transcript) => {
            ledger.append(sample.source, &sample.filename, &transcript)?;
            publish(hub, store, ledger).await?;
            Ok(SampleOutcome::Published { sample, transcript })
        }
        TranscriptionOutcome::Failed { reason } => {
            Ok(SampleOutcome::TranscriptionFailed { sample, reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SourceType;
    use crate::hub::api::MockHub;
    use crate::stt::transcriber::MockTranscriber;
    use tempfile::tempdir;

    fn fixtures(dir: &std::path::Path) -> (SampleStore, MetadataLedger) {
        let store = SampleStore::new(dir).unwrap();
        let ledger = MetadataLedger::new(store.metadata_path());
        (store, ledger)
    }

    #[tokio::test]
    async fn successful_sample_is_appended_and_published() {
        let dir = tempdir().unwrap();
        let (store, ledger) = fixtures(dir.path());
        let transcriber = MockTranscriber::new("m").with_response("the quick brown fox");
        let hub = MockHub::new();

        let captured = CapturedAudio::from_recording(&[0i16, 1000, -1000]);
        let outcome = run_sample(&captured, &store, &ledger, &transcriber, &hub)
            .await
            .unwrap();

        let sample = match outcome {
            SampleOutcome::Published { sample, transcript } => {
                assert_eq!(transcript, "the quick brown fox");
                sample
            }
            other => panic!("Expected Published, got {:?}", other),
        };

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].audio,
            format!("audio/recorded/{}", sample.filename)
        );
        assert_eq!(rows[0].text, "the quick brown fox");

        assert_eq!(
            hub.operations(),
            vec!["ensure_repo", "upload_folder", "upload_file:metadata.csv"]
        );
    }

    #[tokio::test]
    async fn transcription_failure_short_circuits() {
        let dir = tempdir().unwrap();
        let (store, ledger) = fixtures(dir.path());
        let transcriber = MockTranscriber::new("m").with_failure();
        let hub = MockHub::new();

        let captured = CapturedAudio::from_recording(&[0i16; 100]);
        let outcome = run_sample(&captured, &store, &ledger, &transcriber, &hub)
            .await
            .unwrap();

        match outcome {
            SampleOutcome::TranscriptionFailed { sample, reason } => {
                assert!(sample.path.exists(), "audio file should be kept");
                assert!(reason.contains("mock transcription failure"));
            }
            other => panic!("Expected TranscriptionFailed, got {:?}", other),
        }

        // No ledger row, no remote traffic.
        assert!(!ledger.path().exists());
        assert!(hub.operations().is_empty());
    }

    #[tokio::test]
    async fn transcription_failure_leaves_existing_ledger_unchanged() {
        let dir = tempdir().unwrap();
        let (store, ledger) = fixtures(dir.path());
        let hub = MockHub::new();

        let good = MockTranscriber::new("m").with_response("first");
        let captured = CapturedAudio::from_recording(&[1i16, 2]);
        run_sample(&captured, &store, &ledger, &good, &hub)
            .await
            .unwrap();
        let before = ledger.read_all().unwrap();

        let bad = MockTranscriber::new("m").with_failure();
        run_sample(&captured, &store, &ledger, &bad, &hub)
            .await
            .unwrap();

        assert_eq!(ledger.read_all().unwrap(), before);
    }

    #[tokio::test]
    async fn sequential_samples_append_in_submission_order() {
        let dir = tempdir().unwrap();
        let (store, ledger) = fixtures(dir.path());
        let hub = MockHub::new();

        let mut filenames = Vec::new();
        for i in 0..3 {
            let transcriber =
                MockTranscriber::new("m").with_response(&format!("transcript {i}"));
            let captured = CapturedAudio::from_recording(&[i as i16; 10]);
            let outcome = run_sample(&captured, &store, &ledger, &transcriber, &hub)
                .await
                .unwrap();
            match outcome {
                SampleOutcome::Published { sample, .. } => filenames.push(sample.filename),
                other => panic!("Expected Published, got {:?}", other),
            }
        }

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.audio, format!("audio/recorded/{}", filenames[i]));
            assert_eq!(row.text, format!("transcript {i}"));
        }
    }

    #[tokio::test]
    async fn upload_sample_lands_in_uploaded_subtree() {
        let dir = tempdir().unwrap();
        let (store, ledger) = fixtures(dir.path());
        let transcriber = MockTranscriber::new("m").with_response("spoken words");
        let hub = MockHub::new();

        let captured = CapturedAudio::from_upload("Voice Memo.M4A", vec![0u8; 64]).unwrap();
        run_sample(&captured, &store, &ledger, &transcriber, &hub)
            .await
            .unwrap();

        let rows = ledger.read_all().unwrap();
        assert!(rows[0].audio.starts_with("audio/uploaded/"));
        assert!(rows[0].audio.ends_with(".m4a"));

        let remote = hub.remote_files();
        assert!(remote.keys().any(|k| k.starts_with("uploaded/")));
    }

    #[tokio::test]
    async fn publish_failure_propagates_after_append() {
        let dir = tempdir().unwrap();
        let (store, ledger) = fixtures(dir.path());
        let transcriber = MockTranscriber::new("m").with_response("words");
        let hub = MockHub::new().with_upload_failure();

        let captured = CapturedAudio::from_recording(&[5i16; 20]);
        let result = run_sample(&captured, &store, &ledger, &transcriber, &hub).await;

        // The ledger row was written before the publish failure; the remote
        // is simply behind until the next successful publish.
        assert!(result.is_err());
        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }
}
