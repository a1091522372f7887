//! Command entry points.
//!
//! Drives the full flow for each user action: capture → persist →
//! transcribe → append → publish. The transcription model is loaded once per
//! process and shared by reference across everything that needs it.

use crate::audio::capture::{CpalAudioSource, suppress_audio_warnings};
use crate::audio::recorder::AudioSource;
use crate::capture::CapturedAudio;
use crate::config::{Config, HubConfig};
use crate::defaults;
use crate::error::{Result, VoicebankError};
use crate::hub::api::HfHubClient;
use crate::ledger::MetadataLedger;
use crate::models::download::{
    download_model, find_any_installed_model, is_model_installed, model_path,
};
use crate::pipeline::{SampleOutcome, run_sample};
use crate::store::SampleStore;
use crate::stt::transcriber::Transcriber;
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

/// Run the record command: capture from the microphone until Enter, then
/// submit the sample through the pipeline.
pub async fn run_record_command(
    mut config: Config,
    device: Option<String>,
    model: Option<String>,
    language: Option<String>,
    quiet: bool,
    no_download: bool,
) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    if let Some(d) = device {
        config.audio.device = Some(d);
    }
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(l) = language {
        config.stt.language = l;
    }

    let (store, ledger) = open_storage(&config)?;
    let hub = build_hub(&config)?;

    // Load model ONCE before recording (this is the slow part)
    if !quiet {
        eprintln!(
            "Loading model '{}' ({} backend)...",
            config.stt.model,
            defaults::gpu_backend()
        );
    }
    let transcriber = create_transcriber(&config, quiet, no_download).await?;

    let samples = record_until_enter(&config, quiet)?;
    if samples.is_empty() {
        return Err(VoicebankError::AudioCapture {
            message: "no audio captured".to_string(),
        });
    }
    if !quiet {
        eprintln!(
            "Captured {:.1}s of audio.",
            samples.len() as f64 / defaults::RECORD_SAMPLE_RATE as f64
        );
    }

    let captured = CapturedAudio::from_recording(&samples);
    submit(&captured, &store, &ledger, transcriber.as_ref(), &hub, quiet).await
}

/// Run the upload command: submit an existing audio file through the pipeline.
pub async fn run_upload_command(
    mut config: Config,
    file: &Path,
    model: Option<String>,
    language: Option<String>,
    quiet: bool,
    no_download: bool,
) -> Result<()> {
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(l) = language {
        config.stt.language = l;
    }

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| VoicebankError::Capture {
            message: format!("'{}' has no usable filename", file.display()),
        })?;
    let bytes = std::fs::read(file)?;
    let captured = CapturedAudio::from_upload(filename, bytes)?;

    let (store, ledger) = open_storage(&config)?;
    let hub = build_hub(&config)?;

    if !quiet {
        eprintln!(
            "Loading model '{}' ({} backend)...",
            config.stt.model,
            defaults::gpu_backend()
        );
    }
    let transcriber = create_transcriber(&config, quiet, no_download).await?;

    submit(&captured, &store, &ledger, transcriber.as_ref(), &hub, quiet).await
}

/// Print the metadata ledger.
pub fn run_ledger_command(config: Config) -> Result<()> {
    let (_store, ledger) = open_storage(&config)?;

    if !ledger.path().exists() {
        println!("No samples collected yet.");
        return Ok(());
    }

    let rows = ledger.read_all()?;
    for row in &rows {
        println!("{}\t{}", row.audio, row.text);
    }
    eprintln!("{} row(s)", rows.len());
    Ok(())
}

/// Push the current local state to the dataset repository.
pub async fn run_publish_command(config: Config, quiet: bool) -> Result<()> {
    let (store, ledger) = open_storage(&config)?;
    let hub = build_hub(&config)?;

    if !ledger.path().exists() {
        return Err(VoicebankError::Ledger {
            message: "no metadata ledger yet; submit a sample first".to_string(),
        });
    }

    if !quiet {
        eprintln!("Publishing to '{}'...", hub.repo_id());
    }
    crate::hub::publisher::publish(&hub, &store, &ledger).await?;
    if !quiet {
        eprintln!("{}", "Upload complete.".green());
    }
    Ok(())
}

/// Open the sample store and ledger under the configured base directory.
fn open_storage(config: &Config) -> Result<(SampleStore, MetadataLedger)> {
    let store = SampleStore::new(config.storage.resolve_base_dir())?;
    let ledger = MetadataLedger::new(store.metadata_path());
    Ok((store, ledger))
}

/// Build the Hub client from configuration.
///
/// The repository id comes from the config file or HF_REPO_ID; the bearer
/// token comes from HF_TOKEN only.
fn build_hub(config: &Config) -> Result<HfHubClient> {
    let repo_id = config.hub.repo_id.as_deref().ok_or_else(|| {
        VoicebankError::ConfigInvalidValue {
            key: "hub.repo_id".to_string(),
            message: "not set; add it to config.toml or set HF_REPO_ID".to_string(),
        }
    })?;

    let token = HubConfig::token().ok_or_else(|| VoicebankError::ConfigInvalidValue {
        key: defaults::HUB_TOKEN_ENV.to_string(),
        message: "environment variable not set".to_string(),
    })?;

    Ok(HfHubClient::new(&config.hub.endpoint, repo_id, &token))
}

/// Record from the configured input device until the user presses Enter.
fn record_until_enter(config: &Config, quiet: bool) -> Result<Vec<i16>> {
    let mut source = CpalAudioSource::new(config.audio.device.as_deref())?;
    source.start()?;

    if !quiet {
        eprintln!("{}", "Recording... press Enter to stop.".yellow());
    }
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    source.stop()?;
    source.read_samples()
}

/// Run one sample through the pipeline and report the outcome.
async fn submit(
    captured: &CapturedAudio,
    store: &SampleStore,
    ledger: &MetadataLedger,
    transcriber: &dyn Transcriber,
    hub: &HfHubClient,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        eprintln!("Transcribing...");
    }

    match run_sample(captured, store, ledger, transcriber, hub).await? {
        SampleOutcome::Published { sample, transcript } => {
            println!("{}", transcript);
            if !quiet {
                eprintln!("Saved as {}", sample.path.display());
                eprintln!(
                    "{}",
                    format!("Published to '{}'.", hub.repo_id()).green()
                );
            }
            Ok(())
        }
        SampleOutcome::TranscriptionFailed { sample, reason } => {
            eprintln!("{}", format!("Transcription failed: {}", reason).red());
            eprintln!(
                "Audio kept at {}; not added to the ledger, not published.",
                sample.path.display()
            );
            Ok(())
        }
    }
}

/// Create the transcriber, handling model download if needed.
async fn create_transcriber(
    config: &Config,
    quiet: bool,
    no_download: bool,
) -> Result<Arc<dyn Transcriber>> {
    let model_name = &config.stt.model;

    let model_to_use = if is_model_installed(model_name) {
        model_name.clone()
    } else if no_download {
        if let Some(fallback) = find_any_installed_model() {
            if !quiet {
                eprintln!(
                    "Model '{}' not installed (--no-download). Using '{}'.",
                    model_name, fallback
                );
            }
            fallback
        } else {
            return Err(VoicebankError::Transcription {
                message: format!(
                    "Model '{}' not installed and --no-download specified.\n\
                     Run: voicebank models install {}",
                    model_name, model_name
                ),
            });
        }
    } else {
        if !quiet {
            eprintln!("Downloading model '{}'...", model_name);
        }
        download_model(model_name, !quiet).await?;
        if !quiet {
            eprintln!("Download complete.");
        }
        model_name.clone()
    };

    let whisper_config = WhisperConfig {
        model_path: model_path(&model_to_use),
        language: config.stt.language.clone(),
        threads: None,
    };

    Ok(Arc::new(WhisperTranscriber::new(whisper_config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.base_dir = Some(dir.to_path_buf());
        config.hub.repo_id = Some("org/voices".to_string());
        config
    }

    #[test]
    fn open_storage_creates_layout_under_base_dir() {
        let dir = tempdir().unwrap();
        let (store, ledger) = open_storage(&config_in(dir.path())).unwrap();

        assert!(store.audio_dir().is_dir());
        assert_eq!(ledger.path(), store.metadata_path());
    }

    #[test]
    fn build_hub_requires_repo_id() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(defaults::HUB_TOKEN_ENV, "hf_test_token");

        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.hub.repo_id = None;

        match build_hub(&config) {
            Err(VoicebankError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "hub.repo_id");
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }

        remove_env(defaults::HUB_TOKEN_ENV);
    }

    #[test]
    fn build_hub_requires_token() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env(defaults::HUB_TOKEN_ENV);

        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        match build_hub(&config) {
            Err(VoicebankError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, defaults::HUB_TOKEN_ENV);
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn build_hub_with_token_and_repo_succeeds() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(defaults::HUB_TOKEN_ENV, "hf_test_token");

        let dir = tempdir().unwrap();
        let hub = build_hub(&config_in(dir.path())).unwrap();
        assert_eq!(hub.repo_id(), "org/voices");

        remove_env(defaults::HUB_TOKEN_ENV);
    }

    #[test]
    fn ledger_command_handles_missing_ledger() {
        let dir = tempdir().unwrap();
        assert!(run_ledger_command(config_in(dir.path())).is_ok());
    }

    #[tokio::test]
    async fn publish_command_without_samples_errors() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(defaults::HUB_TOKEN_ENV, "hf_test_token");

        let dir = tempdir().unwrap();
        let result = run_publish_command(config_in(dir.path()), true).await;
        assert!(matches!(result, Err(VoicebankError::Ledger { .. })));

        remove_env(defaults::HUB_TOKEN_ENV);
    }
}
