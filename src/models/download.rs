//! Model download and installation management.
//!
//! Handles downloading Whisper models from HuggingFace, verifying their integrity,
//! and storing them in the user's cache directory.

use crate::error::{Result, VoicebankError};
use crate::models::catalog::{ModelInfo, get_model};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the directory where models are stored.
///
/// Uses `~/.cache/voicebank/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("voicebank")
        .join("models")
}

/// Get the full path for a model file.
///
/// Always returns a path regardless of whether the model is in the catalog.
/// The file may or may not exist on disk.
pub fn model_path(name: &str) -> PathBuf {
    let resolved = crate::models::catalog::resolve_name(name);
    let filename = format!("ggml-{resolved}.bin");
    models_dir().join(filename)
}

/// Check if a model is installed.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

/// Core download: fetch url, save to path, verify sha1 if non-empty.
async fn download_to_path(
    name: &str,
    url: &str,
    sha1: &str,
    size_mb: u32,
    output_path: &Path,
    progress: bool,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| VoicebankError::Other(format!("Failed to create models directory: {e}")))?;
    }

    if progress {
        eprintln!("Downloading {name} ({size_mb} MB)...");
    }

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| VoicebankError::Other(format!("Failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(VoicebankError::Other(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            // SAFETY: hardcoded template string — always valid
            #[allow(clippy::expect_used)]
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("hardcoded progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Download with streaming and hash calculation
    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(output_path)
        .map_err(|e| VoicebankError::Other(format!("Failed to create output file: {e}")))?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| VoicebankError::Other(format!("Failed to read download chunk: {e}")))?;

        file.write_all(&chunk)
            .map_err(|e| VoicebankError::Other(format!("Failed to write to file: {e}")))?;

        hasher.update(&chunk);

        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    // Verify SHA-1 checksum
    if !sha1.is_empty() {
        let calculated_hash = format!("{:x}", hasher.finalize());
        if calculated_hash != sha1 {
            if let Err(e) = fs::remove_file(output_path) {
                eprintln!("voicebank: failed to remove corrupted download: {e}");
            }
            return Err(VoicebankError::Other(format!(
                "SHA-1 checksum mismatch. Expected: {sha1}, got: {calculated_hash}"
            )));
        }
        if progress {
            eprintln!("Checksum verified");
        }
    }

    if progress {
        eprintln!("Model installed to: {}", output_path.display());
    }

    Ok(())
}

/// Download a Whisper model from the static catalog.
///
/// # Errors
///
/// Returns an error if:
/// - The model is not in the catalog
/// - The download fails
/// - The SHA-1 checksum doesn't match
/// - The file cannot be written
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);

    if path.exists() {
        if !progress {
            eprintln!(
                "Model '{}' is already installed at {}",
                name,
                path.display()
            );
        }
        return Ok(path);
    }

    let info = get_model(name).ok_or_else(|| {
        VoicebankError::Other(format!(
            "Model '{name}' not found in catalog.\n\
             Run 'voicebank models list' to see available models."
        ))
    })?;

    download_to_path(name, &info.url(), info.sha1, info.size_mb, &path, progress).await?;
    Ok(path)
}

/// Find any installed model from the catalog.
///
/// Scans through all catalog models and returns the first one that is installed.
/// Useful for fallback scenarios when the configured model is not available.
pub fn find_any_installed_model() -> Option<String> {
    crate::models::catalog::list_models()
        .iter()
        .find(|m| is_model_installed(m.name))
        .map(|m| m.name.to_string())
}

/// Format model information for display.
pub fn format_model_info(model: &ModelInfo) -> String {
    let status = if is_model_installed(model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    format!("{:16} {:5} MB   {}", model.name, model.size_mb, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_dir_is_valid_path() {
        let dir = models_dir();
        assert!(dir.to_string_lossy().contains("voicebank"));
        assert!(dir.to_string_lossy().contains("models"));
    }

    #[test]
    fn test_model_path_for_valid_model() {
        let path = model_path("tiny.en");
        assert!(path.to_string_lossy().contains("ggml-tiny.en.bin"));
    }

    #[test]
    fn test_model_path_for_unknown_model() {
        let path = model_path("nonexistent");
        assert!(path.to_string_lossy().contains("ggml-nonexistent.bin"));
    }

    #[test]
    fn test_model_path_resolves_alias() {
        let path = model_path("large");
        assert!(
            path.to_string_lossy().contains("large-v3-turbo"),
            "model_path(\"large\") should resolve to large-v3-turbo, got: {}",
            path.display()
        );
    }

    #[test]
    fn test_is_model_installed_returns_false_for_invalid_model() {
        assert!(!is_model_installed("nonexistent_model_xyz"));
    }

    #[test]
    fn test_format_model_info_shows_name_and_size() {
        let model = get_model("tiny.en").unwrap();
        let formatted = format_model_info(model);
        assert!(formatted.contains("tiny.en"));
        assert!(formatted.contains("75"));
        assert!(formatted.contains("MB"));
        assert!(formatted.contains("installed"));
    }

    #[test]
    fn test_model_path_filename_format() {
        for model in crate::models::catalog::list_models() {
            let path = model_path(model.name);
            let filename = path.file_name().unwrap().to_string_lossy();
            assert!(filename.starts_with("ggml-"), "{}", filename);
            assert!(filename.ends_with(".bin"), "{}", filename);
        }
    }

    #[test]
    fn test_find_any_installed_model_is_from_catalog() {
        if let Some(name) = find_any_installed_model() {
            assert!(get_model(&name).is_some());
        }
    }
}
