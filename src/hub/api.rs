//! HuggingFace Hub dataset repository client.
//!
//! Three operations are consumed: create-or-noop of the repository, a
//! recursive folder mirror, and a single-file upload. Authentication is a
//! bearer token and a fixed repository id, supplied at startup.

use crate::error::{Result, VoicebankError};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use std::fs;
use std::path::Path;

/// Trait for the remote dataset store.
///
/// This trait allows swapping implementations (real Hub vs mock).
#[async_trait]
pub trait DatasetHub: Send + Sync {
    /// Ensure the dataset repository exists; creating it is idempotent.
    async fn ensure_repo(&self) -> Result<()>;

    /// Upload one local file to a path inside the repository, overwriting
    /// any existing remote copy.
    async fn upload_file(&self, local: &Path, remote_path: &str) -> Result<()>;

    /// Mirror a local directory tree into the repository root, overwriting
    /// remote files at the same relative paths.
    async fn upload_folder(&self, dir: &Path) -> Result<()>;
}

/// One file staged for a commit: remote path plus raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StagedFile {
    remote_path: String,
    content: Vec<u8>,
}

/// HuggingFace Hub client for a fixed dataset repository.
#[derive(Debug)]
pub struct HfHubClient {
    client: reqwest::Client,
    endpoint: String,
    repo_id: String,
    token: String,
}

impl HfHubClient {
    pub fn new(endpoint: &str, repo_id: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            repo_id: repo_id.to_string(),
            token: token.to_string(),
        }
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Push staged files as one commit to the repository's main branch.
    async fn commit(&self, summary: &str, files: &[StagedFile]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let url = format!(
            "{}/api/datasets/{}/commit/main",
            self.endpoint, self.repo_id
        );
        let body = build_commit_payload(summary, files);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| VoicebankError::Publish {
                message: format!("commit request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(VoicebankError::Publish {
                message: format!("commit to '{}' failed with {status}: {detail}", self.repo_id),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl DatasetHub for HfHubClient {
    async fn ensure_repo(&self) -> Result<()> {
        let url = format!("{}/api/repos/create", self.endpoint);

        let (organization, name) = split_repo_id(&self.repo_id);
        let mut body = serde_json::json!({
            "type": "dataset",
            "name": name,
        });
        if let Some(org) = organization {
            body["organization"] = serde_json::Value::String(org.to_string());
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoicebankError::Publish {
                message: format!("repo create request failed: {e}"),
            })?;

        if !create_status_ok(response.status()) {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(VoicebankError::Publish {
                message: format!(
                    "failed to create dataset repo '{}': {status}: {detail}",
                    self.repo_id
                ),
            });
        }

        Ok(())
    }

    async fn upload_file(&self, local: &Path, remote_path: &str) -> Result<()> {
        let content = fs::read(local).map_err(|e| VoicebankError::Publish {
            message: format!("failed to read {}: {e}", local.display()),
        })?;

        self.commit(
            &format!("Upload {remote_path}"),
            &[StagedFile {
                remote_path: remote_path.to_string(),
                content,
            }],
        )
        .await
    }

    async fn upload_folder(&self, dir: &Path) -> Result<()> {
        let files = stage_folder(dir)?;
        self.commit("Upload audio folder", &files).await
    }
}

/// Split a repo id into (organization, name). A bare name has no organization.
fn split_repo_id(repo_id: &str) -> (Option<&str>, &str) {
    match repo_id.split_once('/') {
        Some((org, name)) => (Some(org), name),
        None => (None, repo_id),
    }
}

/// A create call is idempotent: an already-existing repo answers 409.
fn create_status_ok(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::CONFLICT
}

/// Build the NDJSON commit payload: one header line, one line per file with
/// base64-encoded content.
fn build_commit_payload(summary: &str, files: &[StagedFile]) -> String {
    let mut lines = Vec::with_capacity(files.len() + 1);
    lines.push(
        serde_json::json!({
            "key": "header",
            "value": { "summary": summary },
        })
        .to_string(),
    );
    for file in files {
        lines.push(
            serde_json::json!({
                "key": "file",
                "value": {
                    "path": file.remote_path,
                    "content": BASE64.encode(&file.content),
                    "encoding": "base64",
                },
            })
            .to_string(),
        );
    }
    lines.join("\n")
}

/// Collect every file under `dir`, keyed by its path relative to `dir`.
///
/// Remote paths always use forward slashes.
fn stage_folder(dir: &Path) -> Result<Vec<StagedFile>> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| VoicebankError::Publish {
            message: format!("failed to walk {}: {e}", dir.display()),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| VoicebankError::Publish {
                message: format!("failed to relativize {}: {e}", entry.path().display()),
            })?;
        let remote_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let content = fs::read(entry.path()).map_err(|e| VoicebankError::Publish {
            message: format!("failed to read {}: {e}", entry.path().display()),
        })?;

        files.push(StagedFile {
            remote_path,
            content,
        });
    }

    Ok(files)
}

/// Mock dataset hub for testing.
///
/// Records every operation and mirrors uploads into an in-memory map keyed by
/// remote path, so tests can assert on the final remote state.
#[derive(Debug, Default)]
pub struct MockHub {
    inner: std::sync::Mutex<MockHubState>,
    fail_ensure_repo: bool,
    fail_uploads: bool,
}

#[derive(Debug, Default)]
struct MockHubState {
    repo_created: bool,
    ensure_repo_calls: usize,
    operations: Vec<String>,
    remote_files: std::collections::BTreeMap<String, Vec<u8>>,
}

impl MockHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on ensure_repo
    pub fn with_ensure_repo_failure(mut self) -> Self {
        self.fail_ensure_repo = true;
        self
    }

    /// Configure the mock to fail on uploads
    pub fn with_upload_failure(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    /// Ordered names of the operations performed so far.
    pub fn operations(&self) -> Vec<String> {
        self.inner.lock().unwrap().operations.clone()
    }

    pub fn ensure_repo_calls(&self) -> usize {
        self.inner.lock().unwrap().ensure_repo_calls
    }

    /// Snapshot of the mirrored remote state: remote path → content.
    pub fn remote_files(&self) -> std::collections::BTreeMap<String, Vec<u8>> {
        self.inner.lock().unwrap().remote_files.clone()
    }
}

#[async_trait]
impl DatasetHub for MockHub {
    async fn ensure_repo(&self) -> Result<()> {
        if self.fail_ensure_repo {
            return Err(VoicebankError::Publish {
                message: "mock ensure_repo failure".to_string(),
            });
        }
        let mut state = self.inner.lock().unwrap();
        state.ensure_repo_calls += 1;
        state.repo_created = true;
        state.operations.push("ensure_repo".to_string());
        Ok(())
    }

    async fn upload_file(&self, local: &Path, remote_path: &str) -> Result<()> {
        if self.fail_uploads {
            return Err(VoicebankError::Publish {
                message: "mock upload failure".to_string(),
            });
        }
        let content = fs::read(local).map_err(|e| VoicebankError::Publish {
            message: format!("failed to read {}: {e}", local.display()),
        })?;
        let mut state = self.inner.lock().unwrap();
        state.operations.push(format!("upload_file:{remote_path}"));
        state.remote_files.insert(remote_path.to_string(), content);
        Ok(())
    }

    async fn upload_folder(&self, dir: &Path) -> Result<()> {
        if self.fail_uploads {
            return Err(VoicebankError::Publish {
                message: "mock upload failure".to_string(),
            });
        }
        let files = stage_folder(dir)?;
        let mut state = self.inner.lock().unwrap();
        state.operations.push("upload_folder".to_string());
        for file in files {
            state.remote_files.insert(file.remote_path, file.content);
        }
        Ok(())
    }
}
