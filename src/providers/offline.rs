/*!
 * Local offline translation engine, run as a subprocess.
 *
 * The engine receives a JSON array of strings on stdin and must print a JSON
 * array of the same length on stdout. Arguments may contain a `{target}`
 * placeholder, replaced by the target language code.
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;
use super::{Provider, body_excerpt, ensure_count};

/// Placeholder substituted in engine arguments
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Offline engine backend
#[derive(Debug, Clone)]
pub struct OfflineEngine {
    /// Executable name or path; `None` when not configured
    binary_path: Option<String>,
    /// Extra arguments
    args: Vec<String>,
    /// Target language (ISO 639-1)
    target_language: String,
    /// Deadline of one invocation
    timeout: Duration,
}

impl OfflineEngine {
    pub fn new(
        binary_path: Option<String>,
        args: Vec<String>,
        target_language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            binary_path: binary_path
                .map(|path| path.trim().to_string())
                .filter(|path| !path.is_empty()),
            args,
            target_language: target_language.into(),
            timeout,
        }
    }

    /// Arguments with the target placeholder filled in
    pub fn resolved_args(&self) -> Vec<String> {
        self.args.iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, &self.target_language))
            .collect()
    }

    /// Locate the executable, searching `PATH` for bare names
    pub fn executable(&self) -> Option<PathBuf> {
        self.binary_path.as_deref().and_then(resolve_executable)
    }
}

/// Resolve a configured engine name to an executable file
pub fn resolve_executable(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(binary))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[async_trait]
impl Provider for OfflineEngine {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::Offline
    }

    fn is_available(&self) -> bool {
        self.executable().is_some()
    }

    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let executable = self.executable().ok_or_else(|| {
            ProviderError::Unavailable(match &self.binary_path {
                Some(path) => format!("Offline engine '{}' not found or not executable", path),
                None => "No offline engine configured".to_string(),
            })
        })?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::to_vec(texts)
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to encode engine input: {}", e)))?;

        debug!("Running offline engine {} on {} strings", executable.display(), texts.len());
        let mut child = Command::new(&executable)
            .args(self.resolved_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProviderError::ProcessFailed(format!("Failed to start {}: {}", executable.display(), e)))?;

        // Feed stdin concurrently so a chatty engine cannot block on a full stdout pipe
        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!("Offline engine closed stdin early: {}", e);
                }
            });
        }

        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|e| ProviderError::ProcessFailed(format!("Failed to wait for offline engine: {}", e)))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                warn!("Offline engine timed out after {:?}", self.timeout);
                return Err(ProviderError::Timeout(format!("Offline engine exceeded {:?}", self.timeout)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Offline engine failed ({}): {}", output.status, body_excerpt(stderr.trim()));
            return Err(ProviderError::ProcessFailed(format!(
                "Offline engine exited with {}: {}",
                output.status,
                body_excerpt(stderr.trim())
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let translated: Vec<String> = serde_json::from_str(stdout.trim())
            .map_err(|e| ProviderError::ParseError(format!("Offline engine output is not a JSON string array: {}", e)))?;
        ensure_count(texts.len(), translated)
    }
}
