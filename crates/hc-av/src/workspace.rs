//! Request-scoped working directories.
//!
//! A [`Workspace`] owns a temporary directory for one clip request: the
//! downloaded segment copies, the concat descriptor and the encoder output
//! all live inside it. The directory is namespaced by clip kind and request
//! ID so concurrent requests never share files, and it is removed when the
//! workspace is dropped, on success and failure alike.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use hc_core::{ClipKind, Error, RequestId};

/// File name of the encoder output inside the workspace.
const OUTPUT_NAME: &str = "clip.out";

/// Temporary directory for one clip request.
///
/// # Example
///
/// ```no_run
/// use hc_av::Workspace;
/// use hc_core::{ClipKind, RequestId};
///
/// let ws = Workspace::new(&std::env::temp_dir(), ClipKind::Before, RequestId::new()).unwrap();
/// // ... download segments into ws.temp_file(..), encode into ws.output() ...
/// ws.finalize(std::path::Path::new("output/before_video.ts")).unwrap();
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: Option<TempDir>,
    path: PathBuf,
    kind: ClipKind,
    request_id: RequestId,
}

impl Workspace {
    /// Create a new workspace directory under `root`.
    ///
    /// The directory name is `hlsclip-<kind>-<request>-<random>`.
    pub fn new(root: &Path, kind: ClipKind, request_id: RequestId) -> hc_core::Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| {
            Error::tool(
                "workspace",
                format!("failed to create work root {}: {e}", root.display()),
            )
        })?;

        let prefix = format!("hlsclip-{kind}-{}-", request_id.short());
        let temp_dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(root)
            .map_err(|e| Error::tool("workspace", format!("failed to create temp dir: {e}")))?;

        let path = temp_dir.path().to_path_buf();
        tracing::debug!("created workspace {}", path.display());

        Ok(Self {
            temp_dir: Some(temp_dir),
            path,
            kind,
            request_id,
        })
    }

    /// Path to the temporary directory.
    pub fn temp_dir(&self) -> &Path {
        &self.path
    }

    /// Create a path for a named temporary file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Where the encoder writes the finished clip before finalization.
    pub fn output(&self) -> PathBuf {
        self.temp_file(OUTPUT_NAME)
    }

    pub fn kind(&self) -> ClipKind {
        self.kind
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Move the finished clip to `dest`, creating parent directories.
    ///
    /// Tries a rename first (same filesystem), falling back to copy. The
    /// workspace directory is removed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file does not exist or if it cannot be
    /// moved into place.
    pub fn finalize(self, dest: &Path) -> hc_core::Result<PathBuf> {
        let output = self.output();

        if !output.exists() {
            return Err(Error::tool(
                "workspace",
                format!("output file does not exist: {}", output.display()),
            ));
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::tool(
                        "workspace",
                        format!("failed to create output dir {}: {e}", parent.display()),
                    )
                })?;
                tracing::info!("created output directory {}", parent.display());
            }
        }

        if let Err(_rename_err) = std::fs::rename(&output, dest) {
            std::fs::copy(&output, dest).map_err(|e| {
                Error::tool(
                    "workspace",
                    format!("failed to copy output to {}: {e}", dest.display()),
                )
            })?;
        }

        Ok(dest.to_path_buf())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(dir) = self.temp_dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => tracing::debug!("removed workspace {}", self.path.display()),
            Err(e) => tracing::warn!("failed to remove workspace {}: {e}", self.path.display()),
        }
    }
}
