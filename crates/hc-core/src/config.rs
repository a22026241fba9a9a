//! Application configuration types.
//!
//! The top-level [`Config`] struct carries all sub-configs for clip windows,
//! fetching, encoding and tool paths. Every section defaults sensibly so a
//! completely empty config file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::Error;

/// Longest clip window accepted by [`Config::check`], in seconds (one day).
pub const MAX_CLIP_SECONDS: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clip: ClipConfig,
    pub fetch: FetchConfig,
    pub encode: EncodeConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Reject values that make the pipeline impossible to run.
    pub fn check(&self) -> Result<()> {
        let clip = &self.clip;
        for (name, secs) in [
            ("clip.before_seconds", clip.before_seconds),
            ("clip.after_seconds", clip.after_seconds),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(Error::Validation(format!(
                    "{name} must be a non-negative number, got {secs}"
                )));
            }
            if secs > MAX_CLIP_SECONDS {
                return Err(Error::Validation(format!(
                    "{name} must be at most {MAX_CLIP_SECONDS}, got {secs}"
                )));
            }
        }
        if clip.max_segments == 0 {
            return Err(Error::Validation("clip.max_segments must be at least 1".into()));
        }
        if self.fetch.concurrency == 0 {
            return Err(Error::Validation("fetch.concurrency must be at least 1".into()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::Validation("fetch.timeout_secs must be at least 1".into()));
        }
        if self.encode.timeout_secs == 0 {
            return Err(Error::Validation("encode.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.clip.before_seconds == 0.0 {
            warnings.push("clip.before_seconds is 0; the before clip will be empty".into());
        }
        if self.clip.after_seconds == 0.0 {
            warnings.push("clip.after_seconds is 0; the after clip will be empty".into());
        }
        if self.clip.max_segments > 10 {
            warnings.push(format!(
                "clip.max_segments is {}; every selected segment is downloaded and re-encoded",
                self.clip.max_segments
            ));
        }
        if self.clip.before_file == self.clip.after_file {
            warnings.push(format!(
                "clip.before_file and clip.after_file are both '{}'; one clip will overwrite the other",
                self.clip.before_file
            ));
        }
        if self.fetch.retries > 5 {
            warnings.push(format!("fetch.retries is {}; failures will be slow", self.fetch.retries));
        }
        if let Some(ref path) = self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    path.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Clip window and output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Length of the clip ending at the reference instant.
    pub before_seconds: f64,
    /// Length of the clip starting at the reference instant.
    pub after_seconds: f64,
    /// Most segments a selection may contain.
    pub max_segments: usize,
    pub output_dir: PathBuf,
    pub before_file: String,
    pub after_file: String,
    /// Parent of the per-request working directories (OS temp dir if unset).
    pub work_dir: Option<PathBuf>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            before_seconds: 10.0,
            after_seconds: 10.0,
            max_segments: 3,
            output_dir: PathBuf::from("output"),
            before_file: "before_video.ts".into(),
            after_file: "after_video.ts".into(),
            work_dir: None,
        }
    }
}

impl ClipConfig {
    /// Resolved parent directory for per-request workspaces.
    pub fn work_root(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Playlist and segment retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Extra attempts after a transport error or 5xx response.
    pub retries: u32,
    pub retry_backoff_ms: u64,
    /// Concurrent segment downloads per selection.
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 0,
            retry_backoff_ms: 500,
            concurrency: 3,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Re-encode policy for the trimmed clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub video_codec: String,
    pub preset: String,
    /// Output container passed to `-f`.
    pub format: String,
    pub timeout_secs: u64,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".into(),
            preset: "fast".into(),
            format: "mpegts".into(),
            timeout_secs: 300,
        }
    }
}

impl EncodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = Config::default();
        assert_eq!(cfg.clip.before_seconds, 10.0);
        assert_eq!(cfg.clip.after_seconds, 10.0);
        assert_eq!(cfg.clip.max_segments, 3);
        assert_eq!(cfg.encode.video_codec, "libx264");
        assert_eq!(cfg.encode.preset, "fast");
        assert!(cfg.check().is_ok());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn empty_json_is_valid() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"clip": {"max_segments": 5}}"#).unwrap();
        assert_eq!(cfg.clip.max_segments, 5);
        assert_eq!(cfg.clip.before_seconds, 10.0);
        assert_eq!(cfg.fetch.concurrency, 3);
    }

    #[test]
    fn check_rejects_zero_max_segments() {
        let mut cfg = Config::default();
        cfg.clip.max_segments = 0;
        let err = cfg.check().unwrap_err();
        assert!(err.to_string().contains("max_segments"));
    }

    #[test]
    fn check_rejects_negative_seconds() {
        let mut cfg = Config::default();
        cfg.clip.after_seconds = -1.0;
        assert!(cfg.check().is_err());
        cfg.clip.after_seconds = f64::NAN;
        assert!(cfg.check().is_err());
    }

    #[test]
    fn check_rejects_windows_longer_than_a_day() {
        let mut cfg = Config::default();
        cfg.clip.before_seconds = 1e13;
        let err = cfg.check().unwrap_err();
        assert!(err.to_string().contains("clip.before_seconds must be at most"), "{err}");

        cfg.clip.before_seconds = MAX_CLIP_SECONDS;
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn validate_warns_on_shared_output_file() {
        let mut cfg = Config::default();
        cfg.clip.after_file = cfg.clip.before_file.clone();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("overwrite"));
    }
}
