//! Trim and re-encode a concatenated segment sequence with ffmpeg.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hc_core::config::EncodeConfig;
use hc_core::Error;

use crate::command::ToolCommand;
use crate::concat::ConcatList;
use crate::tools::ToolRegistry;
use crate::workspace::Workspace;

/// File name of the concat descriptor inside the workspace.
const CONCAT_LIST_NAME: &str = "concat_list.txt";

/// Parameters for one trim invocation.
#[derive(Debug, Clone)]
pub struct TrimRequest<'a> {
    /// Local segment files in ascending start order.
    pub inputs: &'a ConcatList,
    /// Seconds from the start of the concatenated sequence.
    pub start_offset: f64,
    /// Requested clip length in seconds. ffmpeg stops early if the source
    /// runs out.
    pub duration: f64,
    pub encode: &'a EncodeConfig,
    /// Overrides the tool's default timeout.
    pub timeout: Option<Duration>,
}

fn build_args(list: &Path, output: &Path, request: &TrimRequest<'_>) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-hide_banner", "-f", "concat", "-safe", "0", "-i"]
        .into_iter()
        .map(String::from)
        .collect();
    args.push(list.to_string_lossy().to_string());
    args.extend([
        "-ss".to_string(),
        format!("{:.3}", request.start_offset),
        "-t".to_string(),
        format!("{:.3}", request.duration),
        "-c:v".to_string(),
        request.encode.video_codec.clone(),
        "-preset".to_string(),
        request.encode.preset.clone(),
        "-an".to_string(),
        "-f".to_string(),
        request.encode.format.clone(),
    ]);
    args.push(output.to_string_lossy().to_string());
    args
}

/// Write the concat descriptor into the workspace and run ffmpeg over it,
/// producing a video-only clip at [`Workspace::output`].
///
/// # Errors
///
/// - [`Error::Tool`] if ffmpeg is not available.
/// - [`Error::Timeout`] if ffmpeg runs past its timeout.
/// - [`Error::Trim`] if ffmpeg fails for any other reason.
pub async fn trim_concat(
    workspace: &Workspace,
    tools: &ToolRegistry,
    request: &TrimRequest<'_>,
) -> hc_core::Result<PathBuf> {
    if request.inputs.is_empty() {
        return Err(Error::trim("no input segments to concatenate"));
    }

    let ffmpeg = tools.require("ffmpeg")?;

    let list_path = workspace.temp_file(CONCAT_LIST_NAME);
    request.inputs.write_to(&list_path)?;

    let output = workspace.output();

    tracing::info!(
        "trim {} segments: -ss {:.3} -t {:.3} -> {}",
        request.inputs.len(),
        request.start_offset,
        request.duration,
        output.display()
    );

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.timeout(request.timeout.unwrap_or(ffmpeg.timeout));
    cmd.args(build_args(&list_path, &output, request));

    match cmd.execute().await {
        Ok(_) => Ok(output),
        Err(e @ Error::Timeout { .. }) => Err(e),
        Err(e) => Err(Error::trim(e.to_string())),
    }
}
