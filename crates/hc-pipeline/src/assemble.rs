//! Clip assembly: selection in, finished clip out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use hc_av::{trim_concat, ConcatList, ToolRegistry, TrimRequest, Workspace};
use hc_core::config::EncodeConfig;
use hc_core::{ClipKind, Instant, Notice, RequestId, Result, Segment, Selection};

use crate::fetch::Fetcher;
use crate::plan::{plan_trim, TrimPlan};

/// One clip to produce.
#[derive(Debug, Clone)]
pub struct ClipRequest<'a> {
    pub selection: &'a Selection,
    pub reference: Instant,
    /// Requested clip length in seconds.
    pub duration: f64,
    pub destination: &'a Path,
    pub request_id: RequestId,
}

/// A clip that was written to its destination.
#[derive(Debug, Clone)]
pub struct ClipOutput {
    pub kind: ClipKind,
    pub request_id: RequestId,
    pub path: PathBuf,
    pub plan: TrimPlan,
    pub segments: usize,
    pub notices: Vec<Notice>,
}

/// Produces clips from selections.
///
/// Every clip gets its own [`Workspace`] under `work_root`; the workspace is
/// removed whether assembly succeeds or fails.
pub struct ClipAssembler {
    fetcher: Arc<dyn Fetcher>,
    tools: Arc<ToolRegistry>,
    encode: EncodeConfig,
    work_root: PathBuf,
    concurrency: usize,
}

impl ClipAssembler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        tools: Arc<ToolRegistry>,
        encode: EncodeConfig,
        work_root: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            tools,
            encode,
            work_root,
            concurrency: 3,
        }
    }

    /// Limit concurrent segment downloads per clip.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Plan, download, trim and move the clip into place.
    ///
    /// # Errors
    ///
    /// Any fetch, trim, timeout or filesystem failure is returned unchanged;
    /// the caller adds clip context.
    pub async fn assemble(&self, request: ClipRequest<'_>) -> Result<ClipOutput> {
        let selection = request.selection;
        let kind = selection.kind();

        let (plan, notices) = plan_trim(selection, request.reference, request.duration)?.into_parts();
        tracing::info!(
            "{kind} clip: {} segments, {:.3}s available, offset {:.3}s, duration {:.3}s",
            selection.len(),
            plan.available,
            plan.start_offset,
            plan.duration
        );

        let workspace = Workspace::new(&self.work_root, kind, request.request_id)?;
        let inputs = self.materialize(&workspace, &selection.segments).await?;

        let trim = TrimRequest {
            inputs: &inputs,
            start_offset: plan.start_offset,
            duration: plan.duration,
            encode: &self.encode,
            timeout: Some(self.encode.timeout()),
        };
        trim_concat(&workspace, &self.tools, &trim).await?;

        let path = workspace.finalize(request.destination)?;
        tracing::info!("{kind} clip written to {}", path.display());

        Ok(ClipOutput {
            kind,
            request_id: request.request_id,
            path,
            plan,
            segments: selection.len(),
            notices,
        })
    }

    /// Download `segments` into the workspace and return them as a concat
    /// list in the order given.
    ///
    /// Downloads run concurrently and complete in any order; each result
    /// carries its position and the list is rebuilt from those positions.
    async fn materialize(&self, workspace: &Workspace, segments: &[Segment]) -> Result<ConcatList> {
        let fetcher = &self.fetcher;
        let mut fetched: Vec<(usize, PathBuf)> = stream::iter(segments.iter().enumerate())
            .map(|(idx, segment)| async move {
                let dest = workspace.temp_file(&format!("{idx:03}-{}", segment.file_name()));
                let bytes = fetcher.fetch_to_file(&segment.locator, &dest).await?;
                tracing::debug!("downloaded {} ({bytes} bytes)", segment.locator);
                Ok::<_, hc_core::Error>((idx, dest))
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        fetched.sort_by_key(|(idx, _)| *idx);

        let mut list = ConcatList::new();
        for (_, path) in &fetched {
            list.push(path)?;
        }
        Ok(list)
    }
}
