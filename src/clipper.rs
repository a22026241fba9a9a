//! End-to-end clip extraction: fetch, parse, select and assemble.
//!
//! [`Clipper`] drives one run. The playlist is fetched and parsed once; the
//! before and after clips then run concurrently against the shared,
//! read-only [`Timeline`], each in its own workspace and tracing span. Each
//! clip reports its own outcome so that one failing never hides or blocks
//! the other.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;
use url::Url;

use hc_av::ToolRegistry;
use hc_core::config::Config;
use hc_core::{ClipKind, Instant, Notice, Outcome, RequestId, Result, Timeline, Window};
use hc_pipeline::{ClipAssembler, ClipOutput, ClipRequest, Fetcher, HttpFetcher};
use hc_playlist::SelectionPolicy;

/// What to cut.
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub playlist: Url,
    pub reference: Instant,
    pub before_seconds: f64,
    pub after_seconds: f64,
}

impl ClipJob {
    /// A job using the clip lengths from `config`.
    pub fn new(playlist: Url, reference: Instant, config: &Config) -> Self {
        Self {
            playlist,
            reference,
            before_seconds: config.clip.before_seconds,
            after_seconds: config.clip.after_seconds,
        }
    }
}

/// Outcome of a run: playlist diagnostics plus one result per clip.
#[derive(Debug)]
pub struct ClipReport {
    pub segments: usize,
    pub parse_notices: Vec<Notice>,
    pub before: Result<ClipOutput>,
    pub after: Result<ClipOutput>,
}

impl ClipReport {
    pub fn is_success(&self) -> bool {
        self.before.is_ok() && self.after.is_ok()
    }

    /// The first failed clip, before-clip first.
    pub fn first_error(&self) -> Option<&hc_core::Error> {
        self.before.as_ref().err().or(self.after.as_ref().err())
    }

    /// Process exit code: 0 when both clips succeeded, otherwise the code of
    /// the first failure.
    pub fn exit_code(&self) -> i32 {
        self.first_error().map_or(0, |e| e.exit_code())
    }

    pub fn outcomes(&self) -> [(ClipKind, &Result<ClipOutput>); 2] {
        [(ClipKind::Before, &self.before), (ClipKind::After, &self.after)]
    }
}

/// Runs clip jobs against a configuration.
pub struct Clipper {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    assembler: ClipAssembler,
}

impl Clipper {
    /// Build a clipper that fetches over HTTP and discovers ffmpeg from the
    /// configuration or `PATH`.
    pub fn new(config: Config) -> Self {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.fetch));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        let assembler = ClipAssembler::new(
            fetcher.clone(),
            tools,
            config.encode.clone(),
            config.clip.work_root(),
        )
        .with_concurrency(config.fetch.concurrency);

        Self {
            config,
            fetcher,
            assembler,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch and parse the playlist at `playlist`.
    pub async fn load_timeline(&self, playlist: &Url) -> Result<Outcome<Timeline>> {
        let text = self.fetcher.fetch_text(playlist).await?;
        let outcome = hc_playlist::parse(&text, playlist);
        tracing::info!(
            "parsed {} segments ({:.3}s) from {playlist} with {} notices",
            outcome.value.len(),
            outcome.value.total_duration(),
            outcome.notices.len()
        );
        Ok(outcome)
    }

    /// Run both clips for `job`.
    ///
    /// # Errors
    ///
    /// Returns an error when a clip window cannot be represented or the
    /// playlist cannot be retrieved. Everything after that, including an
    /// empty timeline, is reported per clip in the [`ClipReport`].
    pub async fn run(&self, job: &ClipJob) -> Result<ClipReport> {
        let before = Window::before(job.reference, job.before_seconds)?;
        let after = Window::after(job.reference, job.after_seconds)?;

        let (timeline, parse_notices) = self.load_timeline(&job.playlist).await?.into_parts();
        let (before, after) = tokio::join!(
            self.run_clip(&timeline, before, self.destination(ClipKind::Before)),
            self.run_clip(&timeline, after, self.destination(ClipKind::After)),
        );

        Ok(ClipReport {
            segments: timeline.len(),
            parse_notices,
            before,
            after,
        })
    }

    fn destination(&self, kind: ClipKind) -> PathBuf {
        let clip = &self.config.clip;
        let name = match kind {
            ClipKind::Before => &clip.before_file,
            ClipKind::After => &clip.after_file,
        };
        clip.output_dir.join(name)
    }

    async fn run_clip(&self, timeline: &Timeline, window: Window, destination: PathBuf) -> Result<ClipOutput> {
        let request_id = RequestId::new();
        let kind = window.kind;
        let span = tracing::info_span!("clip", %kind, request_id = %request_id.short());

        async {
            tracing::info!("selecting segments for window {window}");
            let policy = SelectionPolicy {
                max_segments: self.config.clip.max_segments,
            };
            let (selection, mut notices) = hc_playlist::select(timeline, window, policy)?.into_parts();

            let mut output = self
                .assembler
                .assemble(ClipRequest {
                    selection: &selection,
                    reference: window.reference,
                    duration: window.length(),
                    destination: &destination,
                    request_id,
                })
                .await?;

            notices.append(&mut output.notices);
            output.notices = notices;
            Ok::<_, hc_core::Error>(output)
        }
        .instrument(span.clone())
        .await
        .map_err(|e| {
            let _entered = span.enter();
            tracing::error!("{kind} clip failed: {e}");
            e.in_clip(kind, window)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    /// Serves one playlist body and fails every segment download.
    struct PlaylistOnly(String);

    #[async_trait]
    impl Fetcher for PlaylistOnly {
        async fn fetch_text(&self, _url: &Url) -> Result<String> {
            Ok(self.0.clone())
        }

        async fn fetch_to_file(&self, url: &Url, _dest: &Path) -> Result<u64> {
            Err(hc_core::Error::fetch(url, "HTTP 404 Not Found"))
        }
    }

    fn job(config: &Config) -> ClipJob {
        ClipJob::new(
            Url::parse("http://host/live/stream.m3u8").unwrap(),
            hc_playlist::parse_timestamp("2025-06-03T08:03:06+0530").unwrap(),
            config,
        )
    }

    fn config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.clip.output_dir = dir.join("out");
        config.clip.work_dir = Some(dir.join("work"));
        config
    }

    #[tokio::test]
    async fn empty_timeline_fails_both_clips() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let clipper = Clipper::with_fetcher(config.clone(), Arc::new(PlaylistOnly("#EXTM3U\n".into())));

        let report = clipper.run(&job(&config)).await.unwrap();

        assert_eq!(report.segments, 0);
        for (_, outcome) in report.outcomes() {
            let err = outcome.as_ref().unwrap_err();
            assert!(matches!(err, hc_core::Error::Clip { .. }));
            assert_eq!(err.exit_code(), 4);
        }
        assert_eq!(report.exit_code(), 4);
    }

    #[tokio::test]
    async fn failures_name_the_clip_and_window() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let playlist = "#EXTM3U\n\
            #EXT-X-PROGRAM-DATE-TIME:2025-06-03T08:03:00+0530\n\
            #EXTINF:4.0,\n\
            seg0.ts\n\
            #EXT-X-PROGRAM-DATE-TIME:2025-06-03T08:03:04+0530\n\
            #EXTINF:4.0,\n\
            seg1.ts\n";
        let clipper = Clipper::with_fetcher(config.clone(), Arc::new(PlaylistOnly(playlist.into())));

        let report = clipper.run(&job(&config)).await.unwrap();

        assert_eq!(report.segments, 2);
        assert!(!report.is_success());
        let before = report.before.as_ref().unwrap_err().to_string();
        assert!(before.starts_with("before clip for window [2025-06-03T08:02:56+05:30"), "{before}");
        assert!(before.contains("HTTP 404"));
        let after = report.after.as_ref().unwrap_err().to_string();
        assert!(after.starts_with("after clip for window [2025-06-03T08:03:06+05:30"), "{after}");
        assert_eq!(report.exit_code(), 3);
    }

    #[tokio::test]
    async fn unrepresentable_window_fails_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let clipper = Clipper::with_fetcher(config.clone(), Arc::new(PlaylistOnly("#EXTM3U\n".into())));
        let mut job = job(&config);
        job.after_seconds = 1e13;

        let err = clipper.run(&job).await.unwrap_err();

        assert!(matches!(err, hc_core::Error::Validation(_)), "{err}");
        assert_eq!(err.exit_code(), 1);
        assert!(!dir.path().join("work").exists());
    }

    #[test]
    fn destinations_follow_config() {
        let mut config = Config::default();
        config.clip.output_dir = PathBuf::from("/srv/clips");
        config.clip.after_file = "next.ts".into();
        let clipper = Clipper::with_fetcher(config, Arc::new(PlaylistOnly(String::new())));
        assert_eq!(
            clipper.destination(ClipKind::Before),
            Path::new("/srv/clips/before_video.ts")
        );
        assert_eq!(clipper.destination(ClipKind::After), Path::new("/srv/clips/next.ts"));
    }
}
