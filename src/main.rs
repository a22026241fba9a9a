mod cli;

use hlsclip::clipper::{ClipJob, Clipper};
use hlsclip::config::{self, Config};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use hc_core::Instant;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Overrides for the `[clip]` section taken from the command line.
struct ClipOverrides {
    before: Option<f64>,
    after: Option<f64>,
    max_segments: Option<usize>,
    output_dir: Option<PathBuf>,
}

impl ClipOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(before) = self.before {
            config.clip.before_seconds = before;
        }
        if let Some(after) = self.after {
            config.clip.after_seconds = after;
        }
        if let Some(max) = self.max_segments {
            config.clip.max_segments = max;
        }
        if let Some(dir) = self.output_dir {
            config.clip.output_dir = dir;
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "hlsclip=trace,hc_core=trace,hc_playlist=trace,hc_av=trace,hc_pipeline=trace".to_string()
        } else {
            "hlsclip=debug,hc_core=debug,hc_playlist=debug,hc_av=debug,hc_pipeline=debug".to_string()
        }
    });

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Clip {
            playlist,
            at,
            before,
            after,
            max_segments,
            output_dir,
        } => {
            let overrides = ClipOverrides {
                before,
                after,
                max_segments,
                output_dir,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_clip(&playlist, at, overrides, cli.config.as_deref()))
        }
        Commands::Timeline { playlist, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_timeline(&playlist, json, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("hlsclip {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run_clip(
    playlist: &str,
    at: Instant,
    overrides: ClipOverrides,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let mut config = config::load_config_or_default(config_path)?;
    overrides.apply(&mut config);
    config.check()?;

    let playlist = hc_playlist::resolve_locator(playlist)?;
    let job = ClipJob::new(playlist, at, &config);
    let clipper = Clipper::new(config);

    tracing::info!("Clipping {} around {}", job.playlist, job.reference.to_rfc3339());

    let report = match clipper.run(&job).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(exit_code(e.exit_code()));
        }
    };

    if !report.parse_notices.is_empty() {
        println!("Playlist: {} segments, {} notices", report.segments, report.parse_notices.len());
    }

    for (kind, outcome) in report.outcomes() {
        match outcome {
            Ok(output) => {
                print!(
                    "✓ {kind}: {} ({} segments, offset {:.3}s, {:.3}s of {:.3}s requested)",
                    output.path.display(),
                    output.segments,
                    output.plan.start_offset,
                    output.plan.available.min(output.plan.duration),
                    output.plan.duration
                );
                if !output.notices.is_empty() {
                    print!(" [{} notices]", output.notices.len());
                }
                println!();
            }
            Err(e) => {
                println!("✗ {kind}: failed");
                eprintln!("Error: {e}");
            }
        }
    }

    Ok(exit_code(report.exit_code()))
}

async fn print_timeline(playlist: &str, json: bool, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = config::load_config_or_default(config_path)?;
    let playlist = hc_playlist::resolve_locator(playlist)?;
    let clipper = Clipper::new(config);

    let outcome = match clipper.load_timeline(&playlist).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(exit_code(e.exit_code()));
        }
    };

    if json {
        let doc = serde_json::json!({
            "playlist": playlist,
            "segments": outcome.value,
            "notices": outcome.notices,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(ExitCode::SUCCESS);
    }

    let timeline = &outcome.value;
    println!("Playlist: {}", playlist);
    println!("Segments: {}", timeline.len());
    if let Some((start, end)) = timeline.span() {
        println!("Span: {} .. {}", start.to_rfc3339(), end.to_rfc3339());
    }
    println!("Total duration: {:.3}s", timeline.total_duration());

    for (i, segment) in timeline.iter().enumerate() {
        println!(
            "  [{}] {} {:>8.3}s {}",
            i,
            segment.start.to_rfc3339(),
            segment.duration,
            segment.locator
        );
    }

    if !outcome.notices.is_empty() {
        println!("\nNotices: {}", outcome.notices.len());
        for notice in &outcome.notices {
            println!("  {}", notice);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn check_tools(config_path: Option<&Path>) -> Result<ExitCode> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = hc_av::ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them or set [tools] paths in the config.");
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(config: &Config) {
    println!(
        "  Clip: {}s before, {}s after, at most {} segments",
        config.clip.before_seconds, config.clip.after_seconds, config.clip.max_segments
    );
    println!(
        "  Output: {} ({}, {})",
        config.clip.output_dir.display(),
        config.clip.before_file,
        config.clip.after_file
    );
    println!(
        "  Fetch: {}s timeout, {} retries, {} concurrent",
        config.fetch.timeout_secs, config.fetch.retries, config.fetch.concurrency
    );
    println!(
        "  Encode: {} / {} -> {}",
        config.encode.video_codec, config.encode.preset, config.encode.format
    );
}

fn validate_config(path: Option<&Path>) -> Result<ExitCode> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    print_summary(&config);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    Ok(ExitCode::SUCCESS)
}
