//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Reference instant used by most tests: six seconds into [`live_playlist`].
pub const AT: &str = "2025-06-03T08:03:06+0530";

/// Three contiguous 4-second segments starting at 08:03:00+05:30, with a
/// malformed timestamp tag that drops one extra reference.
pub fn live_playlist() -> String {
    "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:4
#EXT-X-PROGRAM-DATE-TIME:2025-06-03T08:03:00.000+0530
#EXTINF:4.000,
seg0.ts
#EXT-X-PROGRAM-DATE-TIME:2025-06-03T08:03:04.000+0530
#EXTINF:4.000,
seg1.ts
#EXT-X-PROGRAM-DATE-TIME:2025-06-03T08:03:08.000+0530
#EXTINF:4.000,
seg2.ts
#EXT-X-PROGRAM-DATE-TIME:not-a-date
#EXTINF:4.000,
seg3.ts
"
    .to_string()
}

/// Write the playlist and its segment files into `dir`; each segment file
/// contains its own name.
pub fn write_local_stream(dir: &Path) -> PathBuf {
    for name in ["seg0.ts", "seg1.ts", "seg2.ts", "seg3.ts"] {
        fs::write(dir.join(name), name).unwrap();
    }
    let playlist = dir.join("stream.m3u8");
    fs::write(&playlist, live_playlist()).unwrap();
    playlist
}

/// Fake encoder that copies the concat list (argument 8) to the output path
/// (last argument), so tests can see which segments it was given.
pub const COPY_CONCAT_LIST: &str = "for last; do :; done\ncp \"$8\" \"$last\"";

/// Fake encoder that always fails.
pub const FAILING_ENCODER: &str = "echo 'Invalid data found when processing input' >&2\nexit 1";

/// Write an executable shell script standing in for ffmpeg.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("ffmpeg");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write a config that sends output and workspaces into `dir` and uses
/// `ffmpeg` as the encoder.
pub fn write_config(dir: &Path, ffmpeg: &Path) -> PathBuf {
    let path = dir.join("hlsclip.toml");
    fs::write(
        &path,
        format!(
            r#"
[clip]
output_dir = "{}"
work_dir = "{}"

[fetch]
timeout_secs = 5

[tools]
ffmpeg_path = "{}"
"#,
            dir.join("output").display(),
            dir.join("work").display(),
            ffmpeg.display()
        ),
    )
    .unwrap();
    path
}

/// Segment file names listed in a concat descriptor, in order.
pub fn concat_entries(list: &str) -> Vec<String> {
    list.lines()
        .filter_map(|l| l.strip_prefix("file '")?.strip_suffix('\''))
        .map(|p| p.rsplit('/').next().unwrap_or(p).to_string())
        .collect()
}

/// Number of entries left in the work directory.
pub fn leftover_workspaces(dir: &Path) -> usize {
    match fs::read_dir(dir.join("work")) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}
