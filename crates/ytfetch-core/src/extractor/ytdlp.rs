//! `yt-dlp` child-process driver.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::progress::{parse_progress_line, progress_template, ProgressEvent};
use super::{Extractor, ExtractorError};
use crate::options::ExtractorOptions;

/// yt-dlp's exit status when it finished but reported errors.
const SKIPPED_ENTRIES_EXIT_CODE: i32 = 1;

/// Runs the `yt-dlp` executable with rendered [`ExtractorOptions`].
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument vector for one URL.
    pub fn command_args(&self, url: &str, options: &ExtractorOptions) -> Vec<String> {
        let mut args = options.to_args();
        args.push("--newline".to_string());
        args.push("--progress-template".to_string());
        args.push(progress_template());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

impl Extractor for YtDlp {
    fn download(
        &self,
        url: &str,
        options: &ExtractorOptions,
        on_event: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), ExtractorError> {
        tracing::info!("Starting download: {}", url);
        let mut child = Command::new(&self.program)
            .args(self.command_args(url, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExtractorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ExtractorError::Io(std::io::Error::other("failed to capture yt-dlp stdout"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            ExtractorError::Io(std::io::Error::other("failed to capture yt-dlp stderr"))
        })?;

        let stderr_handle = std::thread::spawn(move || {
            BufReader::new(stderr)
                .lines()
                .map_while(Result::ok)
                .collect::<Vec<String>>()
        });

        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            match parse_progress_line(&line) {
                Some(event) => on_event(event),
                None if !line.trim().is_empty() => tracing::debug!("[yt-dlp] {}", line),
                None => {}
            }
        }

        let status = child.wait()?;
        let stderr_lines = stderr_handle.join().unwrap_or_default();
        for line in &stderr_lines {
            if line.starts_with("WARNING:") {
                tracing::warn!("[yt-dlp] {}", line);
            }
        }

        if status.success() {
            return Ok(());
        }
        // With --ignore-errors yt-dlp skips failed playlist entries but still exits 1.
        if options.ignore_errors && status.code() == Some(SKIPPED_ENTRIES_EXIT_CODE) {
            for line in stderr_lines.iter().filter(|l| l.trim_start().starts_with("ERROR:")) {
                tracing::warn!("[yt-dlp] skipped: {}", line.trim());
            }
            return Ok(());
        }
        let message = summarize_stderr(&stderr_lines)
            .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
        Err(ExtractorError::Failed {
            code: status.code(),
            message,
        })
    }
}

/// Condense yt-dlp's stderr into one message: all `ERROR:` lines, else the last non-empty line.
pub fn summarize_stderr(lines: &[String]) -> Option<String> {
    let errors: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return Some(errors.join("; "));
    }
    lines
        .iter()
        .map(|l| l.trim())
        .rfind(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ExtractorOptions {
        ExtractorOptions {
            format: "bestvideo+bestaudio/best".into(),
            output_template: PathBuf::from("/tmp/%(title)s.%(ext)s"),
            ffmpeg_location: PathBuf::from("/usr/bin/ffmpeg"),
            proxy: None,
            extract_audio: None,
            merge_output_format: Some("mp4".into()),
            no_playlist: true,
            ignore_errors: false,
            quiet: true,
        }
    }

    #[test]
    fn url_is_last_after_separator() {
        let args = YtDlp::default().command_args("https://youtu.be/x", &opts());
        let n = args.len();
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "https://youtu.be/x");
        assert!(args.contains(&"--newline".to_string()));
    }

    #[test]
    fn summarize_prefers_error_lines() {
        let lines = vec![
            "WARNING: something".to_string(),
            "ERROR: [youtube] abc: Video unavailable".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            summarize_stderr(&lines).as_deref(),
            Some("ERROR: [youtube] abc: Video unavailable")
        );
        let plain = vec!["first".to_string(), "last".to_string(), "  ".to_string()];
        assert_eq!(summarize_stderr(&plain).as_deref(), Some("last"));
        assert_eq!(summarize_stderr(&[]), None);
    }

    #[test]
    fn spawn_failure_is_reported() {
        let ytdlp = YtDlp::new("/nonexistent/dir/yt-dlp");
        let err = ytdlp.download("https://youtu.be/x", &opts(), &mut |_| {}).unwrap_err();
        assert!(matches!(err, ExtractorError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("yt-dlp");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn streams_progress_events_and_succeeds() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ytdlp(
                dir.path(),
                "echo '[youtube] abc: Downloading webpage'\n\
                 echo '[ytfetch-progress] downloading|50|100|NA|10.0|clip.mp4'\n\
                 echo '[ytfetch-progress] finished|100|100|NA|NA|clip.mp4'\n\
                 exit 0",
            );
            let mut events = Vec::new();
            YtDlp::new(program)
                .download("https://youtu.be/x", &opts(), &mut |e| events.push(e))
                .unwrap();
            assert_eq!(events.len(), 2);
            assert!(matches!(events[1], ProgressEvent::Finished { .. }));
        }

        #[test]
        fn non_zero_exit_carries_error_lines() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ytdlp(
                dir.path(),
                "echo 'ERROR: [youtube] abc: Video unavailable' >&2\nexit 1",
            );
            let err = YtDlp::new(program)
                .download("https://youtu.be/x", &opts(), &mut |_| {})
                .unwrap_err();
            match err {
                ExtractorError::Failed { code, message } => {
                    assert_eq!(code, Some(1));
                    assert_eq!(message, "ERROR: [youtube] abc: Video unavailable");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        fn playlist_opts() -> ExtractorOptions {
            ExtractorOptions {
                no_playlist: false,
                ignore_errors: true,
                ..opts()
            }
        }

        #[test]
        fn skipped_playlist_entries_are_not_a_failure() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ytdlp(
                dir.path(),
                "echo '[ytfetch-progress] finished|10|10|NA|NA|e1.mp4'\n\
                 echo 'ERROR: [youtube] e2: Video unavailable' >&2\n\
                 exit 1",
            );
            let mut events = Vec::new();
            YtDlp::new(program)
                .download("https://youtube.com/playlist?list=x", &playlist_opts(), &mut |e| events.push(e))
                .unwrap();
            assert_eq!(events.len(), 1);
        }

        #[test]
        fn ignore_errors_still_fails_on_other_exit_codes() {
            let dir = tempfile::tempdir().unwrap();
            let crashed = fake_ytdlp(dir.path(), "echo 'ERROR: fatal' >&2\nexit 2");
            let err = YtDlp::new(crashed)
                .download("https://youtube.com/playlist?list=x", &playlist_opts(), &mut |_| {})
                .unwrap_err();
            assert!(matches!(err, ExtractorError::Failed { code: Some(2), .. }));

            let killed = dir.path().join("killed");
            fs::create_dir(&killed).unwrap();
            let program = fake_ytdlp(&killed, "kill -9 $$");
            let err = YtDlp::new(program)
                .download("https://youtube.com/playlist?list=x", &playlist_opts(), &mut |_| {})
                .unwrap_err();
            assert!(matches!(err, ExtractorError::Failed { code: None, .. }));
        }

        #[test]
        fn single_video_exit_one_is_still_a_failure() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ytdlp(dir.path(), "echo 'ERROR: Video unavailable' >&2\nexit 1");
            let err = YtDlp::new(program)
                .download("https://youtu.be/x", &opts(), &mut |_| {})
                .unwrap_err();
            assert!(matches!(err, ExtractorError::Failed { code: Some(1), .. }));
        }

        #[test]
        fn passes_rendered_options_to_program() {
            let dir = tempfile::tempdir().unwrap();
            let log = dir.path().join("args.txt");
            let program = fake_ytdlp(
                dir.path(),
                &format!("for a in \"$@\"; do echo \"$a\" >> '{}'; done\nexit 0", log.display()),
            );
            YtDlp::new(program)
                .download("https://youtu.be/x", &opts(), &mut |_| {})
                .unwrap();
            let seen: Vec<String> = fs::read_to_string(&log)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect();
            assert_eq!(seen, YtDlp::default().command_args("https://youtu.be/x", &opts()));
        }
    }
}
