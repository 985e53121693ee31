//! External processes: command lines for the renderer and encoder, and a supervised child
//! whose stderr is drained on a background thread.

use std::{
    io::Read as _,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread::JoinHandle,
    time::Duration,
};

use crate::{
    compose::graph::FilterGraph,
    config::{
        options::{EncoderTunables, RendererTunables},
        tools::Toolchain,
    },
    foundation::{
        core::{Canvas, FrameRate},
        error::{ReelError, ReelResult, Stage},
    },
};

/// Number of trailing stderr lines kept in error messages.
const STDERR_TAIL_LINES: usize = 12;

/// Last lines of a tool's stderr, trimmed.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Exit status and captured stderr of a finished child.
#[derive(Debug)]
pub(crate) struct Finished {
    pub status: ExitStatus,
    pub stderr: String,
}

impl Finished {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Status plus the stderr tail, for error details and warnings.
    pub fn describe(&self) -> String {
        let tail = stderr_tail(&self.stderr);
        if tail.is_empty() {
            format!("exited with {}", self.status)
        } else {
            format!("exited with {}: {tail}", self.status)
        }
    }
}

/// A spawned tool attributed to a stage and, optionally, a repository.
pub(crate) struct Supervised {
    stage: Stage,
    repo: Option<String>,
    child: Child,
    stderr_drain: Option<JoinHandle<String>>,
}

impl Supervised {
    /// Spawn `cmd` with stdin/stdout detached and stderr captured.
    pub fn spawn(stage: Stage, repo: Option<&str>, cmd: &mut Command) -> ReelResult<Self> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let program = cmd.get_program().to_string_lossy().into_owned();
        tracing::debug!(
            %stage,
            program = %program,
            args = ?cmd.get_args().collect::<Vec<_>>(),
            "spawning external tool"
        );

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::external_tool(
                stage,
                repo,
                format!("failed to spawn '{program}' (is it installed and on PATH?): {e}"),
            )
        })?;

        let stderr_drain = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                match stderr.read_to_end(&mut bytes) {
                    Ok(_) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(e) => format!("<failed to read stderr: {e}>"),
                }
            })
        });

        Ok(Self {
            stage,
            repo: repo.map(str::to_owned),
            child,
            stderr_drain,
        })
    }

    /// Error for this child attributed to its stage and repository.
    pub fn error(&self, detail: impl Into<String>) -> ReelError {
        ReelError::external_tool(self.stage, self.repo.as_deref(), detail)
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> ReelResult<Option<ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|e| self.error(format!("failed to poll process: {e}")))
    }

    /// Wait for exit and collect stderr.
    pub fn wait(mut self) -> ReelResult<Finished> {
        let status = self
            .child
            .wait()
            .map_err(|e| self.error(format!("failed to wait for process: {e}")))?;
        let stderr = self
            .stderr_drain
            .take()
            .and_then(|drain| drain.join().ok())
            .unwrap_or_default();
        Ok(Finished { status, stderr })
    }

    /// Wait and turn a nonzero exit into an error.
    pub fn wait_success(self) -> ReelResult<Finished> {
        let stage = self.stage;
        let repo = self.repo.clone();
        let finished = self.wait()?;
        if finished.success() {
            Ok(finished)
        } else {
            Err(ReelError::external_tool(
                stage,
                repo.as_deref(),
                finished.describe(),
            ))
        }
    }

    /// Kill and reap.
    pub fn kill(mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!(stage = %self.stage, error = %e, "kill failed");
        }
        if let Err(e) = self.wait() {
            tracing::debug!(error = %e, "reaping killed process failed");
        }
    }
}

/// Spawn `cmd` and wait for a zero exit.
pub(crate) fn run_to_completion(
    stage: Stage,
    repo: Option<&str>,
    cmd: &mut Command,
) -> ReelResult<()> {
    Supervised::spawn(stage, repo, cmd)?.wait_success()?;
    Ok(())
}

/// One renderer invocation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RendererJob<'a> {
    /// Event log to visualize.
    pub log: &'a Path,
    /// Named pipe or file receiving frames.
    pub frames: &'a Path,
    pub title: &'a str,
    /// Full output canvas; sizes the virtual display.
    pub canvas: Canvas,
    /// Canvas the renderer draws at.
    pub inner: Canvas,
    pub fps: FrameRate,
    pub tunables: &'a RendererTunables,
}

/// Renderer command line, wrapped in the virtual display when the toolchain has one.
pub(crate) fn renderer_command(tools: &Toolchain, job: &RendererJob<'_>) -> Command {
    let mut cmd = match &tools.display_wrapper {
        Some(wrapper) => {
            let mut cmd = Command::new(wrapper);
            cmd.args(["-a", "-s"])
                .arg(format!(
                    "-screen 0 {}x{}x24",
                    job.canvas.width, job.canvas.height
                ))
                .arg(&tools.gource)
                .env("SDL_VIDEODRIVER", "x11");
            cmd
        }
        None => Command::new(&tools.gource),
    };

    let t = job.tunables;
    cmd.args(["--seconds-per-day", &t.seconds_per_day.to_string()])
        .args(["--user-scale", &t.user_scale.to_string()])
        .args(["--time-scale", &t.time_scale.to_string()])
        .args(["--auto-skip-seconds", &t.auto_skip.to_string()])
        .args(["--title", job.title])
        .args(["--background-colour", "000000"])
        .args(["--font-colour", "FFFFFF"])
        .args(["--camera-mode", "overview"])
        .args(["--hide", "usernames,mouse,date,filenames"])
        .args(["--font-size", "42"])
        .args(["--dir-name-depth", "3"])
        .args(["--filename-time", "2"])
        .args(["--max-user-speed", "500"])
        .args(["--bloom-multiplier", "1.2"])
        .arg(format!("--{}x{}", job.inner.width, job.inner.height))
        .arg("--stop-at-end")
        .arg(job.log)
        .args(["-r", &job.fps.to_string()])
        .arg("-o")
        .arg(job.frames);
    cmd
}

/// Where the encoder reads its video inputs from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum EncoderSource<'a> {
    /// Image stream written by the renderer into a named pipe.
    FramePipe { pipe: &'a Path, fps: FrameRate },
    /// Finished panel videos.
    Panels(&'a [PathBuf]),
}

/// Encoder command line: video inputs, optional logo input, filter graph, codec, output.
pub(crate) fn encoder_command(
    tools: &Toolchain,
    source: EncoderSource<'_>,
    logo: Option<&Path>,
    graph: &FilterGraph,
    tunables: &EncoderTunables,
    output: &Path,
) -> Command {
    let mut cmd = Command::new(&tools.ffmpeg);
    cmd.arg("-y");
    match source {
        EncoderSource::FramePipe { pipe, fps } => {
            cmd.args(["-r", &fps.to_string()])
                .args(["-f", "image2pipe", "-probesize", "100M", "-i"])
                .arg(pipe);
        }
        EncoderSource::Panels(panels) => {
            for panel in panels {
                cmd.arg("-i").arg(panel);
            }
        }
    }
    if let Some(logo) = logo {
        cmd.arg("-i").arg(logo);
    }
    cmd.args(graph.encoder_args())
        .args(tunables.args())
        .arg(output);
    cmd
}

/// Log generator command: `gource --output-custom-log <out> <repo>`.
pub(crate) fn log_command(tools: &Toolchain, repo: &Path, out: &Path) -> Command {
    let mut cmd = Command::new(&tools.gource);
    cmd.arg("--output-custom-log").arg(out).arg(repo);
    cmd
}

/// Create the parent directory of `path` if missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::filesystem(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// Interval between exit checks while supervising a pipe pair.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Unblock a reader stuck opening `pipe` after the writer exited without opening it.
///
/// Opens and closes the write end without blocking. Retries while nobody has the read end
/// open and `reader` is still running.
#[cfg(unix)]
pub(crate) fn release_stalled_reader(pipe: &Path, reader: &mut Supervised) -> ReelResult<()> {
    use nix::{errno::Errno, fcntl::OFlag, sys::stat::Mode};

    loop {
        if reader.try_wait()?.is_some() {
            return Ok(());
        }
        match nix::fcntl::open(pipe, OFlag::O_WRONLY | OFlag::O_NONBLOCK, Mode::empty()) {
            Ok(fd) => {
                drop(fd);
                return Ok(());
            }
            Err(Errno::ENXIO) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(ReelError::filesystem(format!(
                    "failed to open '{}' for writing: {e}",
                    pipe.display()
                )));
            }
        }
    }
}

/// Unblock a writer stuck opening `pipe` after the reader exited.
///
/// Opens and closes the read end without blocking until `writer` exits. Once past its open,
/// the writer sees a broken pipe on its next write.
#[cfg(unix)]
pub(crate) fn release_stalled_writer(pipe: &Path, writer: &mut Supervised) -> ReelResult<()> {
    use nix::{fcntl::OFlag, sys::stat::Mode};

    while writer.try_wait()?.is_none() {
        let fd = nix::fcntl::open(pipe, OFlag::O_RDONLY | OFlag::O_NONBLOCK, Mode::empty())
            .map_err(|e| {
                ReelError::filesystem(format!(
                    "failed to open '{}' for reading: {e}",
                    pipe.display()
                ))
            })?;
        drop(fd);
        std::thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn release_stalled_reader(_pipe: &Path, _reader: &mut Supervised) -> ReelResult<()> {
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn release_stalled_writer(_pipe: &Path, _writer: &mut Supervised) -> ReelResult<()> {
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/process.rs"]
mod tests;
