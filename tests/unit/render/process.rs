use super::*;
use crate::{
    compose::graph::Label,
    foundation::{core::Resolution, error::Stage},
};

fn args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn tunables() -> RendererTunables {
    RendererTunables {
        seconds_per_day: 0.12,
        time_scale: 1.6,
        user_scale: 1.35,
        auto_skip: 0.5,
    }
}

#[test]
fn stderr_tail_keeps_last_lines() {
    let noisy: String = (0..30).map(|i| format!("line {i}\n")).collect();
    let tail = stderr_tail(&noisy);
    assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
    assert!(tail.ends_with("line 29"));
    assert_eq!(stderr_tail("  \n"), "");
}

#[test]
fn renderer_command_without_wrapper() {
    let tools = Toolchain::default().without_display_wrapper();
    let t = tunables();
    let canvas = Resolution::P1080.canvas();
    let cmd = renderer_command(
        &tools,
        &RendererJob {
            log: Path::new("/w/merged.log"),
            frames: Path::new("/w/frames.pipe"),
            title: "Demo",
            canvas,
            inner: canvas.inset(26),
            fps: FrameRate::new(30).unwrap(),
            tunables: &t,
        },
    );
    assert_eq!(cmd.get_program(), "gource");
    let a = args(&cmd);
    assert_eq!(&a[..2], ["--seconds-per-day", "0.12"]);
    assert!(a.windows(2).any(|w| w == ["--title", "Demo"]));
    assert!(a.windows(2).any(|w| w == ["--hide", "usernames,mouse,date,filenames"]));
    assert_eq!(
        &a[a.len() - 7..],
        ["--1868x1028", "--stop-at-end", "/w/merged.log", "-r", "30", "-o", "/w/frames.pipe"]
    );
    assert!(cmd.get_envs().next().is_none());
}

#[test]
fn renderer_command_with_virtual_display() {
    let tools = Toolchain::default();
    let t = tunables();
    let canvas = Resolution::P720.canvas();
    let cmd = renderer_command(
        &tools,
        &RendererJob {
            log: Path::new("l"),
            frames: Path::new("p"),
            title: "T",
            canvas,
            inner: canvas,
            fps: FrameRate::default(),
            tunables: &t,
        },
    );
    assert_eq!(cmd.get_program(), "xvfb-run");
    let a = args(&cmd);
    assert_eq!(&a[..4], ["-a", "-s", "-screen 0 1280x720x24", "gource"]);
    let env: Vec<_> = cmd.get_envs().collect();
    assert_eq!(env.len(), 1);
    assert_eq!(env[0].0, "SDL_VIDEODRIVER");
}

#[test]
fn encoder_command_for_frame_pipe() {
    let tools = Toolchain::default();
    let enc = EncoderTunables {
        crf: 18,
        preset: "fast".into(),
    };
    let graph = FilterGraph::new(Label::Input(0));
    let cmd = encoder_command(
        &tools,
        EncoderSource::FramePipe {
            pipe: Path::new("/w/frames.pipe"),
            fps: FrameRate::default(),
        },
        None,
        &graph,
        &enc,
        Path::new("out.mp4"),
    );
    assert_eq!(
        args(&cmd).join(" "),
        "-y -r 60 -f image2pipe -probesize 100M -i /w/frames.pipe \
         -vcodec libx264 -pix_fmt yuv420p -crf 18 -preset fast -bf 0 out.mp4"
    );
}

#[test]
fn encoder_command_for_panels_with_logo_and_graph() {
    let tools = Toolchain::default();
    let enc = EncoderTunables {
        crf: 22,
        preset: "medium".into(),
    };
    let mut graph = FilterGraph::new(Label::Input(0));
    graph.apply("hflip", "base");
    let panels = vec![PathBuf::from("panel-0.mp4"), PathBuf::from("panel-1.mp4")];
    let cmd = encoder_command(
        &tools,
        EncoderSource::Panels(&panels),
        Some(Path::new("logo.png")),
        &graph,
        &enc,
        Path::new("out.mp4"),
    );
    let a = args(&cmd);
    assert_eq!(
        &a[..9],
        [
            "-y",
            "-i",
            "panel-0.mp4",
            "-i",
            "panel-1.mp4",
            "-i",
            "logo.png",
            "-filter_complex",
            "[0:v]hflip[base0]"
        ]
    );
    assert_eq!(&a[9..11], ["-map", "[base0]"]);
}

#[test]
fn log_command_layout() {
    let cmd = log_command(&Toolchain::default(), Path::new("/r"), Path::new("/w/r.log"));
    assert_eq!(args(&cmd), ["--output-custom-log", "/w/r.log", "/r"]);
}

#[test]
fn ensure_parent_dir_creates_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a/b/out.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("out.mp4")).unwrap();
}

#[test]
fn spawn_failure_names_stage_and_repo() {
    let mut cmd = Command::new("/nonexistent/commitreel-tool");
    let err = run_to_completion(Stage::Log, Some("alpha"), &mut cmd).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Log));
    assert_eq!(err.repo(), Some("alpha"));
    assert!(err.to_string().contains("failed to spawn"), "{err}");
}

#[cfg(unix)]
#[test]
fn nonzero_exit_reports_stderr_tail() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo first >&2; echo boom >&2; exit 3"]);
    let err = run_to_completion(Stage::Clone, None, &mut cmd).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("clone failed: exited with"), "{msg}");
    assert!(msg.contains("boom"), "{msg}");
}

#[cfg(unix)]
#[test]
fn killed_child_is_reaped() {
    let mut cmd = Command::new("sleep");
    cmd.arg("30");
    let mut child = Supervised::spawn(Stage::Render, None, &mut cmd).unwrap();
    assert!(child.try_wait().unwrap().is_none());
    child.kill();
}

#[cfg(unix)]
#[test]
fn writer_blocked_on_open_is_released() {
    let dir = tempfile::tempdir().unwrap();
    let pipe = dir.path().join("frames.pipe");
    nix::unistd::mkfifo(&pipe, nix::sys::stat::Mode::S_IRWXU).unwrap();

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("printf x > '{}'", pipe.display()));
    let mut writer = Supervised::spawn(Stage::Render, None, &mut cmd).unwrap();
    release_stalled_writer(&pipe, &mut writer).unwrap();
    assert!(writer.try_wait().unwrap().is_some());
    writer.wait().unwrap();
}
