use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use commitreel::{
    LegendMode, RenderOptions, RenderPipeline, Resolution, SyncMode, Toolchain, templates,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "commitreel", version, about = "Render repository history videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a video (requires `gource` and `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Write the merged, synchronized event log without rendering.
    Log(LogArgs),
    /// List the available templates.
    Templates {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Base options as JSON; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository path or remote URL.
    #[arg(long, conflicts_with = "multi_dir")]
    repo: Option<String>,

    /// Directory whose subdirectories are repositories.
    #[arg(long)]
    multi_dir: Option<PathBuf>,

    /// Template name (see `commitreel templates`).
    #[arg(long)]
    template: Option<String>,

    /// Timing mode.
    #[arg(long, value_enum)]
    sync_timing: Option<SyncMode>,

    /// Sync span in seconds.
    #[arg(long)]
    sync_span: Option<i64>,
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// `gource` binary.
    #[arg(long)]
    gource: Option<PathBuf>,

    /// `ffmpeg` binary.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// `git` binary.
    #[arg(long)]
    git: Option<PathBuf>,

    /// `curl` binary.
    #[arg(long)]
    curl: Option<PathBuf>,

    /// Run the renderer without `xvfb-run`.
    #[arg(long)]
    no_display_wrapper: bool,

    /// Directory for per-render working areas.
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    tools: ToolArgs,

    /// Output video path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output resolution.
    #[arg(long, value_enum)]
    resolution: Option<Resolution>,

    /// Frames per second (25, 30 or 60).
    #[arg(long)]
    fps: Option<u32>,

    /// Title drawn by the renderer.
    #[arg(long)]
    title: Option<String>,

    /// Logo file path or URL.
    #[arg(long)]
    logo: Option<String>,

    /// Legend content.
    #[arg(long, value_enum)]
    legend: Option<LegendMode>,

    /// Extension rows in the files legend.
    #[arg(long)]
    legend_limit: Option<usize>,

    /// Renderer seconds per day.
    #[arg(long)]
    seconds_per_day: Option<f64>,

    /// Renderer time scale.
    #[arg(long)]
    time_scale: Option<f64>,

    /// Renderer user scale.
    #[arg(long)]
    user_scale: Option<f64>,

    /// Renderer auto-skip seconds.
    #[arg(long)]
    auto_skip: Option<f64>,

    /// x264 constant-rate factor (0-51).
    #[arg(long)]
    crf: Option<u32>,

    /// x264 preset.
    #[arg(long)]
    preset: Option<String>,

    /// Also write the merged event log here.
    #[arg(long)]
    export_log: Option<PathBuf>,

    /// Print the render report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct LogArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    tools: ToolArgs,

    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Log(args) => cmd_log(args),
        Command::Templates { json } => cmd_templates(json),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_options(path: &Path) -> anyhow::Result<RenderOptions> {
    let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
    let opts = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse options JSON '{}'", path.display()))?;
    Ok(opts)
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn base_options(source: SourceArgs) -> anyhow::Result<RenderOptions> {
    let mut opts = match &source.config {
        Some(path) => read_options(path)?,
        None => RenderOptions::default(),
    };
    if source.repo.is_some() || source.multi_dir.is_some() {
        opts.repo = source.repo;
        opts.multi_dir = source.multi_dir;
    }
    set(&mut opts.template, source.template);
    set(&mut opts.sync_timing, source.sync_timing);
    set(&mut opts.sync_span, source.sync_span);
    Ok(opts)
}

fn pipeline(args: ToolArgs) -> RenderPipeline {
    let mut tools = Toolchain::default();
    set(&mut tools.gource, args.gource);
    set(&mut tools.ffmpeg, args.ffmpeg);
    set(&mut tools.git, args.git);
    set(&mut tools.curl, args.curl);
    if args.no_display_wrapper {
        tools = tools.without_display_wrapper();
    }
    let pipeline = RenderPipeline::new(tools);
    match args.work_dir {
        Some(dir) => pipeline.with_work_root(dir),
        None => pipeline,
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut opts = base_options(args.source)?;
    set(&mut opts.output, args.output);
    set(&mut opts.resolution, args.resolution);
    set(&mut opts.fps, args.fps);
    set(&mut opts.title, args.title);
    if args.logo.is_some() {
        opts.logo = args.logo;
    }
    set(&mut opts.legend, args.legend);
    set(&mut opts.legend_limit, args.legend_limit);
    set(&mut opts.seconds_per_day, args.seconds_per_day);
    set(&mut opts.time_scale, args.time_scale);
    set(&mut opts.user_scale, args.user_scale);
    set(&mut opts.auto_skip, args.auto_skip);
    set(&mut opts.crf, args.crf);
    set(&mut opts.preset, args.preset);
    if args.export_log.is_some() {
        opts.export_log = args.export_log;
    }

    let cfg = opts.validate()?;
    let report = pipeline(args.tools).render(&cfg)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
        println!("wrote {}", report.output.display());
    }
    Ok(())
}

fn cmd_log(args: LogArgs) -> anyhow::Result<()> {
    let cfg = base_options(args.source)?.validate()?;
    let merged = pipeline(args.tools).merged_log(&cfg)?;
    match args.out {
        Some(path) => {
            merged.log.write_to(&path)?;
            eprintln!(
                "wrote {} entries from {} repositories to {}",
                merged.log.len(),
                merged.repos.len(),
                path.display()
            );
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(merged.log.to_text().as_bytes())
                .context("write event log to stdout")?;
        }
    }
    Ok(())
}

fn cmd_templates(json: bool) -> anyhow::Result<()> {
    if json {
        let list: Vec<serde_json::Value> = templates()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "kind": t.kind,
                    "inputs": t.input_streams(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for t in templates() {
            println!("{:<20} {}", t.name, t.kind);
        }
    }
    Ok(())
}
