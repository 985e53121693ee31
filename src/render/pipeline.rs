use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    compose::{
        composer::{ComposeInputs, compose},
        graph::{FilterGraph, Label},
    },
    config::{
        options::{LogoRef, RenderConfig, Source, probe_logo},
        tools::Toolchain,
    },
    foundation::error::{ReelError, ReelResult, Stage},
    log::{
        event::EventLog,
        merge::{merge, prefix_paths},
        sync::{EffectiveSync, synchronize},
    },
    render::{
        process::{
            EncoderSource, Finished, POLL_INTERVAL, RendererJob, Supervised, encoder_command,
            ensure_parent_dir, release_stalled_reader, release_stalled_writer, renderer_command,
            run_to_completion,
        },
        workspace::Workspace,
    },
    repo::collect::{LocalRepo, collect, enumerate_repos, resolve},
    template::registry::TemplateDef,
};

/// How a render turns logs into the output video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Strategy {
    /// One renderer piped into one encoder.
    SingleStream,
    /// One video per repository, then a composition pass over all panels.
    MultiPanel {
        /// Number of panels.
        panels: usize,
    },
}

impl Strategy {
    /// Multi-panel only for a split template over a directory holding enough repositories.
    pub fn choose(template: &TemplateDef, source: &Source, repo_count: usize) -> Self {
        match (template.layout(), source) {
            (Some(layout), Source::Multi(_)) if repo_count >= layout.panels() => {
                Self::MultiPanel {
                    panels: layout.panels(),
                }
            }
            _ => Self::SingleStream,
        }
    }
}

/// Outcome of a successful render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderReport {
    /// Encoded video.
    pub output: PathBuf,
    /// Strategy used.
    pub strategy: Strategy,
    /// Timing mode after `auto` was resolved.
    pub sync: EffectiveSync,
    /// Contributing repositories in render order.
    pub repos: Vec<String>,
    /// Non-fatal problems, such as a renderer exiting nonzero after frames were encoded.
    pub warnings: Vec<String>,
}

/// Merged, synchronized history of a render's repositories.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedLog {
    /// Contributing repositories in merge order.
    pub repos: Vec<String>,
    /// Timing mode after `auto` was resolved.
    pub sync: EffectiveSync,
    /// Merged event log, non-decreasing in time.
    pub log: EventLog,
}

struct Prepared {
    repos: Vec<LocalRepo>,
    /// Synchronized per-repository logs, in `repos` order.
    logs: Vec<EventLog>,
    merged: MergedLog,
}

impl Prepared {
    fn names(&self) -> &[String] {
        &self.merged.repos
    }
}

/// Drives log collection, filter composition and the renderer/encoder processes.
///
/// Every intermediate file lives in a per-render working area that is removed when the
/// render returns, whatever the outcome.
#[derive(Clone, Debug, Default)]
pub struct RenderPipeline {
    tools: Toolchain,
    work_root: Option<PathBuf>,
}

impl RenderPipeline {
    /// Pipeline driving `tools`.
    pub fn new(tools: Toolchain) -> Self {
        Self {
            tools,
            work_root: None,
        }
    }

    /// Create working areas under `root` instead of the system temp directory.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    /// Tools this pipeline drives.
    pub fn toolchain(&self) -> &Toolchain {
        &self.tools
    }

    /// Collect, synchronize and merge the event logs of every repository in `cfg`.
    pub fn merged_log(&self, cfg: &RenderConfig) -> ReelResult<MergedLog> {
        let ws = Workspace::create(self.work_root.as_deref())?;
        let repos = self.repositories(cfg, &ws)?;
        Ok(self.prepare(cfg, &ws, repos)?.merged)
    }

    /// Render `cfg` into its output file.
    #[tracing::instrument(skip_all, fields(template = cfg.template.name, output = %cfg.output.display()))]
    pub fn render(&self, cfg: &RenderConfig) -> ReelResult<RenderReport> {
        let ws = Workspace::create(self.work_root.as_deref())?;

        let mut repos = self.repositories(cfg, &ws)?;
        let strategy = Strategy::choose(cfg.template, &cfg.source, repos.len());
        if let Strategy::MultiPanel { panels } = strategy {
            repos.truncate(panels);
        }
        tracing::info!(?strategy, repos = repos.len(), "starting render");

        let prepared = self.prepare(cfg, &ws, repos)?;
        if let Some(path) = &cfg.export_log {
            ensure_parent_dir(path)?;
            prepared.merged.log.write_to(path)?;
            tracing::info!(path = %path.display(), "exported merged event log");
        }

        let logo = self.logo(cfg, &ws)?;
        ensure_parent_dir(&cfg.output)?;

        let warnings = match strategy {
            Strategy::SingleStream => self.single_stream(cfg, &ws, &prepared, logo.as_deref())?,
            Strategy::MultiPanel { panels } => {
                self.multi_panel(cfg, &ws, &prepared, panels, logo.as_deref())?
            }
        };

        tracing::info!(warnings = warnings.len(), "render finished");
        Ok(RenderReport {
            output: cfg.output.clone(),
            strategy,
            sync: prepared.merged.sync,
            repos: prepared.merged.repos,
            warnings,
        })
    }

    fn repositories(&self, cfg: &RenderConfig, ws: &Workspace) -> ReelResult<Vec<LocalRepo>> {
        match &cfg.source {
            Source::Single(reference) => Ok(vec![resolve(reference, &self.tools, ws)?]),
            Source::Multi(dir) => enumerate_repos(dir),
        }
    }

    fn prepare(
        &self,
        cfg: &RenderConfig,
        ws: &Workspace,
        repos: Vec<LocalRepo>,
    ) -> ReelResult<Prepared> {
        let sync = cfg.sync.resolve(repos.len(), cfg.template.kind);
        let prefix = matches!(cfg.source, Source::Multi(_));

        let mut logs = Vec::with_capacity(repos.len());
        for (k, repo) in repos.iter().enumerate() {
            let raw = collect(&self.tools, repo, &ws.log_file(k, &repo.name))?;
            logs.push(synchronize(&raw, sync, cfg.sync_span, &repo.name));
        }

        let log = if prefix {
            merge(
                repos
                    .iter()
                    .zip(&logs)
                    .map(|(repo, log)| prefix_paths(log, &repo.name)),
            )
        } else {
            merge(logs.iter().cloned())
        };
        tracing::info!(?sync, entries = log.len(), "merged event logs");

        let names = repos.iter().map(|r| r.name.clone()).collect();
        Ok(Prepared {
            repos,
            logs,
            merged: MergedLog {
                repos: names,
                sync,
                log,
            },
        })
    }

    fn logo(&self, cfg: &RenderConfig, ws: &Workspace) -> ReelResult<Option<PathBuf>> {
        match &cfg.logo {
            None => Ok(None),
            Some(LogoRef::File(path)) => Ok(Some(path.clone())),
            Some(LogoRef::Url(url)) => {
                let dest = ws.file("logo");
                let mut cmd = Command::new(&self.tools.curl);
                cmd.args(["-fsSL", url.as_str(), "-o"]).arg(&dest);
                run_to_completion(Stage::FetchLogo, None, &mut cmd)?;
                probe_logo(&dest);
                Ok(Some(dest))
            }
        }
    }

    fn graph(
        &self,
        cfg: &RenderConfig,
        prepared: &Prepared,
        video_inputs: usize,
        logo: bool,
    ) -> ReelResult<FilterGraph> {
        compose(&ComposeInputs {
            template: cfg.template,
            canvas: cfg.canvas(),
            video_inputs,
            legend: cfg.legend,
            legend_limit: cfg.legend_limit,
            repos: prepared.names(),
            sync: prepared.merged.sync,
            log: &prepared.merged.log,
            logo,
        })
    }

    fn single_stream(
        &self,
        cfg: &RenderConfig,
        ws: &Workspace,
        prepared: &Prepared,
        logo: Option<&Path>,
    ) -> ReelResult<Vec<String>> {
        let graph = self.graph(cfg, prepared, 1, logo.is_some())?;
        let log_path = ws.file("merged.log");
        prepared.merged.log.write_to(&log_path)?;

        let repo = match &cfg.source {
            Source::Single(_) => prepared.names().first().map(String::as_str),
            Source::Multi(_) => None,
        };
        let stream = Stream {
            log: &log_path,
            title: &cfg.title,
            graph: &graph,
            logo,
            output: &cfg.output,
            repo,
            pipe_name: "frames.pipe",
        };
        Ok(self.stream(cfg, ws, &stream)?.into_iter().collect())
    }

    fn multi_panel(
        &self,
        cfg: &RenderConfig,
        ws: &Workspace,
        prepared: &Prepared,
        panels: usize,
        logo: Option<&Path>,
    ) -> ReelResult<Vec<String>> {
        let plain = FilterGraph::new(Label::Input(0));
        let mut warnings = Vec::new();
        let mut outputs = Vec::with_capacity(panels);

        for (k, (repo, log)) in prepared.repos.iter().zip(&prepared.logs).enumerate() {
            tracing::info!(panel = k, repo = %repo.name, "rendering panel");
            let log_path = ws.file(&format!("panel-{k}.log"));
            log.write_to(&log_path)?;
            let output = ws.file(&format!("panel-{k}.mp4"));
            let title = format!("{} — {}", cfg.title, repo.name);
            let pipe_name = format!("panel-{k}.pipe");
            let stream = Stream {
                log: &log_path,
                title: &title,
                graph: &plain,
                logo: None,
                output: &output,
                repo: Some(&repo.name),
                pipe_name: &pipe_name,
            };
            let warning = self
                .stream(cfg, ws, &stream)
                .map_err(|e| e.for_repo(&repo.name))?;
            warnings.extend(warning);
            outputs.push(output);
        }

        let graph = self.graph(cfg, prepared, panels, logo.is_some())?;
        tracing::info!(panels, "composing panels");
        let mut cmd = encoder_command(
            &self.tools,
            EncoderSource::Panels(&outputs),
            logo,
            &graph,
            &cfg.encoder,
            &cfg.output,
        );
        run_to_completion(Stage::Compose, None, &mut cmd)?;
        Ok(warnings)
    }

    /// Renderer piped into encoder. Returns a warning when only the renderer failed.
    fn stream(
        &self,
        cfg: &RenderConfig,
        ws: &Workspace,
        stream: &Stream<'_>,
    ) -> ReelResult<Option<String>> {
        let pipe = ws.make_fifo(stream.pipe_name)?;
        let job = RendererJob {
            log: stream.log,
            frames: &pipe,
            title: stream.title,
            canvas: cfg.canvas(),
            inner: cfg.inner_canvas(),
            fps: cfg.fps,
            tunables: &cfg.renderer,
        };

        let renderer = Supervised::spawn(
            Stage::Render,
            stream.repo,
            &mut renderer_command(&self.tools, &job),
        )?;
        let encoder = match Supervised::spawn(
            Stage::Encode,
            stream.repo,
            &mut encoder_command(
                &self.tools,
                EncoderSource::FramePipe {
                    pipe: &pipe,
                    fps: cfg.fps,
                },
                stream.logo,
                stream.graph,
                &cfg.encoder,
                stream.output,
            ),
        ) {
            Ok(encoder) => encoder,
            Err(e) => {
                renderer.kill();
                return Err(e);
            }
        };

        let (rendered, encoded) = supervise_pipe(&pipe, renderer, encoder)?;

        if !encoded.success() {
            let renderer_state = match &rendered {
                Some(rendered) => format!("renderer exited with {}", rendered.status),
                None => "renderer stopped after the encoder exited".to_owned(),
            };
            return Err(ReelError::external_tool(
                Stage::Encode,
                stream.repo,
                format!("encoder {}; {renderer_state}", encoded.describe()),
            ));
        }
        if let Some(rendered) = rendered.filter(|r| !r.success()) {
            let warning = format!("renderer {}", rendered.describe());
            tracing::warn!(repo = stream.repo, %warning, "renderer failed but the encode succeeded");
            return Ok(Some(warning));
        }
        Ok(None)
    }
}

/// Wait for both ends of the frame pipe.
///
/// Whichever side exits first releases the other from a blocked open. A renderer outliving a
/// failed encoder is killed and reported as `None`.
fn supervise_pipe(
    pipe: &Path,
    mut renderer: Supervised,
    mut encoder: Supervised,
) -> ReelResult<(Option<Finished>, Finished)> {
    loop {
        match renderer.try_wait() {
            Ok(Some(_)) => {
                let rendered = match renderer.wait() {
                    Ok(rendered) => rendered,
                    Err(e) => {
                        encoder.kill();
                        return Err(e);
                    }
                };
                if let Err(e) = release_stalled_reader(pipe, &mut encoder) {
                    encoder.kill();
                    return Err(e);
                }
                return Ok((Some(rendered), encoder.wait()?));
            }
            Ok(None) => {}
            Err(e) => {
                renderer.kill();
                encoder.kill();
                return Err(e);
            }
        }

        match encoder.try_wait() {
            Ok(Some(_)) => {
                let encoded = match encoder.wait() {
                    Ok(encoded) => encoded,
                    Err(e) => {
                        renderer.kill();
                        return Err(e);
                    }
                };
                if !encoded.success() {
                    tracing::debug!("encoder exited first; stopping the renderer");
                    renderer.kill();
                    return Ok((None, encoded));
                }
                if let Err(e) = release_stalled_writer(pipe, &mut renderer) {
                    renderer.kill();
                    return Err(e);
                }
                return Ok((Some(renderer.wait()?), encoded));
            }
            Ok(None) => {}
            Err(e) => {
                renderer.kill();
                encoder.kill();
                return Err(e);
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

/// One renderer/encoder pair.
struct Stream<'a> {
    log: &'a Path,
    title: &'a str,
    graph: &'a FilterGraph,
    logo: Option<&'a Path>,
    output: &'a Path,
    repo: Option<&'a str>,
    pipe_name: &'a str,
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
