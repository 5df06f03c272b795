use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::docker::{
    BindMount, BuildRequest, ContainerId, ContainerSpec, Created, Engine, RemoveOptions, Sink,
};
use crate::error::LaunchError;
use crate::freshness;

use super::request::RunRequest;

/// Sequences one invocation: image freshness, container create/start/wait,
/// log streaming, and removal.
pub struct Launcher<'a, E: Engine> {
    engine: &'a E,
    settings: &'a Settings,
    working_dir: Option<PathBuf>,
}

impl<'a, E: Engine> Launcher<'a, E> {
    pub fn new(engine: &'a E, settings: &'a Settings) -> Self {
        Self {
            engine,
            settings,
            working_dir: None,
        }
    }

    /// Mount `dir` instead of the process's current directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run `request` in a fresh container and return its exit code.
    ///
    /// `out` and `err` receive build output, container output, and
    /// informational messages. Any error aborts the run; a container that
    /// was already created is still removed on a best-effort basis.
    pub fn run(
        &self,
        request: &RunRequest,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<i32, LaunchError> {
        let begin = Instant::now();

        let info = self.engine.connect()?;
        debug!(runtime = %info.runtime, version = %info.server_version, "connected to engine");

        self.refresh_images(false, &mut *out, &mut *err)?;

        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => {
                std::env::current_dir().map_err(|source| LaunchError::WorkingDir { source })?
            }
        };
        let spec = self.container_spec(request, cwd);

        let created = match self.engine.create_container(&spec) {
            Ok(created) => created,
            Err(first) => {
                warn!(error = %first, "container creation failed; rebuilding images and retrying");
                self.refresh_images(true, &mut *out, &mut *err)?;
                self.engine.create_container(&spec)?
            }
        };
        let Created { id, warnings } = created;
        for warning in &warnings {
            let _ = writeln!(err, "warning: {warning}");
        }
        debug!(container = %id, "container created");

        match self.execute(&id, begin, &mut *out, &mut *err) {
            Ok(code) => {
                self.engine.remove_container(&id, RemoveOptions::default())?;
                debug!(container = %id, code, "container removed");
                Ok(code)
            }
            Err(e) => {
                if let Err(cleanup) = self.engine.remove_container(&id, RemoveOptions::default()) {
                    warn!(container = %id, error = %cleanup, "cleanup after failed run");
                }
                Err(e)
            }
        }
    }

    /// Start, wait, and stream logs for a created container.
    fn execute(
        &self,
        id: &ContainerId,
        begin: Instant,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<i32, LaunchError> {
        self.engine.start_container(id)?;

        let setup = begin.elapsed();
        info!(seconds = setup.as_secs_f64(), "container setup finished");
        let _ = writeln!(err, "container setup took {:.3}s", setup.as_secs_f64());

        let status = self.engine.wait_container(id)?;
        self.engine.container_logs(id, &mut *out, &mut *err)?;

        Ok(status.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Build base then compiler when stale, or unconditionally when `force`.
    fn refresh_images(
        &self,
        force: bool,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<(), LaunchError> {
        let project_dir = &self.settings.project_dir;
        for descriptor in self.settings.config.descriptors() {
            // Evaluated even when forced so the marker is refreshed.
            let stale = freshness::needs_build(project_dir, &descriptor)?;
            if !stale && !force {
                debug!(image = %descriptor.image, "image is fresh");
                continue;
            }

            info!(image = %descriptor.image, forced = force, "building image");
            let request = BuildRequest {
                image: descriptor.image.clone(),
                dockerfile: project_dir.join(&descriptor.dockerfile),
                context: project_dir.clone(),
                platform: self.settings.config.platform.clone(),
            };
            self.engine.build_image(&request, &mut *out, &mut *err)?;
        }
        Ok(())
    }

    fn container_spec(&self, request: &RunRequest, cwd: PathBuf) -> ContainerSpec {
        let config = &self.settings.config;
        ContainerSpec {
            image: config.compiler_image.clone(),
            command: request.command(),
            working_dir: config.workdir_mount.clone(),
            mounts: vec![
                BindMount::new(cwd, &config.workdir_mount),
                BindMount::new(&self.settings.project_dir, &config.project_mount),
            ],
            platform: config.platform.clone(),
        }
    }
}
