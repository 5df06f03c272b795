use std::process::{Command, Output, Stdio};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{ContainerOp, LaunchError};

use super::engine::{Engine, Sink};
use super::stream::{copy_streams, tee_lines};
use super::types::{BuildRequest, ContainerId, ContainerSpec, Created, EngineInfo, RemoveOptions};

/// [`Engine`] backed by the `docker` CLI (or anything CLI-compatible,
/// such as `podman`).
///
/// Host, TLS and API version come from the CLI's own environment
/// (`DOCKER_HOST`, contexts, ...); nothing is configured here.
#[derive(Debug, Clone)]
pub struct DockerCli {
    runtime: String,
}

impl DockerCli {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let line = shell_words::join(
            std::iter::once(self.runtime.as_str()).chain(args.iter().map(String::as_str)),
        );
        debug!(command = %line, "engine call");
        let mut cmd = Command::new(&self.runtime);
        cmd.args(args);
        cmd
    }

    /// Run a short engine command to completion, failing on non-zero exit.
    fn run_container_op(&self, op: ContainerOp, args: &[String]) -> Result<Output, LaunchError> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                LaunchError::container(op, format!("failed to invoke `{}`: {e}", self.runtime))
            })?;

        if !output.status.success() {
            return Err(LaunchError::container(op, failure_message(&output)));
        }
        Ok(output)
    }
}

impl Engine for DockerCli {
    fn connect(&self) -> Result<EngineInfo, LaunchError> {
        let output = self
            .command(&version_args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| LaunchError::EngineUnavailable {
                runtime: self.runtime.clone(),
                message: format!(
                    "failed to invoke `{}`; is it installed and on PATH? ({e})",
                    self.runtime
                ),
            })?;

        if !output.status.success() {
            return Err(LaunchError::EngineUnavailable {
                runtime: self.runtime.clone(),
                message: failure_message(&output),
            });
        }

        Ok(EngineInfo {
            runtime: self.runtime.clone(),
            server_version: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        })
    }

    fn build_image(
        &self,
        request: &BuildRequest,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<(), LaunchError> {
        let mut child = self
            .command(&build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LaunchError::EngineUnavailable {
                runtime: self.runtime.clone(),
                message: format!("failed to spawn `{} build`: {e}", self.runtime),
            })?;

        let build_log_err = |source| LaunchError::BuildLog {
            image: request.image.clone(),
            source,
        };
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(build_log_err(std::io::Error::other("build output was not piped")));
        };

        let last_error = Mutex::new(None::<String>);
        let copied = tee_lines(stdout, stderr, out, err, |line| {
            if is_error_line(line)
                && let Ok(mut slot) = last_error.lock()
            {
                *slot = Some(line.to_string());
            }
        });

        let status = child.wait().map_err(build_log_err)?;
        copied.map_err(build_log_err)?;

        if !status.success() {
            let message = last_error
                .into_inner()
                .ok()
                .flatten()
                .unwrap_or_else(|| format!("build exited with {status}"));
            return Err(LaunchError::Build {
                image: request.image.clone(),
                message,
                detail: status.to_string(),
            });
        }
        Ok(())
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<Created, LaunchError> {
        let output = self.run_container_op(ContainerOp::Create, &create_args(spec))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let id = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .ok_or_else(|| LaunchError::container(ContainerOp::Create, "engine returned no id"))?;

        Ok(Created {
            id: ContainerId(id.to_string()),
            warnings: parse_warnings(&String::from_utf8_lossy(&output.stderr)),
        })
    }

    fn start_container(&self, id: &ContainerId) -> Result<(), LaunchError> {
        self.run_container_op(ContainerOp::Start, &["start".into(), id.to_string()])?;
        Ok(())
    }

    fn wait_container(&self, id: &ContainerId) -> Result<i64, LaunchError> {
        let output = self.run_container_op(ContainerOp::Wait, &["wait".into(), id.to_string()])?;
        parse_exit_code(&String::from_utf8_lossy(&output.stdout))
    }

    fn container_logs(
        &self,
        id: &ContainerId,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<(), LaunchError> {
        let logs_err = |message: String| LaunchError::container(ContainerOp::Logs, message);

        let mut child = self
            .command(&["logs".into(), id.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| logs_err(format!("failed to invoke `{}`: {e}", self.runtime)))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(logs_err("log output was not piped".into()));
        };

        let copied = copy_streams(stdout, stderr, out, err);
        let status = child.wait().map_err(|e| logs_err(e.to_string()))?;
        copied.map_err(|e| logs_err(format!("copying container output: {e}")))?;

        if !status.success() {
            return Err(logs_err(format!("`{} logs` exited with {status}", self.runtime)));
        }
        Ok(())
    }

    fn remove_container(&self, id: &ContainerId, opts: RemoveOptions) -> Result<(), LaunchError> {
        self.run_container_op(ContainerOp::Remove, &remove_args(id, opts))?;
        Ok(())
    }
}

// ── argument builders ────────────────────────────────────────────────

fn version_args() -> Vec<String> {
    vec![
        "version".into(),
        "--format".into(),
        "{{.Server.Version}}".into(),
    ]
}

fn build_args(request: &BuildRequest) -> Vec<String> {
    let mut args = vec!["build".to_string()];
    if let Some(platform) = &request.platform {
        args.push(format!("--platform={platform}"));
    }
    args.extend([
        "-f".into(),
        request.dockerfile.to_string_lossy().into_owned(),
        "--tag".into(),
        request.image.clone(),
        request.context.to_string_lossy().into_owned(),
    ]);
    args
}

fn create_args(spec: &ContainerSpec) -> Vec<String> {
    // A missing image must fail creation rather than trigger a registry pull.
    let mut args = vec!["create".to_string(), "--pull=never".to_string()];
    if let Some(platform) = &spec.platform {
        args.push(format!("--platform={platform}"));
    }
    args.extend(["--workdir".into(), spec.working_dir.clone()]);
    for mount in &spec.mounts {
        args.extend(["--mount".into(), mount.to_mount_arg()]);
    }
    args.push(spec.image.clone());
    args.extend(spec.command.iter().cloned());
    args
}

fn remove_args(id: &ContainerId, opts: RemoveOptions) -> Vec<String> {
    let mut args = vec!["rm".to_string()];
    if opts.force {
        args.push("--force".into());
    }
    if opts.volumes {
        args.push("--volumes".into());
    }
    args.push(id.to_string());
    args
}

// ── output parsing ───────────────────────────────────────────────────

fn is_error_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("ERROR") || line.starts_with("error:")
}

fn parse_warnings(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("WARNING"))
        .map(|l| {
            l.trim_start_matches("WARNING")
                .trim_start_matches(':')
                .trim()
                .to_string()
        })
        .collect()
}

fn parse_exit_code(stdout: &str) -> Result<i64, LaunchError> {
    let text = stdout.trim();
    text.lines()
        .last()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| {
            LaunchError::container(ContainerOp::Wait, format!("unexpected exit status {text:?}"))
        })
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}
