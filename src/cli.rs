use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Settings;
use crate::docker::DockerCli;
use crate::launcher::{Launcher, RunRequest};

/// Env var holding the tracing filter, e.g. `JAI_DOCKER_LOG=debug`.
pub const LOG_ENV: &str = "JAI_DOCKER_LOG";

/// How the raw command-line arguments become a container command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// `jai`: the configured binary with the arguments appended verbatim.
    Binary,
    /// `jaish`: the arguments joined into one `shell -c` command.
    Shell,
}

/// Process entry point shared by both binaries.
pub fn main(mode: EntryMode) -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    match launch(mode, &args) {
        Ok(code) => ExitCode::from(exit_status(code)),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn launch(mode: EntryMode, args: &[String]) -> Result<i32> {
    let settings = Settings::from_env().context("failed to load settings")?;
    let engine = DockerCli::new(settings.config.runtime.clone());
    let request = build_request(mode, &settings, args);

    let code = Launcher::new(&engine, &settings).run(
        &request,
        &mut io::stdout(),
        &mut io::stderr(),
    )?;
    Ok(code)
}

pub fn build_request(mode: EntryMode, settings: &Settings, args: &[String]) -> RunRequest {
    match mode {
        EntryMode::Binary => RunRequest::binary(&settings.config.binary, args.to_vec()),
        EntryMode::Shell => RunRequest::shell(&settings.config.shell, args),
    }
}

/// Container exit codes outside `0..=255` collapse to a generic failure.
pub fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
