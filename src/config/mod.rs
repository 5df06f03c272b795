// Settings: project directory, YAML config, env overrides.

mod loader;
mod types;

use std::path::PathBuf;

use anyhow::Result;

pub use loader::{
    CONFIG_FILE, HOME_ENV, RUNTIME_ENV, apply_runtime_override, load, resolve_project_dir,
};
pub use types::{Config, ImageDescriptor};

/// Everything resolved once at startup and handed to the launcher.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_dir: PathBuf,
    pub config: Config,
}

impl Settings {
    pub fn new(project_dir: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            project_dir: project_dir.into(),
            config,
        }
    }

    /// Resolve the project directory and config from the process environment.
    pub fn from_env() -> Result<Self> {
        let home = std::env::var(HOME_ENV).ok();
        let project_dir = resolve_project_dir(home.as_deref());
        let mut config = load(&project_dir)?.unwrap_or_default();
        let runtime = std::env::var(RUNTIME_ENV).ok();
        apply_runtime_override(&mut config, runtime.as_deref());
        Ok(Self::new(project_dir, config))
    }
}
