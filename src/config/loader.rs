use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::Config;

pub const CONFIG_FILE: &str = ".jai-docker.yaml";
pub const HOME_ENV: &str = "JAI_DOCKER_HOME";
pub const RUNTIME_ENV: &str = "JAI_DOCKER_RUNTIME";

/// Load config from `.jai-docker.yaml` in the project directory.
pub fn load(project_dir: &Path) -> Result<Option<Config>> {
    let path = project_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(Some(config))
}

/// The directory holding the Dockerfiles and the freshness markers.
///
/// `$JAI_DOCKER_HOME` wins; otherwise the source checkout this binary was
/// built from.
pub fn resolve_project_dir(home_override: Option<&str>) -> PathBuf {
    match home_override {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
    }
}

/// Apply a runtime override, ignoring blank values.
pub fn apply_runtime_override(config: &mut Config, runtime: Option<&str>) {
    if let Some(runtime) = runtime
        && !runtime.trim().is_empty()
    {
        config.runtime = runtime.trim().to_string();
    }
}
