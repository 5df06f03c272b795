use std::fmt;
use std::path::PathBuf;

/// Engine-assigned container identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(pub String);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the engine reported when the session was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub runtime: String,
    pub server_version: String,
}

/// An image build: Dockerfile plus context directory, tagged `image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub image: String,
    /// Absolute path.
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub platform: Option<String>,
}

/// A host directory bind-mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub source: PathBuf,
    pub target: String,
}

impl BindMount {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Render as a `--mount` value. Fields holding `,` or `"` are CSV-quoted.
    pub fn to_mount_arg(&self) -> String {
        let source = self.source.to_string_lossy();
        format!(
            "type=bind,{},{}",
            csv_field(&format!("source={source}")),
            csv_field(&format!("target={}", self.target)),
        )
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Everything needed to create one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    /// Executable followed by its arguments; never passed through a shell.
    pub command: Vec<String>,
    pub working_dir: String,
    pub mounts: Vec<BindMount>,
    pub platform: Option<String>,
}

/// A created (not yet started) container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: ContainerId,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOptions {
    pub force: bool,
    pub volumes: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self {
            force: true,
            volumes: true,
        }
    }
}
