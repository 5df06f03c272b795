use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse category of a [`LaunchError`], stable enough for callers and
/// tests to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Build files, marker files, or the working directory.
    Configuration,
    /// Engine unreachable or an image build failed.
    Engine,
    /// Build output could not be read.
    BuildLog,
    /// Container create/start/wait/logs/remove failed.
    Runtime,
}

/// Container lifecycle step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerOp {
    Create,
    Start,
    Wait,
    Logs,
    Remove,
}

impl ContainerOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerOp::Create => "create",
            ContainerOp::Start => "start",
            ContainerOp::Wait => "wait",
            ContainerOp::Logs => "logs",
            ContainerOp::Remove => "remove",
        }
    }
}

impl fmt::Display for ContainerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("build file {} is missing", .path.display())]
    MissingBuildFile { path: PathBuf, source: io::Error },

    #[error("failed to update freshness marker {}", .path.display())]
    Marker { path: PathBuf, source: io::Error },

    #[error("cannot resolve the current working directory")]
    WorkingDir { source: io::Error },

    #[error("container engine `{runtime}` is unavailable: {message}")]
    EngineUnavailable { runtime: String, message: String },

    #[error("building image {image} failed: {message} ({detail})")]
    Build {
        image: String,
        message: String,
        detail: String,
    },

    #[error("failed to read build output for {image}")]
    BuildLog { image: String, source: io::Error },

    #[error("container {op} failed: {message}")]
    Container { op: ContainerOp, message: String },
}

impl LaunchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LaunchError::MissingBuildFile { .. }
            | LaunchError::Marker { .. }
            | LaunchError::WorkingDir { .. } => ErrorKind::Configuration,
            LaunchError::EngineUnavailable { .. } | LaunchError::Build { .. } => ErrorKind::Engine,
            LaunchError::BuildLog { .. } => ErrorKind::BuildLog,
            LaunchError::Container { .. } => ErrorKind::Runtime,
        }
    }

    pub fn container(op: ContainerOp, message: impl Into<String>) -> Self {
        LaunchError::Container {
            op,
            message: message.into(),
        }
    }
}
