use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A Dockerfile paired with the image tag it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Relative to the project directory.
    pub dockerfile: PathBuf,
    pub image: String,
}

impl ImageDescriptor {
    pub fn new(dockerfile: impl Into<PathBuf>, image: impl Into<String>) -> Self {
        Self {
            dockerfile: dockerfile.into(),
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Container CLI to drive (`docker`, `podman`, or a path).
    pub runtime: String,
    pub platform: Option<String>,
    pub base_image: String,
    pub base_dockerfile: PathBuf,
    pub compiler_image: String,
    pub compiler_dockerfile: PathBuf,
    /// In-container binary run by `jai`.
    pub binary: String,
    /// In-container shell run by `jaish`.
    pub shell: String,
    /// Mount point for the caller's working directory; also the container workdir.
    pub workdir_mount: String,
    /// Mount point for the project directory.
    pub project_mount: String,
}

impl Config {
    /// Image descriptors in build order: base first, compiler second.
    pub fn descriptors(&self) -> [ImageDescriptor; 2] {
        [
            ImageDescriptor::new(&self.base_dockerfile, &self.base_image),
            ImageDescriptor::new(&self.compiler_dockerfile, &self.compiler_image),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            platform: Some("linux/amd64".to_string()),
            base_image: "jai-docker/ubuntu".to_string(),
            base_dockerfile: PathBuf::from("ubuntu.Dockerfile"),
            compiler_image: "jai-docker/compiler".to_string(),
            compiler_dockerfile: PathBuf::from("Dockerfile"),
            binary: "/root/jai-docker/jai/bin/jai-linux".to_string(),
            shell: "/bin/bash".to_string(),
            workdir_mount: "/cwd".to_string(),
            project_mount: "/root/jai-docker".to_string(),
        }
    }
}
