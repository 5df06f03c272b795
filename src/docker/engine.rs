use std::io::Write;

use crate::error::LaunchError;

use super::types::{BuildRequest, ContainerId, ContainerSpec, Created, EngineInfo, RemoveOptions};

/// Destination for streamed engine output.
pub type Sink<'a> = &'a mut (dyn Write + Send);

/// Request/response contract with the external container engine.
///
/// Every call blocks until the engine answers; there is no timeout.
pub trait Engine {
    /// Establish a session, failing if the engine is unreachable.
    fn connect(&self) -> Result<EngineInfo, LaunchError>;

    /// Build and tag an image, streaming the build's own output as it arrives.
    fn build_image(
        &self,
        request: &BuildRequest,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<(), LaunchError>;

    fn create_container(&self, spec: &ContainerSpec) -> Result<Created, LaunchError>;

    fn start_container(&self, id: &ContainerId) -> Result<(), LaunchError>;

    /// Block until the container is no longer running; returns its exit code.
    fn wait_container(&self, id: &ContainerId) -> Result<i64, LaunchError>;

    /// Copy the container's stdout to `out` and stderr to `err` until both end.
    fn container_logs(
        &self,
        id: &ContainerId,
        out: Sink<'_>,
        err: Sink<'_>,
    ) -> Result<(), LaunchError>;

    fn remove_container(&self, id: &ContainerId, opts: RemoveOptions) -> Result<(), LaunchError>;
}
