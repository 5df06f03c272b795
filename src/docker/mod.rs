// Docker engine boundary: the Engine contract, the CLI-backed engine, stream copying.

pub mod cli;
pub mod engine;
pub mod stream;
pub mod types;

pub use cli::DockerCli;
pub use engine::{Engine, Sink};
pub use types::{
    BindMount, BuildRequest, ContainerId, ContainerSpec, Created, EngineInfo, RemoveOptions,
};
