pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod freshness;
pub mod launcher;

pub use error::{ContainerOp, ErrorKind, LaunchError};
