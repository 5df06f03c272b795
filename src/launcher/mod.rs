// Run orchestration: image freshness, container lifecycle, output streaming.

mod orchestrator;
mod request;

pub use orchestrator::Launcher;
pub use request::RunRequest;
