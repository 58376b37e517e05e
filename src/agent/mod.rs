pub mod config;
mod cycle;
mod error;
mod heartbeat;
mod liveness;
mod sources;
mod supervisor;
mod uploader;

pub use config::AgentConfig;
pub use liveness::handoff;
pub use sources::SensorSourceReader;
pub use supervisor::AgentLoop;
