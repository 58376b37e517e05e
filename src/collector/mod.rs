pub mod api;
pub mod api_doc;
pub mod config;
pub mod engine;
pub mod file_store;
pub mod server;
pub mod store;
pub mod ui;

pub use config::CollectorConfig;
pub use server::{router, run_server, AppState};
pub use store::MemoryStore;
