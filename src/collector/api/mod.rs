pub mod bots;
pub mod error;
