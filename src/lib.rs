pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod settings;
pub mod sync;
