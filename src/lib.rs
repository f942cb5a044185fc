pub mod analyzer;
pub mod app;
pub mod config;
pub mod gateway;
pub mod state;
pub mod vision;
