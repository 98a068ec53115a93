//! Climate API Core Library
//!
//! Shared utilities for the climate API service:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Application constants

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::is_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "climate-api";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default location of the station dataset
pub const DEFAULT_DATABASE: &str = "./hawaii.sqlite";
