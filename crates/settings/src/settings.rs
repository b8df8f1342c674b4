//! Configuration system for termbridge.
//!
//! Provides compile-time constants and TOML config file support.

pub mod config;
pub mod constants;

pub use config::{
    config_path, ensure_config_file, read_config_file, ClipboardAccess, Config, Diagnostic,
    FrameReadback, DEFAULT_CONFIG,
};
