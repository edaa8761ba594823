//! Configuration module for filexfer
//!
//! Provides configuration management including CLI arguments,
//! config files, and runtime settings.

mod settings;

pub use settings::*;
