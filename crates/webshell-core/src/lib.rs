//! webshell-core: shared types and errors for the webshell launcher
//!
//! This crate provides the foundational pieces used by all webshell sub-crates:
//! - Error type and Result alias
//! - Platform detection (the sandbox helper only matters on Linux)
//! - Effective UID queries

pub mod error;
pub mod platform;
pub mod util;

pub use error::{LaunchError, Result};
pub use platform::Platform;
