//! webshell-launch: start the application runtime
//!
//! Finds the runtime executable and its sandbox helper, decides between a
//! normal and a `--no-sandbox` launch, then runs the runtime in the
//! foreground and reports how it ended.

pub mod config;
pub mod orchestrator;
pub mod paths;
pub mod request;
pub mod supervise;

pub use config::LauncherConfig;
pub use orchestrator::{LaunchOrchestrator, LaunchPlan};
pub use paths::{RuntimeLocator, RuntimePaths};
pub use request::{LaunchMode, LaunchRequest};
pub use supervise::ChildProcessResult;
