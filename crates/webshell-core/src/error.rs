//! Error types for launcher operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Errors that stop the launcher.
///
/// Sandbox repair problems never show up here: they are absorbed by the
/// escalation engine and turned into a degraded launch.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Application runtime not found (searched {})", display_paths(.searched))]
    RuntimeNotFound { searched: Vec<PathBuf> },

    #[error("Failed to start {}: {source}", .program.display())]
    ChildSpawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Runtime killed by signal {signal}")]
    ChildSignaled { signal: i32 },

    #[error("Locale error: {0}")]
    Locale(String),
}

impl LaunchError {
    /// Exit status the launcher reports for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = LaunchError::from(io_err);
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_runtime_not_found_lists_candidates() {
        let err = LaunchError::RuntimeNotFound {
            searched: vec![PathBuf::from("/a/electron"), PathBuf::from("/b/electron")],
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/electron"));
        assert!(msg.contains("/b/electron"));
    }

    #[test]
    fn test_runtime_not_found_empty() {
        let err = LaunchError::RuntimeNotFound { searched: vec![] };
        assert!(err.to_string().contains("nothing"));
    }

    #[test]
    fn test_spawn_error_names_program() {
        let err = LaunchError::ChildSpawn {
            program: PathBuf::from("/opt/app/electron"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/opt/app/electron"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_signaled_exit_code() {
        assert_eq!(LaunchError::ChildSignaled { signal: 9 }.exit_code(), 1);
    }
}
