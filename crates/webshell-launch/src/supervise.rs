//! Running the runtime in the foreground and relaying how it ended

use log::{debug, info};
use std::ffi::OsString;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use webshell_core::{LaunchError, Result};

/// Terminal state of the runtime process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildProcessResult {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ChildProcessResult {
    pub fn from_status(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }

    /// Status the launcher exits with: 1 after a signal, otherwise the
    /// runtime's own code (0 if it reported none)
    pub fn exit_code(&self) -> i32 {
        if self.signal.is_some() {
            1
        } else {
            self.code.unwrap_or(0)
        }
    }

    /// Runtime's exit code, or [`LaunchError::ChildSignaled`]
    pub fn into_result(self) -> Result<i32> {
        match self.signal {
            Some(signal) => Err(LaunchError::ChildSignaled { signal }),
            None => Ok(self.code.unwrap_or(0)),
        }
    }
}

/// Start `program` with inherited stdio and exactly `env`, and wait for it.
/// Runs once; the runtime is never restarted.
pub fn spawn_and_wait(
    program: &Path,
    args: &[String],
    env: &[(OsString, OsString)],
) -> Result<ChildProcessResult> {
    debug!("Spawning {} {:?}", program.display(), args);

    let mut child = Command::new(program)
        .args(args)
        .env_clear()
        .envs(env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LaunchError::ChildSpawn {
            program: program.to_path_buf(),
            source,
        })?;

    let status = child.wait()?;
    let result = ChildProcessResult::from_status(status);
    info!(
        "Runtime exited (code={:?}, signal={:?})",
        result.code, result.signal
    );
    Ok(result)
}
