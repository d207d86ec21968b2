//! System operations the audit and repair steps depend on
//!
//! Everything that touches the real machine (stat, chown, sudo, the
//! terminal) goes through [`PrivilegeHost`], so the escalation order can be
//! exercised without root.

use log::debug;
use nix::unistd::{Gid, Uid, chown};
use std::ffi::OsString;
use std::fs::{self, OpenOptions, Permissions};
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use webshell_core::util::{self, ROOT_UID};

/// Default privilege elevation tool
pub const DEFAULT_ELEVATION_TOOL: &str = "sudo";

/// Owner and mode bits of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelperMetadata {
    pub uid: u32,
    pub mode: u32,
}

/// How an elevated command may interact with the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Fail instead of prompting; no terminal attached
    NonInteractive,
    /// Inherit the terminal so a password prompt can be answered
    Interactive,
}

/// A command run through the elevation tool, kept as an argument vector so
/// the helper path is never interpreted by a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatedCommand {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ElevatedCommand {
    /// Ownership and mode change as one elevated invocation, so the user
    /// answers at most one password prompt. The path is passed as `$1` and
    /// never becomes part of the script text. Ownership goes first: changing
    /// the owner clears the set-user-ID bit.
    pub fn repair(path: &Path, mode: u32) -> Self {
        Self {
            program: "sh".to_string(),
            args: vec![
                "-c".into(),
                format!(
                    "chown root:root -- \"$1\" && chmod {:o} -- \"$1\"",
                    mode
                )
                .into(),
                "sh".into(),
                path.as_os_str().to_owned(),
            ],
        }
    }

    /// Target path of a command built by this type (always the last argument)
    pub fn target(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    /// Arguments passed to the elevation tool
    pub fn elevation_argv(&self, interaction: Interaction) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if interaction == Interaction::NonInteractive {
            argv.push("-n".into());
        }
        argv.push(self.program.clone().into());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Human-readable form for logs
    pub fn describe(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        format!("{} {}", self.program, args.join(" "))
    }
}

/// Result of an elevated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub code: Option<i32>,
    /// Captured stderr; empty for interactive runs
    pub stderr: String,
}

/// Operations on the host used to audit and repair the helper
pub trait PrivilegeHost {
    /// Owner and mode of `path`
    fn stat(&self, path: &Path) -> io::Result<HelperMetadata>;

    /// Whether this process already has superuser identity
    fn is_superuser(&self) -> bool;

    /// Whether a controlling terminal is available for a password prompt
    fn has_controlling_terminal(&self) -> bool;

    /// Change owner to root and set `mode`, in-process
    fn set_root_owner_and_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Run `command` through the elevation tool and wait for it
    fn run_elevated(
        &self,
        command: &ElevatedCommand,
        interaction: Interaction,
    ) -> io::Result<CommandOutcome>;
}

/// The real machine
#[derive(Debug, Clone)]
pub struct SystemHost {
    elevation_tool: PathBuf,
}

impl Default for SystemHost {
    fn default() -> Self {
        Self {
            elevation_tool: PathBuf::from(DEFAULT_ELEVATION_TOOL),
        }
    }
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elevation_tool(tool: impl Into<PathBuf>) -> Self {
        Self {
            elevation_tool: tool.into(),
        }
    }

    pub fn elevation_tool(&self) -> &Path {
        &self.elevation_tool
    }
}

impl PrivilegeHost for SystemHost {
    fn stat(&self, path: &Path) -> io::Result<HelperMetadata> {
        let meta = fs::metadata(path)?;
        Ok(HelperMetadata {
            uid: meta.uid(),
            mode: meta.mode(),
        })
    }

    fn is_superuser(&self) -> bool {
        util::is_root()
    }

    fn has_controlling_terminal(&self) -> bool {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .is_ok()
    }

    fn set_root_owner_and_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        chown(
            path,
            Some(Uid::from_raw(ROOT_UID)),
            Some(Gid::from_raw(ROOT_UID)),
        )
        .map_err(io::Error::from)?;
        fs::set_permissions(path, Permissions::from_mode(mode))
    }

    fn run_elevated(
        &self,
        command: &ElevatedCommand,
        interaction: Interaction,
    ) -> io::Result<CommandOutcome> {
        let mut cmd = Command::new(&self.elevation_tool);
        cmd.args(command.elevation_argv(interaction));
        debug!(
            "Running {} {:?}",
            self.elevation_tool.display(),
            command.elevation_argv(interaction)
        );

        match interaction {
            Interaction::NonInteractive => {
                let output = cmd
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()?;
                Ok(CommandOutcome {
                    success: output.status.success(),
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
            Interaction::Interactive => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()?;
                Ok(CommandOutcome {
                    success: status.success(),
                    code: status.code(),
                    stderr: String::new(),
                })
            }
        }
    }
}
