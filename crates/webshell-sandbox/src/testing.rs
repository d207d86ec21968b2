//! In-memory [`PrivilegeHost`] for exercising audit and escalation logic
//! without root

use std::cell::{Cell, RefCell};
use std::io;
use std::path::Path;

use crate::host::{CommandOutcome, ElevatedCommand, HelperMetadata, Interaction, PrivilegeHost};

/// A call observed by [`FakeHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Stat,
    Direct,
    Elevated {
        interaction: Interaction,
        command: String,
    },
}

/// Simulated helper file plus scripted privilege behavior
#[derive(Debug)]
pub struct FakeHost {
    file: Cell<Option<HelperMetadata>>,
    superuser: bool,
    terminal: bool,
    direct_works: bool,
    cached_credentials: bool,
    prompt_accepted: bool,
    calls: RefCell<Vec<FakeCall>>,
}

impl FakeHost {
    /// Non-root process, no terminal, sudo refusing everything
    pub fn new(uid: u32, permissions: u32) -> Self {
        Self {
            file: Cell::new(Some(HelperMetadata {
                uid,
                mode: 0o100000 | permissions,
            })),
            superuser: false,
            terminal: false,
            direct_works: true,
            cached_credentials: false,
            prompt_accepted: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn missing(self) -> Self {
        self.file.set(None);
        self
    }

    pub fn superuser(mut self) -> Self {
        self.superuser = true;
        self
    }

    pub fn with_terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Direct chown/chmod fails (read-only filesystem and the like)
    pub fn direct_fails(mut self) -> Self {
        self.direct_works = false;
        self
    }

    /// `sudo -n` succeeds
    pub fn cached_credentials(mut self) -> Self {
        self.cached_credentials = true;
        self
    }

    /// Interactive `sudo` succeeds once the user answers the prompt
    pub fn prompt_accepted(mut self) -> Self {
        self.prompt_accepted = true;
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.borrow().clone()
    }

    pub fn stat_count(&self) -> usize {
        self.count(|c| matches!(c, FakeCall::Stat))
    }

    pub fn direct_count(&self) -> usize {
        self.count(|c| matches!(c, FakeCall::Direct))
    }

    pub fn elevated_count(&self, interaction: Interaction) -> usize {
        self.count(|c| matches!(c, FakeCall::Elevated { interaction: i, .. } if *i == interaction))
    }

    /// Any call that could change the helper
    pub fn mutation_count(&self) -> usize {
        self.count(|c| !matches!(c, FakeCall::Stat))
    }

    fn count(&self, pred: impl Fn(&FakeCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    /// chown to root (clearing set-id bits), then chmod
    fn set_root_and_mode(&self, mode: u32) {
        let Some(mut meta) = self.file.get() else {
            return;
        };
        meta.uid = 0;
        meta.mode = (meta.mode & !0o7777) | mode;
        self.file.set(Some(meta));
    }

    /// Mode requested by the `chmod` in an elevated repair script
    fn requested_mode(command: &ElevatedCommand) -> Option<u32> {
        let script = command.args.get(1)?.to_string_lossy().into_owned();
        let rest = &script[script.find("chmod ")? + "chmod ".len()..];
        let digits = rest.split_whitespace().next()?;
        u32::from_str_radix(digits, 8).ok()
    }
}

impl PrivilegeHost for FakeHost {
    fn stat(&self, _path: &Path) -> io::Result<HelperMetadata> {
        self.calls.borrow_mut().push(FakeCall::Stat);
        self.file
            .get()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn is_superuser(&self) -> bool {
        self.superuser
    }

    fn has_controlling_terminal(&self) -> bool {
        self.terminal
    }

    fn set_root_owner_and_mode(&self, _path: &Path, mode: u32) -> io::Result<()> {
        self.calls.borrow_mut().push(FakeCall::Direct);
        if !self.direct_works || !self.superuser {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "operation not permitted",
            ));
        }
        self.set_root_and_mode(mode);
        Ok(())
    }

    fn run_elevated(
        &self,
        command: &ElevatedCommand,
        interaction: Interaction,
    ) -> io::Result<CommandOutcome> {
        self.calls.borrow_mut().push(FakeCall::Elevated {
            interaction,
            command: command.describe(),
        });

        let allowed = match interaction {
            Interaction::NonInteractive => self.cached_credentials,
            Interaction::Interactive => self.prompt_accepted,
        };

        if !allowed {
            return Ok(CommandOutcome {
                success: false,
                code: Some(1),
                stderr: "sudo: a password is required".to_string(),
            });
        }

        if let Some(mode) = Self::requested_mode(command) {
            self.set_root_and_mode(mode);
        }
        Ok(CommandOutcome {
            success: true,
            code: Some(0),
            stderr: String::new(),
        })
    }
}
