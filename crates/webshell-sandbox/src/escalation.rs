//! Escalating repair of the sandbox helper
//!
//! Strategies run in a fixed order, least invasive first. Each one mutates
//! the helper and is immediately followed by a fresh audit; the first
//! strategy whose action succeeds *and* whose audit reports compliance ends
//! the sequence.

use log::{debug, info, warn};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

use webshell_locale::Translator;

use crate::audit::{COMPLIANT_MODE, SandboxHelperState};
use crate::host::{ElevatedCommand, Interaction, PrivilegeHost};

/// One way of bringing the helper into compliance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// chown/chmod in-process; only when already root
    Direct,
    /// `sudo -n`, reusing cached credentials, never prompting
    NonInteractive,
    /// `sudo` on the terminal, prompting for a password
    Interactive,
}

impl StrategyKind {
    /// Order in which strategies are tried
    pub const ORDER: [StrategyKind; 3] = [
        StrategyKind::Direct,
        StrategyKind::NonInteractive,
        StrategyKind::Interactive,
    ];

    /// Whether this strategy can run in the current process at all
    pub fn applicable<H: PrivilegeHost + ?Sized>(&self, host: &H) -> bool {
        match self {
            StrategyKind::Direct => host.is_superuser(),
            // As root, sudo has nothing more to offer than the direct path
            StrategyKind::NonInteractive => !host.is_superuser(),
            StrategyKind::Interactive => !host.is_superuser() && host.has_controlling_terminal(),
        }
    }

    /// Perform the mutation. Compliance is checked by the caller.
    fn attempt<H: PrivilegeHost + ?Sized, W: Write>(
        &self,
        host: &H,
        path: &Path,
        translator: &Translator,
        out: &mut W,
    ) -> Result<(), StrategyFailure> {
        match self {
            StrategyKind::Direct => host
                .set_root_owner_and_mode(path, COMPLIANT_MODE)
                .map_err(StrategyFailure::Filesystem),
            StrategyKind::NonInteractive => run_repair(host, path, Interaction::NonInteractive),
            StrategyKind::Interactive => {
                if let Err(e) = writeln!(out, "{}", translator.t("sudo_prompt"))
                    .and_then(|()| out.flush())
                {
                    debug!("Could not show the password notice: {}", e);
                }
                run_repair(host, path, Interaction::Interactive)
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Direct => "direct",
            StrategyKind::NonInteractive => "sudo-non-interactive",
            StrategyKind::Interactive => "sudo-interactive",
        };
        f.write_str(name)
    }
}

fn run_repair<H: PrivilegeHost + ?Sized>(
    host: &H,
    path: &Path,
    interaction: Interaction,
) -> Result<(), StrategyFailure> {
    let command = ElevatedCommand::repair(path, COMPLIANT_MODE);
    let outcome = host
        .run_elevated(&command, interaction)
        .map_err(StrategyFailure::ElevationUnavailable)?;

    if !outcome.success {
        return Err(StrategyFailure::CommandFailed {
            step: command.describe(),
            code: outcome.code,
            stderr: outcome.stderr,
        });
    }
    Ok(())
}

/// Why a single strategy did not produce a compliant helper
#[derive(Error, Debug)]
pub enum StrategyFailure {
    #[error("filesystem change failed: {0}")]
    Filesystem(#[source] io::Error),

    #[error("could not run the elevation tool: {0}")]
    ElevationUnavailable(#[source] io::Error),

    #[error("`{step}` failed ({}){}", describe_code(.code), describe_stderr(.stderr))]
    CommandFailed {
        step: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("helper is still not compliant after the change")]
    StillNonCompliant,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Record of one strategy run, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationAttempt {
    pub strategy: StrategyKind,
    pub succeeded: bool,
    pub detail: String,
}

/// How the repair ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The first audit already passed; nothing was attempted
    AlreadyCompliant,
    /// A strategy made the helper compliant
    Repaired(StrategyKind),
    /// The helper does not exist, so there is nothing to repair
    HelperMissing,
    /// Every applicable strategy failed
    Exhausted,
}

/// Everything the engine did for one helper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationReport {
    pub attempts: Vec<EscalationAttempt>,
    pub outcome: RepairOutcome,
}

impl EscalationReport {
    /// Whether the runtime may keep its sandbox enabled
    pub fn is_compliant(&self) -> bool {
        matches!(
            self.outcome,
            RepairOutcome::AlreadyCompliant | RepairOutcome::Repaired(_)
        )
    }

    pub fn attempts_of(&self, strategy: StrategyKind) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.strategy == strategy)
            .count()
    }
}

/// Runs the strategy sequence against one helper path
pub struct EscalationEngine<'a, H: PrivilegeHost + ?Sized> {
    host: &'a H,
    translator: &'a Translator,
}

impl<'a, H: PrivilegeHost + ?Sized> EscalationEngine<'a, H> {
    pub fn new(host: &'a H, translator: &'a Translator) -> Self {
        Self { host, translator }
    }

    /// Bring `path` into compliance if possible. Never fails: an unrepairable
    /// helper is reported through [`RepairOutcome`].
    ///
    /// `out` receives the notice shown before an interactive prompt.
    pub fn repair<W: Write>(&self, path: &Path, out: &mut W) -> EscalationReport {
        let initial = SandboxHelperState::capture(path, self.host);
        if initial.is_compliant() {
            debug!("Sandbox helper {} already compliant", path.display());
            return EscalationReport {
                attempts: Vec::new(),
                outcome: RepairOutcome::AlreadyCompliant,
            };
        }

        if !initial.exists() {
            warn!("Sandbox helper {} does not exist", path.display());
            return EscalationReport {
                attempts: Vec::new(),
                outcome: RepairOutcome::HelperMissing,
            };
        }

        debug!(
            "Sandbox helper {} not compliant (uid={:?}, mode={:?})",
            path.display(),
            initial.owner_uid(),
            initial.mode().map(|m| format!("{:o}", m))
        );

        let mut attempts = Vec::new();

        for strategy in StrategyKind::ORDER {
            if !strategy.applicable(self.host) {
                debug!("Skipping {} repair: not applicable", strategy);
                continue;
            }

            debug!("Trying {} repair of {}", strategy, path.display());
            let action = strategy.attempt(self.host, path, self.translator, out);

            // Audit even after a failed action: a first step may have landed
            let after = SandboxHelperState::capture(path, self.host);
            let result = action.and_then(|()| {
                if after.is_compliant() {
                    Ok(())
                } else {
                    Err(StrategyFailure::StillNonCompliant)
                }
            });

            match result {
                Ok(()) => {
                    info!("Sandbox helper repaired via {}", strategy);
                    attempts.push(EscalationAttempt {
                        strategy,
                        succeeded: true,
                        detail: "compliant".to_string(),
                    });
                    return EscalationReport {
                        attempts,
                        outcome: RepairOutcome::Repaired(strategy),
                    };
                }
                Err(failure) => {
                    warn!("{} repair failed: {}", strategy, failure);
                    attempts.push(EscalationAttempt {
                        strategy,
                        succeeded: false,
                        detail: failure.to_string(),
                    });
                }
            }
        }

        EscalationReport {
            attempts,
            outcome: RepairOutcome::Exhausted,
        }
    }
}
