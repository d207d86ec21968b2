//! webshell-sandbox: setuid sandbox helper audit and repair
//!
//! The browser runtime refuses to start its sandbox unless the helper binary
//! is owned by root with the set-user-ID bit. This crate checks that
//! precondition and, when it does not hold, tries to establish it:
//!
//! 1. directly, when already running as root
//! 2. through `sudo -n`, reusing cached credentials without prompting
//! 3. through `sudo` on the terminal, letting the user type a password
//!
//! Failing all three is an expected outcome, not an error.

pub mod audit;
pub mod escalation;
pub mod host;
pub mod instructions;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use audit::{SandboxHelperState, is_compliant, mode_is_compliant};
pub use escalation::{
    EscalationAttempt, EscalationEngine, EscalationReport, RepairOutcome, StrategyFailure,
    StrategyKind,
};
pub use host::{CommandOutcome, ElevatedCommand, HelperMetadata, Interaction, PrivilegeHost, SystemHost};
pub use instructions::write_manual_instructions;
