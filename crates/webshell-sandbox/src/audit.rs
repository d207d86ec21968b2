//! Sandbox helper permission audit
//!
//! A helper is compliant when it is owned by root, has the set-user-ID bit,
//! and is executable by others. Every audit stats the file again; nothing
//! here caches a previous answer.

use log::debug;
use std::io;
use std::path::{Path, PathBuf};

use webshell_core::util::is_root_uid;

use crate::host::PrivilegeHost;

/// Set-user-ID bit
pub const SETUID_BIT: u32 = 0o4000;
/// Execute permission for others
pub const OTHER_EXEC_BIT: u32 = 0o0001;
/// Mode applied by every repair strategy: setuid, rwxr-xr-x
pub const COMPLIANT_MODE: u32 = 0o4755;

/// Check the three compliance conditions on raw owner/mode values
pub fn mode_is_compliant(uid: u32, mode: u32) -> bool {
    is_root_uid(uid) && mode & SETUID_BIT == SETUID_BIT && mode & OTHER_EXEC_BIT == OTHER_EXEC_BIT
}

/// Snapshot of the helper binary taken by one audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxHelperState {
    path: PathBuf,
    owner_uid: Option<u32>,
    mode: Option<u32>,
    exists: bool,
}

impl SandboxHelperState {
    /// Stat `path` now. Failures produce a non-compliant snapshot.
    pub fn capture<H: PrivilegeHost + ?Sized>(path: &Path, host: &H) -> Self {
        match host.stat(path) {
            Ok(meta) => Self {
                path: path.to_path_buf(),
                owner_uid: Some(meta.uid),
                mode: Some(meta.mode),
                exists: true,
            },
            Err(e) => {
                debug!("Cannot stat sandbox helper {}: {}", path.display(), e);
                Self {
                    path: path.to_path_buf(),
                    owner_uid: None,
                    mode: None,
                    exists: e.kind() != io::ErrorKind::NotFound,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner_uid(&self) -> Option<u32> {
        self.owner_uid
    }

    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    /// False only when the stat reported the file as missing
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_compliant(&self) -> bool {
        match (self.owner_uid, self.mode) {
            (Some(uid), Some(mode)) => mode_is_compliant(uid, mode),
            _ => false,
        }
    }
}

/// Fresh compliance check of `path`
pub fn is_compliant<H: PrivilegeHost + ?Sized>(path: &Path, host: &H) -> bool {
    SandboxHelperState::capture(path, host).is_compliant()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    #[test]
    fn compliant_when_all_three_hold() {
        assert!(mode_is_compliant(0, 0o104755));
        assert!(mode_is_compliant(0, 0o4701));
        assert!(mode_is_compliant(0, 0o4001));
    }

    #[test]
    fn not_compliant_when_owner_is_not_root() {
        assert!(!mode_is_compliant(1000, 0o104755));
    }

    #[test]
    fn not_compliant_without_setuid() {
        assert!(!mode_is_compliant(0, 0o100755));
    }

    #[test]
    fn not_compliant_without_other_exec() {
        assert!(!mode_is_compliant(0, 0o104754));
    }

    #[test]
    fn every_single_missing_condition_fails() {
        for uid in [0u32, 1000] {
            for setuid in [0u32, SETUID_BIT] {
                for other_x in [0u32, OTHER_EXEC_BIT] {
                    let mode = 0o100750 | setuid | other_x;
                    let expected = uid == 0 && setuid != 0 && other_x != 0;
                    assert_eq!(mode_is_compliant(uid, mode), expected, "uid={uid} mode={mode:o}");
                }
            }
        }
    }

    #[test]
    fn capture_reads_host() {
        let host = FakeHost::new(0, 0o104755);
        let state = SandboxHelperState::capture(Path::new("/helper"), &host);
        assert!(state.exists());
        assert!(state.is_compliant());
        assert_eq!(state.owner_uid(), Some(0));
    }

    #[test]
    fn missing_helper_is_non_compliant() {
        let host = FakeHost::new(0, 0o104755).missing();
        let state = SandboxHelperState::capture(Path::new("/helper"), &host);
        assert!(!state.exists());
        assert!(!state.is_compliant());
        assert_eq!(state.mode(), None);
    }

    #[test]
    fn audit_is_idempotent() {
        let host = FakeHost::new(1000, 0o100755);
        let path = Path::new("/helper");
        let first = SandboxHelperState::capture(path, &host);
        let second = SandboxHelperState::capture(path, &host);
        assert_eq!(first, second);
        assert_eq!(host.stat_count(), 2);
    }
}
