//! Identity helpers

use nix::unistd::{Uid, geteuid};

/// UID of the superuser account
pub const ROOT_UID: u32 = 0;

/// Check if running as root
pub fn is_root() -> bool {
    geteuid().is_root()
}

/// Get current effective UID
pub fn get_uid() -> u32 {
    geteuid().as_raw()
}

/// Whether `uid` is the superuser
pub fn is_root_uid(uid: u32) -> bool {
    Uid::from_raw(uid).is_root()
}
