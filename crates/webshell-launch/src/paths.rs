//! Locating the runtime executable and its sandbox helper

use log::debug;
use nix::unistd::{AccessFlags, access};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use webshell_core::{LaunchError, Result};

/// File name of the runtime executable
pub const RUNTIME_NAME: &str = "electron";
/// File name of the setuid sandbox helper shipped next to the runtime
pub const HELPER_NAME: &str = "chrome-sandbox";

const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Where the runtime and its helper live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub runtime: PathBuf,
    /// `None` when no install directory could be derived from the runtime
    pub helper: Option<PathBuf>,
}

/// Search order for the runtime executable
#[derive(Debug, Clone)]
pub struct RuntimeLocator {
    app_root: PathBuf,
    override_path: Option<PathBuf>,
    search_path: Option<OsString>,
}

impl RuntimeLocator {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            override_path: None,
            search_path: None,
        }
    }

    /// Use this executable before anything else
    pub fn with_override(mut self, path: Option<PathBuf>) -> Self {
        self.override_path = path;
        self
    }

    /// `PATH` value used for name lookups
    pub fn with_search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    /// Candidate executables, in the order they are checked
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(path) = &self.override_path {
            if path.components().count() > 1 || path.is_absolute() {
                candidates.push(path.clone());
            } else {
                candidates.extend(self.path_entries(&path.to_string_lossy()));
            }
        }

        let modules = self.app_root.join("node_modules");
        candidates.push(modules.join("electron").join("dist").join(RUNTIME_NAME));
        candidates.push(modules.join(".bin").join(RUNTIME_NAME));
        candidates.extend(self.path_entries(RUNTIME_NAME));

        candidates
    }

    /// First executable candidate plus the helper derived from it
    pub fn resolve(&self) -> Result<RuntimePaths> {
        let candidates = self.candidates();

        for candidate in &candidates {
            if is_executable(candidate) {
                debug!("Runtime found at {}", candidate.display());
                return Ok(RuntimePaths {
                    runtime: candidate.clone(),
                    helper: helper_for(candidate),
                });
            }
            debug!("No runtime at {}", candidate.display());
        }

        Err(LaunchError::RuntimeNotFound {
            searched: candidates,
        })
    }

    fn path_entries(&self, program: &str) -> Vec<PathBuf> {
        let path_value = self
            .search_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        path_value
            .split(':')
            .map(|entry| {
                let dir = if entry.is_empty() { "." } else { entry };
                Path::new(dir).join(program)
            })
            .collect()
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

/// Helper binary belonging to `runtime`.
///
/// Symlinks such as `node_modules/.bin/electron` are followed to the real
/// install directory first. The helper sits either next to the executable
/// or in its `dist/` directory; when neither exists the sibling location is
/// reported so the audit classifies it as missing.
pub fn helper_for(runtime: &Path) -> Option<PathBuf> {
    let resolved = fs::canonicalize(runtime).unwrap_or_else(|_| runtime.to_path_buf());
    let install_dir = resolved.parent()?;

    let sibling = install_dir.join(HELPER_NAME);
    let in_dist = install_dir.join("dist").join(HELPER_NAME);

    if !sibling.exists() && in_dist.exists() {
        return Some(in_dist);
    }
    Some(sibling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::{PermissionsExt, symlink};

    fn touch_exec(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn prefers_dist_binary_in_app_root() {
        let root = tempfile::tempdir().unwrap();
        let dist = root.path().join("node_modules/electron/dist");
        touch_exec(&dist.join(RUNTIME_NAME));
        fs::write(dist.join(HELPER_NAME), b"").unwrap();

        let paths = RuntimeLocator::new(root.path())
            .with_search_path(Some("/nonexistent".into()))
            .resolve()
            .unwrap();
        assert_eq!(paths.runtime, dist.join(RUNTIME_NAME));
        assert_eq!(
            paths.helper.unwrap(),
            fs::canonicalize(&dist).unwrap().join(HELPER_NAME)
        );
    }

    #[test]
    fn bin_symlink_resolves_helper_in_dist() {
        let root = tempfile::tempdir().unwrap();
        let pkg = root.path().join("node_modules/electron");
        touch_exec(&pkg.join("cli.js"));
        fs::create_dir_all(pkg.join("dist")).unwrap();
        fs::write(pkg.join("dist").join(HELPER_NAME), b"").unwrap();

        let bin = root.path().join("node_modules/.bin");
        fs::create_dir_all(&bin).unwrap();
        symlink(pkg.join("cli.js"), bin.join(RUNTIME_NAME)).unwrap();

        let paths = RuntimeLocator::new(root.path())
            .with_search_path(Some("/nonexistent".into()))
            .resolve()
            .unwrap();
        assert_eq!(paths.runtime, bin.join(RUNTIME_NAME));
        assert_eq!(
            paths.helper.unwrap(),
            fs::canonicalize(&pkg).unwrap().join("dist").join(HELPER_NAME)
        );
    }

    #[test]
    fn override_comes_first() {
        let root = tempfile::tempdir().unwrap();
        let custom = root.path().join("custom/runtime");
        touch_exec(&custom);
        touch_exec(&root.path().join("node_modules/electron/dist").join(RUNTIME_NAME));

        let paths = RuntimeLocator::new(root.path())
            .with_override(Some(custom.clone()))
            .resolve()
            .unwrap();
        assert_eq!(paths.runtime, custom);
    }

    #[test]
    fn override_name_is_looked_up_on_path() {
        let root = tempfile::tempdir().unwrap();
        let bin = root.path().join("bin");
        touch_exec(&bin.join("my-runtime"));

        let paths = RuntimeLocator::new(root.path())
            .with_override(Some(PathBuf::from("my-runtime")))
            .with_search_path(Some(bin.clone().into_os_string()))
            .resolve()
            .unwrap();
        assert_eq!(paths.runtime, bin.join("my-runtime"));
    }

    #[test]
    fn non_executable_file_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let dist = root.path().join("node_modules/electron/dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join(RUNTIME_NAME), b"").unwrap();

        let err = RuntimeLocator::new(root.path())
            .with_search_path(Some("/nonexistent".into()))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, LaunchError::RuntimeNotFound { .. }));
    }

    #[test]
    fn not_found_lists_every_candidate() {
        let root = tempfile::tempdir().unwrap();
        let locator =
            RuntimeLocator::new(root.path()).with_search_path(Some("/a:/b".into()));
        match locator.resolve() {
            Err(LaunchError::RuntimeNotFound { searched }) => {
                assert_eq!(searched.len(), 4);
                assert_eq!(searched[2], PathBuf::from("/a/electron"));
                assert_eq!(searched[3], PathBuf::from("/b/electron"));
            }
            other => panic!("expected RuntimeNotFound, got {:?}", other),
        }
    }

    #[test]
    fn helper_defaults_to_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = dir.path().join(RUNTIME_NAME);
        let helper = helper_for(&runtime).unwrap();
        assert_eq!(helper, dir.path().join(HELPER_NAME));
    }
}
