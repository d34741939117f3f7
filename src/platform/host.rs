//! Host-local facts used by the driver checks.
//!
//! The checks that run before the VM exists only look at the machine the
//! tool runs on: is a driver binary on the search path, does it carry the
//! setuid bit, is an environment variable set.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of host-local facts.
pub trait HostProbe {
    /// Locate an executable on the search path
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Follow the whole symlink chain; returns `path` unchanged when it
    /// cannot be resolved
    fn resolve_link(&self, path: &Path) -> PathBuf;

    /// Whether the file at `path` has the setuid bit set
    fn has_setuid(&self, path: &Path) -> bool;

    /// Read an environment variable
    fn env_var(&self, name: &str) -> Option<String>;
}

/// The machine this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        let search_path = env::var_os("PATH")?;
        env::split_paths(&search_path)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    fn resolve_link(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn has_setuid(&self, path: &Path) -> bool {
        has_setuid_bit(path)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    if path.is_file() {
        return true;
    }
    path.with_extension("exe").is_file()
}

#[cfg(unix)]
fn has_setuid_bit(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path)
        .map(|meta| meta.mode() & 0o4000 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn has_setuid_bit(_path: &Path) -> bool {
    false
}
