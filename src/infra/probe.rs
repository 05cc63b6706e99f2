//! # Runtime Probe Module / 运行时探测模块
//!
//! Decides whether a runtime version is installable on this host by looking
//! for its interpreter on `PATH`.
//!
//! 通过在 `PATH` 上查找解释器来判断某个运行时版本能否在本主机上使用。

use std::env;
use std::path::{Path, PathBuf};

/// Answers whether an interpreter can be launched on this host.
pub trait RuntimeProbe {
    fn is_available(&self, interpreter: &str) -> bool;
}

impl<F> RuntimeProbe for F
where
    F: Fn(&str) -> bool,
{
    fn is_available(&self, interpreter: &str) -> bool {
        self(interpreter)
    }
}

/// Searches the directories of `PATH` for an executable file.
#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    search_path: Option<Vec<PathBuf>>,
}

impl PathProbe {
    /// Probes an explicit list of directories instead of `PATH`.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            search_path: Some(dirs),
        }
    }
}

impl RuntimeProbe for PathProbe {
    fn is_available(&self, interpreter: &str) -> bool {
        let candidate = Path::new(interpreter);
        if candidate.components().count() > 1 {
            return is_executable(candidate);
        }

        let dirs = match &self.search_path {
            Some(dirs) => dirs.clone(),
            None => env::var_os("PATH")
                .map(|p| env::split_paths(&p).collect())
                .unwrap_or_default(),
        };
        dirs.iter().any(|dir| is_executable(&dir.join(interpreter)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_probes() {
        let probe = |name: &str| name == "python3.7";
        assert!(probe.is_available("python3.7"));
        assert!(!probe.is_available("python3.8"));
    }

    #[test]
    fn empty_search_path_finds_nothing() {
        let probe = PathProbe::with_dirs(Vec::new());
        assert!(!probe.is_available("sh"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_shell_in_bin() {
        let probe = PathProbe::with_dirs(vec![PathBuf::from("/bin"), PathBuf::from("/usr/bin")]);
        assert!(probe.is_available("sh"));
    }
}
