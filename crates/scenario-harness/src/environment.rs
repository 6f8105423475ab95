//! Environment applied to child processes
//!
//! The harness never changes its own working directory or `PATH`. Each child
//! process gets them from a [`ChildEnvironment`] instead.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{HarnessError, Result};

/// Working directory, executable search path and extra variables for a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEnvironment {
    pub working_dir: PathBuf,
    pub search_path: OsString,
    pub vars: BTreeMap<String, String>,
}

impl ChildEnvironment {
    /// Run in `working_dir` with the harness's own `PATH`
    pub fn inherit(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            search_path: std::env::var_os("PATH").unwrap_or_default(),
            vars: BTreeMap::new(),
        }
    }

    /// Put `dir` in front of the search path
    pub fn with_search_path_prefix(mut self, dir: &Path) -> Result<Self> {
        self.search_path = prepend_search_path(dir, &self.search_path)?;
        Ok(self)
    }

    /// Add extra variables. `PATH` is owned by the search path and ignored here.
    pub fn with_vars(mut self, vars: BTreeMap<String, String>) -> Self {
        for (name, value) in vars {
            if name == "PATH" {
                warn!("Ignoring PATH in extra environment; the search path is set by the harness");
                continue;
            }
            self.vars.insert(name, value);
        }
        self
    }
}

/// Build a search path with `dir` ahead of every entry of `current`
pub fn prepend_search_path(dir: &Path, current: &OsString) -> Result<OsString> {
    let entries = std::iter::once(dir.to_path_buf()).chain(
        std::env::split_paths(current).filter(|entry| !entry.as_os_str().is_empty()),
    );
    std::env::join_paths(entries).map_err(|e| HarnessError::SearchPath(e.to_string()))
}
