//! Configuration for the scenario harness

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};

/// Harness configuration, usually read from `harness.toml` in the test directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Directory holding the feature files; the staged binary lands here
    #[serde(default = "default_test_dir")]
    pub test_dir: PathBuf,
    /// Project root, relative to `test_dir` when not absolute
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    /// Cargo target directory; falls back to `CARGO_TARGET_DIR`, then `<project_root>/target`
    #[serde(default)]
    pub target_dir: Option<PathBuf>,
    /// Name of the binary under test
    pub binary: String,
    /// Cargo package containing the binary
    #[serde(default)]
    pub package: Option<String>,
    /// Cargo features enabling the binary's test hooks
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    /// Files in `test_dir` removed at suite teardown
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<String>,
    /// Extra environment variables for scenario commands
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub fixture: FixtureConfig,
}

/// Fixture server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Command line of an out-of-process fixture (program first)
    #[serde(default)]
    pub command: Vec<String>,
    /// Address the fixture listens on
    #[serde(default = "default_fixture_addr")]
    pub addr: String,
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_ms: u64,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            addr: default_fixture_addr(),
            ready_timeout_ms: default_ready_timeout(),
        }
    }
}

fn default_test_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_project_root() -> PathBuf {
    PathBuf::from("../..")
}

fn default_features() -> Vec<String> {
    vec!["functional_tests".to_string()]
}

fn default_artifacts() -> Vec<String> {
    vec!["outfile.tmp".to_string()]
}

fn default_fixture_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_ready_timeout() -> u64 {
    10_000
}

impl HarnessConfig {
    /// Defaults for a binary staged into `test_dir`
    pub fn for_test_dir(test_dir: impl Into<PathBuf>, binary: impl Into<String>) -> Self {
        Self {
            test_dir: test_dir.into(),
            project_root: default_project_root(),
            target_dir: None,
            binary: binary.into(),
            package: None,
            features: default_features(),
            artifacts: default_artifacts(),
            env: BTreeMap::new(),
            fixture: FixtureConfig::default(),
        }
    }

    /// Load a TOML configuration file.
    ///
    /// A relative `test_dir` is resolved against the directory containing the
    /// file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: HarnessConfig = toml::from_str(&content)
            .map_err(|e| HarnessError::Config(format!("{}: {}", path.display(), e)))?;

        if config.test_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.test_dir = base.join(&config.test_dir);
        }
        Ok(config)
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    pub fn project_root(&self) -> PathBuf {
        if self.project_root.is_absolute() {
            self.project_root.clone()
        } else {
            self.test_dir.join(&self.project_root)
        }
    }

    pub fn target_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.target_dir {
            return dir.clone();
        }
        match std::env::var_os("CARGO_TARGET_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => self.project_root().join("target"),
        }
    }

    /// File name of the binary on this platform
    pub fn binary_file_name(&self) -> String {
        format!("{}{}", self.binary, std::env::consts::EXE_SUFFIX)
    }

    /// Where `cargo build` leaves the binary
    pub fn built_binary_path(&self) -> PathBuf {
        self.target_dir()
            .join("debug")
            .join(self.binary_file_name())
    }

    /// Where the binary is staged for scenarios
    pub fn staged_binary_path(&self) -> PathBuf {
        self.test_dir.join(self.binary_file_name())
    }

    /// Arguments passed to `cargo` to build the binary under test
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        if let Some(ref package) = self.package {
            args.push("-p".to_string());
            args.push(package.clone());
        }
        args.push("--bin".to_string());
        args.push(self.binary.clone());
        if !self.features.is_empty() {
            args.push("--features".to_string());
            args.push(self.features.join(","));
        }
        args
    }
}
