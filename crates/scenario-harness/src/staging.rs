//! Building the binary under test and staging it next to the feature files

use std::fs::{self, FileTimes, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::environment::ChildEnvironment;
use crate::error::{HarnessError, Result};
use crate::io::CommandExecutor;

/// Remove `path`, treating a missing file as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run `cargo build` for the binary under test from the project root
pub async fn build_binary(
    config: &HarnessConfig,
    project_root: &Path,
    executor: &dyn CommandExecutor,
) -> Result<()> {
    let args = config.build_args();
    info!("Building {} with cargo {}", config.binary, args.join(" "));

    let env = ChildEnvironment::inherit(project_root);
    let output = executor.output("cargo", &args, &env).await?;
    if !output.success() {
        return Err(HarnessError::BuildFailed {
            status: output.status,
            stderr: output.stderr,
        });
    }
    debug!("Build of {} finished", config.binary);
    Ok(())
}

/// Copy `source` to `dest`, keeping permissions and timestamps
pub fn copy_preserving_metadata(source: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| {
        HarnessError::StageFailed(format!("cannot read {}: {}", source.display(), e))
    })?;

    // fs::copy carries the permission bits over
    fs::copy(source, dest).map_err(|e| {
        HarnessError::StageFailed(format!(
            "cannot copy {} to {}: {}",
            source.display(),
            dest.display(),
            e
        ))
    })?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    // A read-only handle is enough for the owner on unix and keeps no write
    // descriptor around while scenarios exec the binary
    let mut options = OpenOptions::new();
    if cfg!(unix) {
        options.read(true);
    } else {
        options.write(true);
    }
    options
        .open(dest)
        .and_then(|file| file.set_times(times))
        .map_err(|e| {
            HarnessError::StageFailed(format!(
                "cannot set timestamps on {}: {}",
                dest.display(),
                e
            ))
        })?;
    Ok(())
}

/// Replace the staged binary with a fresh build.
///
/// The stale copy goes first, so a failed build leaves no binary behind
/// rather than an outdated one.
pub async fn stage_binary(
    config: &HarnessConfig,
    test_dir: &Path,
    project_root: &Path,
    executor: &dyn CommandExecutor,
) -> Result<PathBuf> {
    let staged = test_dir.join(config.binary_file_name());
    if remove_if_exists(&staged)? {
        debug!("Removed stale {}", staged.display());
    }

    build_binary(config, project_root, executor).await?;

    let built = config.built_binary_path();
    copy_preserving_metadata(&built, &staged)?;
    info!("Staged {} at {}", config.binary, staged.display());
    Ok(staged)
}
