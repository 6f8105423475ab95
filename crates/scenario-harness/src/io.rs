//! I/O traits and implementations for the harness
//!
//! Everything that touches real processes or sockets goes through a trait
//! here so suite setup, scenario commands and the fixture lifecycle can be
//! tested with mocks. The default implementations use tokio processes and
//! TCP sockets.

use std::process::{ExitStatus, Output, Stdio};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::environment::ChildEnvironment;
use crate::error::{HarnessError, Result};

/// Outcome of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `-1` when the process was killed by a signal
    pub status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: exit_code(output.status),
        }
    }
}

// ============================================================================
// CommandExecutor trait and implementations
// ============================================================================

/// Trait for running a command to completion and capturing its output
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` in `env` and wait for it to finish
    ///
    /// A non-zero exit is returned as data. Only a failure to start the
    /// process is an error.
    async fn output(
        &self,
        program: &str,
        args: &[String],
        env: &ChildEnvironment,
    ) -> Result<CommandOutput>;
}

/// Tokio implementation of CommandExecutor
#[derive(Default, Clone)]
pub struct TokioCommandExecutor;

impl TokioCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for TokioCommandExecutor {
    async fn output(
        &self,
        program: &str,
        args: &[String],
        env: &ChildEnvironment,
    ) -> Result<CommandOutput> {
        debug!(
            "Running {} {:?} in {}",
            program,
            args,
            env.working_dir.display()
        );

        let output = Command::new(program)
            .args(args)
            .current_dir(&env.working_dir)
            .envs(&env.vars)
            .env("PATH", &env.search_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| HarnessError::CommandLaunch {
                program: program.to_string(),
                source,
            })?;

        let output = CommandOutput::from(output);
        debug!("{} exited with status {}", program, output.status);
        Ok(output)
    }
}

// ============================================================================
// ProcessHandle trait and implementations
// ============================================================================

/// Trait for interacting with a spawned long-running process
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessHandle: Send {
    /// Returns `Ok(Some(exit_code))` if the process has exited, `Ok(None)` if
    /// it is still running
    async fn try_wait(&mut self) -> Result<Option<i32>>;

    async fn kill(&mut self) -> Result<()>;

    async fn wait(&mut self) -> Result<i32>;

    fn id(&self) -> Option<u32>;
}

/// Exit code of a finished process, `-1` when a signal ended it
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// A spawned child, killed when dropped
pub struct ChildProcess {
    program: String,
    child: Child,
}

#[async_trait]
impl ProcessHandle for ChildProcess {
    async fn try_wait(&mut self) -> Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(exit_code))
    }

    async fn kill(&mut self) -> Result<()> {
        debug!("Killing {} ({:?})", self.program, self.child.id());
        Ok(self.child.kill().await?)
    }

    async fn wait(&mut self) -> Result<i32> {
        let status = self.child.wait().await?;
        debug!("{} finished: {}", self.program, status);
        Ok(exit_code(status))
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

// ============================================================================
// ProcessSpawner trait and implementations
// ============================================================================

/// Trait for spawning long-running processes such as an external fixture
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
        env: &ChildEnvironment,
    ) -> Result<Box<dyn ProcessHandle>>;
}

/// Tokio implementation of ProcessSpawner
#[derive(Default, Clone)]
pub struct TokioProcessSpawner;

impl TokioProcessSpawner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSpawner for TokioProcessSpawner {
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
        env: &ChildEnvironment,
    ) -> Result<Box<dyn ProcessHandle>> {
        debug!("Spawning process: {} {:?}", program, args);

        let child = Command::new(program)
            .args(args)
            .current_dir(&env.working_dir)
            .envs(&env.vars)
            .env("PATH", &env.search_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                HarnessError::FixtureStartFailed(format!("Failed to start {}: {}", program, e))
            })?;

        debug!("Process started with PID: {:?}", child.id());

        Ok(Box::new(ChildProcess {
            program: program.to_string(),
            child,
        }))
    }
}

// ============================================================================
// ConnectionProbe trait and implementations
// ============================================================================

/// Trait for checking whether something accepts TCP connections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn can_connect(&self, addr: &str) -> bool;
}

/// TCP implementation of ConnectionProbe
#[derive(Default, Clone)]
pub struct TcpConnectionProbe;

impl TcpConnectionProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionProbe for TcpConnectionProbe {
    async fn can_connect(&self, addr: &str) -> bool {
        TcpStream::connect(addr).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_success() {
        let output = CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            status: 0,
        };
        assert!(output.success());
        assert!(!CommandOutput { status: 2, ..output }.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_executor_captures_streams_and_status() {
        let env = ChildEnvironment::inherit(std::env::temp_dir());
        let output = TokioCommandExecutor::new()
            .output(
                "sh",
                &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()],
                &env,
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.status, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_executor_search_path_overrides_path_var() {
        let mut env = ChildEnvironment::inherit(std::env::temp_dir());
        env.vars
            .insert("PATH".to_string(), "/nonexistent".to_string());

        let output = TokioCommandExecutor::new()
            .output("sh", &["-c".to_string(), "echo \"$PATH\"".to_string()], &env)
            .await
            .unwrap();

        assert_eq!(output.status, 0, "stderr: {}", output.stderr);
        assert_eq!(output.stdout.trim_end(), env.search_path.to_string_lossy());
    }

    #[tokio::test]
    async fn test_executor_missing_program_is_launch_error() {
        let env = ChildEnvironment::inherit(std::env::temp_dir());
        let err = TokioCommandExecutor::new()
            .output("definitely-not-a-real-program-4711", &[], &env)
            .await
            .unwrap_err();
        match err {
            HarnessError::CommandLaunch { program, .. } => {
                assert_eq!(program, "definitely-not-a-real-program-4711")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawned_process_reports_exit_code() {
        let env = ChildEnvironment::inherit(std::env::temp_dir());
        let mut process = TokioProcessSpawner::new()
            .spawn("sh", &["-c".to_string(), "exit 3".to_string()], &env)
            .await
            .unwrap();

        assert!(process.id().is_some());
        assert_eq!(process.wait().await.unwrap(), 3);
        assert_eq!(process.try_wait().await.unwrap(), Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_killed_process_has_no_exit_code() {
        let env = ChildEnvironment::inherit(std::env::temp_dir());
        let mut process = TokioProcessSpawner::new()
            .spawn("sleep", &["30".to_string()], &env)
            .await
            .unwrap();

        assert_eq!(process.try_wait().await.unwrap(), None);
        process.kill().await.unwrap();
        assert_eq!(process.wait().await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_spawn_missing_program_fails_to_start() {
        let env = ChildEnvironment::inherit(std::env::temp_dir());
        let result = TokioProcessSpawner::new()
            .spawn("definitely-not-a-real-fixture-4711", &[], &env)
            .await;
        assert!(matches!(result, Err(HarnessError::FixtureStartFailed(_))));
    }

    #[tokio::test]
    async fn test_tcp_probe_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(!TcpConnectionProbe::new().can_connect(&addr.to_string()).await);
    }

    #[tokio::test]
    async fn test_tcp_probe_accepting() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(TcpConnectionProbe::new().can_connect(&addr.to_string()).await);
    }
}
