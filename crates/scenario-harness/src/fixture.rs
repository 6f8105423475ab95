//! Fixture server lifecycle
//!
//! The harness only needs to start the fixture before the first scenario and
//! stop it after the last one. What the fixture serves is its own business.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::config::FixtureConfig;
use crate::environment::ChildEnvironment;
use crate::error::{HarnessError, Result};
use crate::io::{
    ConnectionProbe, ProcessHandle, ProcessSpawner, TcpConnectionProbe, TokioProcessSpawner,
};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A server the suite keeps running while scenarios execute
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixtureServer: Send {
    /// Start the server and return once it accepts connections
    async fn start(&mut self, env: &ChildEnvironment) -> Result<()>;

    /// Stop the server. Stopping a server that is not running is a no-op.
    async fn stop(&mut self) -> Result<()>;
}

/// Fixture running as an external process, e.g. the `http-fixture` binary
pub struct ProcessFixture {
    config: FixtureConfig,
    process: Option<Box<dyn ProcessHandle>>,
    process_spawner: Arc<dyn ProcessSpawner>,
    connection_probe: Arc<dyn ConnectionProbe>,
}

impl ProcessFixture {
    pub fn new(config: FixtureConfig) -> Self {
        Self::with_spawner(
            config,
            Arc::new(TokioProcessSpawner::new()),
            Arc::new(TcpConnectionProbe::new()),
        )
    }

    pub fn with_spawner(
        config: FixtureConfig,
        process_spawner: Arc<dyn ProcessSpawner>,
        connection_probe: Arc<dyn ConnectionProbe>,
    ) -> Self {
        Self {
            config,
            process: None,
            process_spawner,
            connection_probe,
        }
    }

    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    async fn wait_for_ready(&mut self) -> Result<()> {
        let timeout = Duration::from_millis(self.config.ready_timeout_ms);
        let start = Instant::now();

        debug!("Waiting for fixture at {}...", self.config.addr);

        loop {
            let connected = self.connection_probe.can_connect(&self.config.addr).await;

            // A connect can reach some other listener, so the child must still be alive
            let exited = match self.process.as_mut() {
                Some(child) => child.try_wait().await,
                None => Ok(None),
            };
            match exited {
                Ok(Some(status)) => {
                    self.process = None;
                    return Err(HarnessError::FixtureStartFailed(format!(
                        "fixture exited prematurely with status: {}",
                        status
                    )));
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(HarnessError::FixtureStartFailed(format!(
                        "failed to check fixture status: {}",
                        e
                    )));
                }
            }
            if connected {
                return Ok(());
            }

            if start.elapsed() >= timeout {
                return Err(HarnessError::Timeout(format!(
                    "fixture at {} not ready within {} ms",
                    self.config.addr, self.config.ready_timeout_ms
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl FixtureServer for ProcessFixture {
    async fn start(&mut self, env: &ChildEnvironment) -> Result<()> {
        if self.process.is_some() {
            return Err(HarnessError::FixtureStartFailed(
                "fixture already running".to_string(),
            ));
        }
        let (program, args) = self.config.command.split_first().ok_or_else(|| {
            HarnessError::FixtureStartFailed("no fixture command configured".to_string())
        })?;

        if self.connection_probe.can_connect(&self.config.addr).await {
            return Err(HarnessError::FixtureStartFailed(format!(
                "{} is already accepting connections",
                self.config.addr
            )));
        }

        let child = self.process_spawner.spawn(program, args, env).await?;
        debug!("Fixture process started with PID: {:?}", child.id());
        self.process = Some(child);

        if let Err(e) = self.wait_for_ready().await {
            // Never leave a half-started fixture behind
            let _ = self.stop().await;
            return Err(e);
        }

        debug!("Fixture is ready at {}", self.config.addr);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.process.take() {
            debug!("Stopping fixture process {:?}", child.id());
            if let Err(e) = child.kill().await {
                debug!("Error killing fixture: {}", e);
            }
            child.wait().await?;
        }
        Ok(())
    }
}
