use async_trait::async_trait;
use http_fixture::{HttpFixture, RunningFixture};
use scenario_harness::{ChildEnvironment, FixtureServer, HarnessError};

/// Serves the HTTP fixture on a task of the suite's own runtime
pub struct InProcessFixture {
    addr: String,
    running: Option<RunningFixture>,
}

impl InProcessFixture {
    pub fn new(addr: String) -> Self {
        Self {
            addr,
            running: None,
        }
    }
}

#[async_trait]
impl FixtureServer for InProcessFixture {
    async fn start(&mut self, _env: &ChildEnvironment) -> scenario_harness::Result<()> {
        let fixture = HttpFixture::bind(self.addr.as_str())
            .await
            .map_err(|e| HarnessError::FixtureStartFailed(format!("{}: {}", self.addr, e)))?;
        self.running = Some(fixture.spawn()?);
        Ok(())
    }

    async fn stop(&mut self) -> scenario_harness::Result<()> {
        if let Some(running) = self.running.take() {
            running.shutdown().await;
        }
        Ok(())
    }
}
