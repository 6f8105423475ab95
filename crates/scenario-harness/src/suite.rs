//! Suite setup and teardown

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::environment::ChildEnvironment;
use crate::error::{HarnessError, Result};
use crate::fixture::FixtureServer;
use crate::io::{CommandExecutor, TokioCommandExecutor};
use crate::runner::CommandRunner;
use crate::scenario::ScenarioContext;
use crate::staging;

/// Prepares the shared environment every scenario runs in
pub struct Suite {
    config: HarnessConfig,
    executor: Arc<dyn CommandExecutor>,
}

impl Suite {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_executor(config, Arc::new(TokioCommandExecutor::new()))
    }

    /// Use a custom executor for the build and for scenario commands
    pub fn with_executor(config: HarnessConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { config, executor }
    }

    /// Build and stage the binary under test, then start `fixture`.
    ///
    /// Any failure here is fatal for the whole run. Nothing is rolled back: a
    /// failed build leaves the test directory without a staged binary.
    pub async fn setup(self, mut fixture: Box<dyn FixtureServer>) -> Result<SuiteEnvironment> {
        let Suite {
            mut config,
            executor,
        } = self;

        let test_dir = resolve_dir(config.test_dir(), "test directory")?;
        let project_root = resolve_dir(&config.project_root(), "project root")?;
        debug!(
            "Test directory {}, project root {}",
            test_dir.display(),
            project_root.display()
        );
        config.test_dir = test_dir.clone();
        config.project_root = project_root.clone();

        let staged_binary =
            staging::stage_binary(&config, &test_dir, &project_root, executor.as_ref()).await?;

        let child_env = ChildEnvironment::inherit(&test_dir)
            .with_search_path_prefix(&test_dir)?
            .with_vars(config.env.clone());

        fixture.start(&child_env).await?;
        info!("Suite ready: {} staged, fixture started", config.binary);

        Ok(SuiteEnvironment {
            config,
            child_env,
            staged_binary,
            fixture,
            executor,
        })
    }
}

fn resolve_dir(path: &Path, what: &str) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        HarnessError::Config(format!("cannot resolve {} {}: {}", what, path.display(), e))
    })
}

/// Everything suite setup produced; consumed by [`SuiteEnvironment::teardown`]
pub struct SuiteEnvironment {
    config: HarnessConfig,
    child_env: ChildEnvironment,
    staged_binary: PathBuf,
    fixture: Box<dyn FixtureServer>,
    executor: Arc<dyn CommandExecutor>,
}

impl SuiteEnvironment {
    /// Configuration with absolute test directory and project root
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn staged_binary(&self) -> &Path {
        &self.staged_binary
    }

    pub fn child_environment(&self) -> &ChildEnvironment {
        &self.child_env
    }

    /// A command runner for one scenario
    pub fn runner(&self) -> CommandRunner {
        CommandRunner::with_executor(self.child_env.clone(), Arc::clone(&self.executor))
    }

    /// Scenario setup: fresh stash, newly bound runner
    pub fn begin_scenario(&self, context: &mut ScenarioContext) {
        context.begin(self.runner());
    }

    /// Stop the fixture and delete transient artifacts.
    ///
    /// Both steps always run; failures are logged and reported, never raised.
    pub async fn teardown(mut self) -> TeardownReport {
        let mut report = TeardownReport::default();

        if let Err(e) = self.fixture.stop().await {
            warn!("Failed to stop fixture: {}", e);
            report.errors.push(e);
        }

        for artifact in &self.config.artifacts {
            let path = self.config.test_dir.join(artifact);
            match staging::remove_if_exists(&path) {
                Ok(true) => {
                    debug!("Removed {}", path.display());
                    report.removed.push(path);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to remove {}: {}", path.display(), e);
                    report.errors.push(HarnessError::Io(e));
                }
            }
        }

        info!("Suite teardown complete");
        report
    }
}

/// What suite teardown did
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub removed: Vec<PathBuf>,
    pub errors: Vec<HarnessError>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
