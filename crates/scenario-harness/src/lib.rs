//! Scenario Test Harness
//!
//! Bootstraps a BDD functional test suite around a separate binary under
//! test: builds it with its test-hook features, stages it next to the
//! feature files, keeps an HTTP fixture server running for the duration of
//! the suite and gives every scenario a fresh stash plus a command runner
//! that finds the staged binary by its bare name.
//!
//! A typical cucumber entry point:
//!
//! ```no_run
//! # use scenario_harness::{FixtureServer, HarnessConfig, ScenarioContext, Suite};
//! # async fn example(fixture: Box<dyn FixtureServer>) -> scenario_harness::Result<()> {
//! let config = HarnessConfig::load("tests/functionals/harness.toml".as_ref())?;
//! let suite = Suite::new(config).setup(fixture).await?;
//!
//! let mut context = ScenarioContext::default();
//! suite.begin_scenario(&mut context);
//! let output = context.run("probe --help").await?;
//! assert_eq!(output.status, 0);
//!
//! let report = suite.teardown().await;
//! assert!(report.is_clean());
//! # Ok(())
//! # }
//! ```

pub mod command_line;
pub mod config;
pub mod environment;
pub mod error;
pub mod fixture;
pub mod io;
pub mod runner;
pub mod scenario;
pub mod staging;
pub mod suite;

pub use config::{FixtureConfig, HarnessConfig};
pub use environment::ChildEnvironment;
pub use error::{HarnessError, Result};
pub use fixture::{FixtureServer, ProcessFixture};
pub use io::CommandOutput;
pub use runner::CommandRunner;
pub use scenario::{ScenarioContext, Stash};
pub use suite::{Suite, SuiteEnvironment, TeardownReport};
