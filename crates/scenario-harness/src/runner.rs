//! Command runner bound into each scenario

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::command_line;
use crate::environment::ChildEnvironment;
use crate::error::{HarnessError, Result};
use crate::io::{CommandExecutor, CommandOutput, TokioCommandExecutor};

/// Runs scenario command lines against the staged binary
///
/// Holds the child environment produced by suite setup, so a bare program
/// name resolves through the test directory first.
#[derive(Clone)]
pub struct CommandRunner {
    env: ChildEnvironment,
    executor: Arc<dyn CommandExecutor>,
}

impl CommandRunner {
    pub fn new(env: ChildEnvironment) -> Self {
        Self::with_executor(env, Arc::new(TokioCommandExecutor::new()))
    }

    pub fn with_executor(env: ChildEnvironment, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { env, executor }
    }

    pub fn environment(&self) -> &ChildEnvironment {
        &self.env
    }

    /// Parse `command` and run it to completion.
    ///
    /// The exit status is part of the returned [`CommandOutput`]; only a
    /// command that cannot be started is an error.
    pub async fn run(&self, command: &str) -> Result<CommandOutput> {
        let mut args = command_line::parse(command);
        if args.is_empty() {
            return Err(HarnessError::EmptyCommand);
        }
        let program = args.remove(0);
        debug!("Scenario command: {} {:?}", program, args);
        self.executor.output(&program, &args, &self.env).await
    }
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}
