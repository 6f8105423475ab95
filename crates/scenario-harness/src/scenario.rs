//! Per-scenario state: the stash and the bound command runner

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::io::CommandOutput;
use crate::runner::CommandRunner;

/// Key/value store step definitions use to hand values to later steps
///
/// Values are typed; a lookup with the wrong type finds nothing.
#[derive(Default)]
pub struct Stash {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn insert<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Take the value out of the stash if it has type `T`
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key).is_some_and(|v| v.is::<T>()) {
            return None;
        }
        self.entries
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Stash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Stash").field("keys", &keys).finish()
    }
}

/// State a scenario's steps share
///
/// Lives inside the BDD world. [`ScenarioContext::begin`] runs before every
/// scenario and leaves a fresh stash plus a newly bound runner.
#[derive(Debug, Default)]
pub struct ScenarioContext {
    pub stash: Stash,
    runner: Option<CommandRunner>,
}

impl ScenarioContext {
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            stash: Stash::new(),
            runner: Some(runner),
        }
    }

    /// Reset for a new scenario
    pub fn begin(&mut self, runner: CommandRunner) {
        debug!("Starting scenario with a fresh stash");
        self.stash = Stash::new();
        self.runner = Some(runner);
    }

    pub fn runner(&self) -> Option<&CommandRunner> {
        self.runner.as_ref()
    }

    /// Run a command line through the bound runner
    pub async fn run(&self, command: &str) -> Result<CommandOutput> {
        let runner = self.runner.as_ref().ok_or(HarnessError::RunnerNotBound)?;
        runner.run(command).await
    }
}
