use cucumber::World;
use scenario_harness::io::CommandOutput;
use scenario_harness::ScenarioContext;

/// Stash key holding the output of the last command a scenario ran
pub const RESULT: &str = "result";

#[derive(Debug, Default, World)]
pub struct HarnessWorld {
    pub context: ScenarioContext,
}

impl HarnessWorld {
    pub fn last_output(&self) -> &CommandOutput {
        self.context
            .stash
            .get::<CommandOutput>(RESULT)
            .expect("no command has been run in this scenario")
    }
}
