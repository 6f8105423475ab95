use crate::world::{HarnessWorld, RESULT};
use cucumber::gherkin::Step;
use cucumber::{then, when};

fn docstring(step: &Step) -> &str {
    step.docstring
        .as_deref()
        .expect("step needs a doc string")
        .trim_matches('\n')
}

#[when(regex = r"^I run `(.*)`$")]
async fn i_run(world: &mut HarnessWorld, command: String) {
    let output = world
        .context
        .run(&command)
        .await
        .unwrap_or_else(|e| panic!("failed to run {:?}: {}", command, e));
    world.context.stash.insert(RESULT, output);
}

#[when(regex = r"^I try to run `(.*)`$")]
async fn i_try_to_run(world: &mut HarnessWorld, command: String) {
    match world.context.run(&command).await {
        Ok(output) => world.context.stash.insert(RESULT, output),
        Err(e) => world.context.stash.insert("error", e.to_string()),
    }
}

#[then(expr = "the exit status should be {int}")]
fn exit_status_should_be(world: &mut HarnessWorld, expected: i32) {
    let output = world.last_output();
    assert_eq!(
        output.status, expected,
        "stdout: {}\nstderr: {}",
        output.stdout, output.stderr
    );
}

#[then("the output should be:")]
fn output_should_be(world: &mut HarnessWorld, step: &Step) {
    let expected: Vec<&str> = docstring(step).lines().collect();
    let actual: Vec<&str> = world.last_output().stdout.lines().collect();
    assert_eq!(actual, expected);
}

#[then(expr = "the output should be {string}")]
fn output_should_equal(world: &mut HarnessWorld, expected: String) {
    assert_eq!(world.last_output().stdout, expected);
}

#[then(expr = "the output should contain {string}")]
fn output_should_contain(world: &mut HarnessWorld, expected: String) {
    let stdout = &world.last_output().stdout;
    assert!(
        stdout.contains(&expected),
        "expected stdout to contain {:?}, got {:?}",
        expected,
        stdout
    );
}

#[then("the output should be empty")]
fn output_should_be_empty(world: &mut HarnessWorld) {
    assert_eq!(world.last_output().stdout, "");
}

#[then(expr = "the error output should contain {string}")]
fn error_output_should_contain(world: &mut HarnessWorld, expected: String) {
    let stderr = &world.last_output().stderr;
    assert!(
        stderr.contains(&expected),
        "expected stderr to contain {:?}, got {:?}",
        expected,
        stderr
    );
}

#[then("the error output should be empty")]
fn error_output_should_be_empty(world: &mut HarnessWorld) {
    assert_eq!(world.last_output().stderr, "");
}

#[then(expr = "the command should fail to launch with {string}")]
fn command_should_fail_to_launch(world: &mut HarnessWorld, expected: String) {
    let error = world
        .context
        .stash
        .get::<String>("error")
        .expect("command did launch");
    assert!(
        error.contains(&expected),
        "expected error to contain {:?}, got {:?}",
        expected,
        error
    );
}

#[then(expr = "the file {string} should contain {string}")]
fn file_should_contain(world: &mut HarnessWorld, name: String, expected: String) {
    let dir = &world
        .context
        .runner()
        .expect("runner not bound")
        .environment()
        .working_dir;
    let content = std::fs::read_to_string(dir.join(&name))
        .unwrap_or_else(|e| panic!("failed to read {}: {}", name, e));
    assert_eq!(content, expected);
}
