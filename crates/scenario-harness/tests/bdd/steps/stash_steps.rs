use crate::world::{HarnessWorld, RESULT};
use cucumber::{given, then};

#[given(expr = "I stash {string} under {string}")]
fn stash_value(world: &mut HarnessWorld, value: String, key: String) {
    world.context.stash.insert(key, value);
}

#[then(expr = "the stash should hold {string} under {string}")]
fn stash_should_hold(world: &mut HarnessWorld, expected: String, key: String) {
    assert_eq!(
        world.context.stash.get::<String>(&key).map(String::as_str),
        Some(expected.as_str())
    );
}

#[then(expr = "the stash should not contain {string}")]
fn stash_should_not_contain(world: &mut HarnessWorld, key: String) {
    assert!(
        !world.context.stash.contains_key(&key),
        "stash leaked from another scenario: {:?}",
        world.context.stash
    );
}

#[then("the stash should be empty")]
fn stash_should_be_empty(world: &mut HarnessWorld) {
    assert!(world.context.stash.is_empty(), "{:?}", world.context.stash);
    assert!(!world.context.stash.contains_key(RESULT));
}
