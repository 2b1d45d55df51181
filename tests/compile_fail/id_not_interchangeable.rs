// ABOUTME: Compile-fail test verifying ComposeId and DeploymentId are not interchangeable.
// ABOUTME: This test should fail to compile, validating type safety.

use bosun::types::{ComposeId, DeploymentId};

fn takes_compose_id(_id: ComposeId) {}

fn main() {
    let deployment_id = DeploymentId::new("d1");
    takes_compose_id(deployment_id); // ERROR: expected ComposeId, found DeploymentId
}
