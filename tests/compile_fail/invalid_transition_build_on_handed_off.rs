// ABOUTME: Compile-fail test verifying a handed-off attempt cannot build again.
// ABOUTME: This test should fail to compile, validating state machine safety.

use bosun::build::BuildInvoker;
use bosun::compose::ComposeDetails;
use bosun::deploy::{DeployAttempt, HandedOff};

async fn try_invalid_rebuild<B: BuildInvoker>(
    attempt: DeployAttempt<HandedOff>,
    invoker: &B,
    compose: &ComposeDetails,
) {
    // ERROR: build() method doesn't exist on DeployAttempt<HandedOff>
    let _ = attempt.build(invoker, compose).await;
}

fn main() {}
