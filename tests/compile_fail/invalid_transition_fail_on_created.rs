// ABOUTME: Compile-fail test verifying fail cannot be called before the build starts.
// ABOUTME: This test should fail to compile, validating state machine safety.

use bosun::deploy::{Created, DeployAttempt};
use bosun::deployment::DeploymentRecords;

async fn try_invalid_fail(attempt: DeployAttempt<Created>, records: &DeploymentRecords) {
    // ERROR: fail() method doesn't exist on DeployAttempt<Created>
    let _ = attempt.fail(records, "boom").await;
}

fn main() {}
