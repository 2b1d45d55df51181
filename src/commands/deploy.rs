// ABOUTME: Deploy command implementation.
// ABOUTME: Runs one compose deployment and reports where its log lives.

use bosun::deploy::{DeployRequest, Orchestrator};
use bosun::error::Result;
use bosun::output::Output;

pub async fn deploy(
    orchestrator: &Orchestrator,
    request: DeployRequest,
    output: &Output,
) -> Result<()> {
    let mut output = Output::new(output.mode());
    output.start_timer();
    output.progress(&format!("Deploying compose {}", request.compose_id));

    match orchestrator.deploy_compose(request).await {
        Ok(deployment) => {
            output.progress(&format!("  → Log: {}", deployment.log_path.display()));
            output.record(
                &deployment,
                &format!(
                    "Deployed compose {} as deployment {} ({:.1}s)",
                    deployment.compose_id,
                    deployment.deployment_id,
                    output.elapsed_secs()
                ),
            );
            Ok(())
        }
        Err(e) => {
            if let Some(code) = e.build_failure().and_then(|b| b.exit_code()) {
                output.progress(&format!("  ✗ Build exited with status {code}"));
            }
            Err(e)
        }
    }
}
