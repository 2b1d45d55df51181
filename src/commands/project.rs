// ABOUTME: Project command implementation.
// ABOUTME: Creates and shows projects.

use crate::cli::ProjectCommand;
use bosun::compose::NewProject;
use bosun::deploy::Orchestrator;
use bosun::error::Result;
use bosun::output::Output;
use bosun::types::ProjectId;

pub async fn project(
    orchestrator: &Orchestrator,
    command: ProjectCommand,
    output: &Output,
) -> Result<()> {
    match command {
        ProjectCommand::Create { name, description } => {
            let project = orchestrator
                .create_project(NewProject { name, description })
                .await?;
            output.record(
                &project,
                &format!("Created project {} ({})", project.name, project.project_id),
            );
        }
        ProjectCommand::Show { project_id } => {
            let project = orchestrator
                .find_project(&ProjectId::new(project_id))
                .await?;
            let mut text = format!("{} ({})", project.name, project.project_id);
            if let Some(ref description) = project.description {
                text.push_str(&format!("\n  {description}"));
            }
            output.record(&project, &text);
        }
    }
    Ok(())
}
