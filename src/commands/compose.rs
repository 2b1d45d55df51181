// ABOUTME: Compose command implementation.
// ABOUTME: Create, show, list services, update, randomize, and hand off to deploy.

use super::deploy::deploy;
use crate::cli::{ComposeCommand, UpdateArgs};
use bosun::compose::{ComposeDetails, ComposePatch, NewCompose};
use bosun::deploy::{DeployRequest, Orchestrator};
use bosun::error::{Error, Result};
use bosun::output::Output;
use bosun::types::{AppName, ComposeId, ProjectId};

pub async fn compose(
    orchestrator: &Orchestrator,
    command: ComposeCommand,
    output: &Output,
) -> Result<()> {
    match command {
        ComposeCommand::Create {
            name,
            project,
            app_name,
            description,
        } => {
            let mut input = NewCompose::new(name, ProjectId::new(project));
            input.app_name = app_name.as_deref().map(AppName::new).transpose()?;
            input.description = description;

            let compose = orchestrator.create_compose(input).await?;
            output.record(
                &compose,
                &format!(
                    "Created compose {} ({}) as {}",
                    compose.name, compose.compose_id, compose.app_name
                ),
            );
        }
        ComposeCommand::Show { compose_id } => {
            let details = orchestrator
                .find_compose_by_id(&ComposeId::new(compose_id))
                .await?;
            output.record(&details, &describe(&details));
        }
        ComposeCommand::Services { compose_id } => {
            let services = orchestrator
                .load_services(&ComposeId::new(compose_id))
                .await?;
            let names: Vec<String> = services.into_iter().collect();
            output.record(&names, &names.join("\n"));
        }
        ComposeCommand::Update(args) => update(orchestrator, args, output).await?,
        ComposeCommand::Randomize { compose_id } => {
            let id = ComposeId::new(compose_id);
            let text = orchestrator.randomize_compose(&id).await?;
            output.record(&serde_json::json!({ "compose_file": text }), &text);
        }
        ComposeCommand::Deploy { compose_id, title } => {
            let mut request = DeployRequest::new(ComposeId::new(compose_id));
            if let Some(title) = title {
                request = request.title(title);
            }
            deploy(orchestrator, request, output).await?;
        }
    }
    Ok(())
}

async fn update(orchestrator: &Orchestrator, args: UpdateArgs, output: &Output) -> Result<()> {
    let patch = ComposePatch {
        name: args.name,
        app_name: args.app_name.as_deref().map(AppName::new).transpose()?,
        description: args.description,
        env: read_optional(args.env_file.as_deref()).await?,
        compose_file: read_optional(args.file.as_deref()).await?,
    };

    if patch.is_empty() {
        output.warning("nothing to update");
        return Ok(());
    }

    let id = ComposeId::new(args.compose_id);
    let compose = orchestrator
        .update_compose(&id, &patch)
        .await?
        .ok_or_else(|| Error::NotFound(format!("compose {id}")))?;
    output.record(
        &compose,
        &format!("Updated compose {} ({})", compose.name, compose.compose_id),
    );
    Ok(())
}

async fn read_optional(path: Option<&std::path::Path>) -> Result<Option<String>> {
    match path {
        Some(path) => Ok(Some(tokio::fs::read_to_string(path).await?)),
        None => Ok(None),
    }
}

fn describe(details: &ComposeDetails) -> String {
    let compose = &details.compose;
    let mut lines = vec![
        format!("{} ({})", compose.name, compose.compose_id),
        format!("  app name: {}", compose.app_name),
        format!(
            "  project:  {} ({})",
            details.project.name, details.project.project_id
        ),
    ];
    if let Some(ref description) = compose.description {
        lines.push(format!("  description: {description}"));
    }
    if details.deployments.is_empty() {
        lines.push("  no deployments".to_string());
    } else {
        lines.push("  deployments:".to_string());
        for deployment in &details.deployments {
            lines.push(format!(
                "    {} {:<8} {} ({})",
                deployment.created_at.format("%Y-%m-%d %H:%M:%S"),
                deployment.status,
                deployment.title,
                deployment.deployment_id
            ));
        }
    }
    lines.join("\n")
}
