// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bosun")]
#[command(about = "Deployment lifecycle manager for Docker Compose applications")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new bosun.yml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage compose applications
    #[command(subcommand)]
    Compose(ComposeCommand),
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show a project
    Show { project_id: String },
}

#[derive(Subcommand)]
pub enum ComposeCommand {
    /// Create a compose application (starts with an empty compose file)
    Create {
        name: String,
        /// Owning project
        #[arg(short, long)]
        project: String,
        /// Compose project name (derived from the name if omitted)
        #[arg(long)]
        app_name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show a compose application with its deployments
    Show { compose_id: String },

    /// List the services declared in the compose file
    Services { compose_id: String },

    /// Update fields of a compose application
    Update(UpdateArgs),

    /// Suffix every service, volume, and network name with a random string
    Randomize { compose_id: String },

    /// Build and deploy a compose application
    Deploy {
        compose_id: String,
        /// Title recorded on the deployment
        #[arg(short, long)]
        title: Option<String>,
    },
}

#[derive(Args)]
pub struct UpdateArgs {
    pub compose_id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub app_name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Read the compose file from this path
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Read the .env contents from this path
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}
