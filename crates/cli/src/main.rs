//! PolicyDraft CLI — the main entry point.
//!
//! Commands:
//! - `init`      — Create config and data directories
//! - `template`  — Manage document templates
//! - `policy`    — Upload, list and delete policy documents
//! - `generate`  — Generate a document from a template
//! - `refine`    — Refine a generated document with feedback
//! - `document`  — Inspect generated documents
//! - `config`    — Show and validate the active configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "policydraft",
    about = "PolicyDraft — policy-grounded document generation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and data directories
    Init,

    /// Manage document templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Manage policy documents
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },

    /// Generate a document from a template
    Generate {
        /// Template ID
        #[arg(short, long)]
        template: String,

        /// Field value as `field-N=value` (repeatable)
        #[arg(short, long = "input", value_name = "FIELD=VALUE")]
        inputs: Vec<String>,
    },

    /// Refine a generated document
    Refine {
        /// Document ID
        document: String,

        /// What to change
        #[arg(short, long)]
        feedback: String,
    },

    /// Inspect generated documents
    Document {
        #[command(subcommand)]
        action: DocumentAction,
    },

    /// Show and validate the active configuration
    Config,
}

#[derive(Args)]
struct TemplateArgs {
    /// Template name
    #[arg(short, long)]
    name: String,

    /// Short description
    #[arg(short, long, default_value = "")]
    description: String,

    /// File holding the template text
    #[arg(short, long)]
    file: PathBuf,

    /// Restrict retrieval to this policy ID (repeatable)
    #[arg(short, long = "policy", value_name = "POLICY_ID")]
    policies: Vec<String>,
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Create a template from a file
    Create(TemplateArgs),
    /// List templates
    List,
    /// Show a template and its fields
    Show { id: String },
    /// Replace a template's content and settings
    Update {
        id: String,
        #[command(flatten)]
        args: TemplateArgs,
    },
    /// Delete a template
    Delete { id: String },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// Upload a policy text file
    Add {
        path: PathBuf,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List policies
    List,
    /// Delete a policy and its indexed chunks
    Delete { id: String },
}

#[derive(Subcommand)]
enum DocumentAction {
    /// Show a document
    Show {
        id: String,
        /// Print the stored record, context included, as JSON
        #[arg(long)]
        json: bool,
    },
    /// List documents
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Config => commands::config_cmd::run().await?,
        Commands::Template { action } => {
            let app = commands::App::load()?;
            match action {
                TemplateAction::Create(args) => {
                    commands::template::create(&app, args.into_draft()?).await?
                }
                TemplateAction::List => commands::template::list(&app).await?,
                TemplateAction::Show { id } => commands::template::show(&app, &id).await?,
                TemplateAction::Update { id, args } => {
                    commands::template::update(&app, &id, args.into_draft()?).await?
                }
                TemplateAction::Delete { id } => commands::template::delete(&app, &id).await?,
            }
        }
        Commands::Policy { action } => {
            let app = commands::App::load()?;
            match action {
                PolicyAction::Add { path, description } => {
                    commands::policy::add(&app, &path, &description).await?
                }
                PolicyAction::List => commands::policy::list(&app).await?,
                PolicyAction::Delete { id } => commands::policy::delete(&app, &id).await?,
            }
        }
        Commands::Generate { template, inputs } => {
            let app = commands::App::load()?;
            let inputs = commands::generate::parse_inputs(&inputs)?;
            commands::generate::create(&app, &template, &inputs).await?
        }
        Commands::Refine { document, feedback } => {
            let app = commands::App::load()?;
            commands::generate::refine(&app, &document, &feedback).await?
        }
        Commands::Document { action } => {
            let app = commands::App::load()?;
            match action {
                DocumentAction::Show { id, json } => {
                    commands::document::show(&app, &id, json).await?
                }
                DocumentAction::List => commands::document::list(&app).await?,
            }
        }
    }

    Ok(())
}

impl TemplateArgs {
    fn into_draft(self) -> Result<policydraft_core::TemplateDraft, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(&self.file)
            .map_err(|e| format!("Failed to read template file {}: {e}", self.file.display()))?;
        Ok(policydraft_core::TemplateDraft {
            name: self.name,
            description: self.description,
            content,
            policy_ids: self.policies,
        })
    }
}
