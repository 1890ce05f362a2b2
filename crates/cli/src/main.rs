use anyhow::Context;
use clap::{Parser, Subcommand};
use fhir::{CodeTables, DeathRecordBundle, SubmissionBundle, SubmissionContext, SubmissionEvent};
use std::path::PathBuf;
use vrr_core::{SubmissionConfig, Workflow};

#[derive(Parser)]
#[command(name = "vrr")]
#[command(about = "Vital Records Registry death-record tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume a death-record bundle into flat contents
    Consume {
        /// Path to a bundle JSON file
        bundle: PathBuf,
    },
    /// Consume a bundle and split its contents per workflow step
    Steps {
        /// Path to a bundle JSON file
        bundle: PathBuf,
        /// Path to a workflow definition YAML file
        workflow: PathBuf,
    },
    /// Validate a workflow definition
    ValidateWorkflow {
        /// Path to a workflow definition YAML file
        workflow: PathBuf,
    },
    /// Build a submission bundle around a focus resource
    Package {
        /// Path to the focus resource JSON file
        focus: PathBuf,
        /// Build a void submission
        #[arg(long)]
        voided: bool,
        /// Build an update submission
        #[arg(long)]
        submitted: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let tables = CodeTables::new();

    match cli.command {
        Commands::Consume { bundle } => {
            let contents = consume(&bundle, &tables)?;
            println!("{}", serde_json::to_string_pretty(&contents)?);
        }
        Commands::Steps { bundle, workflow } => {
            let contents = consume(&bundle, &tables)?;
            let workflow = Workflow::from_file(&workflow)
                .with_context(|| format!("loading workflow {}", workflow.display()))?;

            let nested = vrr_core::nest(&contents)?;
            let mut separated = serde_json::Map::new();
            for step in workflow.steps() {
                separated.insert(
                    step.name().to_string(),
                    serde_json::Value::Object(step.slice(&nested)),
                );
            }
            println!("{}", serde_json::to_string_pretty(&separated)?);
        }
        Commands::ValidateWorkflow { workflow } => {
            let workflow = Workflow::from_file(&workflow)?;
            println!(
                "workflow '{}' is valid: {} steps, entry '{}'",
                workflow.name(),
                workflow.flows().len(),
                workflow.entry().step().name()
            );
            for flow in workflow.flows() {
                println!(
                    "  {} (role: {}, fields: {})",
                    flow.step().name(),
                    flow.role(),
                    flow.step().params().len()
                );
            }
        }
        Commands::Package {
            focus,
            voided,
            submitted,
        } => {
            let focus_text = std::fs::read_to_string(&focus)
                .with_context(|| format!("reading focus resource {}", focus.display()))?;
            let focus: serde_json::Value = serde_json::from_str(&focus_text)?;

            let config = submission_config_from_env()?;
            let bundle = SubmissionBundle::build(&SubmissionContext {
                message_id: uuid::Uuid::new_v4(),
                record_id: uuid::Uuid::new_v4(),
                timestamp: chrono::Utc::now(),
                event: SubmissionEvent::for_record(voided, submitted),
                focus: &focus,
                jurisdiction_id: config.jurisdiction_id(),
                destination_endpoint: config.destination_endpoint(),
                source_endpoint: config.source_endpoint(),
            })?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
    }

    Ok(())
}

fn consume(bundle: &std::path::Path, tables: &CodeTables) -> anyhow::Result<fhir::FlatContents> {
    let text = std::fs::read_to_string(bundle)
        .with_context(|| format!("reading bundle {}", bundle.display()))?;
    let bundle = DeathRecordBundle::parse(&text)?;
    Ok(fhir::from_fhir(&bundle, tables)?)
}

/// Resolve submission configuration once at startup, preferring
/// environment overrides.
fn submission_config_from_env() -> anyhow::Result<SubmissionConfig> {
    let var = |name: &str, default: &str| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Ok(SubmissionConfig::new(
        var("VRR_JURISDICTION", SubmissionConfig::DEFAULT_JURISDICTION),
        var("VRR_SOURCE_ENDPOINT", SubmissionConfig::DEFAULT_SOURCE),
        var(
            "VRR_DESTINATION_ENDPOINT",
            SubmissionConfig::DEFAULT_DESTINATION,
        ),
    )?)
}
