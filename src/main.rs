// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use kinetic_conditions::expression::{
    ConditionExpression, ExecutionMetadataState, ExecutionState, Expression, ExpressionConfig,
    FieldType,
};
use kinetic_conditions::rules::{ConditionLoader, ExpressionRegistry, Settings};
use schemars::schema_for;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a condition tree against an execution state
    Eval {
        /// Path to the condition file (YAML or JSON)
        #[arg(short, long)]
        file: String,

        /// Execution state as a JSON object
        #[arg(short, long, default_value = "{}")]
        state: String,
    },
    /// Check the integrity of a condition tree
    Check {
        /// Path to the condition file (YAML or JSON)
        #[arg(short, long)]
        file: String,

        /// Available variables as name:type (e.g. node:object)
        #[arg(short, long = "context")]
        context: Vec<String>,

        /// Only prepare the metadata state up to this expression UUID
        #[arg(short, long)]
        until: Option<String>,
    },
    /// Print the normalized configuration of a condition tree
    Show {
        /// Path to the condition file (YAML or JSON)
        #[arg(short, long)]
        file: String,
    },
    /// Print the JSON schema of condition configuration files
    Schema,
    /// List the registered expression plugins
    Plugins,
}

fn parse_context(definitions: &[String]) -> anyhow::Result<ExecutionMetadataState> {
    let mut metadata = ExecutionMetadataState::new();
    for definition in definitions {
        let Some((name, field_type)) = definition.split_once(':') else {
            bail!("Invalid context '{}', expected name:type", definition);
        };
        let field_type = field_type
            .parse::<FieldType>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid context '{}'", definition))?;
        metadata.set_definition(name.trim(), field_type);
    }
    Ok(metadata)
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    let registry = ExpressionRegistry::with_builtins(settings);
    let loader = ConditionLoader::new();

    match args.command {
        Commands::Eval { file, state } => {
            let condition = loader
                .load_condition(&file, &registry)
                .with_context(|| format!("Failed to load conditions from {}", file))?;
            let state: Value = serde_json::from_str(&state).context("Invalid execution state")?;
            if !state.is_object() {
                bail!("Execution state must be a JSON object");
            }

            let result = condition.execute_with_state(&ExecutionState::from_json(state));
            log::info!("Condition '{}' evaluated to {}", condition.label(), result);
            println!("{}", result);
        }
        Commands::Check {
            file,
            context,
            until,
        } => {
            let condition = loader
                .load_condition(&file, &registry)
                .with_context(|| format!("Failed to load conditions from {}", file))?;
            let mut metadata = parse_context(&context)?;

            if let Some(until) = until {
                if !condition.prepare_execution_metadata_state(&mut metadata, Some(&until)) {
                    log::warn!(
                        "Expression '{}' not found, metadata prepared for the whole tree",
                        until
                    );
                }
                let mut names: Vec<&String> = metadata.names().collect();
                names.sort();
                for name in names {
                    if let Some(field_type) = metadata.definition(name) {
                        println!("{}: {}", name, field_type);
                    }
                }
                return Ok(());
            }

            let violations = condition.check_integrity(&mut metadata);
            if violations.is_empty() {
                println!("OK");
                return Ok(());
            }
            for violation in &violations {
                match violation.uuid.as_deref() {
                    Some(uuid) => println!("[{}] {}", uuid, violation),
                    None => println!("{}", violation),
                }
            }
            bail!("Found {} integrity violations", violations.len());
        }
        Commands::Show { file } => {
            let condition = loader
                .load_condition(&file, &registry)
                .with_context(|| format!("Failed to load conditions from {}", file))?;
            print!("{}", ConditionLoader::to_yaml(&condition.configuration())?);
        }
        Commands::Schema => {
            let schema = schema_for!(ExpressionConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Plugins => {
            for plugin_id in registry.plugin_ids() {
                if let Some(definition) = registry.get(&plugin_id) {
                    println!("{}\t{}", definition.id, definition.label);
                }
            }
        }
    }

    Ok(())
}
