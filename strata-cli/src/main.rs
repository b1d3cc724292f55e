use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::debug;

use strata_core::provider::ResourceType;
use strata_core::registration::ServiceRegistration;
use strata_core::resource::{ResourceId, State, Value};
use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use strata_provider_azurerm::acceptance::ConfigDocument;
use strata_provider_azurerm::config::DEFAULT_ENDPOINT;
use strata_provider_azurerm::value::value_to_json;
use strata_provider_azurerm::{AzureConfig, AzureProvider, Registry};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Inspect and import Azure resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered services and their resource types
    Resources,
    /// Show the attribute schema of a resource type
    Schema {
        /// Resource type (e.g., azurerm_dynatrace_monitor)
        resource_type: String,
    },
    /// Validate a JSON configuration document against the schemas
    Validate {
        /// Path to the configuration document
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Read a remote object by its Azure resource ID
    Read {
        resource_type: String,
        /// Azure resource ID
        identifier: String,
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        connection: Connection,
    },
    /// Import a remote object by its Azure resource ID
    Import {
        resource_type: String,
        /// Azure resource ID
        identifier: String,
        /// Label for the imported resource
        #[arg(long, default_value = "imported")]
        label: String,
        /// Print the imported states as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        connection: Connection,
    },
}

#[derive(Args)]
struct Connection {
    #[arg(long, env = "ARM_SUBSCRIPTION_ID")]
    subscription_id: String,

    #[arg(long, env = "ARM_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[arg(long, env = "ARM_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

impl Connection {
    fn provider(self) -> Result<AzureProvider, String> {
        let mut config = AzureConfig::default()
            .with_subscription(self.subscription_id)
            .with_endpoint(self.endpoint);
        if let Some(token) = self.access_token {
            config = config.with_access_token(token);
        }
        AzureProvider::new(config).map_err(|e| e.to_string())
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resources => run_resources(),
        Commands::Schema { resource_type } => run_schema(&resource_type),
        Commands::Validate { file } => run_validate(&file),
        Commands::Read {
            resource_type,
            identifier,
            json,
            connection,
        } => run_read(&resource_type, &identifier, json, connection).await,
        Commands::Import {
            resource_type,
            identifier,
            label,
            json,
            connection,
        } => run_import(&resource_type, &identifier, &label, json, connection).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn schema_for(registry: &Registry, resource_type: &str) -> Result<ResourceSchema, String> {
    registry
        .handler(resource_type)
        .map(|h| h.schema())
        .ok_or_else(|| format!("Unknown resource type: {}", resource_type))
}

fn run_resources() -> Result<(), String> {
    let registry = Registry::new();
    for registration in registry.registrations() {
        let label = registration
            .associated_github_label()
            .map(|l| format!(" ({})", l))
            .unwrap_or_default();
        println!("{}{}", registration.name().cyan().bold(), label.dimmed());
        for resource in registration.resources() {
            println!("  • {}", resource.name());
        }
    }
    Ok(())
}

fn run_schema(resource_type: &str) -> Result<(), String> {
    let schema = schema_for(&Registry::new(), resource_type)?;

    println!("{}", schema.resource_type.cyan().bold());
    if let Some(description) = &schema.description {
        println!("{}", description.dimmed());
    }
    println!();
    print_attributes(&schema.attributes, 1);
    Ok(())
}

fn print_attributes(attributes: &[AttributeSchema], depth: usize) {
    let indent = "  ".repeat(depth);
    for attr in attributes {
        let mut flags = Vec::new();
        if attr.required {
            flags.push("required".yellow().to_string());
        }
        if attr.computed {
            flags.push("computed".blue().to_string());
        }
        if attr.force_new {
            flags.push("force-new".red().to_string());
        }
        if attr.sensitive {
            flags.push("sensitive".magenta().to_string());
        }
        if let Some(default) = &attr.default {
            flags.push(format!("default {}", format_value(default)));
        }

        println!(
            "{}{}: {} {}",
            indent,
            attr.name.bold(),
            attr.attr_type,
            flags.join(" ")
        );

        if let Some(fields) = block_fields(&attr.attr_type) {
            print_attributes(fields, depth + 1);
        }
    }
}

fn block_fields(attr_type: &AttributeType) -> Option<&[AttributeSchema]> {
    match attr_type {
        AttributeType::List(inner) => block_fields(inner),
        AttributeType::Struct { fields, .. } => Some(fields),
        _ => None,
    }
}

fn run_validate(file: &PathBuf) -> Result<(), String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let document = ConfigDocument::parse(&content).map_err(|e| format!("Parse error: {}", e))?;

    println!("{}", "Validating...".cyan());

    let registry = Registry::new();
    let mut all_errors = Vec::new();
    for resource in document.resources() {
        let schema = match schema_for(&registry, &resource.id.resource_type) {
            Ok(schema) => schema,
            Err(e) => {
                all_errors.push(format!("{}: {}", resource.id, e));
                continue;
            }
        };
        let mut attributes = resource.attributes.clone();
        schema.apply_defaults(&mut attributes);
        if let Err(errors) = schema.validate(&attributes) {
            for error in errors {
                all_errors.push(format!("{}: {}", resource.id, error));
            }
        }
    }

    if !all_errors.is_empty() {
        return Err(all_errors.join("\n"));
    }

    println!(
        "{}",
        format!(
            "✓ {} resources validated successfully.",
            document.resources().len()
        )
        .green()
        .bold()
    );
    for resource in document.resources() {
        println!("  • {}", resource.id);
    }
    Ok(())
}

async fn run_read(
    resource_type: &str,
    identifier: &str,
    json: bool,
    connection: Connection,
) -> Result<(), String> {
    let provider = connection.provider()?;
    let id = ResourceId::new(resource_type, "current");
    debug!("reading {} as {}", identifier, id);

    let state = provider
        .read_resource(&id, Some(identifier), None)
        .await
        .map_err(|e| e.to_string())?;
    if !state.exists {
        println!("{}", format!("{} does not exist.", identifier).yellow());
        return Ok(());
    }

    let schema = schema_for(provider.registry(), resource_type)?;
    if json {
        return print_json(&state_json(&state, &schema));
    }
    print_state(&state, &schema);
    Ok(())
}

async fn run_import(
    resource_type: &str,
    identifier: &str,
    label: &str,
    json: bool,
    connection: Connection,
) -> Result<(), String> {
    let provider = connection.provider()?;
    let id = ResourceId::new(resource_type, label);

    let states = provider
        .import_resource(&id, identifier)
        .await
        .map_err(|e| e.to_string())?;

    if json {
        let mut docs = Vec::new();
        for state in &states {
            let schema = schema_for(provider.registry(), &state.id.resource_type)?;
            docs.push(state_json(state, &schema));
        }
        return print_json(&serde_json::Value::Array(docs));
    }

    for state in &states {
        let schema = schema_for(provider.registry(), &state.id.resource_type)?;
        println!("{} {}", "Imported".green().bold(), state.id);
        print_state(state, &schema);
        println!();
    }
    Ok(())
}

fn print_state(state: &State, schema: &ResourceSchema) {
    if let Some(identifier) = &state.identifier {
        println!("  {}: {}", "id".bold(), identifier);
    }

    let mut keys: Vec<&String> = state.attributes.keys().collect();
    keys.sort();
    for key in keys {
        let sensitive = schema.get(key).is_some_and(|a| a.sensitive);
        let shown = if sensitive {
            "(sensitive)".dimmed().to_string()
        } else {
            format_value(&state.attributes[key])
        };
        println!("  {}: {}", key.bold(), shown);
    }
}

/// State as a JSON object: address, identifier and attributes, sensitive ones masked
fn state_json(state: &State, schema: &ResourceSchema) -> serde_json::Value {
    let mut keys: Vec<&String> = state.attributes.keys().collect();
    keys.sort();
    let attributes: serde_json::Map<String, serde_json::Value> = keys
        .into_iter()
        .map(|key| {
            let value = if schema.get(key).is_some_and(|a| a.sensitive) {
                serde_json::Value::Null
            } else {
                value_to_json(&state.attributes[key])
            };
            (key.clone(), value)
        })
        .collect();

    serde_json::json!({
        "address": state.id.to_string(),
        "id": state.identifier,
        "attributes": attributes,
    })
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let content = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", content);
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut strs: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            strs.sort();
            format!("{{{}}}", strs.join(", "))
        }
        Value::ResourceRef(address, attr) => format!("${{{}.{}}}", address, attr),
    }
}
