use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rulekit_rs::engine::DataRecord;
use rulekit_rs::rulekit::config::{self, Config};
use rulekit_rs::rulekit::registry::RuleRegistry;
use rulekit_rs::rulekit::server::{self, AppState};
use rulekit_rs::rulekit::storage;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rule file to load and save (JSON, or YAML by extension)
    #[arg(long, global = true)]
    rules_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create a rule from a rule string
    Create {
        /// Rule name
        #[arg(short, long)]
        name: String,

        /// Rule string, e.g. "age > 30 AND salary > 50000"
        #[arg(short, long)]
        rule: String,
    },
    /// Combine existing rules into a new rule
    Combine {
        /// Name for the combined rule
        #[arg(short, long)]
        name: String,

        /// Comma separated rule names
        #[arg(short, long, value_delimiter = ',', required = true)]
        rules: Vec<String>,

        /// AND or OR
        #[arg(short, long)]
        operator: String,
    },
    /// Evaluate a rule
    Eval {
        /// Rule name
        #[arg(short, long)]
        name: String,

        /// Data record file (JSON or YAML)
        #[arg(short, long, conflicts_with = "record")]
        data: Option<PathBuf>,

        /// Inline JSON data record
        #[arg(long)]
        record: Option<String>,
    },
    /// List stored rules
    List,
    /// Delete a rule
    Delete {
        /// Rule name
        #[arg(short, long)]
        name: String,
    },
    /// Delete all rules
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = args.rules_file {
        config.rules_file = path;
    }

    let registry = RuleRegistry::new();
    storage::load_into(&config.rules_file, &registry)
        .await
        .with_context(|| format!("Failed to load rules from {:?}", config.rules_file))?;

    match args.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            let state = AppState {
                registry,
                default_record: config.default_record,
            };
            server::serve(state, port, config.rules_file)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Commands::Create { name, rule } => {
            let tree = registry.create_rule(&name, &rule).await?;
            storage::save_from(&config.rules_file, &registry).await?;
            println!("Rule '{}' created: {}", name, tree);
        }
        Commands::Combine {
            name,
            rules,
            operator,
        } => {
            let rules: Vec<String> = rules.iter().map(|r| r.trim().to_string()).collect();
            let tree = registry.combine_rules(&name, &rules, &operator).await?;
            storage::save_from(&config.rules_file, &registry).await?;
            println!("Combined rule '{}' created: {}", name, tree);
        }
        Commands::Eval { name, data, record } => {
            let record: DataRecord = match (data, record) {
                (Some(path), _) => config::load_record(&path)
                    .with_context(|| format!("Failed to read data record {:?}", path))?,
                (None, Some(json)) => config::parse_record(&json)?,
                (None, None) => config.default_record,
            };
            let result = registry.evaluate_rule(&name, &record).await?;
            println!("Result of rule '{}': {}", name, result);
        }
        Commands::List => {
            let rules = registry.snapshot().await;
            if rules.is_empty() {
                println!("No rules stored.");
            }
            for (name, tree) in rules {
                println!("{}: {}", name, tree);
            }
        }
        Commands::Delete { name } => {
            if registry.remove(&name).await.is_none() {
                anyhow::bail!("Rule '{}' does not exist.", name);
            }
            storage::save_from(&config.rules_file, &registry).await?;
            println!("Rule '{}' deleted.", name);
        }
        Commands::Clear => {
            registry.clear().await;
            storage::save_from(&config.rules_file, &registry).await?;
            println!("All rules cleared.");
        }
    }

    Ok(())
}
