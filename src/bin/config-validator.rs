//! # HostUpdate Configuration Validator
//!
//! Command-line tool for validating `hostupdate-config.yaml` across environments.
//! Reports the effective runner and orchestrator settings so timeout problems
//! show up before a controller ever sends a request.

use clap::{Parser, Subcommand};
use hostupdate_core::categories::UpdateCategory;
use hostupdate_core::config::{ConfigManager, ConfigurationError, HostUpdateConfig};
use hostupdate_core::orchestrator::UpdateError;
use hostupdate_core::Result;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate HostUpdate configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production); detected from
    /// HOSTUPDATE_ENV / APP_ENV when omitted
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the whole configuration
    All,

    /// Validate one section (runner, orchestrator, logging)
    Component {
        /// Section name
        name: String,
    },

    /// List the valid update category names
    Categories,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Some(Commands::All) | None => validate_all_config(&cli),
        Some(Commands::Component { name }) => validate_component(&cli, name),
        Some(Commands::Categories) => {
            list_categories();
            Ok(())
        }
    };

    match result {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            process::exit(1);
        }
    }
}

fn load(cli: &Cli) -> Result<HostUpdateConfig> {
    println!("🔧 Validating HostUpdate Configuration");
    if let Some(config_dir) = &cli.config_dir {
        println!("Config Directory: {}", config_dir.display());
    }

    let loaded = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    };

    match loaded {
        Ok(manager) => {
            println!("Environment: {}", manager.environment());
            println!(
                "✅ Configuration loaded from {}\n",
                manager.config_directory().display()
            );
            Ok(manager.config().clone())
        }
        Err(e) => {
            println!("❌ Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

fn validate_all_config(cli: &Cli) -> Result<()> {
    let config = load(cli)?;

    validate_runner_config(&config)?;
    validate_orchestrator_config(&config)?;
    validate_logging_config(&config)?;

    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn validate_component(cli: &Cli, component_name: &str) -> Result<()> {
    let config = load(cli)?;

    match component_name.to_lowercase().as_str() {
        "runner" => validate_runner_config(&config)?,
        "orchestrator" => validate_orchestrator_config(&config)?,
        "logging" => validate_logging_config(&config)?,
        _ => {
            return Err(ConfigurationError::InvalidValue {
                field: "component",
                value: component_name.to_string(),
                reason: "expected runner, orchestrator or logging".to_string(),
            }
            .into());
        }
    }

    println!("✅ Component '{}' validation passed!", component_name);
    Ok(())
}

fn list_categories() {
    println!("📋 Update Categories:");
    for category in UpdateCategory::ALL {
        println!("  • {:<18} {}", category.name(), category.provider_id());
    }
}

fn validate_runner_config(config: &HostUpdateConfig) -> Result<()> {
    println!("⏱️  Validating Runner Configuration...");
    let runner = &config.runner;

    println!("   ✅ Task name: {}", runner.task_name);
    println!("   ✅ Start timeout: {}ms", runner.start_timeout_ms);
    println!("   ✅ Poll interval: {}ms", runner.poll_interval_ms);
    match runner.completion_timeout_ms {
        Some(ms) => println!("   ✅ Completion timeout: {}ms", ms),
        None => println!("   ℹ️  Completion timeout: unbounded"),
    }

    Ok(())
}

fn validate_orchestrator_config(config: &HostUpdateConfig) -> Result<()> {
    println!("🎼 Validating Orchestrator Configuration...");

    let category: UpdateCategory = config
        .orchestrator
        .default_category
        .parse()
        .map_err(UpdateError::from)?;
    println!(
        "   ✅ Default category: {} ({})",
        category,
        category.provider_id()
    );

    Ok(())
}

fn validate_logging_config(config: &HostUpdateConfig) -> Result<()> {
    println!("📝 Validating Logging Configuration...");

    println!("   ✅ Log directory: {}", config.logging.log_directory);
    match &config.logging.level {
        Some(level) => println!("   ✅ Level override: {}", level),
        None => println!("   ℹ️  Level: environment default"),
    }

    Ok(())
}
