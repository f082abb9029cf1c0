//! CLI command definitions and dispatch.

pub mod folder;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use arbor_core::config::AppConfig;
use arbor_core::error::AppError;
use arbor_database::{DatabasePool, NodeStore};
use arbor_service::FolderService;

use crate::output::{self, OutputFormat};

/// Arbor: per-owner folder hierarchy administration
#[derive(Debug, Parser)]
#[command(name = "arbor", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Check database connectivity
    Health,
    /// Folder hierarchy operations
    Folder(folder::FolderArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Health => health(config).await,
            Commands::Folder(args) => folder::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {e}")))
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: folder service over the configured database
pub async fn create_folder_service(config: &AppConfig) -> Result<FolderService, AppError> {
    let pool = create_db_pool(config).await?;
    let store: Arc<dyn NodeStore> = Arc::new(pool.node_store());
    Ok(FolderService::new(store, config.hierarchy.clone()))
}

async fn health(config: &AppConfig) -> Result<(), AppError> {
    let pool = create_db_pool(config).await?;
    let store = pool.node_store();
    if store.health_check().await? {
        output::print_success(&format!("{} store is reachable.", store.backend()));
    } else {
        output::print_warning(&format!("{} store answered unexpectedly.", store.backend()));
    }
    pool.close().await;
    Ok(())
}
