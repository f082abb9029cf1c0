//! Folder hierarchy CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use arbor_core::config::AppConfig;
use arbor_core::error::AppError;
use arbor_core::types::{Pagination, UserId};
use arbor_entity::folder::{FolderListQuery, FolderSort, FolderSublist, ParentRef};
use arbor_entity::Folder;
use arbor_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Owner whose hierarchy is addressed
    #[arg(short, long)]
    pub owner: String,

    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Show a single folder
    Info {
        /// Folder ID
        id: String,
    },
    /// List the direct children of a folder
    Children {
        /// Folder ID
        id: String,
    },
    /// List folders under a parent, or search the whole tree
    List {
        /// Parent folder ID ("/" for the top level)
        #[arg(short, long, default_value = "/")]
        parent: String,
        /// Case-insensitive name filter (searches every level)
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order
        #[arg(long, value_enum, default_value = "date-desc")]
        sort: SortArg,
        /// Number of folders to skip
        #[arg(long, default_value = "0")]
        skip: u64,
        /// Maximum number of folders to return
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Show the trail from the root to a folder
    Breadcrumbs {
        /// Folder ID
        id: String,
    },
    /// Create a new folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID ("/" for the top level)
        #[arg(short, long, default_value = "/")]
        parent: String,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: String,
    },
    /// Move a folder and everything below it
    Move {
        /// Folder ID
        id: String,
        /// New parent folder ID ("/" for the top level)
        #[arg(short, long)]
        to: String,
    },
}

/// Sort order for `folder list`
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SortArg {
    /// Newest first
    DateDesc,
    /// Oldest first
    DateAsc,
    /// A to Z
    NameAsc,
    /// Z to A
    NameDesc,
}

impl From<SortArg> for FolderSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::DateDesc => Self::DateDesc,
            SortArg::DateAsc => Self::DateAsc,
            SortArg::NameAsc => Self::NameAsc,
            SortArg::NameDesc => Self::NameDesc,
        }
    }
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent
    parent: String,
    /// Depth below the root
    depth: usize,
    /// Created at
    created_at: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f.parent().to_string(),
            depth: f.parent_list().len(),
            created_at: f.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Name/id pair display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Name
    name: String,
    /// ID
    id: String,
}

fn entry_rows(list: FolderSublist) -> Vec<EntryRow> {
    list.names
        .into_iter()
        .zip(list.ids)
        .map(|(name, id)| EntryRow {
            name,
            id: id.to_string(),
        })
        .collect()
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner_id: UserId = args
        .owner
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid owner UUID: {e}")))?;
    let ctx = RequestContext::new(owner_id);
    let service = super::create_folder_service(config).await?;

    match &args.command {
        FolderCommand::Info { id } => {
            let folder = service.get_folder_info(&ctx, id).await?;
            output::print_item(&folder, format);
        }
        FolderCommand::Children { id } => {
            let children = service.get_folder_sublist(&ctx, id).await?;
            output::print_list(&entry_rows(children), format);
        }
        FolderCommand::List {
            parent,
            search,
            sort,
            skip,
            limit,
        } => {
            let parent: ParentRef = parent
                .parse()
                .map_err(|e| AppError::validation(format!("Invalid parent: {e}")))?;
            let query = FolderListQuery {
                parent: Some(parent),
                search: search.clone(),
                sort: (*sort).into(),
                pagination: Pagination::new(*skip, *limit),
            };
            let folders = service.get_folder_list(&ctx, query).await?;
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Breadcrumbs { id } => {
            let trail = service.get_folder_breadcrumbs(&ctx, id).await?;
            output::print_list(&entry_rows(trail), format);
        }
        FolderCommand::Create { name, parent } => {
            let folder = service.create_folder(&ctx, name, parent).await?;
            output::print_success(&format!("Folder '{}' created (id: {})", folder.name, folder.id));
        }
        FolderCommand::Rename { id, name } => {
            let folder = service.rename_folder(&ctx, id, name).await?;
            output::print_success(&format!("Folder {} renamed to '{}'", folder.id, folder.name));
        }
        FolderCommand::Move { id, to } => match service.move_folder(&ctx, id, to).await {
            Ok(folder) => {
                output::print_success(&format!(
                    "Folder {} moved under {}",
                    folder.id,
                    folder.parent()
                ));
                output::print_kv("Path", &folder.parent_list().to_string());
            }
            Err(e) if e.is_retryable() => {
                output::print_warning("The move did not complete; run the same command again.");
                return Err(e);
            }
            Err(e) => return Err(e),
        },
    }

    Ok(())
}
