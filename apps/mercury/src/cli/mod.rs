//! # Mercury CLI Module
//!
//! ## Available Commands
//!
//! - `show` - Show the combined metadata of a subject
//! - `classes` - List the classes the vocabulary declares
//! - `entities` - List the entities of a class
//! - `resolve` - Resolve a storage path to its subject IRI
//! - `validate` - Check values for a property without sending them
//! - `set` - Replace the values of a property
//! - `create` - Create an entity of a class

mod commands;

use clap::{Parser, Subcommand};
use mercury::{ClientError, Config, MetadataStore};
use std::path::PathBuf;
use std::sync::Arc;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Mercury - linked-data metadata client
#[derive(Parser, Debug)]
#[command(name = "mercury")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to mercury.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and MERCURY_URL)
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the metadata of a subject, joined with the vocabulary
    Show {
        /// Subject IRI
        subject: String,
    },

    /// List the classes declared by the vocabulary
    Classes {
        /// Only classes browsable in the catalog
        #[arg(long)]
        catalog: bool,
    },

    /// List the entities of a class
    Entities {
        /// Class IRI; omit for the entities of every class
        class: Option<String>,
    },

    /// Resolve a storage path to its subject IRI
    Resolve {
        /// Path of a file or directory, e.g. /collection/dir/file.txt
        path: String,
    },

    /// Validate values for a property without sending them
    Validate {
        subject: String,
        predicate: String,
        values: Vec<String>,

        /// Treat values as IRIs of other resources
        #[arg(short, long)]
        reference: bool,
    },

    /// Replace the values of a property
    Set {
        subject: String,
        predicate: String,
        values: Vec<String>,

        /// Treat values as IRIs of other resources
        #[arg(short, long)]
        reference: bool,
    },

    /// Create an entity of a class
    Create {
        /// Class IRI
        class: String,

        /// Identifier for the new subject (random UUID when omitted)
        #[arg(long)]
        id: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ClientError> {
    let config = Config::load(cli.config.as_deref())?
        .with_env()
        .with_url(cli.url);
    let store = Arc::new(MetadataStore::connect(&config)?);
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Show { subject } => cmd_show(store, json_mode, subject).await,
        Commands::Classes { catalog } => cmd_classes(&store, json_mode, catalog).await,
        Commands::Entities { class } => cmd_entities(&store, json_mode, class.as_deref()).await,
        Commands::Resolve { path } => cmd_resolve(&store, json_mode, &path).await,
        Commands::Validate {
            subject,
            predicate,
            values,
            reference,
        } => cmd_validate(&store, json_mode, &subject, &predicate, &values, reference).await,
        Commands::Set {
            subject,
            predicate,
            values,
            reference,
        } => cmd_set(&store, json_mode, &subject, &predicate, &values, reference).await,
        Commands::Create { class, id } => {
            cmd_create(&store, json_mode, &class, id.as_deref()).await
        }
    }
}
