//! # Mercury - Metadata Client
//!
//! Command-line access to the linked-data metadata of a Fairspace backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    apps/mercury (THE CLIENT)                │
//! │                                                             │
//! │  ┌─────────────┐    ┌───────────────┐    ┌──────────────┐  │
//! │  │    CLI      │───▶│ MetadataStore │───▶│ MetadataApi  │  │
//! │  │   (clap)    │    │ (fetch cache) │    │  (reqwest)   │  │
//! │  └─────────────┘    └───────┬───────┘    └──────────────┘  │
//! │                             ▼                               │
//! │                     ┌───────────────┐                       │
//! │                     │ mercury-core  │                       │
//! │                     │  (THE LOGIC)  │                       │
//! │                     └───────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! mercury --url http://localhost:8080 show http://localhost:8080/iri/collections/1
//! mercury classes --catalog
//! mercury set http://localhost:8080/iri/collections/1 http://www.w3.org/2000/01/rdf-schema#label "New name"
//! mercury create http://fairspace.io/ontology#Collection --id 42
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // MERCURY_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MERCURY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mercury=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
