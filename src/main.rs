use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use glean_lab_client::cli::{self, CommonArgs};

#[derive(Parser)]
#[command(name = "glean-lab")]
#[command(about = "Search and index documents through the Glean REST APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which API keys are loaded and where from
    Keys,
    /// Run a search query with the client token
    Search {
        /// Search query
        query: String,
        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value = "10")]
        page_size: u32,
        /// Restrict results to one datasource
        #[arg(short, long)]
        datasource: Option<String>,
    },
    /// Upload a JSON array of documents with the indexing token
    Index {
        /// Path to the documents file
        #[arg(short, long)]
        file: String,
        /// Target datasource (defaults to GLEAN_DATASOURCE)
        #[arg(short, long)]
        datasource: Option<String>,
        /// Object type for documents that do not set one
        #[arg(long)]
        object_type: Option<String>,
    },
    /// Show indexing status for a datasource or a single document
    Status {
        /// Datasource to inspect (defaults to GLEAN_DATASOURCE)
        #[arg(short, long)]
        datasource: Option<String>,
        /// Document id; omit for datasource-wide status
        #[arg(long)]
        document_id: Option<String>,
        /// Object type of the document
        #[arg(long)]
        object_type: Option<String>,
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.common.verbose);
    info!("Starting glean-lab");

    match cli.command {
        Commands::Keys => {
            cli::commands::keys(&cli.common).context("failed to load API keys")?;
        }
        Commands::Search {
            query,
            page_size,
            datasource,
        } => {
            cli::commands::search(&cli.common, query, page_size, datasource)
                .await
                .context("search failed")?;
        }
        Commands::Index {
            file,
            datasource,
            object_type,
        } => {
            cli::commands::index(&cli.common, file, datasource, object_type)
                .await
                .context("document upload failed")?;
        }
        Commands::Status {
            datasource,
            document_id,
            object_type,
            format,
        } => {
            cli::commands::status(&cli.common, datasource, document_id, object_type, format)
                .await
                .context("status check failed")?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    env_logger::Builder::new()
        .parse_filters(get_log_level(verbose))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .format_module_path(false)
        .init();
}

fn get_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}
