//! Packet Builder CLI
//!
//! Builds submittal packets from a JSON request and inspects the results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use packet_builder::pdf::read_metadata;
use packet_builder::{
    generate_packet, DocumentCatalog, DocumentType, Error, HttpFetcher, PacketConfig, PacketFailure,
    PacketRequest,
};

/// Packet Builder - Assemble submittal packets
#[derive(Parser)]
#[command(name = "packet-builder")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build the packet described by a request file
    packet-builder build request.json -o packet.pdf

    # Build from catalog entries instead of the request's document list
    packet-builder build request.json --catalog catalog.json --select roof-membrane,roof-warranty

    # Show page count and title of a finished packet
    packet-builder info OakStreet_Packet.pdf

    # List catalog entries grouped by category
    packet-builder categories --catalog catalog.json")]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a packet from a JSON request
    Build {
        /// Request file with projectData and documents
        request: PathBuf,

        /// Output PDF path (defaults to the packet's own filename)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration file
        #[arg(long, env = "PACKET_CONFIG")]
        config: Option<PathBuf>,

        /// Override the cover template location
        #[arg(long, env = "PACKET_TEMPLATE_URL")]
        template_url: Option<String>,

        /// Override the root for relative document locations
        #[arg(long, env = "PACKET_DOCUMENT_BASE_URL")]
        document_base_url: Option<String>,

        /// Document catalog (JSON) to select documents from
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Catalog ids to merge, in order; replaces the request's documents
        #[arg(long, value_delimiter = ',', requires = "catalog")]
        select: Vec<String>,
    },

    /// Show page count and title/author of a PDF
    Info {
        /// PDF file
        input: PathBuf,
    },

    /// List document categories, or a catalog grouped by category
    Categories {
        /// Document catalog (JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            request,
            output,
            config,
            template_url,
            document_base_url,
            catalog,
            select,
        } => {
            let overrides = Overrides {
                template_url,
                document_base_url,
            };
            let result = cmd_build(&request, output, config.as_deref(), overrides, catalog.as_deref(), &select).await;
            if let Err(e) = &result {
                println!("{}", failure_for(e).to_json());
            }
            result
        }
        Commands::Info { input } => cmd_info(&input),
        Commands::Categories { catalog } => cmd_categories(catalog.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("packet_builder={},lopdf=warn", default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Failure payload for an error out of `cmd_build`
fn failure_for(error: &anyhow::Error) -> PacketFailure {
    match error.downcast_ref::<Error>() {
        Some(e) => PacketFailure::from(e),
        None => PacketFailure {
            error: "packet_failed".to_string(),
            message: format!("{:#}", error),
        },
    }
}

struct Overrides {
    template_url: Option<String>,
    document_base_url: Option<String>,
}

async fn cmd_build(
    request_path: &Path,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
    overrides: Overrides,
    catalog_path: Option<&Path>,
    select: &[String],
) -> Result<()> {
    let mut config = PacketConfig::load(config_path).context("loading configuration")?;
    if let Some(url) = overrides.template_url {
        config.template_url = url;
    }
    if let Some(url) = overrides.document_base_url {
        config.document_base_url = url;
    }

    let json = std::fs::read_to_string(request_path)
        .with_context(|| format!("reading request {}", request_path.display()))?;
    let mut request = PacketRequest::from_json(&json)?;

    if let Some(path) = catalog_path {
        if !select.is_empty() {
            let catalog = DocumentCatalog::load(path)?;
            request.documents = catalog.resolve(select)?;
            info!("Selected {} documents from {}", request.documents.len(), path.display());
        }
    }

    let fetcher = HttpFetcher::new();
    let packet = generate_packet(&request, &fetcher, &config).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(&packet.filename));
    tokio::fs::write(&output, &packet.bytes)
        .await
        .map_err(|e| Error::Serialization(format!("{}: {}", output.display(), e)))?;

    eprintln!("Wrote {} pages to {}", packet.page_count, output.display());
    for outcome in packet.outcomes.iter().filter(|o| !o.status.is_merged()) {
        eprintln!("  {}: {:?}", outcome.name, outcome.status);
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<()> {
    let meta = read_metadata(input)?;

    println!("File:     {}", input.display());
    println!("Pages:    {}", meta.page_count);
    if let Some(title) = meta.title {
        println!("Title:    {}", title);
    }
    if let Some(author) = meta.author {
        println!("Author:   {}", author);
    }
    if let Some(producer) = meta.producer {
        println!("Producer: {}", producer);
    }
    Ok(())
}

fn cmd_categories(catalog_path: Option<&Path>) -> Result<()> {
    let Some(path) = catalog_path else {
        let mut types = DocumentType::ALL.to_vec();
        types.sort_by_key(|t| t.config().priority);
        for doc_type in types {
            let config = doc_type.config();
            println!("{:>2}  {:<26} {}", config.priority, config.label, config.icon);
        }
        return Ok(());
    };

    let catalog = DocumentCatalog::load(path)?;
    for (doc_type, docs) in catalog.by_category() {
        println!("{} ({})", doc_type.label(), docs.len());
        for doc in docs {
            println!("  {:<20} {:<32} {}", doc.id, doc.name, doc.url);
        }
    }
    Ok(())
}
