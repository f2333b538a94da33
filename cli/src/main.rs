mod extract;
mod parse;
mod retrieve;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use retrieve::RetrieveArgs;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Larder recipe engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by recipe name
    Search {
        /// Free-text query
        term: String,
        #[command(flatten)]
        args: RetrieveArgs,
    },
    /// Browse recipes sampled across catalog categories
    Discover {
        #[command(flatten)]
        args: RetrieveArgs,
        /// Seed for the category shuffle (reproducible pages)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Browse random recipes
    Random {
        #[command(flatten)]
        args: RetrieveArgs,
    },
    /// Extract a recipe from a chat reply (reads stdin when no file is given)
    Extract {
        file: Option<PathBuf>,
        /// Timestamp of the chat message, RFC 3339 (default: now)
        #[arg(long)]
        sent_at: Option<DateTime<Utc>>,
    },
    /// Parse one ingredient line, or a name plus a separate measure
    ParseIngredient {
        line: String,
        /// Measure text; when given, LINE is the ingredient name
        #[arg(long)]
        measure: Option<String>,
    },
    /// Split instructions into timed steps (reads stdin when no file is given)
    Segment { file: Option<PathBuf> },
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Cancel the token on Ctrl-C so a running retrieval returns what it has.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, returning results gathered so far");
            token.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { term, args } => {
            retrieve::search(&term, args, cancel_on_interrupt()).await?;
        }
        Commands::Discover { args, seed } => {
            retrieve::discover(args, seed, cancel_on_interrupt()).await?;
        }
        Commands::Random { args } => {
            retrieve::random(args, cancel_on_interrupt()).await?;
        }
        Commands::Extract { file, sent_at } => {
            extract::extract(file.as_deref(), sent_at.unwrap_or_else(Utc::now))?;
        }
        Commands::ParseIngredient { line, measure } => {
            parse::parse_ingredient(&line, measure.as_deref())?;
        }
        Commands::Segment { file } => {
            parse::segment(file.as_deref())?;
        }
    }

    Ok(())
}
