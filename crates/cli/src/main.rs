//! Strata CLI — the main entry point.
//!
//! Commands:
//! - `gateway`   — Start the HTTP API server
//! - `layers`    — Show a user's memory layers
//! - `context`   — Print a user's assembled context block
//! - `put-layer` — Overwrite a layer directly (no LLM)
//! - `promote`   — Merge a fact into a longer-lived layer

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Strata — tiered memory for conversational assistants",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show a user's memory layers
    Layers {
        /// The user to inspect
        user_id: String,
    },

    /// Print a user's assembled context block
    Context {
        /// The user to assemble context for
        user_id: String,
    },

    /// Overwrite a layer directly, bypassing the merge engine
    PutLayer {
        /// The user to edit
        user_id: String,
        /// Layer number (2-5)
        layer: u8,
        /// The replacement text
        content: String,
    },

    /// Merge a fact into a layer via the summarization service
    Promote {
        /// The user to edit
        user_id: String,
        /// The fact to merge
        fact: String,
        /// Target layer number (3-5)
        layer: u8,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Layers { user_id } => commands::layers::run(&user_id).await?,
        Commands::Context { user_id } => commands::context::run(&user_id).await?,
        Commands::PutLayer {
            user_id,
            layer,
            content,
        } => commands::put_layer::run(&user_id, layer, content).await?,
        Commands::Promote {
            user_id,
            fact,
            layer,
        } => commands::promote::run(&user_id, &fact, layer).await?,
    }

    Ok(())
}
