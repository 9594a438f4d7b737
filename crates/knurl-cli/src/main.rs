//! Knurl CLI — send request descriptions from the terminal.
//!
//! Drives the same knurl-core pipeline the desktop UI uses: resolve
//! `{{variables}}` from an environment file, dispatch to the protocol
//! engine, print the validated response.

use clap::{Parser, Subcommand};

use knurl_cli::commands;
use knurl_cli::commands::send::SendOptions;

/// Knurl — API request runner
#[derive(Parser)]
#[command(name = "knurl", version, about = "Knurl — resolve and send API requests")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve variables and send a request
    Send {
        /// Path to the request file (YAML or JSON)
        request: String,
        /// Path to the environment file
        #[arg(long, short = 'e')]
        env: Option<String>,
        /// Path to an engine config file
        #[arg(long, env = "KNURL_CONFIG")]
        config: Option<String>,
        /// HTTP timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
        /// Print the full response as JSON
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Print a request with its variables resolved, without sending it
    Resolve {
        /// Path to the request file (YAML or JSON)
        request: String,
        /// Path to the environment file
        #[arg(long, short = 'e')]
        env: Option<String>,
    },

    /// Validate a saved response file against the response contract
    CheckResponse {
        /// Path to the response file (JSON)
        file: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knurl_core=warn,knurl_cli=info".into()),
        )
        .init();

    let result = match cli.command {
        Commands::Send {
            request,
            env,
            config,
            timeout,
            verbose,
        } => {
            let options = SendOptions {
                env_file: env,
                config_file: config,
                timeout_secs: timeout,
            };
            commands::send::run(&request, &options, verbose).await
        }
        Commands::Resolve { request, env } => commands::resolve::run(&request, env.as_deref()),
        Commands::CheckResponse { file } => commands::check::run(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
