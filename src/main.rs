use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "Self-hosted package gallery")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config path)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the selected backends
    Check,
    /// Create or update the gallery database schema
    Migrate,
    /// Rebuild the local search index from the gallery database
    Reindex,
    /// Show package and download totals
    Stats,
    /// Send a test message through the configured mail transport
    MailTest {
        /// Recipient address
        #[arg(long)]
        to: String,
    },
    /// Manage secrets referenced from the configuration
    #[command(subcommand)]
    Secret(SecretCommands),
}

#[derive(Subcommand)]
enum SecretCommands {
    /// Store a secret in the OS keychain
    Set {
        /// Secret name, referenced as $$name$$ in gallery.yaml
        name: String,
    },
    /// Remove a secret from the OS keychain
    Delete {
        /// Secret name
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check => cli::check::run(cli.config),
        Commands::Migrate => cli::migrate::run(cli.config),
        Commands::Reindex => cli::reindex::run(cli.config).await,
        Commands::Stats => cli::stats::run(cli.config).await,
        Commands::MailTest { to } => cli::mail_test::run(cli.config, to).await,
        Commands::Secret(cmd) => match cmd {
            SecretCommands::Set { name } => cli::secret::set(name),
            SecretCommands::Delete { name } => cli::secret::delete(name),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
