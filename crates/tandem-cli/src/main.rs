//! Tandem CLI - compile source to a browser module through two external tools.

mod colors;
mod compile;
mod provision;
mod serve;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::Overrides;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Two-stage compile pipeline: source → class files → browser module")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON config file (default: ./tandem.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the namespace roots
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// URL of the backend class library archive
    #[arg(long, global = true)]
    library_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack the runtime and download the class library
    Provision,

    /// Compile a source file and write the artifact
    Compile {
        /// Path to the source file
        source: PathBuf,

        /// Output path (default: artifact name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the compile server
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format tandem errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<tandem_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else if let Some(tandem_server::ServerError::Core(core_err)) =
            err.downcast_ref::<tandem_server::ServerError>()
        {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    let overrides = Overrides {
        base_dir: cli.base_dir,
        library_url: cli.library_url,
    };
    let config = settings::load(cli.config.as_deref(), overrides).map_err(format_error)?;

    match cli.command {
        Commands::Provision => provision::execute(config).await.map_err(format_error)?,

        Commands::Compile { source, output } => {
            compile::execute(config, &source, output.as_deref())
                .await
                .map_err(format_error)?;
        }

        Commands::Serve { host, port } => {
            serve::execute(config, host, port).await.map_err(format_error)?;
        }
    }

    Ok(())
}
