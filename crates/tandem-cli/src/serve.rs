//! Serve command implementation for tandem CLI.

use std::sync::Arc;

use tandem_core::{Pipeline, PipelineConfig};
use tandem_server::ServerConfig;

use crate::colors;

/// Start the compile server.
pub async fn execute(config: PipelineConfig, host: String, port: u16) -> anyhow::Result<()> {
    let library_url = config.library_url.clone();
    let pipeline = Arc::new(Pipeline::from_config(config)?);

    println!(
        "\n{}Tandem Server{} - Two-stage compile pipeline",
        colors::BOLD,
        colors::RESET
    );
    println!("{}", "─".repeat(50));

    println!(
        "{}  ◆ Roots:{} {}",
        colors::CYAN,
        colors::RESET,
        pipeline.roots().base_dir.display()
    );
    println!("{}  ◆ Library:{} {}", colors::CYAN, colors::RESET, library_url);

    let server = ServerConfig { host, port };

    println!(
        "{}  ◆ Server:{} http://{}:{}",
        colors::CYAN,
        colors::RESET,
        server.host,
        server.port
    );
    println!("{}", "─".repeat(50));
    println!("{}Press Ctrl+C to stop{}", colors::GREEN, colors::RESET);
    println!();

    tandem_server::serve(pipeline, server).await?;

    Ok(())
}
