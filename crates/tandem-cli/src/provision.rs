//! Provision command: fill the runtime and library roots ahead of time.

use tandem_core::{Pipeline, PipelineConfig, RootKind};

use crate::colors;

pub async fn execute(config: PipelineConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    pipeline.provision().await?;

    println!("\n{}Provisioned{}", colors::GREEN, colors::RESET);
    for kind in RootKind::ALL {
        println!(
            "{}  ◆ {}:{} {}",
            colors::CYAN,
            kind.dir_name(),
            colors::RESET,
            pipeline.roots().get(kind).display()
        );
    }

    Ok(())
}
