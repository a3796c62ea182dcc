//! Compile command implementation for tandem CLI.
//!
//! Runs the full pipeline on a source file and writes the delivered
//! artifact next to the caller.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use tandem_core::{Origin, Pipeline, PipelineConfig, Severity};

use crate::colors;

/// Compile `source_path` and write the artifact to `output` (or to the
/// artifact's own file name in the working directory).
pub async fn execute(
    config: PipelineConfig,
    source_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let start = Instant::now();

    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file {}", source_path.display()))?;

    let pipeline = Pipeline::from_config(config)?;

    println!(
        "\n{}Compiling{} {}",
        colors::BOLD,
        colors::RESET,
        source_path.display()
    );

    let result = pipeline.run(&source).await?;

    for diagnostic in &result.diagnostics {
        if diagnostic.severity > Severity::Info || tracing::enabled!(tracing::Level::DEBUG) {
            eprint!("{}", diagnostic.format_terminal());
        }
    }

    let warnings = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if warnings > 0 {
        println!("{}{} warning(s){}", colors::YELLOW, warnings, colors::RESET);
    }
    if !result.success {
        println!(
            "{}Failed{} at {} with {} error(s)",
            colors::RED,
            colors::RESET,
            if result.diagnostics.iter().any(|d| d.is_error() && d.origin == Origin::Transpile) {
                "transpilation"
            } else {
                "compilation"
            },
            result.error_count()
        );
    }

    let artifact = result.into_artifact()?;
    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    std::fs::write(&target, &artifact.bytes)
        .with_context(|| format!("failed to write {}", target.display()))?;

    println!(
        "{}Wrote{} {} ({} bytes) in {:.2}s",
        colors::GREEN,
        colors::RESET,
        target.display(),
        artifact.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
