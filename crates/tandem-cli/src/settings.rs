//! Pipeline configuration as seen from the command line.

use std::path::{Path, PathBuf};

use tandem_core::PipelineConfig;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tandem.json";

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub library_url: Option<String>,
}

/// Load the pipeline config: explicit file, else `./tandem.json`, else
/// defaults; then apply command-line overrides.
pub fn load(config_path: Option<&Path>, overrides: Overrides) -> anyhow::Result<PipelineConfig> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
            PipelineConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => PipelineConfig::default(),
    };

    if let Some(base_dir) = overrides.base_dir {
        config.base_dir = base_dir;
    }
    if let Some(url) = overrides.library_url {
        config.library_url = url;
    }

    Ok(config)
}
