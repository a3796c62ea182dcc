//! Pipeline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Which file Artifact Delivery hands to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveredArtifact {
    /// The backend bundle in the final root.
    #[default]
    Bundle,
    /// The entry class file in the intermediate root.
    ClassFile,
}

/// Package and class-name prefixes applied when resolving library classes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemappingConfig {
    /// Package whose classes are remapped (e.g. `java`).
    pub package: String,

    /// Package prefix substituted in front of it.
    pub package_prefix: String,

    /// Prefix prepended to the simple class name.
    pub class_prefix: String,
}

impl Default for RemappingConfig {
    fn default() -> Self {
        Self {
            package: "java".to_string(),
            package_prefix: "org.teavm.classlib".to_string(),
            class_prefix: "T".to_string(),
        }
    }
}

/// External program settings for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Explicit program path. When unset the default name is looked up in PATH.
    pub program: Option<PathBuf>,

    /// Additional arguments passed before the inputs.
    pub extra_args: Vec<String>,
}

/// Configuration for a pipeline instance. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding the namespace roots.
    pub base_dir: PathBuf,

    /// Bundled runtime archive shipped with the application.
    pub runtime_archive: PathBuf,

    /// URL of the backend class library archive.
    pub library_url: String,

    /// Seconds before the library fetch is abandoned.
    pub fetch_timeout_secs: u64,

    /// Fixed name of the source unit inside the input root.
    pub source_file_name: String,

    /// Extension of files handed to the front-end compiler.
    pub source_extension: String,

    /// Class that declares `main(String[])`.
    pub entry_class: String,

    /// Name of the bundle produced in the final root.
    pub output_file_name: String,

    /// Compile against the provisioned runtime root instead of the
    /// compiler's own platform classes. Off by default; when on, the
    /// compiler also targets release 8, the newest level that accepts a
    /// replacement boot class path.
    pub runtime_boot_class_path: bool,

    pub deliver: DeliveredArtifact,
    pub remapping: RemappingConfig,
    pub compiler: ToolConfig,
    pub engine: ToolConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            runtime_archive: PathBuf::from("runtime.zip"),
            library_url: String::new(),
            fetch_timeout_secs: 30,
            source_file_name: "Hello.java".to_string(),
            source_extension: "java".to_string(),
            entry_class: "Hello".to_string(),
            output_file_name: "classes.js".to_string(),
            runtime_boot_class_path: false,
            deliver: DeliveredArtifact::default(),
            remapping: RemappingConfig::default(),
            compiler: ToolConfig::default(),
            engine: ToolConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Config rooted at `base_dir`, everything else default.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Check values that have no usable default.
    pub fn validate(&self) -> Result<()> {
        if self.library_url.trim().is_empty() {
            return Err(Error::Config("library_url is not set".to_string()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::Config("fetch_timeout_secs must be positive".to_string()));
        }
        if self.entry_class.trim().is_empty() {
            return Err(Error::Config("entry_class is not set".to_string()));
        }
        Ok(())
    }
}

fn default_base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tandem")
        .join("fs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_file_name, "Hello.java");
        assert_eq!(config.entry_class, "Hello");
        assert_eq!(config.output_file_name, "classes.js");
        assert_eq!(config.deliver, DeliveredArtifact::Bundle);
        assert!(!config.runtime_boot_class_path);
        assert_eq!(config.remapping.class_prefix, "T");
        assert!(config.base_dir.ends_with("tandem/fs") || config.base_dir.ends_with("tandem\\fs"));
    }

    #[test]
    fn test_default_requires_library_url() {
        let err = PipelineConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tandem.json");
        std::fs::write(
            &path,
            r#"{
                "library_url": "http://localhost:8000/classlib.zip",
                "deliver": "class_file",
                "compiler": { "program": "/opt/jdk/bin/javac", "extra_args": ["-g"] }
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).expect("config should parse");
        assert_eq!(config.library_url, "http://localhost:8000/classlib.zip");
        assert_eq!(config.deliver, DeliveredArtifact::ClassFile);
        assert_eq!(config.compiler.program, Some(PathBuf::from("/opt/jdk/bin/javac")));
        assert_eq!(config.compiler.extra_args, vec!["-g".to_string()]);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_misspelled_key_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tandem.json");
        std::fs::write(&path, r#"{ "libary_url": "http://localhost:8000/classlib.zip" }"#).unwrap();

        let err = PipelineConfig::from_file(&path).unwrap_err();
        let Error::Config(message) = &err else {
            panic!("expected config error, got {err:?}");
        };
        assert!(message.contains("libary_url"), "{message}");

        std::fs::write(&path, r#"{ "compiler": { "programm": "javac" } }"#).unwrap();
        assert!(matches!(PipelineConfig::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tandem.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
