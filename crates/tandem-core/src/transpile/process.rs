//! Backend engine run as an external program driven by a JSON manifest.
//!
//! The engine reads everything it needs from the manifest and reports
//! problems one per line. Lines that are JSON objects of the shape
//! `{"severity": "error", "message": "...", "location": {...}}` become
//! diagnostics. A JSON object of any other shape is an error, a line that
//! opens like one but is not JSON is a warning, and plain text is `info`.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::config::ToolConfig;
use crate::diagnostics::{Diagnostic, Origin, Severity, SourceLocation};
use crate::error::{Error, Result};
use crate::process::output_merged;

use super::class_source::DirectoryClassSource;
use super::entry::ArrayArgument;
use super::engine::{BackendEngine, BuildRequest};
use super::plugin::PluginDescriptor;

/// Manifest file name inside the work directory.
pub const MANIFEST_FILE: &str = "build-manifest.json";

#[derive(Debug, Serialize)]
struct BuildManifest<'a> {
    class_path: &'a [DirectoryClassSource],
    plugins: Vec<PluginDescriptor>,
    entry_point: EntryManifest<'a>,
    output_dir: &'a Path,
    output_file: &'a str,
}

#[derive(Debug, Serialize)]
struct EntryManifest<'a> {
    name: &'a str,
    class_name: &'a str,
    method_name: &'a str,
    descriptor: String,
    arguments: &'a [ArrayArgument],
}

impl<'a> BuildManifest<'a> {
    fn new(request: &BuildRequest<'a>) -> Self {
        let entry = request.entry_point;
        let class_source = request.class_source;
        Self {
            class_path: class_source.sources(),
            plugins: request.plugins.descriptors(),
            entry_point: EntryManifest {
                name: &entry.name,
                class_name: &entry.method.class_name,
                method_name: &entry.method.method_name,
                descriptor: entry.method.descriptor(),
                arguments: &entry.arguments,
            },
            output_dir: request.output_dir,
            output_file: request.output_file,
        }
    }
}

/// One structured line of engine output.
#[derive(Debug, Deserialize)]
struct EngineMessage {
    severity: Severity,
    message: String,
    #[serde(default)]
    location: Option<SourceLocation>,
}

/// Invokes a manifest-driven backend engine binary.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: PathBuf,
    extra_args: Vec<String>,
    work_dir: PathBuf,
}

impl ProcessEngine {
    pub const DEFAULT_PROGRAM: &'static str = "teavm";

    /// Create an engine from config. The manifest is written into `work_dir`.
    pub fn new(config: &ToolConfig, work_dir: impl Into<PathBuf>) -> Result<Self> {
        let program = match &config.program {
            Some(program) => program.clone(),
            None => which::which(Self::DEFAULT_PROGRAM).map_err(|_| {
                Error::Toolchain(format!("{} not found in PATH", Self::DEFAULT_PROGRAM))
            })?,
        };

        tracing::debug!("Backend engine: {}", program.display());

        Ok(Self {
            program,
            extra_args: config.extra_args.clone(),
            work_dir: work_dir.into(),
        })
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.join(MANIFEST_FILE)
    }

    fn write_manifest(&self, request: &BuildRequest<'_>) -> Result<PathBuf> {
        crate::paths::ensure_dir(&self.work_dir)?;
        let path = self.manifest_path();
        let json = serde_json::to_vec_pretty(&BuildManifest::new(request))
            .map_err(|e| Error::Toolchain(format!("failed to encode build manifest: {e}")))?;
        std::fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }
}

impl BackendEngine for ProcessEngine {
    fn build(&self, request: &BuildRequest<'_>) -> Result<Vec<Diagnostic>> {
        let manifest = self.write_manifest(request)?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("--manifest").arg(&manifest).args(&self.extra_args);
        let output = output_merged(cmd).map_err(|e| {
            Error::Toolchain(format!("failed to run {}: {}", self.program.display(), e))
        })?;

        let mut diagnostics = parse_engine_output(&output.text);
        if !output.status.success() && !diagnostics.iter().any(Diagnostic::is_error) {
            diagnostics.push(Diagnostic::error(
                Origin::Transpile,
                format!("{} exited with {}", self.program.display(), output.status),
            ));
        }
        Ok(diagnostics)
    }
}

/// Parse engine output lines into transpile diagnostics.
pub fn parse_engine_output(text: &str) -> Vec<Diagnostic> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_engine_line)
        .collect()
}

fn parse_engine_line(line: &str) -> Diagnostic {
    if !line.starts_with('{') {
        return Diagnostic::info(Origin::Transpile, line);
    }

    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(value) => match serde_json::from_value::<EngineMessage>(value) {
            Ok(msg) => Diagnostic {
                severity: msg.severity,
                origin: Origin::Transpile,
                message: msg.message,
                location: msg.location,
                detail: None,
            },
            Err(e) => {
                let mut diagnostic = Diagnostic::error(
                    Origin::Transpile,
                    format!("unrecognized engine message: {e}"),
                );
                diagnostic.detail = Some(line.to_string());
                diagnostic
            }
        },
        Err(_) => Diagnostic::warning(Origin::Transpile, line),
    }
}
