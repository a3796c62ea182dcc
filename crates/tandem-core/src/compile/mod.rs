//! Compilation stage: source unit → intermediate class files.
//!
//! The front-end compiler itself is opaque. This stage finds the inputs,
//! prepares the output directory, invokes the compiler once and translates
//! its text stream into [`Diagnostic`]s tagged [`Origin::Compile`].

mod output;
mod process;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::diagnostics::{Diagnostic, Origin, StageOutcome};
use crate::error::{Error, Result};
use crate::paths::{RootKind, ensure_dir};

pub use output::parse_compiler_output;
pub use process::ProcessCompiler;

/// Flags the stage always passes to the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileFlag {
    Verbose,
    OutputDirectory(PathBuf),
}

impl CompileFlag {
    /// Command-line spelling of the flag.
    pub fn to_args(&self) -> Vec<OsString> {
        match self {
            Self::Verbose => vec!["-verbose".into()],
            Self::OutputDirectory(dir) => vec!["-d".into(), dir.clone().into_os_string()],
        }
    }
}

/// Everything a front-end compiler needs for one invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub sources: Vec<PathBuf>,
    pub flags: Vec<CompileFlag>,

    /// Class tree that replaces the compiler's own platform classes
    pub boot_class_path: Option<PathBuf>,
}

impl CompileRequest {
    /// Output directory named by the flags.
    pub fn output_dir(&self) -> Option<&Path> {
        self.flags.iter().find_map(|flag| match flag {
            CompileFlag::OutputDirectory(dir) => Some(dir.as_path()),
            CompileFlag::Verbose => None,
        })
    }
}

/// Raw result of a compiler invocation.
#[derive(Debug, Clone, Default)]
pub struct FrontendOutput {
    /// The compiler's own verdict
    pub success: bool,

    /// Progress and error text, in emission order
    pub output: String,
}

/// An external source → class file compiler.
pub trait FrontendCompiler: Send + Sync {
    /// Compile `request.sources`. `Err` means the compiler could not be run
    /// at all; rejected source is reported through `FrontendOutput`.
    fn compile(&self, request: &CompileRequest) -> Result<FrontendOutput>;
}

/// Runs the front-end compiler over the input root.
pub struct CompilationStage {
    compiler: Box<dyn FrontendCompiler>,
    source_extension: String,
    boot_class_path: Option<PathBuf>,
    invocations: AtomicUsize,
}

impl CompilationStage {
    pub fn new(compiler: Box<dyn FrontendCompiler>, source_extension: impl Into<String>) -> Self {
        Self {
            compiler,
            source_extension: source_extension.into(),
            boot_class_path: None,
            invocations: AtomicUsize::new(0),
        }
    }

    /// Stage driving the configured `javac`-style compiler.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let stage = Self::new(
            Box::new(ProcessCompiler::new(&config.compiler)?),
            config.source_extension.clone(),
        );
        if config.runtime_boot_class_path {
            return Ok(stage
                .with_boot_class_path(config.base_dir.join(RootKind::Runtime.dir_name())));
        }
        Ok(stage)
    }

    /// Compile against a provisioned runtime class tree.
    pub fn with_boot_class_path(mut self, path: PathBuf) -> Self {
        self.boot_class_path = Some(path);
        self
    }

    /// Number of times the compiler has been invoked.
    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Compile every source file under `input_root` into `intermediate_root`.
    ///
    /// Success requires both the compiler's verdict and the absence of any
    /// error diagnostic. No retries are attempted.
    pub fn compile(&self, input_root: &Path, intermediate_root: &Path) -> Result<StageOutcome> {
        let sources = self.collect_sources(input_root)?;
        if sources.is_empty() {
            return Ok(StageOutcome {
                success: false,
                diagnostics: vec![Diagnostic::error(
                    Origin::Compile,
                    format!(
                        "no .{} source files found in {}",
                        self.source_extension,
                        input_root.display()
                    ),
                )],
            });
        }

        ensure_dir(intermediate_root)?;

        let request = CompileRequest {
            sources,
            flags: vec![
                CompileFlag::Verbose,
                CompileFlag::OutputDirectory(intermediate_root.to_path_buf()),
            ],
            boot_class_path: self.boot_class_path.clone(),
        };

        self.invocations.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Compiling {} source file(s)", request.sources.len());

        let outcome = match self.compiler.compile(&request) {
            Ok(output) => {
                let diagnostics = parse_compiler_output(&output.output);
                let has_errors = diagnostics.iter().any(Diagnostic::is_error);
                if output.success && has_errors {
                    tracing::warn!("Compiler reported success but emitted errors");
                }
                StageOutcome {
                    success: output.success && !has_errors,
                    diagnostics,
                }
            }
            Err(err) => StageOutcome {
                success: false,
                diagnostics: vec![err.to_diagnostic()],
            },
        };

        tracing::info!(
            "Compilation {} ({} diagnostics)",
            if outcome.success { "succeeded" } else { "failed" },
            outcome.diagnostics.len()
        );

        Ok(outcome)
    }

    fn collect_sources(&self, input_root: &Path) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for entry in WalkDir::new(input_root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input_root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                Error::io(path, source)
            })?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == self.source_extension.as_str())
            {
                sources.push(path.to_path_buf());
            }
        }
        tracing::debug!("Found {} source file(s) under {}", sources.len(), input_root.display());
        Ok(sources)
    }
}
