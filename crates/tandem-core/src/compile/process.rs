//! Front-end compiler run as an external program.

use std::path::PathBuf;
use std::process::Command;

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::process::output_merged;

use super::{CompileRequest, FrontendCompiler, FrontendOutput};

/// Invokes a `javac`-compatible compiler binary.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    /// Path to the compiler executable
    program: PathBuf,

    /// Arguments placed after the fixed flags
    extra_args: Vec<String>,
}

impl ProcessCompiler {
    /// Program looked up in PATH when none is configured.
    pub const DEFAULT_PROGRAM: &'static str = "javac";

    /// Create a compiler from config, locating the program if needed.
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let program = match &config.program {
            Some(program) => program.clone(),
            None => which::which(Self::DEFAULT_PROGRAM).map_err(|_| {
                Error::Toolchain(format!("{} not found in PATH", Self::DEFAULT_PROGRAM))
            })?,
        };

        tracing::debug!("Front-end compiler: {}", program.display());

        Ok(Self {
            program,
            extra_args: config.extra_args.clone(),
        })
    }

    fn command(&self, request: &CompileRequest) -> Command {
        let mut cmd = Command::new(&self.program);

        for flag in &request.flags {
            cmd.args(flag.to_args());
        }

        // JDK 9+ only accepts a boot class path for pre-module targets.
        if let Some(boot) = &request.boot_class_path {
            cmd.args(["-source", "8", "-target", "8", "-bootclasspath"])
                .arg(boot);
        }

        cmd.args(&self.extra_args);
        cmd.args(&request.sources);
        cmd
    }
}

impl FrontendCompiler for ProcessCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<FrontendOutput> {
        let output = output_merged(self.command(request)).map_err(|e| {
            Error::Toolchain(format!("failed to run {}: {}", self.program.display(), e))
        })?;

        Ok(FrontendOutput {
            success: output.status.success(),
            output: output.text,
        })
    }
}
