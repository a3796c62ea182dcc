use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::error::Result;

use super::class_source::CompositeClassSource;
use super::entry::EntryPoint;
use super::plugin::PluginSet;

/// Inputs of a single backend build.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub class_source: &'a CompositeClassSource,
    pub plugins: &'a PluginSet,
    pub entry_point: &'a EntryPoint,
    pub output_dir: &'a Path,
    pub output_file: &'a str,
}

impl BuildRequest<'_> {
    pub fn output_path(&self) -> std::path::PathBuf {
        self.output_dir.join(self.output_file)
    }
}

/// An external class file → browser module transpiler.
///
/// The engine reports only diagnostics. Whether the build succeeded is
/// decided by the caller from their severities.
pub trait BackendEngine: Send + Sync {
    fn build(&self, request: &BuildRequest<'_>) -> Result<Vec<Diagnostic>>;
}
