//! Transpilation stage: intermediate class files → browser module.
//!
//! Classes are resolved through a [`CompositeClassSource`] made of the
//! intermediate root followed by the remapped library root. The engine gets
//! the standard [`PluginSet`] and exactly one [`EntryPoint`]. Success is
//! decided here, by scanning the engine's diagnostics for errors.

mod class_source;
mod engine;
mod entry;
mod plugin;
mod process;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::diagnostics::{Diagnostic, Origin, StageOutcome};
use crate::error::Result;
use crate::paths::ensure_dir;

pub use class_source::{
    ClassSource, CompositeClassSource, DirectoryClassSource, NameRemapping, class_file_path,
};
pub use engine::{BackendEngine, BuildRequest};
pub use entry::{ArrayArgument, EntryPoint, MethodReference, ValueType};
pub use plugin::{
    CapabilityPlugin, InteropBindingPlugin, PlatformApiPlugin, PluginDescriptor, PluginSet,
    RuntimeLibraryPlugin,
};
pub use process::{MANIFEST_FILE, ProcessEngine, parse_engine_output};

pub struct TranspilationStage {
    engine: Box<dyn BackendEngine>,
    plugins: PluginSet,
    remapping: NameRemapping,
    output_file: String,
    invocations: AtomicUsize,
}

impl TranspilationStage {
    pub fn new(
        engine: Box<dyn BackendEngine>,
        plugins: PluginSet,
        remapping: NameRemapping,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            plugins,
            remapping,
            output_file: output_file.into(),
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    /// Number of engine builds triggered.
    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// The class view the engine builds against.
    pub fn class_source(&self, intermediate_root: &Path, library_root: &Path) -> CompositeClassSource {
        CompositeClassSource::new(vec![
            DirectoryClassSource::new(intermediate_root),
            DirectoryClassSource::remapped(library_root, self.remapping.clone()),
        ])
    }

    /// Build `entry_point` into `final_root/<output_file>`.
    pub fn transpile(
        &self,
        intermediate_root: &Path,
        library_root: &Path,
        final_root: &Path,
        entry_point: &EntryPoint,
    ) -> Result<StageOutcome> {
        let class_source = self.class_source(intermediate_root, library_root);

        if class_source.locate(entry_point.class_name()).is_none() {
            tracing::info!("Entry class {} not found, skipping build", entry_point.class_name());
            return Ok(StageOutcome {
                success: false,
                diagnostics: vec![Diagnostic::error(
                    Origin::Transpile,
                    format!(
                        "entry class {} not found in {}",
                        entry_point.class_name(),
                        intermediate_root.display()
                    ),
                )],
            });
        }

        ensure_dir(final_root)?;

        let request = BuildRequest {
            class_source: &class_source,
            plugins: &self.plugins,
            entry_point,
            output_dir: final_root,
            output_file: &self.output_file,
        };

        self.invocations.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            "Transpiling {} into {}",
            entry_point.method,
            request.output_path().display()
        );

        let mut diagnostics = match self.engine.build(&request) {
            Ok(diagnostics) => diagnostics,
            Err(err) => vec![Diagnostic::error(Origin::Transpile, err.to_string())],
        };
        for diagnostic in &mut diagnostics {
            diagnostic.origin = Origin::Transpile;
        }

        let success = !diagnostics.iter().any(Diagnostic::is_error);
        tracing::info!(
            "Transpilation {} ({} diagnostics)",
            if success { "succeeded" } else { "failed" },
            diagnostics.len()
        );

        Ok(StageOutcome {
            success,
            diagnostics,
        })
    }
}
