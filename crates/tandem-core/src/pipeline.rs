//! Pipeline orchestration.
//!
//! A run walks `Start → Provisioned → SourceReady → Compiled → Transpiled →
//! Delivered`, dropping to `Failed` when a stage reports errors. Runs share
//! the namespace roots and are serialized by a single gate.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::compile::CompilationStage;
use crate::config::{DeliveredArtifact, PipelineConfig};
use crate::deliver::Artifact;
use crate::diagnostics::{Diagnostic, Origin, aggregate};
use crate::error::{Error, Result};
use crate::ingest::ingest;
use crate::paths::{NamespaceRoots, RootKind, clear_dir};
use crate::provision::{HttpFetcher, Provisioner, RuntimeArchive};
use crate::transpile::{
    EntryPoint, NameRemapping, PluginSet, ProcessEngine, TranspilationStage, class_file_path,
};

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Provisioned,
    SourceReady,
    Compiled,
    Transpiled,
    Delivered,
    Failed,
}

impl PipelineState {
    /// The state a successful step leads to.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Provisioned),
            Self::Provisioned => Some(Self::SourceReady),
            Self::SourceReady => Some(Self::Compiled),
            Self::Compiled => Some(Self::Transpiled),
            Self::Transpiled => Some(Self::Delivered),
            Self::Delivered | Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }

    pub fn can_transition_to(self, to: Self) -> bool {
        if to == Self::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Provisioned => "provisioned",
            Self::SourceReady => "source_ready",
            Self::Compiled => "compiled",
            Self::Transpiled => "transpiled",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub success: bool,

    /// Compile diagnostics, then transpile diagnostics, each in emission order
    pub diagnostics: Vec<Diagnostic>,

    /// Present exactly when the run was delivered
    pub artifact: Option<Artifact>,

    pub state: PipelineState,
}

impl PipelineResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Take the artifact, or turn a failed run into the matching error.
    pub fn into_artifact(mut self) -> Result<Artifact> {
        if let (true, Some(artifact)) = (self.success, self.artifact.take()) {
            return Ok(artifact);
        }

        let errors = self.error_count();
        let transpile_failed = self
            .diagnostics
            .iter()
            .any(|d| d.is_error() && d.origin == Origin::Transpile);
        if transpile_failed {
            Err(Error::Transpile { errors })
        } else {
            Err(Error::Compile { errors })
        }
    }
}

/// State shared by runs, guarded by the gate.
#[derive(Debug, Default)]
struct RunState {
    provisioned: bool,
}

/// Exclusive hold on the namespace roots for one run.
type RunGuard = OwnedMutexGuard<RunState>;

/// Tracks the state of a single run.
struct Progress {
    state: PipelineState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: PipelineState::Start,
        }
    }

    fn advance(&mut self, to: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "invalid transition {} -> {}",
            self.state,
            to
        );
        tracing::debug!("Pipeline state {} -> {}", self.state, to);
        self.state = to;
    }
}

/// The two-stage compile pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    roots: NamespaceRoots,
    provisioner: Provisioner,
    compiler: Arc<CompilationStage>,
    transpiler: Arc<TranspilationStage>,
    gate: Arc<Mutex<RunState>>,
}

impl Pipeline {
    /// Assemble a pipeline from its components. Creates the namespace roots
    /// under `config.base_dir`.
    pub fn new(
        config: PipelineConfig,
        provisioner: Provisioner,
        compiler: CompilationStage,
        transpiler: TranspilationStage,
    ) -> Result<Self> {
        let roots = NamespaceRoots::create(&config.base_dir)?;
        Ok(Self {
            config,
            roots,
            provisioner,
            compiler: Arc::new(compiler),
            transpiler: Arc::new(transpiler),
            gate: Arc::new(Mutex::new(RunState::default())),
        })
    }

    /// Pipeline driving external tools: `javac`-style compiler, manifest
    /// driven engine, HTTP library fetch.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        let provisioner = Provisioner::new(
            RuntimeArchive::File(config.runtime_archive.clone()),
            Arc::new(fetcher),
            config.fetch_timeout(),
        );

        let compiler = CompilationStage::from_config(&config)?;
        let engine = ProcessEngine::new(&config.engine, config.base_dir.join("work"))?;
        let transpiler = TranspilationStage::new(
            Box::new(engine),
            PluginSet::standard()?,
            NameRemapping::from(&config.remapping),
            config.output_file_name.clone(),
        );

        Self::new(config, provisioner, compiler, transpiler)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn roots(&self) -> &NamespaceRoots {
        &self.roots
    }

    pub fn compilation(&self) -> &CompilationStage {
        &self.compiler
    }

    pub fn transpilation(&self) -> &TranspilationStage {
        &self.transpiler
    }

    /// Provision both roots now instead of on the first run.
    pub async fn provision(&self) -> Result<()> {
        let mut state = self.gate.lock().await;
        self.ensure_provisioned(&mut state).await
    }

    /// Run the pipeline on `source`, waiting for any run in progress.
    pub async fn run(&self, source: &str) -> Result<PipelineResult> {
        let guard = Arc::clone(&self.gate).lock_owned().await;
        self.run_locked(guard, source).await
    }

    /// Run the pipeline on `source`, failing with [`Error::RunInProgress`]
    /// if another run holds the roots.
    pub async fn try_run(&self, source: &str) -> Result<PipelineResult> {
        let guard = Arc::clone(&self.gate)
            .try_lock_owned()
            .map_err(|_| Error::RunInProgress)?;
        self.run_locked(guard, source).await
    }

    async fn ensure_provisioned(&self, state: &mut RunState) -> Result<()> {
        if state.provisioned {
            return Ok(());
        }
        self.provisioner.provision_runtime(&self.roots)?;
        self.provisioner
            .provision_library(&self.roots, &self.config.library_url)
            .await?;
        state.provisioned = true;
        Ok(())
    }

    async fn run_locked(&self, mut guard: RunGuard, source: &str) -> Result<PipelineResult> {
        let mut progress = Progress::new();
        tracing::info!("Pipeline run started");

        self.ensure_provisioned(&mut guard).await?;
        progress.advance(PipelineState::Provisioned);

        ingest(&self.roots, &self.config.source_file_name, source)?;
        // Outputs of an earlier run must not survive a failed one.
        clear_dir(self.roots.ensure(RootKind::Intermediate)?, None)?;
        clear_dir(self.roots.ensure(RootKind::Final)?, None)?;
        progress.advance(PipelineState::SourceReady);

        let compiler = Arc::clone(&self.compiler);
        let input = self.roots.input_dir.clone();
        let intermediate = self.roots.intermediate_dir.clone();
        let (guard, compiled) =
            on_blocking_pool(guard, move || compiler.compile(&input, &intermediate)).await?;
        if !compiled.success {
            let merged = aggregate(compiled, None);
            return Ok(self.failed(progress, merged.diagnostics));
        }
        progress.advance(PipelineState::Compiled);

        let transpiler = Arc::clone(&self.transpiler);
        let roots = self.roots.clone();
        let entry_point = EntryPoint::main(self.config.entry_class.as_str());
        let (_guard, transpiled) = on_blocking_pool(guard, move || {
            transpiler.transpile(
                &roots.intermediate_dir,
                &roots.library_dir,
                &roots.final_dir,
                &entry_point,
            )
        })
        .await?;
        let merged = aggregate(compiled, Some(transpiled));
        if !merged.success {
            return Ok(self.failed(progress, merged.diagnostics));
        }
        progress.advance(PipelineState::Transpiled);

        let artifact = Artifact::load(&self.artifact_path())?;
        progress.advance(PipelineState::Delivered);
        tracing::info!(
            "Pipeline delivered {} ({} bytes)",
            artifact.file_name,
            artifact.len()
        );

        Ok(PipelineResult {
            success: true,
            diagnostics: merged.diagnostics,
            artifact: Some(artifact),
            state: progress.state,
        })
    }

    fn failed(&self, mut progress: Progress, diagnostics: Vec<Diagnostic>) -> PipelineResult {
        let stage = progress.state;
        progress.advance(PipelineState::Failed);
        tracing::info!(
            "Pipeline failed after {} with {} error(s)",
            stage,
            diagnostics.iter().filter(|d| d.is_error()).count()
        );
        PipelineResult {
            success: false,
            diagnostics,
            artifact: None,
            state: progress.state,
        }
    }

    /// File handed to the host on success.
    pub fn artifact_path(&self) -> PathBuf {
        match self.config.deliver {
            DeliveredArtifact::Bundle => self.roots.final_dir.join(self.transpiler.output_file()),
            DeliveredArtifact::ClassFile => self
                .roots
                .intermediate_dir
                .join(class_file_path(&self.config.entry_class)),
        }
    }
}

/// Run a stage's synchronous tool invocation off the async runtime.
///
/// The task owns the gate until the tool exits, even if the caller stops
/// waiting for it.
async fn on_blocking_pool<T, F>(guard: RunGuard, task: F) -> Result<(RunGuard, T)>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (guard, result) = tokio::task::spawn_blocking(move || {
        let result = task();
        (guard, result)
    })
    .await
    .map_err(|e| Error::Toolchain(format!("stage task failed: {e}")))?;
    Ok((guard, result?))
}
