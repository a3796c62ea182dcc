//! Tandem core: a two-stage compile pipeline.
//!
//! Submitted source text is compiled by an external front-end compiler into
//! class files, which an external backend engine then transpiles into a
//! single browser-executable module. Both stages read and write through a
//! fixed set of [`NamespaceRoots`]; the runtime and library class trees they
//! depend on are provisioned from zip archives before the first run.
//!
//! ```text
//! Provisioner ─► ingest ─► CompilationStage ─► TranspilationStage ─► deliver
//!                                 │                    │
//!                                 └──── aggregate ◄────┘
//! ```
//!
//! [`Pipeline`] drives one run at a time and returns a [`PipelineResult`]
//! carrying the merged diagnostics and, on success, the delivered
//! [`Artifact`].

pub mod compile;
pub mod config;
pub mod deliver;
pub mod diagnostics;
pub mod error;
pub mod ingest;
pub mod paths;
pub mod pipeline;
mod process;
pub mod provision;
pub mod transpile;

pub use compile::{CompilationStage, FrontendCompiler, ProcessCompiler};
pub use config::{DeliveredArtifact, PipelineConfig};
pub use deliver::{Artifact, deliver};
pub use diagnostics::{Aggregate, Diagnostic, Origin, Severity, StageOutcome, aggregate};
pub use error::{Error, Result};
pub use ingest::ingest;
pub use paths::{NamespaceRoots, RootKind};
pub use pipeline::{Pipeline, PipelineResult, PipelineState};
pub use provision::{ArchiveFetcher, HttpFetcher, Provisioner, RuntimeArchive};
pub use transpile::{BackendEngine, EntryPoint, PluginSet, ProcessEngine, TranspilationStage};
