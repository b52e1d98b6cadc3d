//! bio-core: núcleo de orquestación de jobs multi-etapa
//!
//! Secuenciación lineal de etapas con participación condicional por
//! capacidades del handler, staging de archivos entre hosts con limpieza
//! garantizada, y registro idempotente de salidas en un catálogo durable
//! con log de proveniencia append-only.

pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod handler;
pub mod job;
pub mod model;
pub mod pipeline;
pub mod provenance;
pub mod registrar;
pub mod staging;

pub use config::StagingConfig;
pub use engine::JobEngine;
pub use errors::CoreError;
pub use handler::{Handler, HandlerCapabilities, HandlerRegistry};
pub use job::{Job, JobStatus};
pub use model::{ArtifactCategory, JobContext, OutputArtifact, RecordedAction};
pub use pipeline::{PipelineDefinition, PipelineRegistry, Stage, StageDescriptor, StageKind};
pub use provenance::ProvenanceLog;
pub use registrar::{Catalog, CatalogEntry, CommitFailure, CommitReport, InMemoryCatalog, OutputRegistrar};
pub use staging::{FileClass, FileManager, StagingArea, WorkDirectory};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // Handler sin fases: sólo declara capacidades de controller.
    struct ControllerOnly;
    impl Handler for ControllerOnly {
        fn id(&self) -> &str {
            "controller-only"
        }
        fn capabilities(&self) -> HandlerCapabilities {
            HandlerCapabilities::controller_only()
        }
    }

    #[test]
    fn skipped_stage_leaves_no_trace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let staging_root = dir.path().join("staging");

        let mut pipelines = PipelineRegistry::new();
        pipelines.register("smoke",
                           &[],
                           vec![StageDescriptor::process("worker_step", "processing")],
                           "Smoke")
                 .expect("register");
        let mut handlers = HandlerRegistry::new();
        handlers.register(Arc::new(ControllerOnly)).expect("register handler");

        let staging = StagingArea::new(&StagingConfig::with_root(&staging_root));
        let mut engine = JobEngine::new(pipelines, handlers, staging, InMemoryCatalog::new());

        let mut job = Job::new("smoke", "tests", dir.path().join("out")).with_handler("controller-only");
        engine.run(&mut job).expect("run");

        // la etapa worker se omitió: sin staging, sin acciones, job completo
        assert_eq!(job.status(), JobStatus::Complete);
        assert!(job.provenance().is_empty());
        assert!(!staging_root.join(job.id().to_string()).exists(),
                "no work directory may be acquired for a skipped stage");
    }
}
