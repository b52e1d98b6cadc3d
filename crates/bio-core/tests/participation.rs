//! Participación condicional: un mismo `PipelineDefinition` sirve a
//! handlers con perfiles de capacidad distintos, sin ramificar la
//! definición.

use std::sync::Arc;

use bio_core::{CoreError, Handler, HandlerCapabilities, HandlerRegistry, InMemoryCatalog, Job, JobContext,
               JobEngine, JobStatus, PipelineRegistry, RecordedAction, StageDescriptor, StagingArea, StagingConfig};

struct ImportHandler {
    id: &'static str,
    caps: HandlerCapabilities,
}

impl Handler for ImportHandler {
    fn id(&self) -> &str {
        self.id
    }

    fn capabilities(&self) -> HandlerCapabilities {
        self.caps
    }

    fn init(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        ctx.record(RecordedAction::new("validate_inputs"));
        Ok(())
    }

    fn process(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        ctx.record(RecordedAction::new("worker_process"));
        Ok(())
    }
}

fn engine_with_handlers(staging_root: &std::path::Path) -> JobEngine<InMemoryCatalog> {
    let mut pipelines = PipelineRegistry::new();
    pipelines.register("import",
                       &["fasta"],
                       vec![StageDescriptor::init("import_init", "validating inputs"),
                            StageDescriptor::process("import_process", "processing on worker"),
                            StageDescriptor::commit("import_commit", "registering outputs")],
                       "Importing")
             .expect("register pipeline");

    let mut handlers = HandlerRegistry::new();
    handlers.register(Arc::new(ImportHandler { id: "full",
                                               caps: HandlerCapabilities::everywhere() }))
            .expect("register full");
    handlers.register(Arc::new(ImportHandler { id: "controller-side",
                                               caps: HandlerCapabilities::controller_only() }))
            .expect("register controller-side");

    let staging = StagingArea::new(&StagingConfig::with_root(staging_root));
    JobEngine::new(pipelines, handlers, staging, InMemoryCatalog::new())
}

#[test]
fn worker_stage_runs_or_skips_by_capability_on_the_same_definition() {
    let dir = tempfile::tempdir().expect("tempdir");
    let staging_root = dir.path().join("staging");
    let mut engine = engine_with_handlers(&staging_root);

    // mismo pipeline, dos handlers
    let mut worker_job = Job::new("import", "tests", dir.path().join("out-a")).with_handler("full");
    let mut controller_job = Job::new("import", "tests", dir.path().join("out-b")).with_handler("controller-side");

    engine.run(&mut worker_job).expect("worker job completes");
    engine.run(&mut controller_job).expect("controller job completes");

    let worker_actions: Vec<&str> = worker_job.provenance().actions().map(|a| a.name.as_str()).collect();
    assert_eq!(worker_actions, vec!["validate_inputs", "worker_process"]);

    let controller_actions: Vec<&str> = controller_job.provenance().actions().map(|a| a.name.as_str()).collect();
    assert_eq!(controller_actions, vec!["validate_inputs"], "worker stage must be skipped entirely");

    assert_eq!(worker_job.status(), JobStatus::Complete);
    assert_eq!(controller_job.status(), JobStatus::Complete);
}

#[test]
fn skipped_stage_acquires_no_work_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let staging_root = dir.path().join("staging");
    let mut engine = engine_with_handlers(&staging_root);

    let mut job = Job::new("import", "tests", dir.path().join("out")).with_handler("controller-side");
    engine.run(&mut job).expect("run");

    let job_staging = staging_root.join(job.id().to_string());
    assert!(!job_staging.join("import_process").exists(),
            "a skipped stage must not acquire a work directory");
}
