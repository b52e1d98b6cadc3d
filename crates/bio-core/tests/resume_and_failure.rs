//! Resume idempotente, fallo de etapa con limpieza garantizada y
//! cancelación con granularidad de frontera de etapa.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bio_core::{CoreError, FileClass, Handler, HandlerCapabilities, HandlerRegistry, InMemoryCatalog, Job,
               JobContext, JobEngine, JobStatus, PipelineRegistry, RecordedAction, StageDescriptor, StagingArea,
               StagingConfig};

// Handler que deja marcadores durables por fase, para observar qué corrió.
struct MarkerHandler;

fn append_marker(dir: &Path, name: &str) -> Result<(), CoreError> {
    fs::create_dir_all(dir).map_err(|e| CoreError::StagingIo(e.to_string()))?;
    let mut file = fs::OpenOptions::new().create(true)
                                         .append(true)
                                         .open(dir.join(name))
                                         .map_err(|e| CoreError::StagingIo(e.to_string()))?;
    writeln!(file, "ran").map_err(|e| CoreError::StagingIo(e.to_string()))
}

impl Handler for MarkerHandler {
    fn id(&self) -> &str {
        "marker"
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::everywhere()
    }

    fn init(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        ctx.record(RecordedAction::new("init"));
        append_marker(ctx.output_dir(), "init.log")
    }

    fn process(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        ctx.record(RecordedAction::new("process"));
        append_marker(ctx.output_dir(), "process.log")
    }
}

fn resumable_pipeline() -> Vec<StageDescriptor> {
    vec![StageDescriptor::init("init", "initializing").with_is_complete(|job| {
                                                          job.output_dir().join("init.log").exists()
                                                      }),
         StageDescriptor::process("process", "processing").with_is_complete(|job| {
                                                              job.output_dir().join("process.log").exists()
                                                          }),
         StageDescriptor::commit("commit", "registering").with_is_complete(|job| job.provenance().is_complete())]
}

fn engine_for(staging_root: &Path, stages: Vec<StageDescriptor>) -> JobEngine<InMemoryCatalog> {
    let mut pipelines = PipelineRegistry::new();
    pipelines.register("resumable", &[], stages, "Resumable").expect("register");
    let mut handlers = HandlerRegistry::new();
    handlers.register(Arc::new(MarkerHandler)).expect("register handler");
    let staging = StagingArea::new(&StagingConfig::with_root(staging_root));
    JobEngine::new(pipelines, handlers, staging, InMemoryCatalog::new())
}

#[test]
fn resume_reenters_at_first_incomplete_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_for(&dir.path().join("staging"), resumable_pipeline());
    let mut job = Job::new("resumable", "tests", dir.path().join("out")).with_handler("marker");

    // primera etapa
    assert!(engine.advance(&mut job).expect("advance init"));

    // "crash": el job viaja serializado a otro proceso
    let raw = serde_json::to_string(&job).expect("serialize");
    let mut resumed: Job = serde_json::from_str(&raw).expect("deserialize");

    // re-entra en process, no en init
    assert!(engine.advance(&mut resumed).expect("advance process"));
    assert!(engine.advance(&mut resumed).expect("advance commit"));
    assert!(!engine.advance(&mut resumed).expect("no stages left"));
    assert_eq!(resumed.status(), JobStatus::Complete);

    let init_runs = fs::read_to_string(dir.path().join("out").join("init.log")).expect("init log");
    assert_eq!(init_runs.lines().count(), 1, "init must not re-run on resume");
    let process_runs = fs::read_to_string(dir.path().join("out").join("process.log")).expect("process log");
    assert_eq!(process_runs.lines().count(), 1);
}

#[test]
fn cancellation_stops_at_the_stage_boundary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_for(&dir.path().join("staging"), resumable_pipeline());
    let mut job = Job::new("resumable", "tests", dir.path().join("out")).with_handler("marker");

    assert!(engine.advance(&mut job).expect("advance init"));
    job.cancel();

    // la etapa siguiente no corre; el scheduler observa el estado terminal
    assert!(matches!(engine.advance(&mut job), Err(CoreError::JobTerminal)));
    assert_eq!(job.status(), JobStatus::Cancelled);
    assert!(!dir.path().join("out").join("process.log").exists(),
            "a cancelled job must not proceed past its current stage");
}

// Handler cuyo process deja un intermedio a medio escribir y falla.
struct FailingHandler;

impl Handler for FailingHandler {
    fn id(&self) -> &str {
        "failing"
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::everywhere()
    }

    fn process(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        let work_dir = ctx.work_dir().expect("process stage stages files");
        let partial = work_dir.local_path("partial.tmp");
        fs::write(&partial, b"half-written").map_err(|e| CoreError::StagingIo(e.to_string()))?;
        ctx.track(partial, FileClass::Intermediate);
        Err(CoreError::StageExecution("simulated domain failure".to_string()))
    }
}

#[test]
fn failed_stage_marks_job_failed_and_releases_staging() {
    let dir = tempfile::tempdir().expect("tempdir");
    let staging_root = dir.path().join("staging");

    let mut pipelines = PipelineRegistry::new();
    pipelines.register("fragile",
                       &[],
                       vec![StageDescriptor::process("process", "processing")],
                       "Fragile")
             .expect("register");
    let mut handlers = HandlerRegistry::new();
    handlers.register(Arc::new(FailingHandler)).expect("register handler");
    let staging = StagingArea::new(&StagingConfig::with_root(&staging_root));
    let mut engine = JobEngine::new(pipelines, handlers, staging, InMemoryCatalog::new());

    let mut job = Job::new("fragile", "tests", dir.path().join("out")).with_handler("failing");
    let err = engine.run(&mut job).expect_err("stage must fail");

    assert!(matches!(err, CoreError::StageExecution(_)));
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.failure().expect("failure recorded").contains("simulated domain failure"));

    // limpieza garantizada: el work dir de la etapa fue descartado
    let stage_dir = staging_root.join(job.id().to_string()).join("process");
    assert!(!stage_dir.exists(), "work dir must be released even on failure");
}
