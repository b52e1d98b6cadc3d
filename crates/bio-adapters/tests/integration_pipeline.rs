//! Escenarios end-to-end del pipeline de importación sobre un filesystem
//! real: staging, normalización, push de salidas, commit terminal y
//! participación por capacidades.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use bio_adapters::{register_import_pipeline, AnnotationHandler, SequenceImportHandler, IMPORT_PIPELINE};
use bio_core::{HandlerRegistry, InMemoryCatalog, Job, JobEngine, JobStatus, PipelineRegistry, StagingArea,
               StagingConfig};

fn build_engine(staging_root: &Path) -> JobEngine<InMemoryCatalog> {
    let mut pipelines = PipelineRegistry::new();
    register_import_pipeline(&mut pipelines).expect("register pipeline");

    let mut handlers = HandlerRegistry::new();
    handlers.register(Arc::new(SequenceImportHandler)).expect("register import handler");
    handlers.register(Arc::new(AnnotationHandler)).expect("register annotation handler");

    let staging = StagingArea::new(&StagingConfig::with_root(staging_root));
    JobEngine::new(pipelines, handlers, staging, InMemoryCatalog::new())
}

#[test]
fn full_import_run_stages_normalizes_and_commits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("x.fasta");
    fs::write(&input, ">seq1\nacgt\n>seq2\nttag\n").expect("write input");

    let staging_root = dir.path().join("staging");
    let out_dir = dir.path().join("out");
    let mut engine = build_engine(&staging_root);

    let mut job = Job::new(IMPORT_PIPELINE, "genomics-lab", &out_dir).with_handler("fasta_import")
                                                                    .with_input(&input);
    engine.run(&mut job).expect("el pipeline completo debería correr");

    // salida final empujada al almacenamiento durable, normalizada
    let imported = out_dir.join("x.imported.fasta");
    let body = fs::read_to_string(&imported).expect("imported file");
    assert_eq!(body, ">seq1\nACGT\n>seq2\nTTAG\n");

    // el intermedio no sobrevive al release del work dir
    let stage_dir = staging_root.join(job.id().to_string()).join("import_process");
    assert!(!stage_dir.exists(), "work dir must be discarded after release");

    // commit terminal: artefactos con catalog id, cola vacía, job completo
    assert_eq!(job.status(), JobStatus::Complete);
    assert!(job.pending_outputs().is_empty());
    assert_eq!(job.committed_outputs().len(), 2, "imported file + report");
    for artifact in job.committed_outputs() {
        assert!(artifact.is_committed(), "artifact must carry a catalog id");
        assert_eq!(artifact.run_id, job.run_id());
    }
    assert_eq!(engine.registrar().catalog().len(), 2);

    // el reporte lista la salida importada
    let report = fs::read_to_string(out_dir.join("import_report.txt")).expect("report");
    assert!(report.contains("x.imported.fasta"));

    // proveniencia en orden de etapas y cerrada
    let actions: Vec<&str> = job.provenance().actions().map(|a| a.name.as_str()).collect();
    assert_eq!(actions, vec!["validate_inputs", "import_sequences", "write_report"]);
    assert!(job.provenance().is_complete());
}

#[test]
fn controller_only_handler_skips_worker_stage_on_shared_definition() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("x.fasta");
    fs::write(&input, ">seq1\nacgt\n").expect("write input");

    let staging_root = dir.path().join("staging");
    let mut engine = build_engine(&staging_root);

    // dos jobs, misma definición de pipeline
    let mut worker_job = Job::new(IMPORT_PIPELINE, "genomics-lab", dir.path().join("out-a"))
        .with_handler("fasta_import")
        .with_input(&input);
    let mut annotation_job = Job::new(IMPORT_PIPELINE, "genomics-lab", dir.path().join("out-b"))
        .with_handler("annotation_only")
        .with_input(&input);

    engine.run(&mut worker_job).expect("worker job");
    engine.run(&mut annotation_job).expect("annotation job");

    assert!(worker_job.provenance().actions().any(|a| a.name == "import_sequences"));
    assert!(!annotation_job.provenance().actions().any(|a| a.name == "import_sequences"),
            "worker stage must be skipped for the controller-only handler");

    // la etapa omitida no adquirió work dir
    let skipped_dir = staging_root.join(annotation_job.id().to_string()).join("import_process");
    assert!(!skipped_dir.exists());

    // el trabajo de controller sí produjo y registró su anotación
    let annotations = dir.path().join("out-b").join("annotations.txt");
    assert!(annotations.exists(), "annotation output must be pushed to durable storage");
    assert_eq!(annotation_job.committed_outputs().len(), 1);
    assert!(annotation_job.committed_outputs()[0].is_committed());
    assert_eq!(annotation_job.status(), JobStatus::Complete);
}

#[test]
fn invalid_input_fails_the_init_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("notes.csv");
    fs::write(&input, "a,b,c\n1,2,3\n").expect("write input");

    let mut engine = build_engine(&dir.path().join("staging"));
    let mut job = Job::new(IMPORT_PIPELINE, "genomics-lab", dir.path().join("out")).with_handler("fasta_import")
                                                                                   .with_input(&input);

    engine.run(&mut job).expect_err("un formato irreconocible debe fallar la etapa de init");
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.failure().expect("failure recorded").contains("notes.csv"));
    assert!(job.committed_outputs().is_empty());
}
