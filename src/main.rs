use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bio_adapters::{register_import_pipeline, AnnotationHandler, SequenceImportHandler, IMPORT_PIPELINE};
use bio_core::{HandlerRegistry, InMemoryCatalog, Job, JobEngine, JobStatus, PipelineRegistry, StagingArea,
               StagingConfig};
use uuid::Uuid;

fn build_engine(staging_root: &Path) -> JobEngine<InMemoryCatalog> {
    let mut pipelines = PipelineRegistry::new();
    register_import_pipeline(&mut pipelines).expect("registro del pipeline de importación");

    let mut handlers = HandlerRegistry::new();
    handlers.register(Arc::new(SequenceImportHandler)).expect("registro fasta_import");
    handlers.register(Arc::new(AnnotationHandler)).expect("registro annotation_only");

    let staging = StagingArea::new(&StagingConfig::with_root(staging_root));
    JobEngine::new(pipelines, handlers, staging, InMemoryCatalog::new())
}

/// Validación: importación completa con staging real, push de salidas y
/// commit terminal idempotente.
fn run_import_validation(root: &Path) {
    fs::create_dir_all(root).expect("crear raíz de la demo");
    let input = root.join("sample.fasta");
    fs::write(&input, ">seq1\nacgt\n>seq2\nttag\n").expect("escribir entrada de ejemplo");

    let out_dir = root.join("out");
    let mut engine = build_engine(&root.join("staging"));
    let mut job = Job::new(IMPORT_PIPELINE, "demo", &out_dir).with_handler("fasta_import")
                                                            .with_input(&input);

    engine.run(&mut job).expect("el job de importación debe completarse");

    assert_eq!(job.status(), JobStatus::Complete);
    assert!(job.pending_outputs().is_empty(), "la cola pendiente queda vacía tras el commit");
    assert!(out_dir.join("sample.imported.fasta").exists());
    assert!(job.committed_outputs().iter().all(|a| a.is_committed()));
    assert!(job.provenance().is_complete());

    println!("[import] job {} completo: {} artefactos registrados, {} acciones de proveniencia",
             job.id(),
             job.committed_outputs().len(),
             job.provenance().len());
    for entry in engine.registrar().catalog().entries() {
        println!("[import]   catálogo {} -> {}", entry.id, entry.path.display());
    }

    // Frontera de persistencia: el job viaja serializado entre procesos.
    let raw = serde_json::to_string(&job).expect("serializar job");
    let restored: Job = serde_json::from_str(&raw).expect("deserializar job");
    assert_eq!(restored.status(), JobStatus::Complete);
    assert_eq!(restored.committed_outputs().len(), job.committed_outputs().len());
    println!("[import] estado del job serializado: {} bytes", raw.len());
}

/// Validación: el mismo pipeline sirve a un handler sólo-controller, que
/// omite la etapa worker por capacidades.
fn run_capability_skip_validation(root: &Path) {
    fs::create_dir_all(root).expect("crear raíz de la demo");
    let input = root.join("sample.fasta");
    fs::write(&input, ">seq1\nacgt\n").expect("escribir entrada de ejemplo");

    let mut engine = build_engine(&root.join("staging"));
    let mut job = Job::new(IMPORT_PIPELINE, "demo", root.join("out")).with_handler("annotation_only")
                                                                     .with_input(&input);

    engine.run(&mut job).expect("el job de anotación debe completarse");

    assert_eq!(job.status(), JobStatus::Complete);
    assert!(!job.provenance().actions().any(|a| a.name == "import_sequences"),
            "la etapa worker debe omitirse para el handler sólo-controller");
    assert!(root.join("out").join("annotations.txt").exists());

    println!("[skip] job {} completo con la etapa worker omitida; acciones: {:?}",
             job.id(),
             job.provenance().actions().map(|a| a.name.as_str()).collect::<Vec<_>>());
}

fn main() {
    bio_core::config::init_dotenv();

    let root = env::temp_dir().join(format!("bioflow-demo-{}", Uuid::new_v4()));
    run_import_validation(&root.join("import"));
    run_capability_skip_validation(&root.join("skip"));
    let _ = fs::remove_dir_all(&root);

    println!("Validaciones completadas");
}
