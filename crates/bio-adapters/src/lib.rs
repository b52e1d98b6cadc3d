//! bio-adapters: handlers concretos sobre el core neutral de orquestación.
//!
//! El dominio de ejemplo es la importación de archivos de secuencias: un
//! handler con perfil worker completo y otro sólo-controller, ambos
//! servidos por el mismo pipeline registrado en `pipelines`.

pub mod handlers;
pub mod pipelines;

pub use handlers::{AnnotationHandler, SequenceImportHandler};
pub use pipelines::{import_pipeline_stages, register_import_pipeline, IMPORT_PIPELINE};
