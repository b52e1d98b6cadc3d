//! Handlers del dominio de importación.

pub mod annotation;
pub mod sequence_import;

pub use annotation::AnnotationHandler;
pub use sequence_import::SequenceImportHandler;
