//! Artefacto de salida producido por un job.
//!
//! Un `OutputArtifact` es la unidad que viaja por la cola pendiente del job
//! hasta su registro en el catálogo. El core no interpreta el contenido del
//! archivo: la `path` lo direcciona como blob opaco.
//! - `catalog_id` y `run_id` son `None` hasta el commit; su presencia es la
//!   marca de "ya registrado" que hace el commit re-ejecutable sin
//!   duplicados.
//! - `checksum` (blake3 hex del contenido) se estampa en el commit; es
//!   metadato de catálogo, no direcciona el archivo.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Categorías neutrales de artefacto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactCategory {
    /// Archivo sin semántica especial.
    GenericFile,
    /// Datos de secuencias (FASTA/FASTQ y similares).
    SequenceData,
    /// Índice derivado de otro artefacto.
    Index,
    /// Reporte legible por humanos.
    Report,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputArtifact {
    pub category: ArtifactCategory,
    pub path: PathBuf,
    pub catalog_id: Option<Uuid>,
    pub run_id: Option<Uuid>,
    pub checksum: Option<String>,
    pub metadata: Option<Value>,
}

impl OutputArtifact {
    pub fn new(category: ArtifactCategory, path: impl Into<PathBuf>) -> Self {
        Self { category,
               path: path.into(),
               catalog_id: None,
               run_id: None,
               checksum: None,
               metadata: None }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Un artefacto con `catalog_id` es inmutable: ya fue registrado.
    pub fn is_committed(&self) -> bool {
        self.catalog_id.is_some()
    }
}
