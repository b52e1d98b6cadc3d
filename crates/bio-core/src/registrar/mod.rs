//! Registro idempotente de salidas en el catálogo durable.
//!
//! Las etapas encolan `OutputArtifact` en el job en vez de escribir el
//! catálogo directamente; el registro se difiere a un único commit terminal
//! por job. Así varias etapas (init en controller, proceso remoto, proceso
//! local) pueden producir salidas sin que el catálogo muestre resultados
//! parciales, y la escritura al catálogo queda como el único punto que
//! requiere cuidado transaccional.
//!
//! Contrato del commit:
//! - artefacto con `catalog_id`: ya registrado, cero inserts nuevos
//!   (re-ejecución segura tras un crash a mitad de commit);
//! - archivo de respaldo ausente: se loguea y se salta ese artefacto sin
//!   abortar el lote (atómico por artefacto, no por lote);
//! - error del catálogo: el artefacto queda pendiente para un commit
//!   posterior (re-impulsable).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::job::Job;
use crate::model::{ArtifactCategory, OutputArtifact};

/// Interfaz de commit del catálogo (colaborador externo).
pub trait Catalog {
    /// Crea la entrada y devuelve su identificador de catálogo.
    fn insert_artifact(&mut self, owner: &str, artifact: &OutputArtifact) -> Result<Uuid, CoreError>;
}

/// Entrada registrada, con estampas de run y de tiempo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub owner: String,
    pub category: ArtifactCategory,
    pub path: PathBuf,
    pub checksum: Option<String>,
    pub run_id: Option<Uuid>,
    pub registered_at: DateTime<Utc>,
}

/// Implementación en memoria, suficiente para tests y para el binario de
/// validación. El catálogo real vive fuera de este core.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: IndexMap<Uuid, CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}

impl Catalog for InMemoryCatalog {
    fn insert_artifact(&mut self, owner: &str, artifact: &OutputArtifact) -> Result<Uuid, CoreError> {
        let id = Uuid::new_v4();
        let entry = CatalogEntry { id,
                                   owner: owner.to_string(),
                                   category: artifact.category,
                                   path: artifact.path.clone(),
                                   checksum: artifact.checksum.clone(),
                                   run_id: artifact.run_id,
                                   registered_at: Utc::now() };
        self.entries.insert(id, entry);
        Ok(id)
    }
}

/// Fallo de commit de un artefacto individual.
#[derive(Debug, Clone)]
pub struct CommitFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Resultado estructurado de un lote de commit.
#[derive(Debug, Default)]
pub struct CommitReport {
    pub committed: Vec<OutputArtifact>,
    pub failures: Vec<CommitFailure>,
    pub already_committed: usize,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct OutputRegistrar<C: Catalog> {
    catalog: C,
}

impl<C: Catalog> OutputRegistrar<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Comete la cola pendiente del job, artefacto por artefacto.
    pub fn commit(&mut self, job: &mut Job) -> CommitReport {
        let run_id = job.ensure_run_id();
        let pending = job.take_pending_outputs();
        let mut report = CommitReport::default();
        let mut still_pending: Vec<OutputArtifact> = Vec::new();

        for mut artifact in pending {
            if artifact.is_committed() {
                // ya registrado en una corrida anterior: no insertar de nuevo
                report.already_committed += 1;
                job.push_committed(artifact);
                continue;
            }

            if !artifact.path.exists() {
                warn!("job {}: archivo de respaldo ausente, artefacto omitido: {}",
                      job.id(),
                      artifact.path.display());
                report.failures.push(CommitFailure { path: artifact.path.clone(),
                                                     reason: "backing file missing".to_string() });
                continue;
            }

            match file_checksum(&artifact.path) {
                Ok(digest) => artifact.checksum = Some(digest),
                Err(e) => {
                    // el checksum es metadato; su fallo no bloquea el registro
                    warn!("job {}: checksum de '{}' falló: {e}", job.id(), artifact.path.display());
                }
            }
            artifact.run_id = Some(run_id);

            match self.catalog.insert_artifact(job.owner(), &artifact) {
                Ok(id) => {
                    artifact.catalog_id = Some(id);
                    debug!("job {}: artefacto registrado {} -> {}", job.id(), artifact.path.display(), id);
                    report.committed.push(artifact.clone());
                    job.push_committed(artifact);
                }
                Err(e) => {
                    warn!("job {}: escritura al catálogo falló para '{}': {e}",
                          job.id(),
                          artifact.path.display());
                    report.failures.push(CommitFailure { path: artifact.path.clone(),
                                                         reason: e.to_string() });
                    // queda pendiente: un commit posterior lo reintenta
                    artifact.run_id = None;
                    still_pending.push(artifact);
                }
            }
        }

        job.restore_pending(still_pending);
        report
    }
}

/// Digest blake3 (hex) del contenido del archivo.
fn file_checksum(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
