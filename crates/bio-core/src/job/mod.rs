//! Estado del job: la unidad persistible de una ejecución de pipeline.
//!
//! `Job` es completamente serializable: parámetros, cola de salidas
//! pendientes, estado y proveniencia viajan juntos por la frontera de
//! persistencia, de modo que un proceso distinto del que lo creó puede
//! retomarlo. Los ayudantes transitorios (FileManager, WorkDirectory) nunca
//! viven en el Job: pertenecen al `JobContext` de la etapa en curso.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::HANDLER_PARAM_KEY;
use crate::errors::CoreError;
use crate::model::{OutputArtifact, RecordedAction};
use crate::provenance::ProvenanceLog;

/// Estados del ciclo de vida.
///
/// Transiciones válidas:
/// - `Created` -> `Running`
/// - `Running` -> `Complete` | `Failed` | `Cancelled`
/// - `Created` -> `Cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Created,
    Running,
    Complete,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: Uuid,
    pipeline: String,
    owner: String,
    params: Map<String, Value>,
    input_files: Vec<PathBuf>,
    output_dir: PathBuf,
    pending_outputs: Vec<OutputArtifact>,
    committed_outputs: Vec<OutputArtifact>,
    run_id: Option<Uuid>,
    status: JobStatus,
    provenance: ProvenanceLog,
    failure: Option<String>,
}

impl Job {
    pub fn new(pipeline: impl Into<String>, owner: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self { id: Uuid::new_v4(),
               pipeline: pipeline.into(),
               owner: owner.into(),
               params: Map::new(),
               input_files: Vec::new(),
               output_dir: output_dir.into(),
               pending_outputs: Vec::new(),
               committed_outputs: Vec::new(),
               run_id: None,
               status: JobStatus::Created,
               provenance: ProvenanceLog::new(),
               failure: None }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Fija el identificador del handler (clave `handler` del mapa de
    /// parámetros).
    pub fn with_handler(self, handler_id: impl Into<String>) -> Self {
        let id = handler_id.into();
        self.with_param(HANDLER_PARAM_KEY, Value::String(id))
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_files.push(path.into());
        self
    }

    // ---- lectura ----

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Identificador estable del handler a resolver en el registro.
    pub fn handler_id(&self) -> Result<&str, CoreError> {
        self.params
            .get(HANDLER_PARAM_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Configuration(format!("job {} sin parámetro '{HANDLER_PARAM_KEY}'", self.id)))
    }

    pub fn input_files(&self) -> &[PathBuf] {
        &self.input_files
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn pending_outputs(&self) -> &[OutputArtifact] {
        &self.pending_outputs
    }

    pub fn committed_outputs(&self) -> &[OutputArtifact] {
        &self.committed_outputs
    }

    pub fn provenance(&self) -> &ProvenanceLog {
        &self.provenance
    }

    // ---- transiciones de estado ----

    pub fn mark_running(&mut self) {
        if matches!(self.status, JobStatus::Created | JobStatus::Running) {
            self.status = JobStatus::Running;
        }
    }

    pub fn mark_complete(&mut self) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Complete;
        }
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Failed;
            self.failure = Some(reason.into());
        }
    }

    /// Cancelación con granularidad de frontera de etapa: el engine no
    /// avanza más allá de la etapa en curso.
    pub fn cancel(&mut self) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Cancelled;
        }
    }

    // ---- cola de salidas y proveniencia ----

    pub fn queue_output(&mut self, artifact: OutputArtifact) {
        self.pending_outputs.push(artifact);
    }

    pub fn queue_outputs(&mut self, artifacts: impl IntoIterator<Item = OutputArtifact>) {
        self.pending_outputs.extend(artifacts);
    }

    pub fn merge_actions(&mut self, actions: impl IntoIterator<Item = RecordedAction>) -> usize {
        self.provenance.merge(actions)
    }

    pub(crate) fn mark_provenance_complete(&mut self) {
        self.provenance.mark_complete();
    }

    /// Run id del commit: se crea en el primer commit y queda fijo.
    pub(crate) fn ensure_run_id(&mut self) -> Uuid {
        *self.run_id.get_or_insert_with(Uuid::new_v4)
    }

    pub(crate) fn take_pending_outputs(&mut self) -> Vec<OutputArtifact> {
        std::mem::take(&mut self.pending_outputs)
    }

    pub(crate) fn restore_pending(&mut self, artifacts: Vec<OutputArtifact>) {
        self.pending_outputs = artifacts;
    }

    pub(crate) fn push_committed(&mut self, artifact: OutputArtifact) {
        self.committed_outputs.push(artifact);
    }
}
