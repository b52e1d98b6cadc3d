//! Contexto de ejecución entregado a la etapa en curso.
//!
//! Un `JobContext` se crea fresco por ejecución de etapa y muere con ella.
//! Es la fachada por la que el handler toca el mundo: parámetros del job,
//! directorio de trabajo (si la etapa hace staging), seguimiento de
//! archivos, acciones de proveniencia y artefactos a encolar. Referencia al
//! `Job` sin poseerlo; el engine lo desarma con `into_parts` y fusiona lo
//! acumulado en el job durable.
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::job::Job;
use crate::model::{OutputArtifact, RecordedAction};
use crate::staging::{FileClass, FileManager, WorkDirectory};

pub struct JobContext<'a> {
    job: &'a Job,
    files: FileManager,
    work_dir: Option<WorkDirectory>,
    // orden de inserción preservado, duplicados por identidad suprimidos
    actions: IndexSet<RecordedAction>,
    queued: Vec<OutputArtifact>,
}

impl<'a> JobContext<'a> {
    pub fn new(job: &'a Job, files: FileManager, work_dir: Option<WorkDirectory>) -> Self {
        Self { job,
               files,
               work_dir,
               actions: IndexSet::new(),
               queued: Vec::new() }
    }

    pub fn job(&self) -> &Job {
        self.job
    }

    pub fn params(&self) -> &Map<String, Value> {
        self.job.params()
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.job.param(key)
    }

    /// Directorio de trabajo de la etapa; `None` para etapas sin staging.
    pub fn work_dir(&self) -> Option<&WorkDirectory> {
        self.work_dir.as_ref()
    }

    /// Destino durable de las salidas finales del job.
    pub fn output_dir(&self) -> &Path {
        self.job.output_dir()
    }

    pub fn files(&self) -> &FileManager {
        &self.files
    }

    /// Registra un archivo creado por la etapa con su clasificación.
    pub fn track(&mut self, path: impl Into<PathBuf>, class: FileClass) {
        self.files.track(path, class);
    }

    /// Entradas ya staged en el directorio de trabajo.
    pub fn staged_inputs(&self) -> Vec<PathBuf> {
        self.files.paths_with_class(FileClass::Input).cloned().collect()
    }

    /// Registra una acción de proveniencia. Devuelve `false` si era un
    /// duplicado por identidad.
    pub fn record(&mut self, action: RecordedAction) -> bool {
        self.actions.insert(action)
    }

    pub fn actions(&self) -> &IndexSet<RecordedAction> {
        &self.actions
    }

    /// Encola un artefacto para el commit diferido del job.
    pub fn queue_output(&mut self, artifact: OutputArtifact) {
        self.queued.push(artifact);
    }

    pub fn queued_outputs(&self) -> &[OutputArtifact] {
        &self.queued
    }

    /// Desarma el contexto al final de la etapa. El engine fusiona acciones
    /// y artefactos en el job y libera el staging.
    pub fn into_parts(self) -> (FileManager, Option<WorkDirectory>, IndexSet<RecordedAction>, Vec<OutputArtifact>) {
        (self.files, self.work_dir, self.actions, self.queued)
    }
}
