//! Área de staging y directorios de trabajo por etapa.
//!
//! Un `WorkDirectory` es un directorio privado, local al host, con vida
//! acotada a una ejecución de etapa. El `StagingArea` es su dueño:
//! - `acquire` crea el directorio, hace pull de las entradas declaradas del
//!   job (copiándolas, porque pueden vivir en otro host) y las registra como
//!   `Input` en un `FileManager` nuevo.
//! - `release` empuja los `FinalOutput` que viven bajo el directorio hacia
//!   el `output_dir` durable del job y descarta el directorio completo.
//!
//! La raíz de staging se trata siempre como volátil: el push de salidas
//! finales ocurre en todo release; sobre un filesystem compartido es una
//! copia en el mismo disco.
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use uuid::Uuid;

use super::{FileClass, FileManager};
use crate::config::StagingConfig;
use crate::errors::CoreError;
use crate::job::Job;

/// Directorio de trabajo privado de una ejecución de etapa.
#[derive(Debug)]
pub struct WorkDirectory {
    root: PathBuf,
    job_id: Uuid,
    stage_id: String,
}

impl WorkDirectory {
    fn new(root: PathBuf, job_id: Uuid, stage_id: impl Into<String>) -> Self {
        Self { root,
               job_id,
               stage_id: stage_id.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    /// Path local dentro del directorio de trabajo.
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// Dueño de la adquisición/liberación de directorios de trabajo.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(config: &StagingConfig) -> Self {
        Self { root: config.root.clone() }
    }

    pub fn from_env() -> Self {
        Self::new(&StagingConfig::from_env())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Adquisición con scope: crea el directorio privado de la etapa y hace
    /// pull de las entradas del job. Un fallo de copia es fatal para la
    /// etapa (las etapas siguientes no pueden correr sin sus entradas).
    pub fn acquire(&self, job: &Job, stage_id: &str) -> Result<(WorkDirectory, FileManager), CoreError> {
        let dir = self.root.join(job.id().to_string()).join(stage_id);
        fs::create_dir_all(&dir).map_err(|e| CoreError::StagingIo(format!("creando '{}': {e}", dir.display())))?;

        let mut files = FileManager::new();
        for input in job.input_files() {
            let name = input.file_name()
                            .ok_or_else(|| CoreError::StagingIo(format!("entrada sin nombre de archivo: {}", input.display())))?;
            let dest = dir.join(name);
            fs::copy(input, &dest).map_err(|e| {
                                      CoreError::StagingIo(format!("pull de '{}' falló: {e}", input.display()))
                                  })?;
            debug!("staged input {} -> {}", input.display(), dest.display());
            files.track(dest, FileClass::Input);
        }

        Ok((WorkDirectory::new(dir, job.id(), stage_id), files))
    }

    /// Liberación: empuja los `FinalOutput` bajo el directorio hacia el
    /// `output_dir` del job y descarta el directorio. El push es fatal si
    /// falla (el artefacto quedaría inaccesible); el borrado del directorio
    /// es best-effort.
    pub fn release(&self, work_dir: WorkDirectory, files: &FileManager, job: &Job) -> Result<(), CoreError> {
        let finals: Vec<PathBuf> = files.paths_with_class(FileClass::FinalOutput)
                                        .filter(|p| work_dir.contains(p))
                                        .cloned()
                                        .collect();
        if !finals.is_empty() {
            fs::create_dir_all(job.output_dir()).map_err(|e| {
                                                    CoreError::StagingIo(format!("creando output dir '{}': {e}",
                                                                                 job.output_dir().display()))
                                                })?;
            for src in finals {
                let name = src.file_name()
                              .ok_or_else(|| CoreError::StagingIo(format!("salida sin nombre: {}", src.display())))?;
                let dest = job.output_dir().join(name);
                fs::copy(&src, &dest).map_err(|e| {
                                         CoreError::StagingIo(format!("push de '{}' falló: {e}", src.display()))
                                     })?;
                debug!("pushed output {} -> {}", src.display(), dest.display());
            }
        }

        if let Err(e) = fs::remove_dir_all(work_dir.path()) {
            warn!("no se pudo descartar work dir '{}': {e}", work_dir.path().display());
        }
        Ok(())
    }
}
