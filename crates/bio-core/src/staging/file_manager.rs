//! Seguimiento de archivos tocados durante la ejecución de una etapa.
//!
//! El `FileManager` es dueño de la regla de qué sobrevive a la limpieza:
//! - `Input`: staged desde las entradas declaradas del job; nunca se borra
//!   explícitamente.
//! - `Intermediate`: temporal de la etapa; se elimina en la limpieza.
//! - `FinalOutput`: producto de la etapa; se empuja a almacenamiento durable
//!   en el release del `WorkDirectory`.
//!
//! Se crea al adquirir el `WorkDirectory` y muere con su release.
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indexmap::IndexSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::model::RecordedAction;

/// Clasificación de un path registrado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileClass {
    Input,
    Intermediate,
    FinalOutput,
}

#[derive(Debug, Default)]
pub struct FileManager {
    // orden de inserción preservado; reclasificar un path no lo reordena
    tracked: IndexMap<PathBuf, FileClass>,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reclasifica) un path. La última clasificación gana.
    pub fn track(&mut self, path: impl Into<PathBuf>, class: FileClass) {
        self.tracked.insert(path.into(), class);
    }

    pub fn class_of(&self, path: &Path) -> Option<FileClass> {
        self.tracked.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn paths_with_class(&self, class: FileClass) -> impl Iterator<Item = &PathBuf> {
        self.tracked
            .iter()
            .filter(move |(_, c)| **c == class)
            .map(|(p, _)| p)
    }

    /// Borra todo path clasificado `Intermediate`. Nunca toca `Input` ni
    /// `FinalOutput`. Un fallo de borrado individual se loguea y no aborta
    /// la etapa (limpieza best-effort).
    pub fn delete_intermediate_files(&mut self) {
        let doomed: Vec<PathBuf> = self.paths_with_class(FileClass::Intermediate).cloned().collect();
        for path in doomed {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("intermedio eliminado: {}", path.display());
                    self.tracked.shift_remove(&path);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.tracked.shift_remove(&path);
                }
                Err(e) => {
                    warn!("no se pudo borrar intermedio '{}': {e}", path.display());
                }
            }
        }
    }

    /// Poda el mapa de seguimiento reteniendo sólo los paths referenciados
    /// por las acciones dadas (por path completo o por nombre de archivo).
    /// Evita acumular paths huérfanos a lo largo de un job largo.
    pub fn cleanup(&mut self, actions: &IndexSet<RecordedAction>) {
        let mut referenced: HashSet<String> = HashSet::new();
        for action in actions {
            referenced.extend(action.inputs.iter().cloned());
            referenced.extend(action.outputs.iter().cloned());
        }
        self.tracked.retain(|path, _| {
                        let full = path.to_string_lossy();
                        if referenced.contains(full.as_ref()) {
                            return true;
                        }
                        path.file_name()
                            .map(|n| referenced.contains(n.to_string_lossy().as_ref()))
                            .unwrap_or(false)
                    });
    }
}
