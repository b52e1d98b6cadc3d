//! Errores específicos del core de orquestación.
//!
//! Un solo enum cubre la taxonomía completa: los errores fatales para el job
//! (configuración, handler/pipeline desconocido, fallo de etapa, IO de
//! staging) se propagan con `?`; los fallos por-artefacto del commit NO viven
//! aquí sino en `CommitReport` (se registran y se continúa).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("configuration: {0}")] Configuration(String),
    #[error("pipeline '{0}' is not registered")] UnknownPipeline(String),
    #[error("handler '{0}' is not registered")] UnknownHandler(String),
    #[error("stage execution failed: {0}")] StageExecution(String),
    #[error("staging io: {0}")] StagingIo(String),
    #[error("artifact commit: {0}")] ArtifactCommit(String),
    #[error("job is already terminal")] JobTerminal,
    #[error("internal: {0}")] Internal(String),
}
