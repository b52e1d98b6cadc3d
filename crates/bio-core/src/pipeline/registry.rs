//! Registro de pipelines: write-once por nombre, read-many.
//!
//! Se construye completo durante la inicialización del proceso; después de
//! eso sólo se consulta, así que no necesita locking más allá de la
//! exclusión propia de la fase de arranque (`&mut self` en `register`).

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::pipeline::{PipelineDefinition, StageDescriptor};

#[derive(Debug, Default)]
pub struct PipelineRegistry {
    inner: HashMap<String, Arc<PipelineDefinition>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un pipeline. Falla con `Configuration` si el nombre ya está
    /// tomado o la secuencia de etapas es vacía.
    pub fn register(&mut self,
                    name: impl Into<String>,
                    input_file_types: &[&str],
                    stages: Vec<StageDescriptor>,
                    display_state: impl Into<String>)
                    -> Result<(), CoreError> {
        let name = name.into();
        if self.inner.contains_key(&name) {
            return Err(CoreError::Configuration(format!("pipeline '{name}' ya registrado")));
        }
        if stages.is_empty() {
            return Err(CoreError::Configuration(format!("pipeline '{name}' sin etapas")));
        }
        let types = input_file_types.iter().map(|t| t.to_string()).collect();
        let definition = PipelineDefinition::new(name.clone(), types, stages, display_state);
        self.inner.insert(name, Arc::new(definition));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<PipelineDefinition>, CoreError> {
        self.inner
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownPipeline(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(|s| s.as_str())
    }
}
