//! Definición inmutable de un pipeline.
//!
//! Secuencia ordenada de `StageDescriptor` más los metadatos de registro.
//! Se construye una vez al arranque del proceso, nunca se muta y se comparte
//! vía `Arc` entre todos los jobs que la usan.

use crate::pipeline::StageDescriptor;

#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    name: String,
    input_file_types: Vec<String>,
    stages: Vec<StageDescriptor>,
    display_state: String,
}

impl PipelineDefinition {
    pub(crate) fn new(name: impl Into<String>,
                      input_file_types: Vec<String>,
                      stages: Vec<StageDescriptor>,
                      display_state: impl Into<String>)
                      -> Self {
        Self { name: name.into(),
               input_file_types,
               stages,
               display_state: display_state.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tipos de archivo de entrada aceptados; vacío = acepta cualquiera.
    pub fn input_file_types(&self) -> &[String] {
        &self.input_file_types
    }

    pub fn accepts(&self, file_type: &str) -> bool {
        self.input_file_types.is_empty() || self.input_file_types.iter().any(|t| t == file_type)
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Metadatos de presentación para la UI/registro externo.
    pub fn display_state(&self) -> &str {
        &self.display_state
    }
}
