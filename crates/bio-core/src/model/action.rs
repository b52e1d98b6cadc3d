//! Acción registrada: una arista de proveniencia.
//!
//! Cada `RecordedAction` correlaciona un conjunto de referencias de entrada
//! con las salidas que produjo una etapa. Las referencias son strings (path
//! completo o nombre de archivo) y no paths vivos: el log debe seguir siendo
//! legible después de que los intermedios fueron borrados.
//!
//! `BTreeSet` da semántica de conjunto con `Eq + Hash` derivables, lo que
//! permite deduplicar acciones por identidad al fusionarlas.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RecordedAction {
    pub name: String,
    pub inputs: BTreeSet<String>,
    pub outputs: BTreeSet<String>,
}

impl RecordedAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               inputs: BTreeSet::new(),
               outputs: BTreeSet::new() }
    }

    pub fn input(mut self, reference: impl Into<String>) -> Self {
        self.inputs.insert(reference.into());
        self
    }

    pub fn output(mut self, reference: impl Into<String>) -> Self {
        self.outputs.insert(reference.into());
        self
    }

    /// ¿La acción referencia este string (entrada o salida)?
    pub fn references(&self, reference: &str) -> bool {
        self.inputs.contains(reference) || self.outputs.contains(reference)
    }
}
