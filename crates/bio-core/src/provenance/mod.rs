//! Log de proveniencia append-only del job.
//!
//! El log es el rastro de auditoría que correlaciona cada salida con las
//! entradas y la etapa que la produjo. Semántica de merge:
//! - preserva el orden de inserción (orden de finalización de etapas),
//! - suprime duplicados por identidad (`Eq + Hash` de `RecordedAction`),
//! - nunca edita ni borra acciones ya registradas.
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::RecordedAction;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvenanceLog {
    actions: IndexSet<RecordedAction>,
    completed: bool,
}

impl ProvenanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fusiona un conjunto de acciones al final del log. Devuelve cuántas
    /// eran realmente nuevas.
    pub fn merge(&mut self, actions: impl IntoIterator<Item = RecordedAction>) -> usize {
        let mut fresh = 0;
        for action in actions {
            if self.actions.insert(action) {
                fresh += 1;
            }
        }
        fresh
    }

    pub fn actions(&self) -> impl Iterator<Item = &RecordedAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn contains(&self, action: &RecordedAction) -> bool {
        self.actions.contains(action)
    }

    /// Cierre del log en el commit terminal. No borra nada: sólo marca que
    /// el job ya no aportará más acciones.
    pub fn mark_complete(&mut self) {
        self.completed = true;
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}
