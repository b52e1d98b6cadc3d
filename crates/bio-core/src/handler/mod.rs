//! Contrato de Handler y su tabla de registro explícita.
//!
//! Un `Handler` es la unidad de lógica de dominio enchufable: el core no
//! sabe qué significa "importar" o "alinear", sólo conoce tres puntos de
//! entrada por fase (init en el controller, process en el worker, finalize
//! de vuelta en el controller) y un conjunto de flags de capacidad que
//! gobiernan en qué etapas participa. La resolución es por identificador
//! estable contra un `HandlerRegistry` construido al arranque: nada de
//! singletons de proceso ni lookup por nombre de clase.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::model::JobContext;

/// Flags de capacidad que gobiernan la participación en etapas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerCapabilities {
    pub runs_on_controller: bool,
    pub runs_on_worker: bool,
    pub supports_archived_inputs: bool,
}

impl HandlerCapabilities {
    /// Handler que sólo trabaja en el host controller.
    pub fn controller_only() -> Self {
        Self { runs_on_controller: true,
               runs_on_worker: false,
               supports_archived_inputs: false }
    }

    /// Handler que trabaja en ambos hosts.
    pub fn everywhere() -> Self {
        Self { runs_on_controller: true,
               runs_on_worker: true,
               supports_archived_inputs: false }
    }

    pub fn with_archived_inputs(mut self) -> Self {
        self.supports_archived_inputs = true;
        self
    }
}

/// Unidad de lógica de dominio. Las fases no usadas quedan como no-op.
///
/// Cada fase acumula acciones y artefactos a través del `JobContext`; el
/// engine los fusiona en el job al cierre de la etapa.
pub trait Handler: Send + Sync {
    /// Identificador estable para lookup en el registro.
    fn id(&self) -> &str;

    fn capabilities(&self) -> HandlerCapabilities;

    /// Fase de inicialización (lado controller).
    fn init(&self, _ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        Ok(())
    }

    /// Fase de procesamiento (lado worker).
    fn process(&self, _ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        Ok(())
    }

    /// Fase final (lado controller, previa al commit).
    fn finalize(&self, _ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Tabla de handlers: write-once por nombre al arranque, read-many después.
#[derive(Default)]
pub struct HandlerRegistry {
    inner: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Result<(), CoreError> {
        let id = handler.id().to_string();
        if self.inner.contains_key(&id) {
            return Err(CoreError::Configuration(format!("handler '{id}' ya registrado")));
        }
        self.inner.insert(id, handler);
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Result<Arc<dyn Handler>, CoreError> {
        self.inner
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownHandler(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHandler;
    impl Handler for NullHandler {
        fn id(&self) -> &str {
            "null"
        }
        fn capabilities(&self) -> HandlerCapabilities {
            HandlerCapabilities::controller_only()
        }
    }

    #[test]
    fn duplicate_registration_is_a_configuration_error() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(NullHandler)).expect("first registration");
        let err = registry.register(Arc::new(NullHandler)).expect_err("duplicate must fail");
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn unknown_handler_lookup_fails() {
        let registry = HandlerRegistry::new();
        assert!(matches!(registry.resolve("ghost"), Err(CoreError::UnknownHandler(_))));
    }
}
