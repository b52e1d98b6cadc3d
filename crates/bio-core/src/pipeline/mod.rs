//! Definiciones relacionadas a pipelines y etapas.
//!
//! Un pipeline es una lista ordenada y lineal de `StageDescriptor`; el
//! mismo pipeline sirve a handlers con perfiles de capacidad distintos
//! gracias al predicado de participación de cada etapa (sin ramificar la
//! definición).

pub mod definition;
pub mod descriptor;
pub mod registry;

pub use definition::PipelineDefinition;
pub use descriptor::{CompleteFn, HandlerStage, ParticipatesFn, Stage, StageDescriptor, StageFactoryFn, StageKind};
pub use registry::PipelineRegistry;
