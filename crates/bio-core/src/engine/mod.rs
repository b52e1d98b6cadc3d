//! Engine module for JobEngine implementation
//!
//! Provides the orchestration loop that advances a job through its stage
//! sequence with conditional participation, guaranteed staging cleanup and
//! a single terminal commit.

pub mod core;

pub use core::JobEngine;

pub use crate::pipeline::{PipelineDefinition, PipelineRegistry, Stage, StageDescriptor, StageKind};
pub use crate::registrar::{Catalog, CommitReport, InMemoryCatalog, OutputRegistrar};
