//! Registro del pipeline estándar de importación.
//!
//! Una sola definición `[init, process, commit]` sirve tanto al handler de
//! importación completa (worker) como al de anotación (sólo controller): la
//! etapa de proceso se omite sola vía capacidades.

use bio_core::{CoreError, PipelineRegistry, StageDescriptor};

/// Nombre con el que queda registrado el pipeline de importación.
pub const IMPORT_PIPELINE: &str = "sequence_import";

pub fn import_pipeline_stages() -> Vec<StageDescriptor> {
    vec![StageDescriptor::init("import_init", "validating inputs").with_input_file_types(&["fasta", "fastq"])
                                                                  .with_action_names(&["validate_inputs",
                                                                                       "annotate_inputs"]),
         StageDescriptor::process("import_process", "importing sequences").with_input_file_types(&["fasta",
                                                                                                   "fastq"])
                                                                          .with_action_names(&["import_sequences"]),
         StageDescriptor::commit("import_commit", "registering outputs").with_action_names(&["write_report"])]
}

pub fn register_import_pipeline(registry: &mut PipelineRegistry) -> Result<(), CoreError> {
    registry.register(IMPORT_PIPELINE,
                      &["fasta", "fastq"],
                      import_pipeline_stages(),
                      "Importing sequences")
}
