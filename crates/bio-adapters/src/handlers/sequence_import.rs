//! SequenceImportHandler: importación de archivos de secuencias.
//!
//! - `init` (controller): valida que cada entrada staged parezca un archivo
//!   de secuencias (FASTA `>` o FASTQ `@`). Un formato irreconocible es
//!   fatal para la etapa.
//! - `process` (worker): normaliza cada entrada (fin de línea, mayúsculas
//!   en las líneas de secuencia) pasando por un intermedio, emite el
//!   archivo importado como salida final y encola su artefacto con el
//!   conteo de secuencias como metadata.
//! - `finalize` (controller): escribe el reporte de importación directo en
//!   el directorio durable y lo encola para el mismo commit terminal.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use bio_core::{ArtifactCategory, CoreError, FileClass, Handler, HandlerCapabilities, JobContext, OutputArtifact,
               RecordedAction};

pub struct SequenceImportHandler;

/// Parámetros del handler; se decodifican del mapa de parámetros del job y
/// las claves desconocidas (p. ej. `handler`) se ignoran.
#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ImportParams {
    /// Genoma de referencia anotado en la metadata de los artefactos.
    pub genome: Option<String>,
}

impl ImportParams {
    /// Si los params no decodifican, usa defaults (mismo criterio que el
    /// resto de handlers: params malformados no rompen la etapa).
    fn from_ctx(ctx: &JobContext<'_>) -> Self {
        serde_json::from_value(Value::Object(ctx.params().clone())).unwrap_or_default()
    }
}

/// Normaliza un texto FASTA: recorta espacio al final de línea y pasa las
/// líneas de secuencia a mayúsculas. Devuelve el texto y el conteo de
/// registros.
fn normalize_sequences(raw: &str) -> (String, usize) {
    let mut out = String::with_capacity(raw.len());
    let mut records = 0;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.starts_with('>') || line.starts_with('@') {
            records += 1;
            out.push_str(line);
        } else {
            out.push_str(&line.to_ascii_uppercase());
        }
        out.push('\n');
    }
    (out, records)
}

fn looks_like_sequence_file(raw: &str) -> bool {
    raw.trim_start()
       .chars()
       .next()
       .map(|c| c == '>' || c == '@')
       .unwrap_or(false)
}

fn file_name(path: &Path) -> Result<&str, CoreError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CoreError::StagingIo(format!("path sin nombre de archivo: {}", path.display())))
}

fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

impl Handler for SequenceImportHandler {
    fn id(&self) -> &str {
        "fasta_import"
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::everywhere().with_archived_inputs()
    }

    fn init(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        let mut action = RecordedAction::new("validate_inputs");
        for input in ctx.staged_inputs() {
            let raw = fs::read_to_string(&input).map_err(|e| CoreError::StagingIo(format!("leyendo '{}': {e}", input.display())))?;
            if !looks_like_sequence_file(&raw) {
                return Err(CoreError::StageExecution(format!("'{}' no es un archivo de secuencias reconocible",
                                                             input.display())));
            }
            action = action.input(file_name(&input)?.to_string());
        }
        ctx.record(action);
        Ok(())
    }

    fn process(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        let staged = ctx.staged_inputs();
        let params = ImportParams::from_ctx(ctx);

        for input in &staged {
            let name = file_name(input)?.to_string();
            let raw = fs::read_to_string(input).map_err(|e| CoreError::StagingIo(format!("leyendo '{}': {e}", input.display())))?;
            let (normalized, records) = normalize_sequences(&raw);

            let work_dir = ctx.work_dir()
                              .ok_or_else(|| CoreError::Internal("process requiere staging".into()))?;
            let tmp = work_dir.local_path(&format!("{name}.norm.tmp"));
            fs::write(&tmp, &normalized).map_err(|e| CoreError::StagingIo(format!("escribiendo '{}': {e}", tmp.display())))?;

            let imported_name = format!("{}.imported.fasta", file_stem(&name));
            let out = work_dir.local_path(&imported_name);
            // el importado sale del intermedio normalizado, no del crudo
            fs::copy(&tmp, &out).map_err(|e| CoreError::StagingIo(format!("escribiendo '{}': {e}", out.display())))?;

            ctx.track(tmp, FileClass::Intermediate);
            ctx.track(out, FileClass::FinalOutput);

            let mut metadata = json!({ "records": records, "source": name });
            if let Some(genome) = &params.genome {
                metadata["genome"] = json!(genome);
            }
            let durable = ctx.output_dir().join(&imported_name);
            ctx.queue_output(OutputArtifact::new(ArtifactCategory::SequenceData, durable).with_metadata(metadata));

            ctx.record(RecordedAction::new("import_sequences").input(name).output(imported_name));
        }
        Ok(())
    }

    fn finalize(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        let pending = ctx.job().pending_outputs();
        let mut report = String::from("sequence import report\n");
        for artifact in pending {
            report.push_str(&format!("- {}\n", artifact.path.display()));
        }

        fs::create_dir_all(ctx.output_dir()).map_err(|e| CoreError::StagingIo(e.to_string()))?;
        let report_path = ctx.output_dir().join("import_report.txt");
        fs::write(&report_path, report).map_err(|e| CoreError::StagingIo(format!("escribiendo reporte: {e}")))?;

        let mut action = RecordedAction::new("write_report").output("import_report.txt");
        for artifact in ctx.job().pending_outputs() {
            if let Some(name) = artifact.path.file_name().and_then(|n| n.to_str()) {
                action = action.input(name.to_string());
            }
        }
        ctx.record(action);
        ctx.queue_output(OutputArtifact::new(ArtifactCategory::Report, report_path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_uppercases_sequence_lines_only() {
        let (normalized, records) = normalize_sequences(">seq1\r\nacgt\n>seq2\ntTgG\n");
        assert_eq!(normalized, ">seq1\nACGT\n>seq2\nTTGG\n");
        assert_eq!(records, 2);
    }

    #[test]
    fn recognizes_fasta_and_fastq_headers() {
        assert!(looks_like_sequence_file(">x\nACGT\n"));
        assert!(looks_like_sequence_file("@x\nACGT\n"));
        assert!(!looks_like_sequence_file("x,y,z\n1,2,3\n"));
        assert!(!looks_like_sequence_file(""));
    }

    #[test]
    fn stem_strips_last_extension_only() {
        assert_eq!(file_stem("reads.fasta"), "reads");
        assert_eq!(file_stem("reads.tar.gz"), "reads.tar");
        assert_eq!(file_stem("noext"), "noext");
    }
}
