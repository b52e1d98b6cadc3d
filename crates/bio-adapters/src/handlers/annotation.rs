//! AnnotationHandler: variante sólo-controller.
//!
//! No tiene trabajo del lado worker (`runs_on_worker = false`), así que la
//! etapa de proceso del pipeline compartido se omite para sus jobs. Todo su
//! trabajo ocurre en `init`: anota las entradas declaradas y emite el
//! archivo de anotaciones como salida final.

use std::fs;

use bio_core::{ArtifactCategory, CoreError, FileClass, Handler, HandlerCapabilities, JobContext, OutputArtifact,
               RecordedAction};

pub struct AnnotationHandler;

impl Handler for AnnotationHandler {
    fn id(&self) -> &str {
        "annotation_only"
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::controller_only()
    }

    fn init(&self, ctx: &mut JobContext<'_>) -> Result<(), CoreError> {
        let work_dir = ctx.work_dir()
                          .ok_or_else(|| CoreError::Internal("init requiere staging".into()))?;

        let mut annotations = String::from("# annotations\n");
        let mut action = RecordedAction::new("annotate_inputs").output("annotations.txt");
        for input in ctx.staged_inputs() {
            if let Some(name) = input.file_name().and_then(|n| n.to_str()) {
                annotations.push_str(&format!("{name}\tdeclared-input\n"));
                action = action.input(name.to_string());
            }
        }

        let path = work_dir.local_path("annotations.txt");
        fs::write(&path, annotations).map_err(|e| CoreError::StagingIo(format!("escribiendo anotaciones: {e}")))?;

        ctx.track(path, FileClass::FinalOutput);
        ctx.queue_output(OutputArtifact::new(ArtifactCategory::Report,
                                             ctx.output_dir().join("annotations.txt")));
        ctx.record(action);
        Ok(())
    }
}
