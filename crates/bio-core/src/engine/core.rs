//! Core JobEngine implementation

use log::{debug, info, warn};

use crate::errors::CoreError;
use crate::handler::{Handler, HandlerRegistry};
use crate::job::{Job, JobStatus};
use crate::model::JobContext;
use crate::pipeline::{PipelineRegistry, StageDescriptor, StageKind};
use crate::registrar::{Catalog, CommitReport, OutputRegistrar};
use crate::staging::{FileManager, StagingArea};

/// Motor de avance de jobs a través de su secuencia de etapas.
///
/// Responsable de evaluar participación y resume, adquirir y liberar el
/// staging con limpieza garantizada, fusionar proveniencia en orden de
/// finalización de etapas y disparar el commit terminal. El scheduling
/// entre jobs es de un motor externo: este engine avanza UN job, de forma
/// estrictamente secuencial, mientras sostiene su `&mut Job`.
pub struct JobEngine<C: Catalog> {
    pipelines: PipelineRegistry,
    handlers: HandlerRegistry,
    staging: StagingArea,
    registrar: OutputRegistrar<C>,
}

impl<C: Catalog> JobEngine<C> {
    pub fn new(pipelines: PipelineRegistry, handlers: HandlerRegistry, staging: StagingArea, catalog: C) -> Self {
        Self { pipelines,
               handlers,
               staging,
               registrar: OutputRegistrar::new(catalog) }
    }

    pub fn pipelines(&self) -> &PipelineRegistry {
        &self.pipelines
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn registrar(&self) -> &OutputRegistrar<C> {
        &self.registrar
    }

    /// Commit explícito fuera del flujo normal (re-impulso de una cola que
    /// quedó pendiente tras un fallo del catálogo).
    pub fn commit_outputs(&mut self, job: &mut Job) -> CommitReport {
        self.registrar.commit(job)
    }

    /// Avanza exactamente una etapa: la primera cuyo `is_complete` es falso
    /// y en la que el handler participa. Devuelve `false` cuando no quedan
    /// etapas por correr (y el job queda `Complete`).
    ///
    /// Pensado para schedulers externos que persisten el job entre etapas y
    /// pueden cancelarlo en la frontera; la posición de re-entrada la juzgan
    /// los propios descriptors vía `is_complete`.
    pub fn advance(&mut self, job: &mut Job) -> Result<bool, CoreError> {
        if job.is_terminal() {
            return Err(CoreError::JobTerminal);
        }
        let definition = self.pipelines.resolve(job.pipeline())?;
        let handler = self.handlers.resolve(job.handler_id()?)?;
        job.mark_running();

        for descriptor in definition.stages() {
            if descriptor.is_complete(job) {
                continue;
            }
            if !descriptor.participates(job, handler.as_ref()) {
                info!("job {}: etapa '{}' omitida, handler '{}' no participa",
                      job.id(),
                      descriptor.id(),
                      handler.id());
                continue;
            }
            return match self.run_stage(job, descriptor, handler.as_ref()) {
                Ok(()) => Ok(true),
                Err(e) => {
                    let error = match e {
                        e @ CoreError::StageExecution(_) => e,
                        other => CoreError::StageExecution(format!("etapa '{}': {other}", descriptor.id())),
                    };
                    job.mark_failed(error.to_string());
                    Err(error)
                }
            };
        }

        job.mark_complete();
        Ok(false)
    }

    /// Ejecuta el job desde la primera etapa no completa hasta el final.
    ///
    /// Resume idempotente: las etapas cuyo `is_complete` devuelve `true` se
    /// omiten por completo, así que re-entrar tras un crash retoma en la
    /// primera etapa incompleta preservando el orden original.
    pub fn run(&mut self, job: &mut Job) -> Result<(), CoreError> {
        if job.is_terminal() {
            return Err(CoreError::JobTerminal);
        }
        let definition = self.pipelines.resolve(job.pipeline())?;
        let handler = self.handlers.resolve(job.handler_id()?)?;
        job.mark_running();

        for descriptor in definition.stages() {
            if job.status() == JobStatus::Cancelled {
                info!("job {}: cancelado; no se avanza más allá de la etapa actual", job.id());
                return Ok(());
            }
            if descriptor.is_complete(job) {
                info!("job {}: etapa '{}' ya completa, se omite", job.id(), descriptor.id());
                continue;
            }
            if !descriptor.participates(job, handler.as_ref()) {
                // sin WorkDirectory, sin acciones: la omisión sólo se loguea
                info!("job {}: etapa '{}' omitida, handler '{}' no participa",
                      job.id(),
                      descriptor.id(),
                      handler.id());
                continue;
            }

            if let Err(e) = self.run_stage(job, descriptor, handler.as_ref()) {
                let error = match e {
                    e @ CoreError::StageExecution(_) => e,
                    other => CoreError::StageExecution(format!("etapa '{}': {other}", descriptor.id())),
                };
                job.mark_failed(error.to_string());
                return Err(error);
            }
        }

        if job.status() != JobStatus::Cancelled {
            job.mark_complete();
        }
        Ok(())
    }

    /// Una ejecución de etapa: staging -> stage -> limpieza garantizada ->
    /// fusión en el job -> commit si la etapa es terminal.
    fn run_stage(&mut self, job: &mut Job, descriptor: &StageDescriptor, handler: &dyn Handler) -> Result<(), CoreError> {
        debug!("job {}: etapa '{}' ({})", job.id(), descriptor.id(), descriptor.status_label());

        let (work_dir, files) = if descriptor.needs_staging() {
            let (wd, fm) = self.staging.acquire(job, descriptor.id())?;
            (Some(wd), fm)
        } else {
            (None, FileManager::new())
        };

        let stage = descriptor.create_stage(job);
        let mut ctx = JobContext::new(job, files, work_dir);
        let outcome = stage.run(&mut ctx, handler);
        let (mut files, work_dir, actions, queued) = ctx.into_parts();

        // Limpieza garantizada: corre también cuando la etapa falló, para
        // que intermedios a medio escribir no sobrevivan a la etapa.
        files.delete_intermediate_files();
        files.cleanup(&actions);
        let released = match work_dir {
            Some(wd) => self.staging.release(wd, &files, job),
            None => Ok(()),
        };

        match outcome {
            Ok(()) => {
                released?;
                job.merge_actions(actions);
                job.queue_outputs(queued);
                if descriptor.kind() == StageKind::Commit {
                    let report = self.registrar.commit(job);
                    for failure in &report.failures {
                        warn!("job {}: artefacto '{}' no registrado: {}",
                              job.id(),
                              failure.path.display(),
                              failure.reason);
                    }
                    job.mark_provenance_complete();
                }
                Ok(())
            }
            Err(e) => {
                if let Err(release_err) = released {
                    warn!("job {}: release tras fallo de etapa '{}' también falló: {release_err}",
                          job.id(),
                          descriptor.id());
                }
                Err(e)
            }
        }
    }
}
