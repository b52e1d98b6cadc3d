//! Stage descriptors: the static declaration of one pipeline stage.
//!
//! Un `StageDescriptor` es un único record sin estado de runtime: identidad,
//! metadatos de presentación y tres valores-estrategia (`participates`,
//! `is_complete`, factory de `Stage`). Sin jerarquías de factories ni
//! dispatch virtual encadenado: cambiar el comportamiento de una etapa es
//! reemplazar una closure.

use std::fmt;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::handler::Handler;
use crate::job::Job;
use crate::model::JobContext;

/// Tipo general de la etapa. Decide la fase del `Handler` que ejecuta el
/// stage por defecto y la política de participación por defecto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Preparación en el host controller.
    Init,
    /// Procesamiento en el host worker.
    Process,
    /// Registro terminal de salidas (controller).
    Commit,
}

/// Unidad ejecutable de una etapa, ligada a un job en el momento de correr.
pub trait Stage {
    fn run(&self, ctx: &mut JobContext<'_>, handler: &dyn Handler) -> Result<(), CoreError>;
}

/// Stage de serie: despacha a la fase del handler que corresponde al kind.
pub struct HandlerStage {
    kind: StageKind,
}

impl HandlerStage {
    pub fn new(kind: StageKind) -> Self {
        Self { kind }
    }
}

impl Stage for HandlerStage {
    fn run(&self, ctx: &mut JobContext<'_>, handler: &dyn Handler) -> Result<(), CoreError> {
        match self.kind {
            StageKind::Init => handler.init(ctx),
            StageKind::Process => handler.process(ctx),
            StageKind::Commit => handler.finalize(ctx),
        }
    }
}

pub type ParticipatesFn = Arc<dyn Fn(&Job, &dyn Handler) -> bool + Send + Sync>;
pub type CompleteFn = Arc<dyn Fn(&Job) -> bool + Send + Sync>;
pub type StageFactoryFn = Arc<dyn Fn(&Job) -> Box<dyn Stage> + Send + Sync>;

#[derive(Clone)]
pub struct StageDescriptor {
    id: String,
    kind: StageKind,
    status_label: String,
    input_file_types: Vec<String>,
    action_names: Vec<String>,
    needs_staging: bool,
    participates: ParticipatesFn,
    is_complete: CompleteFn,
    factory: StageFactoryFn,
}

impl StageDescriptor {
    /// Descriptor con defaults por kind:
    /// - participación: Init exige `runs_on_controller`, Process exige
    ///   `runs_on_worker`, Commit participa siempre;
    /// - `is_complete`: falso (sin resume especial);
    /// - factory: `HandlerStage` del mismo kind;
    /// - staging: todas menos Commit.
    pub fn new(id: impl Into<String>, kind: StageKind, status_label: impl Into<String>) -> Self {
        let participates: ParticipatesFn = match kind {
            StageKind::Init => Arc::new(|_: &Job, h: &dyn Handler| h.capabilities().runs_on_controller),
            StageKind::Process => Arc::new(|_: &Job, h: &dyn Handler| h.capabilities().runs_on_worker),
            StageKind::Commit => Arc::new(|_: &Job, _: &dyn Handler| true),
        };
        Self { id: id.into(),
               kind,
               status_label: status_label.into(),
               input_file_types: Vec::new(),
               action_names: Vec::new(),
               needs_staging: !matches!(kind, StageKind::Commit),
               participates,
               is_complete: Arc::new(|_: &Job| false),
               factory: Arc::new(move |_: &Job| Box::new(HandlerStage::new(kind)) as Box<dyn Stage>) }
    }

    pub fn init(id: impl Into<String>, status_label: impl Into<String>) -> Self {
        Self::new(id, StageKind::Init, status_label)
    }

    pub fn process(id: impl Into<String>, status_label: impl Into<String>) -> Self {
        Self::new(id, StageKind::Process, status_label)
    }

    pub fn commit(id: impl Into<String>, status_label: impl Into<String>) -> Self {
        Self::new(id, StageKind::Commit, status_label)
    }

    // ---- builder ----

    pub fn with_input_file_types(mut self, types: &[&str]) -> Self {
        self.input_file_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_action_names(mut self, names: &[&str]) -> Self {
        self.action_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_participates(mut self, f: impl Fn(&Job, &dyn Handler) -> bool + Send + Sync + 'static) -> Self {
        self.participates = Arc::new(f);
        self
    }

    pub fn with_is_complete(mut self, f: impl Fn(&Job) -> bool + Send + Sync + 'static) -> Self {
        self.is_complete = Arc::new(f);
        self
    }

    pub fn with_factory(mut self, f: impl Fn(&Job) -> Box<dyn Stage> + Send + Sync + 'static) -> Self {
        self.factory = Arc::new(f);
        self
    }

    /// Para etapas que no tocan archivos: sin WorkDirectory.
    pub fn without_staging(mut self) -> Self {
        self.needs_staging = false;
        self
    }

    pub fn with_staging(mut self) -> Self {
        self.needs_staging = true;
        self
    }

    // ---- lectura / evaluación ----

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Etiqueta legible usada por el scheduler externo para reportar estado.
    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn input_file_types(&self) -> &[String] {
        &self.input_file_types
    }

    /// Nombres de acciones de proveniencia que la etapa puede emitir.
    pub fn action_names(&self) -> &[String] {
        &self.action_names
    }

    pub fn needs_staging(&self) -> bool {
        self.needs_staging
    }

    pub fn participates(&self, job: &Job, handler: &dyn Handler) -> bool {
        (self.participates)(job, handler)
    }

    /// Evaluado antes de re-entrar en resume: si es `true`, la etapa se
    /// omite por completo confiando en el juicio del descriptor.
    pub fn is_complete(&self, job: &Job) -> bool {
        (self.is_complete)(job)
    }

    pub fn create_stage(&self, job: &Job) -> Box<dyn Stage> {
        (self.factory)(job)
    }
}

impl fmt::Debug for StageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageDescriptor")
         .field("id", &self.id)
         .field("kind", &self.kind)
         .field("status_label", &self.status_label)
         .field("needs_staging", &self.needs_staging)
         .finish()
    }
}
