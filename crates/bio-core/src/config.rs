//! Carga de configuración del área de staging desde variables de entorno.
//! Usa convención `BIOFLOW_STAGING_ROOT` con default al tmp del sistema.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::constants::ENV_STAGING_ROOT;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct StagingConfig {
    pub root: PathBuf,
}

impl StagingConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let root = env::var(ENV_STAGING_ROOT).map(PathBuf::from)
                                             .unwrap_or_else(|_| env::temp_dir().join("bioflow-staging"));
        Self { root }
    }

    /// Raíz explícita (tests y schedulers embebidos).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
