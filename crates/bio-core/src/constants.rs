//! Constantes del core.
//!
//! Claves "bien conocidas" compartidas entre el engine, los handlers y la
//! configuración. Centralizarlas evita strings mágicos repartidos por el
//! código y mantiene estable el contrato de parámetros de un `Job`.

/// Clave del mapa de parámetros del job que identifica al `Handler` a
/// resolver en el `HandlerRegistry`. Un job sin esta clave no puede ejecutar
/// ninguna etapa.
pub const HANDLER_PARAM_KEY: &str = "handler";

/// Variable de entorno con la raíz del área de staging local al host.
pub const ENV_STAGING_ROOT: &str = "BIOFLOW_STAGING_ROOT";
