use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Inicializa el suscriptor global de tracing
///
/// Respeta `RUST_LOG`; con `verbose` baja el piso a `debug`.
pub fn init_tracing(verbose: bool) {
    let nivel_defecto = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(nivel_defecto));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn log_analisis_terminado(faltan: usize, sobran: usize, dudosos: usize) {
    info!(
        "✅ Análisis terminado: {} faltan, {} sobran, {} dudosos",
        faltan, sobran, dudosos
    );
}

pub fn log_mutacion_fallida(motivo: &str) {
    warn!("⚠️ No se pudo corregir la planilla: {}", motivo);
}
