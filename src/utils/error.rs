//! Tipos de error del comparador

use thiserror::Error;

/// Errores de la aplicación
///
/// La ingesta y la detección de columnas son terminales para la corrida;
/// los errores de mutación de planilla no invalidan el análisis ya calculado.
#[derive(Debug, Error)]
pub enum AppError {
    /// Texto pegado o archivo con formato inválido (menos de dos columnas)
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// Ninguna columna de la planilla contiene jerarquías reconocibles
    #[error("Rank column not found: {0}")]
    ColumnDetection(String),

    /// Hoja o fila ancla no encontrada, o error estructural al mutar
    #[error("Workbook mutation error: {0}")]
    Mutation(String),

    /// Error de configuración
    #[error("Configuration error: {0}")]
    Config(String),

    /// Umbrales fuera de rango
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error de E/S
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error leyendo el archivo .xlsx
    #[error("Workbook read error: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),

    /// Error serializando el archivo .xlsx
    #[error("Workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),
}

/// Tipo Result estándar del crate
pub type AppResult<T> = std::result::Result<T, AppError>;
