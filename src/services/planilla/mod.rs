//! Planilla: modelo en memoria, mutación y archivos .xlsx

pub mod grid;
pub mod mutator;
pub mod xlsx;

pub use grid::{Cell, CellStyle, CellValue, Libro, MergeRange, Planilla, RowMeta};
pub use mutator::{
    actualizar, detect_columns, limpiar, nombre_archivo_salida, RELLENO_RESALTADO,
};
pub use xlsx::{escribir_buffer, leer_libro, leer_libro_bytes};
