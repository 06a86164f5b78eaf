//! Ingesta de registros: texto pegado o planilla
//!
//! Produce la secuencia ordenada de pares (jerarquía cruda, nombre crudo)
//! que consume el motor. La fila de encabezado se detecta por palabras
//! clave; con menos de dos columnas la ingesta falla completa y no se
//! publica resultado parcial.

use tracing::debug;

use crate::models::Record;
use crate::services::planilla::{detect_columns, Planilla};
use crate::utils::{AppError, AppResult};
use crate::utils::normalization::fold_lower;

/// Palabras clave que delatan una fila de encabezado
const CLAVES_ENCABEZADO: &[&str] = &["jerarquia", "grado", "apellido", "nombre"];

/// Parsea un bloque de texto pegado (separado por tabs; `;` o `,` de respaldo)
pub fn from_text(texto: &str) -> AppResult<Vec<(String, String)>> {
    let lineas: Vec<&str> = texto
        .lines()
        .filter(|linea| !linea.trim().is_empty())
        .collect();
    if lineas.is_empty() {
        return Err(AppError::Ingest("el texto pegado está vacío".to_string()));
    }

    let separador = detectar_separador(&lineas);
    let mut filas: Vec<Vec<String>> = Vec::with_capacity(lineas.len());
    for linea in &lineas {
        let celdas: Vec<String> = linea
            .split(separador)
            .map(|celda| celda.trim().to_string())
            .collect();
        if celdas.len() < 2 {
            return Err(AppError::Ingest(format!(
                "se esperaban al menos dos columnas y se encontró: '{}'",
                linea.trim()
            )));
        }
        filas.push(celdas);
    }

    // Encabezado: la primera celda contiene alguna palabra clave
    let primera = fold_lower(&filas[0][0]);
    if CLAVES_ENCABEZADO.iter().any(|clave| primera.contains(clave)) {
        debug!("fila de encabezado detectada: '{}'", filas[0][0]);
        filas.remove(0);
    }

    Ok(filas
        .into_iter()
        .map(|mut celdas| {
            let nombre = std::mem::take(&mut celdas[1]);
            let jerarquia = std::mem::take(&mut celdas[0]);
            (jerarquia, nombre)
        })
        .collect())
}

/// Extrae los pares (jerarquía, nombre) de una planilla ya leída,
/// detectando las columnas por contenido
pub fn from_planilla(planilla: &Planilla) -> AppResult<Vec<(String, String)>> {
    let (col_jerarquia, col_nombre) = detect_columns(planilla)?;
    let mut pares = Vec::new();
    for fila in 0..=planilla.max_row() {
        let jerarquia = planilla.cell_text(fila, col_jerarquia).unwrap_or_default();
        let nombre = planilla.cell_text(fila, col_nombre).unwrap_or_default();
        if jerarquia.trim().is_empty() && nombre.trim().is_empty() {
            continue;
        }
        pares.push((jerarquia.trim().to_string(), nombre.trim().to_string()));
    }
    Ok(pares)
}

/// Construye los registros definitivos, normalizando una sola vez
pub fn build_records(pares: &[(String, String)]) -> Vec<Record> {
    pares
        .iter()
        .enumerate()
        .map(|(indice, (jerarquia, nombre))| Record::new(jerarquia, nombre, indice))
        .collect()
}

fn detectar_separador(lineas: &[&str]) -> char {
    if lineas.iter().any(|linea| linea.contains('\t')) {
        '\t'
    } else if lineas.iter().any(|linea| linea.contains(';')) {
        ';'
    } else {
        ','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texto_con_tabs_sin_encabezado() {
        let texto = "OF PPAL\tJuan Pérez\nINSPECTOR\tMaria Lopez\n";
        let pares = from_text(texto).expect("ingesta válida");
        assert_eq!(pares.len(), 2);
        assert_eq!(pares[0], ("OF PPAL".to_string(), "Juan Pérez".to_string()));
    }

    #[test]
    fn test_encabezado_se_descarta() {
        let texto = "Jerarquía\tApellido y Nombre\nOF PPAL\tJuan Pérez";
        let pares = from_text(texto).expect("ingesta válida");
        assert_eq!(pares.len(), 1);
        assert_eq!(pares[0].1, "Juan Pérez");
    }

    #[test]
    fn test_columnas_extra_se_ignoran() {
        let texto = "OF PPAL\tJuan Pérez\t30\tpresente";
        let pares = from_text(texto).expect("ingesta válida");
        assert_eq!(pares, vec![("OF PPAL".to_string(), "Juan Pérez".to_string())]);
    }

    #[test]
    fn test_separador_punto_y_coma() {
        let texto = "OF PPAL;Juan Pérez\nCABO;Pedro Gómez";
        let pares = from_text(texto).expect("ingesta válida");
        assert_eq!(pares.len(), 2);
        assert_eq!(pares[1].0, "CABO");
    }

    #[test]
    fn test_una_sola_columna_falla() {
        let texto = "OF PPAL Juan Pérez";
        let resultado = from_text(texto);
        assert!(matches!(resultado, Err(AppError::Ingest(_))));
    }

    #[test]
    fn test_texto_vacio_falla() {
        assert!(matches!(from_text("   \n  "), Err(AppError::Ingest(_))));
    }

    #[test]
    fn test_build_records_conserva_el_orden() {
        let pares = vec![
            ("OF PPAL".to_string(), "Juan Pérez".to_string()),
            ("CABO".to_string(), "Pedro Gómez".to_string()),
        ];
        let registros = build_records(&pares);
        assert_eq!(registros[0].identity_key, "Juan Pérez#0");
        assert_eq!(registros[1].identity_key, "Pedro Gómez#1");
    }
}
