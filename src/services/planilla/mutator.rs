//! Mutación de la planilla: bajas, altas y resaltado
//!
//! Opera sobre una copia en memoria del libro subido y devuelve un libro
//! nuevo: el original no se toca, así descargas repetidas con distintos
//! conjuntos de cambios siempre salen del mismo punto de partida.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::models::Record;
use crate::services::ranks::{self, abbreviate_rank};
use crate::utils::normalization::{fold_lower, normalize_name};
use crate::utils::{AppError, AppResult};

use super::grid::{Cell, CellStyle, CellValue, Libro, Planilla};

/// Relleno amarillo con el que se marca toda celda tocada
pub const RELLENO_RESALTADO: u32 = 0xFFFF00;

/// Texto que marca la fila ancla: las altas se insertan ahí, empujándola
const MARCADOR_INSERCION: &str = "total";

/// Ventana de escaneo para detectar la columna de jerarquías
const FILAS_ESCANEO: u32 = 50;
const COLUMNAS_ESCANEO: u16 = 20;

/// Autómata multi-patrón sobre las claves de la tabla de jerarquías
static PATRONES_JERARQUIA: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(ranks::patterns()).expect("patrones de jerarquía válidos")
});

/// Detecta (columna de jerarquías, columna de nombres) por contenido
///
/// Cuenta por columna cuántas celdas de la ventana de escaneo contienen
/// alguna clave de la tabla de equivalencias; gana la columna con más
/// aciertos y la de nombres es la inmediata a su derecha.
pub fn detect_columns(hoja: &Planilla) -> AppResult<(u16, u16)> {
    let fila_tope = hoja.max_row().min(FILAS_ESCANEO);
    let mut conteos = vec![0usize; COLUMNAS_ESCANEO as usize];

    for fila in 0..=fila_tope {
        for columna in 0..COLUMNAS_ESCANEO {
            if let Some(texto) = hoja.cell_text(fila, columna) {
                if PATRONES_JERARQUIA.is_match(&fold_lower(texto)) {
                    conteos[columna as usize] += 1;
                }
            }
        }
    }

    let (mejor_columna, aciertos) = conteos
        .iter()
        .enumerate()
        .max_by_key(|(_, aciertos)| **aciertos)
        .unwrap_or((0, &0));

    if *aciertos == 0 {
        return Err(AppError::ColumnDetection(format!(
            "ninguna celda de la hoja '{}' contiene jerarquías",
            hoja.name
        )));
    }

    debug!(
        "columna de jerarquías: {} ({} aciertos)",
        mejor_columna, aciertos
    );
    Ok((mejor_columna as u16, mejor_columna as u16 + 1))
}

/// Borra de la planilla los nombres dados y resalta las celdas tocadas
///
/// Devuelve un libro nuevo; el de entrada queda intacto.
pub fn limpiar(libro: &Libro, bajas: &[String]) -> AppResult<Libro> {
    aplicar(libro, bajas, &[])
}

/// Borra las bajas e inserta las altas en la fila ancla, copiando el
/// estilo de la fila plantilla y resaltando todo lo tocado
pub fn actualizar(libro: &Libro, bajas: &[String], altas: &[Record]) -> AppResult<Libro> {
    aplicar(libro, bajas, altas)
}

fn aplicar(libro: &Libro, bajas: &[String], altas: &[Record]) -> AppResult<Libro> {
    let indice = libro
        .hoja_preferida()
        .ok_or_else(|| AppError::Mutation("el libro no tiene hojas".to_string()))?;

    let mut nuevo = libro.clone();
    let hoja = &mut nuevo.hojas[indice];
    let (col_jerarquia, col_nombre) = detect_columns(hoja)?;

    // Las celdas tocadas se juntan acá y el resaltado se aplica al final,
    // después de la copia de estilos, para que no lo pise la plantilla.
    let mut tocadas: Vec<(u32, u16)> = Vec::new();

    let borradas = aplicar_bajas(hoja, bajas, col_jerarquia, col_nombre, &mut tocadas);

    if !altas.is_empty() {
        aplicar_altas(hoja, altas, col_jerarquia, col_nombre, &mut tocadas)?;
    }

    for (fila, columna) in tocadas {
        hoja.fill_at_anchor(fila, columna, RELLENO_RESALTADO);
    }

    info!(
        "✅ Planilla corregida: {} bajas, {} altas",
        borradas,
        altas.len()
    );
    Ok(nuevo)
}

fn aplicar_bajas(
    hoja: &mut Planilla,
    bajas: &[String],
    col_jerarquia: u16,
    col_nombre: u16,
    tocadas: &mut Vec<(u32, u16)>,
) -> usize {
    let objetivos: HashSet<String> = bajas
        .iter()
        .map(|nombre| normalize_name(nombre))
        .filter(|nombre| !nombre.is_empty())
        .collect();
    if objetivos.is_empty() {
        return 0;
    }

    let mut borradas = 0usize;
    for fila in 0..=hoja.max_row() {
        let nombre_celda = match hoja.cell_text(fila, col_nombre) {
            Some(texto) => normalize_name(texto),
            None => continue,
        };
        if nombre_celda.is_empty() || !objetivos.contains(&nombre_celda) {
            continue;
        }
        hoja.clear_value(fila, col_jerarquia);
        hoja.clear_value(fila, col_nombre);
        tocadas.push((fila, col_jerarquia));
        tocadas.push((fila, col_nombre));
        borradas += 1;
    }
    borradas
}

fn aplicar_altas(
    hoja: &mut Planilla,
    altas: &[Record],
    col_jerarquia: u16,
    col_nombre: u16,
    tocadas: &mut Vec<(u32, u16)>,
) -> AppResult<()> {
    let ancla = buscar_fila_ancla(hoja).ok_or_else(|| {
        AppError::Mutation(format!(
            "no se encontró la fila ancla '{}' en la hoja '{}'",
            MARCADOR_INSERCION.to_uppercase(),
            hoja.name
        ))
    })?;
    if ancla == 0 {
        return Err(AppError::Mutation(
            "la fila ancla está en la primera fila: no hay fila plantilla".to_string(),
        ));
    }
    let fila_plantilla = ancla - 1;

    hoja.insert_rows(ancla, altas.len() as u32);

    // Estilos y alto de la fila plantilla, copiados antes de escribir
    let estilos_plantilla: Vec<(u16, CellStyle)> = hoja
        .cells
        .range((fila_plantilla, 0)..=(fila_plantilla, u16::MAX))
        .map(|((_, columna), celda)| (*columna, celda.style.clone()))
        .collect();
    let meta_plantilla = hoja.row_meta.get(&fila_plantilla).copied();

    for (desplazamiento, registro) in altas.iter().enumerate() {
        let fila = ancla + desplazamiento as u32;

        for (columna, estilo) in &estilos_plantilla {
            hoja.cells.insert(
                (fila, *columna),
                Cell {
                    value: CellValue::Empty,
                    style: estilo.clone(),
                },
            );
        }
        if let Some(meta) = meta_plantilla {
            hoja.row_meta.insert(fila, meta);
        }

        let jerarquia = abbreviate_rank(&registro.normalized_rank);
        escribir_conservando_estilo(hoja, fila, col_jerarquia, &jerarquia);
        escribir_conservando_estilo(hoja, fila, col_nombre, registro.raw_name.trim());
        tocadas.push((fila, col_jerarquia));
        tocadas.push((fila, col_nombre));
    }

    Ok(())
}

/// Escribe el texto sin pisar el estilo ya copiado de la plantilla
fn escribir_conservando_estilo(hoja: &mut Planilla, fila: u32, columna: u16, texto: &str) {
    match hoja.cells.get_mut(&(fila, columna)) {
        Some(celda) => celda.value = CellValue::Texto(texto.to_string()),
        None => {
            hoja.cells.insert((fila, columna), Cell::texto(texto));
        }
    }
}

/// Primera fila que contiene el texto marcador, en cualquier columna
fn buscar_fila_ancla(hoja: &Planilla) -> Option<u32> {
    hoja.cells
        .iter()
        .find(|((_, _), celda)| match &celda.value {
            CellValue::Texto(texto) => fold_lower(texto).contains(MARCADOR_INSERCION),
            _ => false,
        })
        .map(|((fila, _), _)| *fila)
}

/// Nombre del archivo de salida según el modo de corrección
pub fn nombre_archivo_salida(con_altas: bool, original: &str) -> String {
    if con_altas {
        format!("actualizada_{}", original)
    } else {
        format!("limpia_{}", original)
    }
}
