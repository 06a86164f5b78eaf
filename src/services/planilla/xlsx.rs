//! Lectura y escritura de archivos .xlsx
//!
//! La lectura (calamine) trae valores y rangos combinados al modelo en
//! memoria; la escritura (rust_xlsxwriter) serializa el modelo mutado a un
//! buffer de bytes listo para descargar. El libro de entrada nunca se
//! reescribe en el lugar.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use tracing::debug;

use crate::utils::AppResult;

use super::grid::{BorderKind, Cell, CellStyle, CellValue, HAlign, Libro, MergeRange, Planilla};

/// Lee un libro completo desde el disco
pub fn leer_libro(ruta: &Path) -> AppResult<Libro> {
    let mut workbook: Xlsx<_> = open_workbook(ruta)?;
    leer(&mut workbook)
}

/// Lee un libro completo desde un buffer en memoria
pub fn leer_libro_bytes(bytes: &[u8]) -> AppResult<Libro> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    leer(&mut workbook)
}

fn leer<RS: std::io::Read + std::io::Seek>(workbook: &mut Xlsx<RS>) -> AppResult<Libro> {
    workbook.load_merged_regions()?;
    let nombres = workbook.sheet_names().to_owned();

    let mut hojas = Vec::with_capacity(nombres.len());
    for nombre in &nombres {
        let rango = workbook.worksheet_range(nombre)?;
        let mut hoja = Planilla::new(nombre);

        let (fila_base, columna_base) = rango.start().unwrap_or((0, 0));
        for (fila, columna, dato) in rango.used_cells() {
            let posicion = (
                fila_base + fila as u32,
                (columna_base as usize + columna) as u16,
            );
            let valor = match dato {
                Data::String(texto) => CellValue::Texto(texto.clone()),
                Data::Float(numero) => CellValue::Numero(*numero),
                Data::Int(numero) => CellValue::Numero(*numero as f64),
                Data::Bool(valor) => CellValue::Logico(*valor),
                Data::DateTimeIso(texto) | Data::DurationIso(texto) => {
                    CellValue::Texto(texto.clone())
                }
                Data::DateTime(fecha) => CellValue::Numero(fecha.as_f64()),
                Data::Empty | Data::Error(_) => continue,
            };
            hoja.cells.insert(
                posicion,
                Cell {
                    value: valor,
                    style: CellStyle::default(),
                },
            );
        }

        for (_, _, dimensiones) in workbook.merged_regions_by_sheet(nombre) {
            hoja.merges.push(MergeRange {
                first_row: dimensiones.start.0,
                first_col: dimensiones.start.1 as u16,
                last_row: dimensiones.end.0,
                last_col: dimensiones.end.1 as u16,
            });
        }

        debug!(
            "hoja '{}' leída: {} celdas, {} rangos combinados",
            nombre,
            hoja.cells.len(),
            hoja.merges.len()
        );
        hojas.push(hoja);
    }

    Ok(Libro { hojas })
}

/// Serializa el libro a un buffer .xlsx
pub fn escribir_buffer(libro: &Libro) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for hoja in &libro.hojas {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&hoja.name)?;

        for (fila, meta) in &hoja.row_meta {
            if let Some(alto) = meta.height {
                worksheet.set_row_height(*fila, alto)?;
            }
            if meta.hidden {
                worksheet.set_row_hidden(*fila)?;
            }
        }

        // Rangos combinados primero: el valor y el formato van en el ancla
        for rango in &hoja.merges {
            let ancla = hoja.cell(rango.first_row, rango.first_col);
            let formato = formato_de(ancla.map(|celda| &celda.style));
            let texto = match ancla.map(|celda| &celda.value) {
                Some(CellValue::Texto(texto)) => texto.clone(),
                Some(CellValue::Numero(numero)) => numero.to_string(),
                Some(CellValue::Logico(valor)) => valor.to_string(),
                _ => String::new(),
            };
            worksheet.merge_range(
                rango.first_row,
                rango.first_col,
                rango.last_row,
                rango.last_col,
                &texto,
                &formato,
            )?;
        }

        for ((fila, columna), celda) in &hoja.cells {
            // Las celdas dentro de un rango combinado ya las cubrió merge_range
            if hoja.merges.iter().any(|rango| rango.contains(*fila, *columna)) {
                continue;
            }
            let formato = formato_de(Some(&celda.style));
            match &celda.value {
                CellValue::Texto(texto) => {
                    worksheet.write_string_with_format(*fila, *columna, texto, &formato)?
                }
                CellValue::Numero(numero) => {
                    worksheet.write_number_with_format(*fila, *columna, *numero, &formato)?
                }
                CellValue::Logico(valor) => {
                    worksheet.write_boolean_with_format(*fila, *columna, *valor, &formato)?
                }
                CellValue::Empty => worksheet.write_blank(*fila, *columna, &formato)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn formato_de(estilo: Option<&CellStyle>) -> Format {
    let mut formato = Format::new();
    let estilo = match estilo {
        Some(estilo) => estilo,
        None => return formato,
    };

    if estilo.font.bold {
        formato = formato.set_bold();
    }
    if let Some(tamano) = estilo.font.size {
        formato = formato.set_font_size(tamano);
    }
    if let Some(color) = estilo.font.color {
        formato = formato.set_font_color(Color::RGB(color));
    }
    formato = match estilo.border {
        BorderKind::None => formato,
        BorderKind::Hair => formato.set_border(FormatBorder::Hair),
        BorderKind::Thin => formato.set_border(FormatBorder::Thin),
        BorderKind::Medium => formato.set_border(FormatBorder::Medium),
    };
    if let Some(relleno) = estilo.fill {
        formato = formato.set_background_color(Color::RGB(relleno));
    }
    if let Some(numerico) = &estilo.number_format {
        formato = formato.set_num_format(numerico);
    }
    formato = match estilo.align {
        HAlign::General => formato,
        HAlign::Left => formato.set_align(FormatAlign::Left),
        HAlign::Center => formato.set_align(FormatAlign::Center),
        HAlign::Right => formato.set_align(FormatAlign::Right),
    };

    formato
}

#[cfg(test)]
mod tests {
    use super::*;

    fn libro_de_prueba() -> Libro {
        let mut hoja = Planilla::new("Lista de Servicio");
        hoja.set_text(0, 0, "LISTA DE SERVICIO");
        hoja.merges.push(MergeRange {
            first_row: 0,
            first_col: 0,
            last_row: 0,
            last_col: 2,
        });
        hoja.set_text(1, 0, "OF PPAL");
        hoja.set_text(1, 1, "Juan Pérez");
        hoja.set_number(2, 1, 42.0);
        Libro { hojas: vec![hoja] }
    }

    #[test]
    fn test_escribir_y_releer_valores() {
        let libro = libro_de_prueba();
        let buffer = escribir_buffer(&libro).expect("serialización válida");
        assert!(!buffer.is_empty());

        let releido = leer_libro_bytes(&buffer).expect("lectura válida");
        assert_eq!(releido.hojas.len(), 1);
        let hoja = &releido.hojas[0];
        assert_eq!(hoja.name, "Lista de Servicio");
        assert_eq!(hoja.cell_text(0, 0), Some("LISTA DE SERVICIO"));
        assert_eq!(hoja.cell_text(1, 0), Some("OF PPAL"));
        assert_eq!(hoja.cell_text(1, 1), Some("Juan Pérez"));
        assert_eq!(
            hoja.cell(2, 1).map(|celda| celda.value.clone()),
            Some(CellValue::Numero(42.0))
        );
    }

    #[test]
    fn test_rangos_combinados_sobreviven_el_viaje() {
        let libro = libro_de_prueba();
        let buffer = escribir_buffer(&libro).expect("serialización válida");
        let releido = leer_libro_bytes(&buffer).expect("lectura válida");

        assert_eq!(releido.hojas[0].merges.len(), 1);
        let rango = releido.hojas[0].merges[0];
        assert_eq!((rango.first_row, rango.first_col), (0, 0));
        assert_eq!((rango.last_row, rango.last_col), (0, 2));
    }

    #[test]
    fn test_escribir_en_disco() {
        let libro = libro_de_prueba();
        let buffer = escribir_buffer(&libro).expect("serialización válida");

        let directorio = tempfile::tempdir().expect("directorio temporal");
        let ruta = directorio.path().join("servicio.xlsx");
        std::fs::write(&ruta, &buffer).expect("escritura en disco");

        let releido = leer_libro(&ruta).expect("lectura desde disco");
        assert_eq!(releido.hojas[0].cell_text(1, 1), Some("Juan Pérez"));
    }
}
