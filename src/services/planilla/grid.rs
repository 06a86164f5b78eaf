//! Modelo en memoria de la planilla
//!
//! Grilla explícita de celdas con estilos, más un índice separado de
//! rangos combinados y metadatos por fila (alto, visibilidad). Toda
//! operación de estilo a nivel celda debe resolver primero el ancla del
//! rango combinado: pintar una celda no-ancla de un rango combinado no
//! tiene efecto visible en la mayoría de los visores.

use std::collections::BTreeMap;

/// Rango de celdas combinadas, extremos inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl MergeRange {
    pub fn contains(&self, fila: u32, columna: u16) -> bool {
        (self.first_row..=self.last_row).contains(&fila)
            && (self.first_col..=self.last_col).contains(&columna)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    #[default]
    None,
    Hair,
    Thin,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    pub bold: bool,
    pub size: Option<f64>,
    pub color: Option<u32>,
}

/// Estilo de una celda: fuente, borde, relleno, formato numérico y alineación
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellStyle {
    pub font: Font,
    pub border: BorderKind,
    /// Relleno sólido RGB, `None` = sin relleno
    pub fill: Option<u32>,
    pub number_format: Option<String>,
    pub align: HAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Texto(String),
    Numero(f64),
    Logico(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn texto(valor: &str) -> Self {
        Self {
            value: CellValue::Texto(valor.to_string()),
            style: CellStyle::default(),
        }
    }
}

/// Alto y visibilidad de una fila
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowMeta {
    pub height: Option<f64>,
    pub hidden: bool,
}

/// Una hoja: nombre, celdas dispersas, combinadas y metadatos de fila
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Planilla {
    pub name: String,
    pub cells: BTreeMap<(u32, u16), Cell>,
    pub merges: Vec<MergeRange>,
    pub row_meta: BTreeMap<u32, RowMeta>,
}

impl Planilla {
    pub fn new(nombre: &str) -> Self {
        Self {
            name: nombre.to_string(),
            ..Self::default()
        }
    }

    pub fn set_text(&mut self, fila: u32, columna: u16, valor: &str) {
        self.cells.insert((fila, columna), Cell::texto(valor));
    }

    pub fn set_number(&mut self, fila: u32, columna: u16, valor: f64) {
        self.cells.insert(
            (fila, columna),
            Cell {
                value: CellValue::Numero(valor),
                style: CellStyle::default(),
            },
        );
    }

    pub fn cell(&self, fila: u32, columna: u16) -> Option<&Cell> {
        self.cells.get(&(fila, columna))
    }

    /// Texto de la celda, si la celda existe y es textual
    pub fn cell_text(&self, fila: u32, columna: u16) -> Option<&str> {
        match self.cells.get(&(fila, columna)) {
            Some(Cell {
                value: CellValue::Texto(texto),
                ..
            }) => Some(texto.as_str()),
            _ => None,
        }
    }

    /// Última fila con contenido (0 si la hoja está vacía)
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(fila, _)| *fila).max().unwrap_or(0)
    }

    /// Última columna con contenido (0 si la hoja está vacía)
    pub fn max_col(&self) -> u16 {
        self.cells
            .keys()
            .map(|(_, columna)| *columna)
            .max()
            .unwrap_or(0)
    }

    /// Resuelve el ancla del rango combinado que contiene a la celda;
    /// una celda fuera de todo rango es su propia ancla
    pub fn merge_anchor(&self, fila: u32, columna: u16) -> (u32, u16) {
        self.merges
            .iter()
            .find(|rango| rango.contains(fila, columna))
            .map(|rango| (rango.first_row, rango.first_col))
            .unwrap_or((fila, columna))
    }

    /// Borra el valor de la celda conservando su estilo
    pub fn clear_value(&mut self, fila: u32, columna: u16) {
        if let Some(celda) = self.cells.get_mut(&(fila, columna)) {
            celda.value = CellValue::Empty;
        }
    }

    /// Aplica un relleno sólido en el ancla del rango combinado de la celda
    pub fn fill_at_anchor(&mut self, fila: u32, columna: u16, rgb: u32) {
        let ancla = self.merge_anchor(fila, columna);
        let celda = self.cells.entry(ancla).or_insert_with(|| Cell {
            value: CellValue::Empty,
            style: CellStyle::default(),
        });
        celda.style.fill = Some(rgb);
    }

    /// Inserta `cantidad` filas en blanco en la posición `en`
    ///
    /// Desplaza hacia abajo celdas, metadatos de fila y rangos combinados
    /// que empiecen en `en` o después; los rangos que cruzan el punto de
    /// inserción solo extienden su fin, el inicio no se mueve.
    pub fn insert_rows(&mut self, en: u32, cantidad: u32) {
        if cantidad == 0 {
            return;
        }

        let celdas_viejas = std::mem::take(&mut self.cells);
        self.cells = celdas_viejas
            .into_iter()
            .map(|((fila, columna), celda)| {
                let fila_nueva = if fila >= en { fila + cantidad } else { fila };
                ((fila_nueva, columna), celda)
            })
            .collect();

        let metadatos_viejos = std::mem::take(&mut self.row_meta);
        self.row_meta = metadatos_viejos
            .into_iter()
            .map(|(fila, meta)| {
                let fila_nueva = if fila >= en { fila + cantidad } else { fila };
                (fila_nueva, meta)
            })
            .collect();

        for rango in &mut self.merges {
            if rango.first_row >= en {
                rango.first_row += cantidad;
                rango.last_row += cantidad;
            } else if rango.last_row >= en {
                rango.last_row += cantidad;
            }
        }
    }
}

/// Un libro: hojas en el orden del archivo
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Libro {
    pub hojas: Vec<Planilla>,
}

impl Libro {
    /// Hoja a corregir: la primera cuyo nombre mencione la lista de
    /// servicio, o en su defecto la primera del libro
    pub fn hoja_preferida(&self) -> Option<usize> {
        use crate::utils::normalization::fold_lower;

        let preferida = self.hojas.iter().position(|hoja| {
            let nombre = fold_lower(&hoja.name);
            nombre.contains("lista") || nombre.contains("servicio")
        });
        preferida.or(if self.hojas.is_empty() { None } else { Some(0) })
    }
}
