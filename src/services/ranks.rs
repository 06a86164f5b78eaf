//! Jerarquías: equivalencias, normalización y abreviaturas
//!
//! La tabla de equivalencias es una lista ordenada de pares
//! (patrón, jerarquía canónica). El orden de iteración es parte del
//! contrato: en el barrido por subcadena gana la PRIMERA clave de la tabla
//! que aparezca dentro del texto, aunque más abajo exista una clave más
//! larga y específica. Cambiar el orden cambia resultados.

use crate::utils::normalization::fold_lower;

/// Equivalencias de jerarquías, de la más específica a la más genérica
pub const EQUIVALENCIAS: &[(&str, &str)] = &[
    ("of ayte", "OFICIAL AYUDANTE"),
    ("of jefe", "OFICIAL JEFE"),
    ("of mayor", "OFICIAL MAYOR"),
    ("of ppal", "OFICIAL PRINCIPAL"),
    ("oficial ayudante", "OFICIAL AYUDANTE"),
    ("oficial jefe", "OFICIAL JEFE"),
    ("oficial mayor", "OFICIAL MAYOR"),
    ("oficial principal", "OFICIAL PRINCIPAL"),
    ("cdo mayor", "COMANDANTE MAYOR"),
    ("cdo ppal", "COMANDANTE PRINCIPAL"),
    ("comandante mayor", "COMANDANTE MAYOR"),
    ("comandante principal", "COMANDANTE PRINCIPAL"),
    ("comandante", "COMANDANTE"),
    ("inspector", "INSPECTOR"),
    ("insp", "INSPECTOR"),
    ("cabo primero", "CABO PRIMERO"),
    ("cabo 1", "CABO PRIMERO"),
    ("cabo", "CABO"),
    ("aux", "AUXILIAR"),
    ("ayudante", "AYUDANTE"),
    ("ayte", "AYUDANTE"),
];

/// Abreviaturas para escribir jerarquías en la planilla, aplicadas como
/// sustituciones de subcadena en orden
const ABREVIATURAS: &[(&str, &str)] = &[
    ("OFICIAL", "OF"),
    ("COMANDANTE", "CDO"),
    ("PRINCIPAL", "PPAL"),
    ("AYUDANTE", "AYTE"),
    ("INSPECTOR", "INSP"),
    ("PRIMERO", "1RO"),
    ("AUXILIAR", "AUX"),
];

/// Canoniza una etiqueta de jerarquía
///
/// Falla cerrado: entrada vacía o jerarquía no reconocida devuelven cadena
/// vacía, y ese registro queda fuera de la población a comparar.
///
/// # Ejemplos
/// ```
/// use comparador_servicio::services::ranks::normalize_rank;
///
/// assert_eq!(normalize_rank("OF PPAL"), "OFICIAL PRINCIPAL");
/// assert_eq!(normalize_rank("  Inspector  "), "INSPECTOR");
/// assert_eq!(normalize_rank("cabo 1ro"), "CABO PRIMERO");
/// assert_eq!(normalize_rank("bombero"), "");
/// ```
pub fn normalize_rank(raw: &str) -> String {
    let limpio = fold_lower(raw);
    if limpio.is_empty() {
        return String::new();
    }

    // 1. Coincidencia exacta
    for (patron, canonica) in EQUIVALENCIAS {
        if *patron == limpio {
            return (*canonica).to_string();
        }
    }

    // 2. Primera clave de la tabla contenida en el texto
    for (patron, canonica) in EQUIVALENCIAS {
        if limpio.contains(patron) {
            return (*canonica).to_string();
        }
    }

    String::new()
}

/// Abrevia una jerarquía canónica a la convención compacta de la planilla
///
/// # Ejemplos
/// ```
/// use comparador_servicio::services::ranks::abbreviate_rank;
///
/// assert_eq!(abbreviate_rank("OFICIAL PRINCIPAL"), "OF PPAL");
/// assert_eq!(abbreviate_rank("AYUDANTE"), "AYTE");
/// ```
pub fn abbreviate_rank(canonica: &str) -> String {
    let mut texto = canonica.to_string();
    for (larga, corta) in ABREVIATURAS {
        texto = texto.replace(larga, corta);
    }
    texto
}

/// Patrones de la tabla, en orden, para el escaneo multi-patrón de columnas
pub fn patterns() -> Vec<&'static str> {
    EQUIVALENCIAS.iter().map(|(patron, _)| *patron).collect()
}
