//! Funciones de normalización de texto para comparar nombres
//!
//! Todas las funciones son totales: una entrada vacía o irreconocible
//! degrada a cadena vacía, nunca a un error.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Anotaciones entre paréntesis, p. ej. números de puesto: "PEREZ JUAN (30)"
static PARENTESIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("regex de paréntesis válida"));

/// Limpia un nombre para comparación
///
/// - Quita las anotaciones entre paréntesis
/// - Descompone con NFKD y elimina las marcas diacríticas (acentos)
/// - Conserva solo letras ASCII y espacios
/// - Colapsa espacios internos, recorta y pasa a mayúsculas
///
/// Es idempotente: `normalize_name(normalize_name(x)) == normalize_name(x)`.
///
/// # Ejemplos
/// ```
/// use comparador_servicio::utils::normalization::normalize_name;
///
/// assert_eq!(normalize_name("Juan Pérez"), "JUAN PEREZ");
/// assert_eq!(normalize_name("PEREZ JUAN (30)"), "PEREZ JUAN");
/// assert_eq!(normalize_name("  María  Núñez "), "MARIA NUNEZ");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let sin_anotaciones = PARENTESIS.replace_all(raw, "");
    sin_anotaciones
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Pliega un texto a minúsculas ASCII para búsquedas por subcadena
///
/// A diferencia de [`normalize_name`] conserva dígitos y puntuación,
/// porque las claves de la tabla de jerarquías incluyen dígitos ("cabo 1").
///
/// # Ejemplos
/// ```
/// use comparador_servicio::utils::normalization::fold_lower;
///
/// assert_eq!(fold_lower("  OF. PPAL.  "), "of. ppal.");
/// assert_eq!(fold_lower("Jerarquía"), "jerarquia");
/// ```
pub fn fold_lower(raw: &str) -> String {
    deunicode(raw).to_lowercase().trim().to_string()
}
