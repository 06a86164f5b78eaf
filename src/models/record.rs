//! Registro de personal: una fila ingresada del parte o de la lista

use serde::Serialize;

use crate::services::ranks::normalize_rank;
use crate::utils::normalization::normalize_name;

/// Una fila de un roster, con sus formas crudas y normalizadas
///
/// Se crea una sola vez al ingerir y es inmutable de ahí en más. La clave
/// de identidad (nombre crudo más posición en la secuencia de origen) se
/// usa solo para anclar decisiones y estado de interfaz, nunca para el
/// matching en sí.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub raw_rank: String,
    pub raw_name: String,
    /// Jerarquía canónica; vacía significa "no reconocida, fuera de la comparación"
    pub normalized_rank: String,
    /// Nombre en mayúsculas, solo letras y espacios internos
    pub normalized_name: String,
    pub identity_key: String,
}

impl Record {
    pub fn new(raw_rank: &str, raw_name: &str, indice: usize) -> Self {
        Self {
            raw_rank: raw_rank.to_string(),
            raw_name: raw_name.to_string(),
            normalized_rank: normalize_rank(raw_rank),
            normalized_name: normalize_name(raw_name),
            identity_key: format!("{}#{}", raw_name.trim(), indice),
        }
    }

    /// La jerarquía fue reconocida y el registro participa de la comparación
    pub fn has_rank(&self) -> bool {
        !self.normalized_rank.is_empty()
    }

    /// Presentación "JERARQUIA - Nombre" para los paneles de resultado
    pub fn display(&self) -> String {
        format!("{} - {}", self.raw_rank.trim(), self.raw_name.trim())
    }
}
