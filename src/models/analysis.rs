//! Resultado de una corrida del motor de conciliación

use serde::Serialize;

use super::record::Record;

/// Par dudoso: un faltante y un sobrante demasiado parecidos para ignorarlos
/// pero no lo suficiente para matchearlos solos
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParDudoso {
    pub parte: Record,
    pub lista: Record,
    /// Puntaje token-sort que lo dejó en la franja dudosa
    pub score: u32,
}

/// Foto completa de una corrida del motor
///
/// `faltantes`, `sobrantes` y los dos lados de `dudosos` son particiones
/// mutuamente excluyentes. Se recalcula entera en cada corrida; nunca se
/// parcha incrementalmente.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Presentes en el parte, ausentes de la lista (en el orden del parte)
    pub faltantes: Vec<Record>,
    /// Presentes en la lista, sin match en el parte
    pub sobrantes: Vec<Record>,
    /// Pares retenidos a la espera de un veredicto humano
    pub dudosos: Vec<ParDudoso>,
    /// Total ingerido del parte (antes del filtro de jerarquías)
    pub total_parte: usize,
    /// Total ingerido de la lista
    pub total_lista: usize,
}

impl AnalysisResult {
    /// Conteos para el encabezado de resultados
    pub fn resumen(&self) -> Resumen {
        Resumen {
            total_parte: self.total_parte,
            total_lista: self.total_lista,
            faltan: self.faltantes.len(),
            sobran: self.sobrantes.len(),
            dudosos: self.dudosos.len(),
        }
    }

    /// No falta ni sobra nadie y no quedan dudas
    pub fn esta_limpio(&self) -> bool {
        self.faltantes.is_empty() && self.sobrantes.is_empty() && self.dudosos.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resumen {
    pub total_parte: usize,
    pub total_lista: usize,
    pub faltan: usize,
    pub sobran: usize,
    pub dudosos: usize,
}
