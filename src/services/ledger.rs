//! Libro de decisiones: memoria de los veredictos humanos
//!
//! Vive en el estado de sesión y sobrevive a las re-corridas del motor.
//! Solo guarda pares de claves de identidad y veredictos; nunca registros.

use std::collections::HashMap;

use crate::models::{PairKey, Verdict};

/// Conjunto de veredictos confirmados/rechazados, clave (parte, lista)
#[derive(Debug, Clone, Default)]
pub struct DecisionLedger {
    decisiones: HashMap<PairKey, Verdict>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra "son la misma persona"; re-confirmar es un no-op
    pub fn confirm(&mut self, parte_id: &str, lista_id: &str) {
        self.decisiones.insert(
            (parte_id.to_string(), lista_id.to_string()),
            Verdict::ConfirmedSame,
        );
    }

    /// Registra "son personas distintas"; pisa una confirmación previa
    pub fn reject(&mut self, parte_id: &str, lista_id: &str) {
        self.decisiones.insert(
            (parte_id.to_string(), lista_id.to_string()),
            Verdict::RejectedDifferent,
        );
    }

    /// Borra el veredicto del par, sea cual sea
    pub fn undo(&mut self, parte_id: &str, lista_id: &str) {
        self.decisiones
            .remove(&(parte_id.to_string(), lista_id.to_string()));
    }

    pub fn verdict(&self, parte_id: &str, lista_id: &str) -> Option<Verdict> {
        self.decisiones
            .get(&(parte_id.to_string(), lista_id.to_string()))
            .copied()
    }

    pub fn is_confirmed(&self, parte_id: &str, lista_id: &str) -> bool {
        self.verdict(parte_id, lista_id) == Some(Verdict::ConfirmedSame)
    }

    pub fn is_rejected(&self, parte_id: &str, lista_id: &str) -> bool {
        self.verdict(parte_id, lista_id) == Some(Verdict::RejectedDifferent)
    }

    pub fn len(&self) -> usize {
        self.decisiones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisiones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmar_es_idempotente() {
        let mut ledger = DecisionLedger::new();
        ledger.confirm("a#0", "b#0");
        ledger.confirm("a#0", "b#0");
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_confirmed("a#0", "b#0"));
    }

    #[test]
    fn test_rechazar_pisa_confirmacion() {
        let mut ledger = DecisionLedger::new();
        ledger.confirm("a#0", "b#0");
        ledger.reject("a#0", "b#0");
        assert!(ledger.is_rejected("a#0", "b#0"));
        assert!(!ledger.is_confirmed("a#0", "b#0"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_deshacer() {
        let mut ledger = DecisionLedger::new();
        ledger.confirm("a#0", "b#0");
        ledger.undo("a#0", "b#0");
        assert!(ledger.is_empty());
        assert_eq!(ledger.verdict("a#0", "b#0"), None);
        // deshacer sobre un par sin veredicto tampoco falla
        ledger.undo("x#1", "y#2");
    }

    #[test]
    fn test_el_par_es_dirigido() {
        let mut ledger = DecisionLedger::new();
        ledger.confirm("a#0", "b#0");
        assert!(!ledger.is_confirmed("b#0", "a#0"));
    }
}
