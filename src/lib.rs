// Biblioteca del comparador de listas de servicio
// Expone módulos para uso en tests y binarios

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use std::collections::HashSet;

use models::{AnalysisResult, Record};
use services::{ingest, DecisionLedger, Matcher};
use utils::AppResult;

/// Estado de sesión: el único estado mutable compartido
///
/// Es dueño del libro de decisiones y del conjunto de ítems tildados; se
/// pasa explícito a cada acción en lugar de vivir como global ambiente.
/// Toda decisión re-corre el motor completo sobre las secuencias
/// originales, así que destildar o deshacer nunca deja resultados viejos.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub settings: config::Settings,
    pub parte: Vec<Record>,
    pub lista: Vec<Record>,
    pub ledger: DecisionLedger,
    /// Ítems faltantes ya reconocidos por el usuario (tilde de "hecho")
    pub marcados: HashSet<String>,
    pub analysis: Option<AnalysisResult>,
}

impl SessionState {
    pub fn new(settings: config::Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Reemplaza las dos secuencias y descarta el análisis anterior
    ///
    /// El libro de decisiones se conserva: sus claves refieren a registros
    /// por nombre y posición, así que siguen valiendo si el mismo texto se
    /// vuelve a pegar, y quedan inertes si no.
    pub fn cargar(&mut self, parte: Vec<Record>, lista: Vec<Record>) {
        self.parte = parte;
        self.lista = lista;
        self.analysis = None;
    }

    /// Ingesta de texto pegado para ambas fuentes
    pub fn cargar_texto(&mut self, texto_parte: &str, texto_lista: &str) -> AppResult<()> {
        let parte = ingest::build_records(&ingest::from_text(texto_parte)?);
        let lista = ingest::build_records(&ingest::from_text(texto_lista)?);
        self.cargar(parte, lista);
        Ok(())
    }

    /// Corre el motor completo y guarda la foto del resultado
    pub fn analizar(&mut self) -> AppResult<AnalysisResult> {
        self.settings.validate()?;
        let matcher = Matcher::new(
            self.settings.matching.umbral_auto,
            self.settings.matching.umbral_detective,
            &self.ledger,
        )?;
        let resultado = matcher.run(&self.parte, &self.lista);
        self.analysis = Some(resultado.clone());
        Ok(resultado)
    }

    /// Veredicto "misma persona" sobre un par dudoso, con re-análisis
    pub fn confirmar(&mut self, parte_id: &str, lista_id: &str) -> AppResult<AnalysisResult> {
        self.ledger.confirm(parte_id, lista_id);
        self.analizar()
    }

    /// Veredicto "personas distintas" sobre un par dudoso, con re-análisis
    pub fn rechazar(&mut self, parte_id: &str, lista_id: &str) -> AppResult<AnalysisResult> {
        self.ledger.reject(parte_id, lista_id);
        self.analizar()
    }

    /// Borra un veredicto previo, con re-análisis
    pub fn deshacer(&mut self, parte_id: &str, lista_id: &str) -> AppResult<AnalysisResult> {
        self.ledger.undo(parte_id, lista_id);
        self.analizar()
    }

    /// Tilda/destilda un ítem faltante como ya atendido
    pub fn marcar(&mut self, identity_key: &str) {
        if !self.marcados.remove(identity_key) {
            self.marcados.insert(identity_key.to_string());
        }
    }
}
