//! Motor de conciliación parte ↔ lista
//!
//! Tres pasadas secuenciales sobre las dos secuencias de registros:
//!
//! 1. Matching exacto con filtro duro de jerarquía (token-set ≥ umbral).
//!    Gana el PRIMER candidato que supere el umbral, no el mejor: los
//!    empates se resuelven por orden de la lista.
//! 2. Pase de overrides: pares confirmados en el libro de decisiones se
//!    consumen sin importar el puntaje ni la jerarquía.
//! 3. Pase detective: entre los que faltan y los que sobran, el mejor
//!    puntaje token-sort estrictamente entre ambos umbrales arma un par
//!    dudoso a resolver por una persona.
//!
//! Cada corrida recalcula todo desde las secuencias originales; no queda
//! estado parcial entre corridas.

use tracing::{debug, warn};

use crate::models::{AnalysisResult, ParDudoso, Record};
use crate::services::ledger::DecisionLedger;
use crate::utils::similarity::{token_set_ratio, token_sort_ratio};
use crate::utils::{AppError, AppResult};

/// Rango válido del umbral de matching automático
pub const RANGO_UMBRAL_AUTO: (u32, u32) = (50, 100);
/// Rango válido del piso detective
pub const RANGO_UMBRAL_DETECTIVE: (u32, u32) = (50, 90);

pub struct Matcher<'a> {
    umbral_auto: u32,
    umbral_detective: u32,
    ledger: &'a DecisionLedger,
}

impl<'a> Matcher<'a> {
    pub fn new(
        umbral_auto: u32,
        umbral_detective: u32,
        ledger: &'a DecisionLedger,
    ) -> AppResult<Self> {
        if !(RANGO_UMBRAL_AUTO.0..=RANGO_UMBRAL_AUTO.1).contains(&umbral_auto) {
            return Err(AppError::Validation(format!(
                "umbral de coincidencia fuera de rango [{}, {}]: {}",
                RANGO_UMBRAL_AUTO.0, RANGO_UMBRAL_AUTO.1, umbral_auto
            )));
        }
        if !(RANGO_UMBRAL_DETECTIVE.0..=RANGO_UMBRAL_DETECTIVE.1).contains(&umbral_detective) {
            return Err(AppError::Validation(format!(
                "umbral detective fuera de rango [{}, {}]: {}",
                RANGO_UMBRAL_DETECTIVE.0, RANGO_UMBRAL_DETECTIVE.1, umbral_detective
            )));
        }
        if umbral_detective >= umbral_auto {
            return Err(AppError::Validation(format!(
                "el umbral detective ({}) debe ser menor que el de coincidencia ({})",
                umbral_detective, umbral_auto
            )));
        }
        Ok(Self {
            umbral_auto,
            umbral_detective,
            ledger,
        })
    }

    /// Corre las tres pasadas y devuelve la foto completa del análisis
    pub fn run(&self, parte: &[Record], lista: &[Record]) -> AnalysisResult {
        // Los registros sin jerarquía reconocida quedan fuera de las dos
        // poblaciones: nunca se informan como faltantes ni sobrantes.
        let parte_activo: Vec<&Record> = parte.iter().filter(|r| r.has_rank()).collect();
        let lista_activa: Vec<&Record> = lista.iter().filter(|r| r.has_rank()).collect();

        advertir_duplicados(&parte_activo, "parte");
        advertir_duplicados(&lista_activa, "lista");

        let mut consumido = vec![false; lista_activa.len()];
        let mut resuelto = vec![false; parte_activo.len()];

        // Pase 1: matching exacto con filtro de jerarquía
        for (i, registro_parte) in parte_activo.iter().enumerate() {
            for (j, candidato) in lista_activa.iter().enumerate() {
                if consumido[j] || candidato.normalized_rank != registro_parte.normalized_rank {
                    continue;
                }
                let puntaje = token_set_ratio(
                    &registro_parte.normalized_name,
                    &candidato.normalized_name,
                );
                if puntaje >= self.umbral_auto {
                    debug!(
                        "match automático: '{}' ↔ '{}' ({})",
                        registro_parte.normalized_name, candidato.normalized_name, puntaje
                    );
                    consumido[j] = true;
                    resuelto[i] = true;
                    break;
                }
            }
        }

        // Pase 2: overrides confirmados en el libro, sin filtro de jerarquía
        for (i, registro_parte) in parte_activo.iter().enumerate() {
            if resuelto[i] {
                continue;
            }
            for (j, candidato) in lista_activa.iter().enumerate() {
                if consumido[j] {
                    continue;
                }
                if self
                    .ledger
                    .is_confirmed(&registro_parte.identity_key, &candidato.identity_key)
                {
                    debug!(
                        "match por veredicto: '{}' ↔ '{}'",
                        registro_parte.normalized_name, candidato.normalized_name
                    );
                    consumido[j] = true;
                    resuelto[i] = true;
                    break;
                }
            }
        }

        // Pase 3: detección de dudosos entre faltantes y sobrantes
        let mut reclamado = consumido.clone();
        let mut faltantes = Vec::new();
        let mut dudosos = Vec::new();

        for (i, registro_parte) in parte_activo.iter().enumerate() {
            if resuelto[i] {
                continue;
            }
            let mut mejor: Option<(usize, u32)> = None;
            for (j, candidato) in lista_activa.iter().enumerate() {
                if reclamado[j]
                    || self
                        .ledger
                        .is_rejected(&registro_parte.identity_key, &candidato.identity_key)
                {
                    continue;
                }
                let puntaje = token_sort_ratio(
                    &registro_parte.normalized_name,
                    &candidato.normalized_name,
                );
                // Empates: se queda el primero que alcanzó el puntaje más alto
                if mejor.map_or(true, |(_, s)| puntaje > s) {
                    mejor = Some((j, puntaje));
                }
            }
            match mejor {
                Some((j, puntaje))
                    if puntaje > self.umbral_detective && puntaje < self.umbral_auto =>
                {
                    reclamado[j] = true;
                    dudosos.push(ParDudoso {
                        parte: (*registro_parte).clone(),
                        lista: lista_activa[j].clone(),
                        score: puntaje,
                    });
                }
                _ => faltantes.push((*registro_parte).clone()),
            }
        }

        let sobrantes: Vec<Record> = lista_activa
            .iter()
            .enumerate()
            .filter(|(j, _)| !reclamado[*j])
            .map(|(_, r)| (*r).clone())
            .collect();

        AnalysisResult {
            faltantes,
            sobrantes,
            dudosos,
            total_parte: parte.len(),
            total_lista: lista.len(),
        }
    }
}

/// Nombres repetidos dentro de una misma fuente: se advierte pero cada
/// ocurrencia sigue participando del matching por separado
fn advertir_duplicados(registros: &[&Record], origen: &str) {
    use std::collections::HashMap;

    let mut conteo: HashMap<&str, usize> = HashMap::new();
    for registro in registros {
        if registro.normalized_name.is_empty() {
            continue;
        }
        *conteo.entry(registro.normalized_name.as_str()).or_insert(0) += 1;
    }
    for (nombre, veces) in conteo {
        if veces > 1 {
            warn!(
                "⚠️ Nombre duplicado en {}: '{}' aparece {} veces",
                origen, nombre, veces
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registros(filas: &[(&str, &str)]) -> Vec<Record> {
        filas
            .iter()
            .enumerate()
            .map(|(i, (jerarquia, nombre))| Record::new(jerarquia, nombre, i))
            .collect()
    }

    fn correr(
        parte: &[Record],
        lista: &[Record],
        auto: u32,
        detective: u32,
        ledger: &DecisionLedger,
    ) -> AnalysisResult {
        Matcher::new(auto, detective, ledger)
            .expect("umbrales válidos")
            .run(parte, lista)
    }

    #[test]
    fn test_match_automatico_con_jerarquia_abreviada() {
        let parte = registros(&[("OFICIAL PRINCIPAL", "Juan Pérez")]);
        let lista = registros(&[("OF PPAL", "PEREZ JUAN (30)")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 85, 65, &ledger);
        assert!(resultado.faltantes.is_empty());
        assert!(resultado.sobrantes.is_empty());
        assert!(resultado.dudosos.is_empty());
    }

    #[test]
    fn test_typo_queda_como_dudoso() {
        let parte = registros(&[("INSPECTOR", "Maria Lopez")]);
        let lista = registros(&[("INSPECTOR", "Maria Lopes")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 95, 65, &ledger);
        assert!(resultado.faltantes.is_empty());
        assert!(resultado.sobrantes.is_empty());
        assert_eq!(resultado.dudosos.len(), 1);
        assert_eq!(resultado.dudosos[0].score, 91);
    }

    #[test]
    fn test_rechazo_separa_el_par() {
        let parte = registros(&[("INSPECTOR", "Maria Lopez")]);
        let lista = registros(&[("INSPECTOR", "Maria Lopes")]);
        let mut ledger = DecisionLedger::new();
        ledger.reject(&parte[0].identity_key, &lista[0].identity_key);

        let resultado = correr(&parte, &lista, 95, 65, &ledger);
        assert_eq!(resultado.faltantes.len(), 1);
        assert_eq!(resultado.sobrantes.len(), 1);
        assert!(resultado.dudosos.is_empty());
        assert_eq!(resultado.faltantes[0].normalized_name, "MARIA LOPEZ");
        assert_eq!(resultado.sobrantes[0].normalized_name, "MARIA LOPES");
    }

    #[test]
    fn test_confirmacion_sobrevive_la_recorrida() {
        // El apodo no se parece al nombre del parte: sin veredicto queda
        // como faltante + sobrante; confirmado, se consume en el pase 2.
        let parte = registros(&[("CABO", "Rodríguez Walter")]);
        let lista = registros(&[("CABO", "El Negro")]);
        let mut ledger = DecisionLedger::new();

        let antes = correr(&parte, &lista, 85, 65, &ledger);
        assert_eq!(antes.faltantes.len(), 1);
        assert_eq!(antes.sobrantes.len(), 1);

        ledger.confirm(&parte[0].identity_key, &lista[0].identity_key);
        let despues = correr(&parte, &lista, 85, 65, &ledger);
        assert!(despues.faltantes.is_empty());
        assert!(despues.sobrantes.is_empty());
        assert!(despues.dudosos.is_empty());

        // Deshacer restaura la partición previa
        ledger.undo(&parte[0].identity_key, &lista[0].identity_key);
        let restaurado = correr(&parte, &lista, 85, 65, &ledger);
        assert_eq!(restaurado, antes);
    }

    #[test]
    fn test_confirmacion_ignora_jerarquia() {
        let parte = registros(&[("INSPECTOR", "Maria Lopez")]);
        let lista = registros(&[("CABO", "Lopez M.")]);
        let mut ledger = DecisionLedger::new();
        ledger.confirm(&parte[0].identity_key, &lista[0].identity_key);

        let resultado = correr(&parte, &lista, 85, 65, &ledger);
        assert!(resultado.faltantes.is_empty());
        assert!(resultado.sobrantes.is_empty());
    }

    #[test]
    fn test_jerarquia_es_filtro_duro_en_pase_uno() {
        // Mismo nombre, jerarquías distintas: el pase 1 no los junta y el
        // token-sort de nombres idénticos (100 ≥ umbral auto) tampoco los
        // deja como dudosos, así que quedan faltante + sobrante.
        let parte = registros(&[("INSPECTOR", "Juan Pérez")]);
        let lista = registros(&[("CABO", "Juan Pérez")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 85, 65, &ledger);
        assert_eq!(resultado.faltantes.len(), 1);
        assert_eq!(resultado.sobrantes.len(), 1);
        assert!(resultado.dudosos.is_empty());
    }

    #[test]
    fn test_jerarquia_desconocida_queda_afuera() {
        let parte = registros(&[("BOMBERO", "Juan Pérez"), ("CABO", "Pedro Gómez")]);
        let lista = registros(&[("CABO", "Pedro Gómez"), ("GENDARME", "Luis Sosa")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 85, 65, &ledger);
        // Ni "Juan Pérez" (jerarquía desconocida en el parte) ni "Luis
        // Sosa" (desconocida en la lista) aparecen en ningún panel.
        assert!(resultado.faltantes.is_empty());
        assert!(resultado.sobrantes.is_empty());
        assert!(resultado.dudosos.is_empty());
        assert_eq!(resultado.total_parte, 2);
        assert_eq!(resultado.total_lista, 2);
    }

    #[test]
    fn test_gana_el_primer_candidato_no_el_mejor() {
        let parte = registros(&[("CABO", "Juan Carlos Pérez")]);
        // Ambos candidatos superan el umbral; se consume el primero en
        // orden de lista aunque el segundo puntúe más alto.
        let lista = registros(&[("CABO", "Pérez Juan"), ("CABO", "Juan Carlos Pérez")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 85, 65, &ledger);
        assert_eq!(resultado.sobrantes.len(), 1);
        assert_eq!(resultado.sobrantes[0].normalized_name, "JUAN CARLOS PEREZ");
    }

    #[test]
    fn test_duplicados_matchean_por_separado() {
        let parte = registros(&[("CABO", "Pedro Gómez"), ("CABO", "Pedro Gómez")]);
        let lista = registros(&[("CABO", "Pedro Gómez"), ("CABO", "Pedro Gómez")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 85, 65, &ledger);
        assert!(resultado.faltantes.is_empty());
        assert!(resultado.sobrantes.is_empty());
    }

    #[test]
    fn test_particion_completa() {
        let parte = registros(&[
            ("OF PPAL", "Juan Pérez"),
            ("INSPECTOR", "Maria Lopez"),
            ("CABO", "Walter Rodríguez"),
            ("CABO 1", "Hugo Ibarra"),
        ]);
        let lista = registros(&[
            ("OF PPAL", "PEREZ JUAN"),
            ("INSPECTOR", "Maria Lopes"),
            ("CABO", "Raúl Duarte"),
        ]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 95, 65, &ledger);

        // Cada registro del parte con jerarquía reconocida cae en
        // exactamente una de {match, faltante, dudoso-parte}
        let en_dudosos_parte = resultado.dudosos.len();
        let matcheados_parte =
            parte.len() - resultado.faltantes.len() - en_dudosos_parte;
        assert_eq!(matcheados_parte, 1); // Juan Pérez
        assert_eq!(resultado.faltantes.len(), 2); // Rodríguez e Ibarra
        assert_eq!(en_dudosos_parte, 1); // Lopez/Lopes

        // Ídem lado lista
        let en_dudosos_lista = resultado.dudosos.len();
        let matcheados_lista =
            lista.len() - resultado.sobrantes.len() - en_dudosos_lista;
        assert_eq!(matcheados_lista, 1);
        assert_eq!(resultado.sobrantes.len(), 1); // Duarte
    }

    #[test]
    fn test_subir_umbral_nunca_achica_faltantes() {
        let parte = registros(&[
            ("CABO", "Juan Carlos Pérez"),
            ("INSPECTOR", "Maria Lopez"),
            ("CABO", "Walter Rodríguez"),
        ]);
        let lista = registros(&[
            ("CABO", "Pérez Juan"),
            ("INSPECTOR", "Maria Lopes"),
            ("CABO", "Rodríguez Walter"),
        ]);
        let ledger = DecisionLedger::new();

        let mut anterior = 0usize;
        for umbral in [70, 80, 90, 95, 100] {
            let resultado = correr(&parte, &lista, umbral, 65, &ledger);
            let no_resueltos = resultado.faltantes.len() + resultado.dudosos.len();
            assert!(
                no_resueltos >= anterior,
                "umbral {} resolvió más que el anterior",
                umbral
            );
            anterior = no_resueltos;
        }
    }

    #[test]
    fn test_umbral_invalido() {
        let ledger = DecisionLedger::new();
        assert!(Matcher::new(45, 40, &ledger).is_err());
        assert!(Matcher::new(101, 65, &ledger).is_err());
        assert!(Matcher::new(85, 95, &ledger).is_err());
        assert!(Matcher::new(85, 85, &ledger).is_err());
        assert!(Matcher::new(85, 49, &ledger).is_err());
        assert!(Matcher::new(85, 65, &ledger).is_ok());
    }

    #[test]
    fn test_dudoso_reclamado_no_se_ofrece_dos_veces() {
        // Dos faltantes parecidos al mismo sobrante: solo el primero se
        // lleva el par dudoso, el segundo queda faltante.
        let parte = registros(&[("CABO", "Maria Lopez"), ("CABO", "Mario Lopez")]);
        let lista = registros(&[("INSPECTOR", "Maria Lopes")]);
        let ledger = DecisionLedger::new();

        let resultado = correr(&parte, &lista, 95, 65, &ledger);
        assert_eq!(resultado.dudosos.len(), 1);
        assert_eq!(resultado.dudosos[0].parte.normalized_name, "MARIA LOPEZ");
        assert_eq!(resultado.faltantes.len(), 1);
        assert_eq!(resultado.faltantes[0].normalized_name, "MARIO LOPEZ");
        assert!(resultado.sobrantes.is_empty());
    }
}
