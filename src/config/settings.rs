use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::services::matcher::{RANGO_UMBRAL_AUTO, RANGO_UMBRAL_DETECTIVE};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchingSettings {
    /// Exigencia de coincidencia automática (50–100)
    #[serde(default = "default_umbral_auto")]
    pub umbral_auto: u32,
    /// Piso de detección de pares dudosos (50–90, siempre menor al automático)
    #[serde(default = "default_umbral_detective")]
    pub umbral_detective: u32,
}

fn default_umbral_auto() -> u32 {
    85
}

fn default_umbral_detective() -> u32 {
    65
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            umbral_auto: default_umbral_auto(),
            umbral_detective: default_umbral_detective(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Archivo de configuración base
            .add_source(File::with_name("config/default").required(false))
            // Archivo específico del entorno
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Variables de entorno: COMPARADOR__MATCHING__UMBRAL_AUTO, etc.
            .add_source(Environment::with_prefix("COMPARADOR").separator("__"));

        let s = builder.build()?;
        s.try_deserialize()
    }

    /// Valida los rangos de ambos umbrales y su relación estricta
    pub fn validate(&self) -> AppResult<()> {
        let m = &self.matching;
        if !(RANGO_UMBRAL_AUTO.0..=RANGO_UMBRAL_AUTO.1).contains(&m.umbral_auto)
            || !(RANGO_UMBRAL_DETECTIVE.0..=RANGO_UMBRAL_DETECTIVE.1).contains(&m.umbral_detective)
            || m.umbral_detective >= m.umbral_auto
        {
            return Err(AppError::Config(format!(
                "umbrales inválidos: auto={} (rango {}–{}), detective={} (rango {}–{}, menor al auto)",
                m.umbral_auto,
                RANGO_UMBRAL_AUTO.0,
                RANGO_UMBRAL_AUTO.1,
                m.umbral_detective,
                RANGO_UMBRAL_DETECTIVE.0,
                RANGO_UMBRAL_DETECTIVE.1,
            )));
        }
        Ok(())
    }
}
