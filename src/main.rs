/// Comparador de Listas de Servicio
///
/// Flujo:
/// - Ingesta del parte oficial y de la lista de guardia (texto o .xlsx)
/// - Motor de conciliación en tres pases (automático, veredictos, detective)
/// - Corrección opcional de la planilla: bajas borradas, altas insertadas,
///   todo lo tocado resaltado
///
/// La salida por pantalla son los tres paneles de siempre: agregar,
/// borrar y dudosos, más el resumen de conteos.
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use comparador_servicio::config::Settings;
use comparador_servicio::models::{AnalysisResult, Record};
use comparador_servicio::services::{ingest, planilla};
use comparador_servicio::utils::logging::{init_tracing, log_analisis_terminado, log_mutacion_fallida};
use comparador_servicio::utils::AppResult;
use comparador_servicio::SessionState;

#[derive(Parser)]
#[command(name = "comparador-servicio")]
#[command(about = "Concilia el parte oficial con la lista de guardia", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log detallado
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Exigencia de coincidencia automática (50-100)
    #[arg(long, global = true)]
    umbral: Option<u32>,

    /// Piso de detección de dudosos (50-90, menor al umbral)
    #[arg(long, global = true)]
    umbral_detective: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compara el parte con la lista y muestra qué agregar y qué borrar
    Comparar {
        /// Parte oficial (texto tabulado o .xlsx)
        parte: PathBuf,
        /// Lista de guardia (texto tabulado o .xlsx)
        lista: PathBuf,
        /// Salida en JSON en lugar de paneles
        #[arg(long)]
        json: bool,
    },
    /// Borra de la planilla los nombres que sobran
    Limpiar {
        /// Parte oficial (texto tabulado o .xlsx)
        parte: PathBuf,
        /// Planilla .xlsx con la lista de guardia, que además se corrige
        planilla: PathBuf,
        /// Archivo de salida (por defecto, limpia_<original>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Borra los que sobran e inserta los que faltan en la fila ancla
    Actualizar {
        /// Parte oficial (texto tabulado o .xlsx)
        parte: PathBuf,
        /// Planilla .xlsx con la lista de guardia, que además se corrige
        planilla: PathBuf,
        /// Archivo de salida (por defecto, actualizada_<original>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::new().unwrap_or_default();
    if let Some(umbral) = cli.umbral {
        settings.matching.umbral_auto = umbral;
    }
    if let Some(umbral) = cli.umbral_detective {
        settings.matching.umbral_detective = umbral;
    }
    settings.validate()?;

    match cli.command {
        Commands::Comparar { parte, lista, json } => {
            let registros_parte = cargar_registros(&parte)
                .with_context(|| format!("no se pudo ingerir el parte {:?}", parte))?;
            let registros_lista = cargar_registros(&lista)
                .with_context(|| format!("no se pudo ingerir la lista {:?}", lista))?;

            let mut sesion = SessionState::new(settings);
            sesion.cargar(registros_parte, registros_lista);
            let resultado = sesion.analizar()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&resultado)?);
            } else {
                imprimir_resultado(&resultado);
            }
        }
        Commands::Limpiar {
            parte,
            planilla,
            output,
        } => {
            corregir_planilla(settings, &parte, &planilla, output, false)?;
        }
        Commands::Actualizar {
            parte,
            planilla,
            output,
        } => {
            corregir_planilla(settings, &parte, &planilla, output, true)?;
        }
    }

    Ok(())
}

/// Analiza contra la planilla y escribe la copia corregida
///
/// Un fallo de mutación no invalida el análisis: los paneles se imprimen
/// igual y solo se pierde la descarga.
fn corregir_planilla(
    settings: Settings,
    ruta_parte: &Path,
    ruta_planilla: &Path,
    output: Option<PathBuf>,
    con_altas: bool,
) -> anyhow::Result<()> {
    let registros_parte = cargar_registros(ruta_parte)
        .with_context(|| format!("no se pudo ingerir el parte {:?}", ruta_parte))?;

    let libro = planilla::leer_libro(ruta_planilla)
        .with_context(|| format!("no se pudo leer la planilla {:?}", ruta_planilla))?;
    let indice_hoja = libro
        .hoja_preferida()
        .context("la planilla no tiene hojas")?;
    let registros_lista =
        ingest::build_records(&ingest::from_planilla(&libro.hojas[indice_hoja])?);

    let mut sesion = SessionState::new(settings);
    sesion.cargar(registros_parte, registros_lista);
    let resultado = sesion.analizar()?;
    imprimir_resultado(&resultado);

    let bajas: Vec<String> = resultado
        .sobrantes
        .iter()
        .map(|registro| registro.normalized_name.clone())
        .collect();
    let altas: &[Record] = if con_altas { &resultado.faltantes } else { &[] };

    if bajas.is_empty() && altas.is_empty() {
        println!("\n✨ La planilla ya está al día; no hay nada para corregir.");
        return Ok(());
    }

    let mutado = if con_altas {
        planilla::actualizar(&libro, &bajas, altas)
    } else {
        planilla::limpiar(&libro, &bajas)
    };
    let corregido = match mutado {
        Ok(libro) => libro,
        Err(error) => {
            log_mutacion_fallida(&error.to_string());
            return Ok(());
        }
    };
    let buffer = match planilla::escribir_buffer(&corregido) {
        Ok(buffer) => buffer,
        Err(error) => {
            log_mutacion_fallida(&error.to_string());
            return Ok(());
        }
    };

    let destino = output.unwrap_or_else(|| nombre_por_defecto(ruta_planilla, con_altas));
    std::fs::write(&destino, buffer)
        .with_context(|| format!("no se pudo escribir {:?}", destino))?;
    println!("\n💾 Planilla corregida: {}", destino.display());

    Ok(())
}

/// Ingesta desde un archivo: planilla .xlsx o texto tabulado
fn cargar_registros(ruta: &Path) -> AppResult<Vec<Record>> {
    let es_xlsx = ruta
        .extension()
        .map(|extension| {
            let extension = extension.to_string_lossy().to_lowercase();
            extension == "xlsx" || extension == "xlsm"
        })
        .unwrap_or(false);

    let pares = if es_xlsx {
        let libro = planilla::leer_libro(ruta)?;
        let indice = libro.hoja_preferida().ok_or_else(|| {
            comparador_servicio::utils::AppError::Ingest(format!(
                "el libro {:?} no tiene hojas",
                ruta
            ))
        })?;
        ingest::from_planilla(&libro.hojas[indice])?
    } else {
        let texto = std::fs::read_to_string(ruta)?;
        ingest::from_text(&texto)?
    };

    Ok(ingest::build_records(&pares))
}

fn imprimir_resultado(resultado: &AnalysisResult) {
    let resumen = resultado.resumen();
    println!(
        "\nParte: {} | Lista: {} | Faltan: {} | Sobran: {} | Dudosos: {}",
        resumen.total_parte, resumen.total_lista, resumen.faltan, resumen.sobran, resumen.dudosos
    );

    if resultado.faltantes.is_empty() {
        println!("\n✨ ¡Perfecto! No falta nadie.");
    } else {
        println!("\n✅ AGREGA A LA LISTA ESTOS {}:", resultado.faltantes.len());
        for registro in &resultado.faltantes {
            println!("  - {}", registro.display());
        }
    }

    if resultado.sobrantes.is_empty() {
        println!("\n✨ ¡Limpio! No sobra nadie.");
    } else {
        println!("\n❌ BORRAR DE LA LISTA ({}):", resultado.sobrantes.len());
        for registro in &resultado.sobrantes {
            println!("  - {}", registro.display());
        }
    }

    if !resultado.dudosos.is_empty() {
        println!("\n🔍 DUDOSOS ({}), confirmar o rechazar:", resultado.dudosos.len());
        for par in &resultado.dudosos {
            println!(
                "  - ¿{} es {}? (parecido {})",
                par.parte.display(),
                par.lista.display(),
                par.score
            );
        }
    }

    log_analisis_terminado(
        resultado.faltantes.len(),
        resultado.sobrantes.len(),
        resultado.dudosos.len(),
    );
}

fn nombre_por_defecto(ruta_planilla: &Path, con_altas: bool) -> PathBuf {
    let original = ruta_planilla
        .file_name()
        .map(|nombre| nombre.to_string_lossy().to_string())
        .unwrap_or_else(|| "planilla.xlsx".to_string());
    let nombre = planilla::nombre_archivo_salida(con_altas, &original);
    ruta_planilla.with_file_name(nombre)
}
