//! Veredictos humanos sobre pares dudosos

use serde::Serialize;

/// Clave de un par (registro del parte, registro de la lista)
pub type PairKey = (String, String);

/// Veredicto de una persona sobre un par dudoso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// "Son la misma persona": el par se consume como match en la próxima corrida
    ConfirmedSame,
    /// "Son personas distintas": el par no vuelve a ofrecerse como dudoso
    RejectedDifferent,
}
