//! Puntajes de similitud fuzzy entre nombres (escala 0–100)
//!
//! Construidos sobre `strsim`. El puntaje base es la distancia de
//! Levenshtein normalizada; sobre él se arman las variantes por tokens:
//! `token_set_ratio` ignora el orden y la repetición de palabras,
//! `token_sort_ratio` compara las palabras ordenadas alfabéticamente.

use std::collections::BTreeSet;

use strsim::levenshtein;

/// Similitud simple entre dos cadenas (Levenshtein normalizada, 0–100)
pub fn ratio(a: &str, b: &str) -> u32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let distancia = levenshtein(a, b).min(max_len);
    (((max_len - distancia) as f64 / max_len as f64) * 100.0).round() as u32
}

/// Similitud con las palabras ordenadas alfabéticamente (sensible al contenido
/// de cada palabra, insensible al orden entre ellas)
///
/// # Ejemplos
/// ```
/// use comparador_servicio::utils::similarity::token_sort_ratio;
///
/// assert_eq!(token_sort_ratio("JUAN PEREZ", "PEREZ JUAN"), 100);
/// assert_eq!(token_sort_ratio("MARIA LOPEZ", "MARIA LOPES"), 91);
/// ```
pub fn token_sort_ratio(a: &str, b: &str) -> u32 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0;
    }
    ratio(&ordenar_tokens(a), &ordenar_tokens(b))
}

/// Similitud por conjuntos de palabras (insensible al orden y a palabras
/// extra compartidas)
///
/// Se arman tres cadenas: la intersección ordenada de palabras, y la
/// intersección más el resto de cada lado; el puntaje es el máximo de las
/// comparaciones entre ellas. Dos nombres con las mismas palabras en
/// cualquier orden puntúan 100.
///
/// # Ejemplos
/// ```
/// use comparador_servicio::utils::similarity::token_set_ratio;
///
/// assert_eq!(token_set_ratio("JUAN PEREZ", "PEREZ JUAN"), 100);
/// assert!(token_set_ratio("JUAN PEREZ", "MARIA LOPEZ") < 50);
/// ```
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let interseccion: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let solo_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let solo_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let base = interseccion.join(" ");
    let combinada_a = unir(&base, &solo_a.join(" "));
    let combinada_b = unir(&base, &solo_b.join(" "));

    ratio(&base, &combinada_a)
        .max(ratio(&base, &combinada_b))
        .max(ratio(&combinada_a, &combinada_b))
}

fn ordenar_tokens(texto: &str) -> String {
    let mut tokens: Vec<&str> = texto.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn unir(base: &str, resto: &str) -> String {
    if base.is_empty() {
        resto.to_string()
    } else if resto.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, resto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("JUAN PEREZ", "JUAN PEREZ"), 100);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("LOPEZ MARIA", "LOPES MARIA"), 91);
        assert_eq!(ratio("ABC", "XYZ"), 0);
    }

    #[test]
    fn test_token_sort_ratio() {
        // Mismo nombre con apellido y nombre invertidos
        assert_eq!(token_sort_ratio("JUAN PEREZ", "PEREZ JUAN"), 100);
        // Un typo en el apellido
        assert_eq!(token_sort_ratio("MARIA LOPEZ", "MARIA LOPES"), 91);
        // Vacíos nunca puntúan
        assert_eq!(token_sort_ratio("", "JUAN"), 0);
        assert_eq!(token_sort_ratio("JUAN", ""), 0);
    }

    #[test]
    fn test_token_set_ratio() {
        let casos = vec![
            // (a, b, esperado_minimo, esperado_maximo)
            ("JUAN PEREZ", "PEREZ JUAN", 100, 100),
            ("JUAN PEREZ", "JUAN PEREZ", 100, 100),
            // Subconjunto: el segundo nombre agrega una palabra
            ("JUAN PEREZ", "JUAN CARLOS PEREZ", 100, 100),
            ("MARIA LOPEZ", "MARIA LOPES", 85, 95),
            ("JUAN PEREZ", "MARIA LOPEZ", 0, 49),
        ];
        for (a, b, minimo, maximo) in casos {
            let puntaje = token_set_ratio(a, b);
            assert!(
                (minimo..=maximo).contains(&puntaje),
                "token_set_ratio({:?}, {:?}) = {} fuera de [{}, {}]",
                a,
                b,
                puntaje,
                minimo,
                maximo
            );
        }
    }

    #[test]
    fn test_token_set_ratio_es_simetrico() {
        assert_eq!(
            token_set_ratio("JUAN PEREZ", "PEREZ JUAN CARLOS"),
            token_set_ratio("PEREZ JUAN CARLOS", "JUAN PEREZ")
        );
    }
}
