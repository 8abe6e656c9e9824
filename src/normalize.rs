use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization as _;

use crate::models::Cell;

/// Canonical form of a header for matching: lower-case, accents stripped,
/// whitespace runs collapsed to one space and trimmed.
///
/// Lower-casing happens before decomposition so that characters whose lower-case
/// form carries a combining mark (e.g. `İ`) are stripped on the first pass.
pub fn normalize(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cell-level variant: text is normalized, every other value passes through.
pub fn normalize_cell(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(s) => Cell::Text(normalize(s)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_case_accent_and_space_insensitive() {
        let expected = normalize("modulo");
        assert_eq!(normalize("Módulo"), expected);
        assert_eq!(normalize("MODULO  "), expected);
        assert_eq!(expected, "modulo");
    }

    #[test]
    fn test_normalize_collapses_inner_whitespace() {
        assert_eq!(normalize("  Fonte \t  Curva\n"), "fonte curva");
        assert_eq!(normalize("Fonte\u{a0}Curva"), "fonte curva");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["Módulo", "  EMPREENDIMENTO ", "Fonte   Curva", "İstanbul", "Ação/Março", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_normalize_cell_passes_non_text_through() {
        assert_eq!(normalize_cell(&Cell::Number(3.5)), Cell::Number(3.5));
        assert_eq!(normalize_cell(&Cell::Empty), Cell::Empty);
        assert_eq!(normalize_cell(&Cell::text("Tipologia ")), Cell::text("tipologia"));
    }
}
