use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static NON_SLUG_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Derive a URL slug from a category name.
///
/// Lowercases, strips diacritics (NFD with combining marks dropped), collapses
/// every run of characters outside `[a-z0-9]` into one `-`, and trims hyphens
/// from both ends. Idempotent: `slugify(&slugify(s)) == slugify(s)`.
pub fn slugify(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    NON_SLUG_RUN
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_lowercases() {
        assert_eq!(slugify("Acessórios"), "acessorios");
        assert_eq!(slugify("CALÇADOS"), "calcados");
        assert_eq!(slugify("Pão de Açúcar"), "pao-de-acucar");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(slugify("Camisetas  &  Regatas"), "camisetas-regatas");
        assert_eq!(slugify("a--b__c"), "a-b-c");
        assert_eq!(slugify("Kids / 2-4 anos"), "kids-2-4-anos");
    }

    #[test]
    fn trims_edge_hyphens() {
        assert_eq!(slugify("  -Promo!- "), "promo");
        assert_eq!(slugify("***"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn non_latin_letters_become_separators() {
        assert_eq!(slugify("Chá 緑茶 verde"), "cha-verde");
    }

    #[test]
    fn idempotent() {
        for s in [
            "Roupas",
            "Acessórios de Verão",
            "  --Bolsos & Mochilas--  ",
            "Ångström Ünïcödé",
            "100% Algodão",
            "",
        ] {
            let once = slugify(s);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", s);
        }
    }
}
