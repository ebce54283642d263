//! Cleanup of free-text administrative names.
//!
//! The pipeline runs in a fixed order: strip row numbering, repair spaced-out
//! words, optionally titleize, then apply the substitution table and the
//! truncated-suffix corrections. The result is a fixpoint: normalizing an
//! already normalized name returns it unchanged.

use regex::{Captures, Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Leading row numbers (and the whitespace around them)
static LEADING_NUMBERING: LazyLock<Regex> = LazyLock::new(|| compile(r"^[\d\s]+"));

/// Three or more single letters separated by whitespace, e.g. "B A N D U N G"
static SPACED_WORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b[A-Za-z](?:\s+[A-Za-z]\b){2,}"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

/// Spacing rules, also re-applied after expansion.
const SPACING: &[(&str, &str)] = &[(r"\s+", " "), (r"\s*-\s*", "-"), (r"\s*/\s*", "/")];

/// Abbreviation expansions, applied in order after the spacing rules.
const EXPANSIONS: &[(&str, &str)] = &[
    (r"\bKep\.\s*", "Kepulauan "),
    (r"^(?:Daista|DI)\b", "DI"),
    (r"^DKI\b", "DKI"),
    (r"^Kab(?:\.\s*|\s+)", "Kabupaten "),
    (r"\bAdm\.\s*", "Administrasi "),
];

/// Names the source truncates at a fixed column width.
const SUFFIX_FIXES: &[(&str, &str)] = &[
    (r"Siau Tagulandang B$", "Siau Tagulandang Biaro"),
    (r"Mongondow Ut$", "Mongondow Utara"),
    (r"Mongondow Se$", "Mongondow Selatan"),
];

/// Words kept lowercase by [`titleize`] unless they open the name
const CONNECTORS: &[&str] = &["of", "the", "and"];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

static SPACING_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| rules(SPACING));
static EXPANSION_RULES: LazyLock<Vec<Rule>> =
    LazyLock::new(|| rules(EXPANSIONS).into_iter().chain(rules(SUFFIX_FIXES)).collect());

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("name normalization patterns are valid")
}

fn rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .map(|(pattern, replacement)| Rule {
            pattern: compile(pattern),
            replacement,
        })
        .collect()
}

fn apply(rules: &[Rule], input: String) -> String {
    rules.iter().fold(input, |acc, rule| {
        rule.pattern
            .replace_all(&acc, rule.replacement)
            .into_owned()
    })
}

/// Normalize a raw administrative name.
pub fn normalize_name(raw: &str, titleize_words: bool) -> String {
    let stripped = LEADING_NUMBERING.replace(raw.trim(), "");
    let repaired = repair_spaced_words(stripped.trim());

    let cased = if titleize_words {
        titleize(&repaired)
    } else {
        repaired.into_owned()
    };

    let expanded = apply(&EXPANSION_RULES, apply(&SPACING_RULES, cased));
    apply(&SPACING_RULES, expanded).trim().to_string()
}

/// Collapse letter-spaced runs ("B A N D U N G" → "BANDUNG"), leaving the
/// rest of the string untouched.
pub fn repair_spaced_words(input: &str) -> Cow<'_, str> {
    SPACED_WORD.replace_all(input, |caps: &Captures| {
        WHITESPACE.replace_all(&caps[0], "").into_owned()
    })
}

/// Capitalize each word; connectors stay lowercase except as the first word.
///
/// A word is a run of alphanumerics or apostrophes, so "toli-toli" and
/// "kab.x" both gain a capital after the separator.
pub fn titleize(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut word = String::new();
    let mut first = true;

    for ch in lower.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            word.push(ch);
        } else {
            push_word(&mut out, &mut word, &mut first);
            out.push(ch);
        }
    }
    push_word(&mut out, &mut word, &mut first);
    out
}

fn push_word(out: &mut String, word: &mut String, first: &mut bool) {
    if word.is_empty() {
        return;
    }
    if !*first && CONNECTORS.contains(&word.as_str()) {
        out.push_str(word);
    } else {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            // "ß" uppercases to "SS", which would not survive a second pass
            let mut upper = head.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => out.push(single),
                _ => out.push(head),
            }
            out.push_str(chars.as_str());
        }
    }
    *first = false;
    word.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_row_numbering() {
        assert_eq!(normalize_name("  12 Jawa Tengah ", true), "Jawa Tengah");
        assert_eq!(normalize_name("3Aceh", true), "Aceh");
    }

    #[test]
    fn test_repairs_spaced_word_only() {
        assert_eq!(repair_spaced_words("KOTA B A N D U N G"), "KOTA BANDUNG");
        assert_eq!(repair_spaced_words("Pulau A B"), "Pulau A B");
        assert_eq!(normalize_name("KOTA B A N D U N G", true), "Kota Bandung");
    }

    #[test]
    fn test_expands_abbreviations() {
        assert_eq!(normalize_name("Kab. Cilacap", true), "Kabupaten Cilacap");
        assert_eq!(normalize_name("KAB CILACAP", true), "Kabupaten Cilacap");
        assert_eq!(
            normalize_name("Kab. Kep. Seribu", true),
            "Kabupaten Kepulauan Seribu"
        );
        assert_eq!(
            normalize_name("KOTA ADM. JAKARTA PUSAT", true),
            "Kota Administrasi Jakarta Pusat"
        );
        assert_eq!(normalize_name("DKI JAKARTA", true), "DKI Jakarta");
        assert_eq!(normalize_name("Daista Yogyakarta", true), "DI Yogyakarta");
        assert_eq!(normalize_name("DI YOGYAKARTA", true), "DI Yogyakarta");
    }

    #[test]
    fn test_does_not_double_expand_kabupaten() {
        assert_eq!(
            normalize_name("Kabupaten Cilacap", true),
            "Kabupaten Cilacap"
        );
    }

    #[test]
    fn test_normalizes_hyphen_and_slash_spacing() {
        assert_eq!(normalize_name("TOLI - TOLI", true), "Toli-Toli");
        assert_eq!(normalize_name("Siau /  Tagulandang", false), "Siau/Tagulandang");
        assert_eq!(normalize_name("Sukajadi    Baru", false), "Sukajadi Baru");
    }

    #[test]
    fn test_fixes_truncated_suffixes() {
        assert_eq!(
            normalize_name("BOLAANG MONGONDOW UT", true),
            "Bolaang Mongondow Utara"
        );
        assert_eq!(
            normalize_name("Kab. Bolaang Mongondow Se", true),
            "Kabupaten Bolaang Mongondow Selatan"
        );
        assert_eq!(
            normalize_name("Kab. Kep. Siau Tagulandang B", true),
            "Kabupaten Kepulauan Siau Tagulandang Biaro"
        );
    }

    #[test]
    fn test_titleize_connectors() {
        assert_eq!(titleize("bay of the islands"), "Bay of the Islands");
        assert_eq!(titleize("the hague"), "The Hague");
        assert_eq!(titleize("banjarmasin (banjar)"), "Banjarmasin (Banjar)");
    }

    #[test]
    fn test_titleize_keeps_multi_char_capitals_stable() {
        assert_eq!(titleize("ßa"), "ßa");
        assert_eq!(normalize_name("ß", true), "ß");
        assert_eq!(normalize_name("STRASSE ßERG", true), "Strasse ßerg");
        assert_eq!(titleize("élang"), "Élang");
    }

    #[test]
    fn test_districts_keep_source_case() {
        assert_eq!(normalize_name("Banjarmasin (Banjar)", false), "Banjarmasin (Banjar)");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            raw in "(Kab\\. |Kep\\. |Daista |DKI |Kota Adm\\. |12 )?[A-Za-z0-9ßéÉñÑçÇüÜ ./()-]{0,30}",
            titleize_words in any::<bool>(),
        ) {
            let once = normalize_name(&raw, titleize_words);
            let twice = normalize_name(&once, titleize_words);
            prop_assert_eq!(once, twice);
        }
    }
}
