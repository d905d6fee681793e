//! Identifier slugs for candidate ids and cache keys.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Generate a lowercase, hyphenated slug.
///
/// Accents are folded (`Julián` → `julian`), apostrophes vanish
/// (`O'Rourke` → `orourke`), and every other run of non-alphanumerics
/// becomes a single `-`.
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .collect::<String>()
        .to_lowercase();

    folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
