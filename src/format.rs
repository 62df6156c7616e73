//! Number formatting for terminal output and exported labels.

use num_format::{Locale, ToFormattedString};

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `sl`, `sl_SI`, `de`, `de_DE`,
/// `german`, `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        // Slovenian groups with '.' and uses ',' for decimals, same as German.
        "sl" | "sl_si" | "slovenian" | "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Whole-number count with locale thousands separators (`12,345` / `12.345`).
pub fn format_count(value: f64, locale_tag: &str) -> String {
    let (locale, _) = map_locale(locale_tag);
    let n = value.round() as i64;
    n.to_formatted_string(locale)
}

/// Share in 0..=1 as a percentage with one decimal, using the locale's decimal separator.
pub fn format_share(share: f64, locale_tag: &str) -> String {
    let (_, dec) = map_locale(locale_tag);
    let s = format!("{:.1}%", share * 100.0);
    if dec == '.' { s } else { s.replace('.', &dec.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_use_locale_separators() {
        assert_eq!(format_count(1234567.0, "en"), "1,234,567");
        assert_eq!(format_count(1234567.0, "de"), "1.234.567");
        assert_eq!(format_count(12.4, "en"), "12");
    }

    #[test]
    fn shares_use_decimal_separator() {
        assert_eq!(format_share(0.125, "en"), "12.5%");
        assert_eq!(format_share(0.5, "sl"), "50,0%");
    }
}
