use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase ASCII-ish form of `raw`: compatibility decomposition, combining
/// marks dropped, and letters that do not decompose folded by hand.
pub fn fold(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.nfkd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' => out.push_str("ss"),
            'æ' | 'Æ' => out.push_str("ae"),
            'œ' | 'Œ' => out.push_str("oe"),
            'ø' | 'Ø' => out.push('o'),
            'ł' | 'Ł' => out.push('l'),
            'đ' | 'Đ' => out.push('d'),
            'þ' | 'Þ' => out.push_str("th"),
            'ı' => out.push('i'),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            c => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Keep letters and internal hyphens. Periods and apostrophes vanish
/// ("o'neil" -> "oneil"); anything else is dropped.
pub fn clean_token(token: &str) -> String {
    let kept: String = token
        .chars()
        .filter(|c| c.is_alphabetic() || *c == '-')
        .collect();
    kept.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(fold("JOSÉ Müller"), "jose muller");
        assert_eq!(fold("Ångström"), "angstrom");
    }

    #[test]
    fn folds_letters_without_decomposition() {
        assert_eq!(fold("Straße"), "strasse");
        assert_eq!(fold("Søren Łukasz"), "soren lukasz");
        assert_eq!(fold("Þór"), "thor");
    }

    #[test]
    fn cleans_punctuation() {
        assert_eq!(clean_token("o'neil"), "oneil");
        assert_eq!(clean_token("jr."), "jr");
        assert_eq!(clean_token("smith-jones,"), "smith-jones");
        assert_eq!(clean_token("-x-"), "x");
        assert_eq!(clean_token("..."), "");
    }
}
