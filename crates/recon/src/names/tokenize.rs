use std::collections::BTreeSet;

/// Alternate spellings of a raw name that may have lost or gained word
/// boundaries: the original, a space or hyphen inserted at each lower/upper
/// case boundary ("SmithJones"), and hyphens replaced by a space or removed.
pub fn expand_tokenizations(raw: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    out.insert(raw.to_string());

    let chars: Vec<char> = raw.chars().collect();
    for i in 1..chars.len() {
        if chars[i - 1].is_lowercase() && chars[i].is_uppercase() {
            for sep in [' ', '-'] {
                let mut variant: String = chars[..i].iter().collect();
                variant.push(sep);
                variant.extend(&chars[i..]);
                out.insert(variant);
            }
        }
    }

    if raw.contains('-') {
        out.insert(raw.replace('-', " "));
        out.insert(raw.replace('-', ""));
    }
    out
}
