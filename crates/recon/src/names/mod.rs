//! Name parsing and the same-person decision used by clustering.
//!
//! Names arrive as free text typed by different operators: "Last, First",
//! "First Middle Last", nicknames in quotes, honorifics, suffixes, missing
//! spaces. Everything here is pure and total; an unusable name simply never
//! matches.

mod metaphone;
mod nicknames;
mod normalize;
mod similarity;
mod tokenize;

use serde::Serialize;

pub use metaphone::phonetic_code;
pub use nicknames::are_nickname_related;
pub use normalize::fold;
pub use similarity::set_similarity;
pub use tokenize::expand_tokenizations;

use normalize::clean_token;

const HONORIFICS: &[&str] = &["dr", "mr", "mrs", "ms", "miss", "prof"];

const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "md", "rn", "np", "pa", "phd", "dds", "dmd", "esq",
];

/// Shortest prefix accepted as an abbreviation of a first name.
const MIN_ABBREVIATION: usize = 3;

/// Middle names with less phonetic overlap than this are a conflict.
const MIDDLE_NAME_SIMILARITY: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedName {
    /// Empty when only one name was given.
    pub first: String,
    /// Space-separated when there are several.
    pub middle: Option<String>,
    pub last: String,
    pub nickname: Option<String>,
    pub suffix: Option<String>,
}

/// Parse one spelling of a name. `None` when no surname can be found.
pub fn parse_name(raw: &str) -> Option<ParsedName> {
    let folded = fold(raw);
    let (rest, nickname) = extract_nickname(&folded);

    let mut parsed = match rest.split_once(',') {
        Some((last, given)) => {
            let mut parts = given.split(',');
            let mut given = strip_honorifics(tokens(parts.next().unwrap_or_default()));
            let mut suffixes = strip_suffixes(&mut given, 1);
            suffixes.extend(parts.flat_map(tokens));

            let last = strip_honorifics(tokens(last));
            let mut given = given.into_iter();
            ParsedName {
                first: given.next().unwrap_or_default(),
                middle: join(given),
                last: last.join(" "),
                nickname: None,
                suffix: join(suffixes.into_iter()),
            }
        }
        None => {
            let mut words = strip_honorifics(tokens(&rest));
            let suffixes = strip_suffixes(&mut words, 2);
            let last = words.pop().unwrap_or_default();
            let mut words = words.into_iter();
            ParsedName {
                first: words.next().unwrap_or_default(),
                middle: join(words),
                last,
                nickname: None,
                suffix: join(suffixes.into_iter()),
            }
        }
    };

    if parsed.last.is_empty() {
        return None;
    }
    parsed.nickname = nickname;
    Some(parsed)
}

/// Whether two free-text names plausibly denote the same person. Symmetric.
pub fn names_represent_same_person(a: &str, b: &str) -> bool {
    let left = variants(a);
    if left.is_empty() {
        return false;
    }
    let right = variants(b);
    left.iter()
        .any(|x| right.iter().any(|y| parsed_names_match(x, y)))
}

/// Parses of every tokenization of `raw`. A re-tokenized spelling may move
/// word boundaries among the given names but never carve pieces off the
/// surname: "Mary McDonald" must not become middle "mc", last "donald".
fn variants(raw: &str) -> Vec<ParsedName> {
    let Some(original) = parse_name(raw) else {
        return Vec::new();
    };
    let surname = squash(&original.last);
    expand_tokenizations(raw)
        .iter()
        .filter_map(|v| parse_name(v))
        .filter(|p| squash(&p.last) == surname)
        .collect()
}

fn parsed_names_match(a: &ParsedName, b: &ParsedName) -> bool {
    last_names_match(&a.last, &b.last) && first_names_match(a, b) && !middle_names_conflict(a, b)
}

fn squash(name: &str) -> String {
    name.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

fn phonetic_eq(a: &str, b: &str) -> bool {
    let code = phonetic_code(a);
    !code.is_empty() && code == phonetic_code(b)
}

fn last_names_match(a: &str, b: &str) -> bool {
    let (a, b) = (squash(a), squash(b));
    !a.is_empty() && !b.is_empty() && (a == b || phonetic_eq(&a, &b))
}

fn first_names_match(a: &ParsedName, b: &ParsedName) -> bool {
    let candidates = |n: &ParsedName| -> Vec<String> {
        std::iter::once(n.first.clone())
            .chain(n.nickname.clone())
            .filter(|s| !s.is_empty())
            .collect()
    };
    let right = candidates(b);
    candidates(a)
        .iter()
        .any(|x| right.iter().any(|y| given_names_match(x, y)))
}

fn given_names_match(a: &str, b: &str) -> bool {
    if a == b || squash(a) == squash(b) || phonetic_eq(a, b) || are_nickname_related(a, b) {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= MIN_ABBREVIATION && long.starts_with(short)
}

/// Only meaningful when both names carry a middle name.
fn middle_names_conflict(a: &ParsedName, b: &ParsedName) -> bool {
    let (Some(ma), Some(mb)) = (&a.middle, &b.middle) else {
        return false;
    };
    let ta: Vec<&str> = ma.split(' ').collect();
    let tb: Vec<&str> = mb.split(' ').collect();

    // An initial can only be checked against the other's first letter.
    if ta[0].chars().count() == 1 || tb[0].chars().count() == 1 {
        return ta[0].chars().next() != tb[0].chars().next();
    }

    let ca: Vec<String> = ta.iter().map(|t| phonetic_code(t)).collect();
    let cb: Vec<String> = tb.iter().map(|t| phonetic_code(t)).collect();
    let sim = set_similarity(&ca, &cb).max(set_similarity(&cb, &ca));
    !(sim >= MIDDLE_NAME_SIMILARITY)
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn tokens(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect()
}

fn join(parts: impl Iterator<Item = String>) -> Option<String> {
    let joined = parts.collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn strip_honorifics(mut words: Vec<String>) -> Vec<String> {
    while words.len() > 1 && HONORIFICS.contains(&words[0].as_str()) {
        words.remove(0);
    }
    words
}

/// Pop trailing suffixes while more than `keep` words remain.
fn strip_suffixes(words: &mut Vec<String>, keep: usize) -> Vec<String> {
    let mut found = Vec::new();
    while words.len() > keep && words.last().is_some_and(|w| SUFFIXES.contains(&w.as_str())) {
        if let Some(w) = words.pop() {
            found.push(w);
        }
    }
    found.reverse();
    found
}

/// Pull a `"quoted"`, `(parenthesised)` or `'single-quoted'` nickname out of
/// an already folded name.
fn extract_nickname(s: &str) -> (String, Option<String>) {
    for (open, close) in [('"', '"'), ('(', ')')] {
        if let Some(start) = s.find(open) {
            let inner_start = start + open.len_utf8();
            if let Some(len) = s[inner_start..].find(close) {
                let inner = &s[inner_start..inner_start + len];
                let rest = format!("{} {}", &s[..start], &s[inner_start + len + close.len_utf8()..]);
                return (rest, tokens(inner).into_iter().next());
            }
        }
    }

    let mut nickname = None;
    let mut kept = Vec::new();
    for word in s.split_whitespace() {
        let quoted = word.len() > 2 && word.starts_with('\'') && word.ends_with('\'');
        if quoted && nickname.is_none() {
            nickname = tokens(word).into_iter().next();
        } else {
            kept.push(word);
        }
    }
    (kept.join(" "), nickname)
}
