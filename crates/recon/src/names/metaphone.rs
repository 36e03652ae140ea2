//! Primary Double Metaphone encoding.
//!
//! Input is reduced to ASCII letters before encoding; fold diacritics first.
//! The code is not truncated.

/// Primary Double Metaphone code of `word`. Empty when `word` has no letters.
pub fn phonetic_code(word: &str) -> String {
    let chars: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    Encoder::new(chars).encode()
}

struct Encoder {
    w: Vec<char>,
    out: String,
    slavo_germanic: bool,
}

impl Encoder {
    fn new(w: Vec<char>) -> Self {
        let text: String = w.iter().collect();
        let slavo_germanic =
            text.contains('W') || text.contains('K') || text.contains("CZ") || text.contains("WITZ");
        Self {
            w,
            out: String::new(),
            slavo_germanic,
        }
    }

    fn at(&self, i: isize) -> char {
        if i < 0 {
            return '\0';
        }
        self.w.get(i as usize).copied().unwrap_or('\0')
    }

    fn is_vowel(&self, i: isize) -> bool {
        matches!(self.at(i), 'A' | 'E' | 'I' | 'O' | 'U' | 'Y')
    }

    /// Whether the `len` letters starting at `start` equal one of `options`.
    fn string_at(&self, start: isize, len: usize, options: &[&str]) -> bool {
        if start < 0 {
            return false;
        }
        let start = start as usize;
        let Some(slice) = self.w.get(start..start + len) else {
            return false;
        };
        options
            .iter()
            .any(|o| o.len() == len && o.chars().zip(slice).all(|(a, b)| a == *b))
    }

    fn push(&mut self, code: &str) {
        self.out.push_str(code);
    }

    fn encode(mut self) -> String {
        if self.w.is_empty() {
            return self.out;
        }
        let length = self.w.len() as isize;
        let last = length - 1;
        let mut cur: isize = 0;

        if self.string_at(0, 2, &["GN", "KN", "PN", "WR", "PS"]) {
            cur = 1;
        }
        if self.at(0) == 'X' {
            self.push("S");
            cur = 1;
        }

        while cur < length {
            cur += match self.at(cur) {
                'A' | 'E' | 'I' | 'O' | 'U' | 'Y' => {
                    if cur == 0 {
                        self.push("A");
                    }
                    1
                }
                'B' => {
                    self.push("P");
                    if self.at(cur + 1) == 'B' { 2 } else { 1 }
                }
                'C' => self.c(cur),
                'D' => {
                    if self.string_at(cur, 2, &["DG"]) {
                        if self.string_at(cur + 2, 1, &["I", "E", "Y"]) {
                            self.push("J");
                            3
                        } else {
                            self.push("TK");
                            2
                        }
                    } else if self.string_at(cur, 2, &["DT", "DD"]) {
                        self.push("T");
                        2
                    } else {
                        self.push("T");
                        1
                    }
                }
                'F' => self.simple("F", 'F', cur),
                'G' => self.g(cur),
                'H' => {
                    if (cur == 0 || self.is_vowel(cur - 1)) && self.is_vowel(cur + 1) {
                        self.push("H");
                        2
                    } else {
                        1
                    }
                }
                'J' => self.j(cur, last),
                'K' => self.simple("K", 'K', cur),
                'L' => self.simple("L", 'L', cur),
                'M' => {
                    self.push("M");
                    let umb = self.string_at(cur - 1, 3, &["UMB"])
                        && (cur + 1 == last || self.string_at(cur + 2, 2, &["ER"]));
                    if umb || self.at(cur + 1) == 'M' { 2 } else { 1 }
                }
                'N' => self.simple("N", 'N', cur),
                'P' => {
                    if self.at(cur + 1) == 'H' {
                        self.push("F");
                        2
                    } else {
                        self.push("P");
                        if self.string_at(cur + 1, 1, &["P", "B"]) { 2 } else { 1 }
                    }
                }
                'Q' => self.simple("K", 'Q', cur),
                'R' => {
                    let silent = cur == last
                        && !self.slavo_germanic
                        && self.string_at(cur - 2, 2, &["IE"])
                        && !self.string_at(cur - 4, 2, &["ME", "MA"]);
                    if !silent {
                        self.push("R");
                    }
                    if self.at(cur + 1) == 'R' { 2 } else { 1 }
                }
                'S' => self.s(cur, last),
                'T' => self.t(cur),
                'V' => self.simple("F", 'V', cur),
                'W' => self.w(cur, last),
                'X' => {
                    let silent = cur == last
                        && (self.string_at(cur - 3, 3, &["IAU", "EAU"])
                            || self.string_at(cur - 2, 2, &["AU", "OU"]));
                    if !silent {
                        self.push("KS");
                    }
                    if self.string_at(cur + 1, 1, &["C", "X"]) { 2 } else { 1 }
                }
                'Z' => {
                    if self.at(cur + 1) == 'H' {
                        self.push("J");
                        2
                    } else {
                        self.push("S");
                        if self.at(cur + 1) == 'Z' { 2 } else { 1 }
                    }
                }
                _ => 1,
            };
        }
        self.out
    }

    /// Letters that encode to one code and absorb a doubled letter.
    fn simple(&mut self, code: &str, letter: char, cur: isize) -> isize {
        self.push(code);
        if self.at(cur + 1) == letter { 2 } else { 1 }
    }

    fn germanic_prefix(&self) -> bool {
        self.string_at(0, 4, &["VAN ", "VON "]) || self.string_at(0, 3, &["SCH"])
    }

    fn c(&mut self, cur: isize) -> isize {
        if cur > 1
            && !self.is_vowel(cur - 2)
            && self.string_at(cur - 1, 3, &["ACH"])
            && self.at(cur + 2) != 'I'
            && (self.at(cur + 2) != 'E' || self.string_at(cur - 2, 6, &["BACHER", "MACHER"]))
        {
            self.push("K");
            return 2;
        }
        if cur == 0 && self.string_at(cur, 6, &["CAESAR"]) {
            self.push("S");
            return 2;
        }
        if self.string_at(cur, 4, &["CHIA"]) {
            self.push("K");
            return 2;
        }
        if self.string_at(cur, 2, &["CH"]) {
            if cur > 0 && self.string_at(cur, 4, &["CHAE"]) {
                self.push("K");
                return 2;
            }
            if cur == 0
                && (self.string_at(cur + 1, 5, &["HARAC", "HARIS"])
                    || self.string_at(cur + 1, 3, &["HOR", "HYM", "HIA", "HEM"]))
                && !self.string_at(0, 5, &["CHORE"])
            {
                self.push("K");
                return 2;
            }
            let hard = self.germanic_prefix()
                || self.string_at(cur - 2, 6, &["ORCHES", "ARCHIT", "ORCHID"])
                || self.string_at(cur + 2, 1, &["T", "S"])
                || ((self.string_at(cur - 1, 1, &["A", "O", "U", "E"]) || cur == 0)
                    && self.string_at(cur + 2, 1, &["L", "R", "N", "M", "B", "H", "F", "V", "W", " "]));
            if hard || (cur > 0 && self.string_at(0, 2, &["MC"])) {
                self.push("K");
            } else {
                self.push("X");
            }
            return 2;
        }
        if self.string_at(cur, 2, &["CZ"]) && !self.string_at(cur - 2, 4, &["WICZ"]) {
            self.push("S");
            return 2;
        }
        if self.string_at(cur + 1, 3, &["CIA"]) {
            self.push("X");
            return 3;
        }
        if self.string_at(cur, 2, &["CC"]) && !(cur == 1 && self.at(0) == 'M') {
            if self.string_at(cur + 2, 1, &["I", "E", "H"]) && !self.string_at(cur + 2, 2, &["HU"]) {
                if (cur == 1 && self.at(cur - 1) == 'A') || self.string_at(cur - 1, 5, &["UCCEE", "UCCES"]) {
                    self.push("KS");
                } else {
                    self.push("X");
                }
                return 3;
            }
            self.push("K");
            return 2;
        }
        if self.string_at(cur, 2, &["CK", "CG", "CQ"]) {
            self.push("K");
            return 2;
        }
        if self.string_at(cur, 2, &["CI", "CE", "CY"]) {
            self.push("S");
            return 2;
        }
        self.push("K");
        if self.string_at(cur + 1, 2, &[" C", " Q", " G"]) {
            3
        } else if self.string_at(cur + 1, 1, &["C", "K", "Q"]) && !self.string_at(cur + 1, 2, &["CE", "CI"]) {
            2
        } else {
            1
        }
    }

    fn g(&mut self, cur: isize) -> isize {
        if self.at(cur + 1) == 'H' {
            if cur > 0 && !self.is_vowel(cur - 1) {
                self.push("K");
                return 2;
            }
            if cur == 0 {
                self.push(if self.at(cur + 2) == 'I' { "J" } else { "K" });
                return 2;
            }
            let silent = (cur > 1 && self.string_at(cur - 2, 1, &["B", "H", "D"]))
                || (cur > 2 && self.string_at(cur - 3, 1, &["B", "H", "D"]))
                || (cur > 3 && self.string_at(cur - 4, 1, &["B", "H"]));
            if !silent {
                if cur > 2
                    && self.at(cur - 1) == 'U'
                    && self.string_at(cur - 3, 1, &["C", "G", "L", "R", "T"])
                {
                    self.push("F");
                } else if cur > 0 && self.at(cur - 1) != 'I' {
                    self.push("K");
                }
            }
            return 2;
        }
        if self.at(cur + 1) == 'N' {
            if cur == 1 && self.is_vowel(0) && !self.slavo_germanic {
                self.push("KN");
            } else if !self.string_at(cur + 2, 2, &["EY"]) && !self.slavo_germanic {
                self.push("N");
            } else {
                self.push("KN");
            }
            return 2;
        }
        if self.string_at(cur + 1, 2, &["LI"]) && !self.slavo_germanic {
            self.push("KL");
            return 2;
        }
        if cur == 0
            && (self.at(cur + 1) == 'Y'
                || self.string_at(
                    cur + 1,
                    2,
                    &["ES", "EP", "EB", "EL", "EY", "IB", "IL", "IN", "IE", "EI", "ER"],
                ))
        {
            self.push("K");
            return 2;
        }
        if (self.string_at(cur + 1, 2, &["ER"]) || self.at(cur + 1) == 'Y')
            && !self.string_at(0, 6, &["DANGER", "RANGER", "MANGER"])
            && !self.string_at(cur - 1, 1, &["E", "I"])
            && !self.string_at(cur - 1, 3, &["RGY", "OGY"])
        {
            self.push("K");
            return 2;
        }
        if self.string_at(cur + 1, 1, &["E", "I", "Y"]) || self.string_at(cur - 1, 4, &["AGGI", "OGGI"]) {
            if self.germanic_prefix() || self.string_at(cur + 1, 2, &["ET"]) {
                self.push("K");
            } else {
                self.push("J");
            }
            return 2;
        }
        self.push("K");
        if self.at(cur + 1) == 'G' { 2 } else { 1 }
    }

    fn j(&mut self, cur: isize, last: isize) -> isize {
        if self.string_at(cur, 4, &["JOSE"]) || self.string_at(0, 4, &["SAN "]) {
            if (cur == 0 && self.at(cur + 4) == ' ') || self.string_at(0, 4, &["SAN "]) {
                self.push("H");
            } else {
                self.push("J");
            }
            return 1;
        }
        if cur == 0
            || (self.is_vowel(cur - 1)
                && !self.slavo_germanic
                && matches!(self.at(cur + 1), 'A' | 'O'))
            || cur == last
            || (!self.string_at(cur + 1, 1, &["L", "T", "K", "S", "N", "M", "B", "Z"])
                && !self.string_at(cur - 1, 1, &["S", "K", "L"]))
        {
            self.push("J");
        }
        if self.at(cur + 1) == 'J' { 2 } else { 1 }
    }

    fn s(&mut self, cur: isize, last: isize) -> isize {
        if self.string_at(cur - 1, 3, &["ISL", "YSL"]) {
            return 1;
        }
        if cur == 0 && self.string_at(cur, 5, &["SUGAR"]) {
            self.push("X");
            return 1;
        }
        if self.string_at(cur, 2, &["SH"]) {
            if self.string_at(cur + 1, 4, &["HEIM", "HOEK", "HOLM", "HOLZ"]) {
                self.push("S");
            } else {
                self.push("X");
            }
            return 2;
        }
        if self.string_at(cur, 3, &["SIO", "SIA"]) || self.string_at(cur, 4, &["SIAN"]) {
            self.push("S");
            return 3;
        }
        if (cur == 0 && self.string_at(cur + 1, 1, &["M", "N", "L", "W"])) || self.string_at(cur + 1, 1, &["Z"]) {
            self.push("S");
            return if self.string_at(cur + 1, 1, &["Z"]) { 2 } else { 1 };
        }
        if self.string_at(cur, 2, &["SC"]) {
            if self.at(cur + 2) == 'H' {
                if self.string_at(cur + 3, 2, &["OO", "ER", "EN", "UY", "ED", "EM"]) {
                    if self.string_at(cur + 3, 2, &["ER", "EN"]) {
                        self.push("X");
                    } else {
                        self.push("SK");
                    }
                } else {
                    self.push("X");
                }
                return 3;
            }
            if self.string_at(cur + 2, 1, &["I", "E", "Y"]) {
                self.push("S");
            } else {
                self.push("SK");
            }
            return 3;
        }
        let silent = cur == last && self.string_at(cur - 2, 2, &["AI", "OI"]);
        if !silent {
            self.push("S");
        }
        if self.string_at(cur + 1, 1, &["S", "Z"]) { 2 } else { 1 }
    }

    fn t(&mut self, cur: isize) -> isize {
        if self.string_at(cur, 4, &["TION"]) || self.string_at(cur, 3, &["TIA", "TCH"]) {
            self.push("X");
            return 3;
        }
        if self.string_at(cur, 2, &["TH"]) || self.string_at(cur, 3, &["TTH"]) {
            if self.string_at(cur + 2, 2, &["OM", "AM"]) || self.germanic_prefix() {
                self.push("T");
            } else {
                self.push("0");
            }
            return 2;
        }
        self.push("T");
        if self.string_at(cur + 1, 1, &["T", "D"]) { 2 } else { 1 }
    }

    fn w(&mut self, cur: isize, last: isize) -> isize {
        if self.string_at(cur, 2, &["WR"]) {
            self.push("R");
            return 2;
        }
        if cur == 0 && (self.is_vowel(cur + 1) || self.string_at(cur, 2, &["WH"])) {
            self.push("A");
        }
        if (cur == last && self.is_vowel(cur - 1))
            || self.string_at(cur - 1, 5, &["EWSKI", "EWSKY", "OWSKI", "OWSKY"])
            || self.string_at(0, 3, &["SCH"])
        {
            return 1;
        }
        if self.string_at(cur, 4, &["WICZ", "WITZ"]) {
            self.push("TS");
            return 4;
        }
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        let cases = [
            ("Smith", "SM0"),
            ("Smyth", "SM0"),
            ("Jon", "JN"),
            ("John", "JN"),
            ("Jones", "JNS"),
            ("Jonas", "JNS"),
            ("Tim", "TM"),
            ("Timothy", "TM0"),
            ("Reinsch", "RNX"),
            ("Catherine", "K0RN"),
            ("Katherine", "K0RN"),
            ("Philip", "FLP"),
            ("Knight", "NT"),
            ("Xavier", "SF"),
            ("Thomas", "TMS"),
            ("Schmidt", "XMT"),
        ];
        for (word, code) in cases {
            assert_eq!(phonetic_code(word), code, "{word}");
        }
    }

    #[test]
    fn non_letters_are_ignored() {
        assert_eq!(phonetic_code("smith-jones"), phonetic_code("SMITHJONES"));
        assert_eq!(phonetic_code(""), "");
        assert_eq!(phonetic_code("--"), "");
    }
}
