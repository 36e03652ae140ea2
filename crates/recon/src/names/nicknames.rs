// Common English given-name diminutives, keyed by the formal name.
const NICKNAMES: &[(&str, &[&str])] = &[
    ("abigail", &["abby", "gail"]),
    ("albert", &["al", "bert", "bertie"]),
    ("alexander", &["alex", "al", "sandy", "xander"]),
    ("alexandra", &["alex", "sandra", "sandy", "lexi"]),
    ("alfred", &["al", "alf", "fred"]),
    ("andrew", &["andy", "drew"]),
    ("anthony", &["tony"]),
    ("barbara", &["barb", "babs"]),
    ("benjamin", &["ben", "benny", "benji"]),
    ("catherine", &["cathy", "kate", "katie", "cat"]),
    ("charles", &["charlie", "chuck", "chas", "chip"]),
    ("christina", &["chris", "tina", "christy"]),
    ("christine", &["chris", "tina", "christy"]),
    ("christopher", &["chris", "kit", "topher"]),
    ("daniel", &["dan", "danny"]),
    ("david", &["dave", "davey"]),
    ("deborah", &["deb", "debbie"]),
    ("dorothy", &["dot", "dottie", "dolly"]),
    ("edward", &["ed", "eddie", "ted", "ned"]),
    ("elizabeth", &["liz", "beth", "betty", "betsy", "eliza", "lisa", "libby"]),
    ("frances", &["fran", "frannie"]),
    ("francis", &["frank", "fran"]),
    ("frederick", &["fred", "freddy", "rick"]),
    ("gregory", &["greg"]),
    ("harold", &["hal", "harry"]),
    ("henry", &["hank", "harry", "hal"]),
    ("james", &["jim", "jimmy", "jamie"]),
    ("jennifer", &["jen", "jenny", "jenn"]),
    ("john", &["jack", "johnny", "jon"]),
    ("jonathan", &["jon", "jonny", "nathan"]),
    ("joseph", &["joe", "joey"]),
    ("katherine", &["kathy", "kate", "katie", "kay", "kit"]),
    ("kenneth", &["ken", "kenny"]),
    ("lawrence", &["larry"]),
    ("margaret", &["maggie", "meg", "peggy", "marge", "greta"]),
    ("matthew", &["matt"]),
    ("michael", &["mike", "mikey", "mick"]),
    ("nicholas", &["nick", "nicky"]),
    ("patricia", &["pat", "patty", "trish"]),
    ("patrick", &["pat", "paddy"]),
    ("peter", &["pete"]),
    ("rebecca", &["becky", "becca"]),
    ("richard", &["rick", "dick", "rich", "richie"]),
    ("robert", &["bob", "bobby", "rob", "robbie", "bert"]),
    ("ronald", &["ron", "ronnie"]),
    ("samuel", &["sam", "sammy"]),
    ("stephen", &["steve", "stevie"]),
    ("steven", &["steve", "stevie"]),
    ("susan", &["sue", "susie"]),
    ("theodore", &["ted", "teddy", "theo"]),
    ("thomas", &["tom", "tommy"]),
    ("timothy", &["tim", "timmy"]),
    ("victoria", &["vicky", "tori"]),
    ("william", &["bill", "billy", "will", "willy", "liam"]),
];

/// True when one name is a listed diminutive of the other. Two diminutives
/// of the same formal name ("bill", "will") are not related.
pub fn are_nickname_related(a: &str, b: &str) -> bool {
    a != b && (is_nickname_of(a, b) || is_nickname_of(b, a))
}

fn is_nickname_of(nickname: &str, formal: &str) -> bool {
    NICKNAMES
        .iter()
        .any(|(name, nicks)| *name == formal && nicks.contains(&nickname))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formal_and_diminutive() {
        assert!(are_nickname_related("bill", "william"));
        assert!(are_nickname_related("william", "bill"));
        assert!(are_nickname_related("peggy", "margaret"));
    }

    #[test]
    fn siblings_and_strangers() {
        assert!(!are_nickname_related("bill", "will"));
        assert!(!are_nickname_related("bud", "f"));
        assert!(!are_nickname_related("john", "john"));
    }

    #[test]
    fn table_is_lowercase_and_sorted() {
        for pair in NICKNAMES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} out of order", pair[1].0);
        }
        for (name, nicks) in NICKNAMES {
            assert_eq!(*name, name.to_lowercase());
            assert!(nicks.iter().all(|n| *n == n.to_lowercase()));
        }
    }
}
