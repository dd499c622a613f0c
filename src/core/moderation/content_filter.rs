// Slur and filter-bypass detection.
//
// Each target word is compiled once into a case-insensitive regex that
// tolerates leet substitutions, stretched letters and separators between
// letters, while still requiring the match to stand on its own (so
// "classic" or "shiitake" never trip the filter).

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters people put between letters to dodge a plain word match.
const SEPARATOR: &str = r"[\s._\-*]*";

/// Inflections that still count as the target word.
const SUFFIXES: &str = r"(?:s|z|es|ed|er|ers|ing|in|y)?";

/// Display label -> spellings to compile.
const TARGET_WORDS: &[(&str, &[&str])] = &[
    ("n-word", &["nigger", "nigga"]),
    ("f-slur", &["faggot", "fag"]),
    ("r-slur", &["retard"]),
    ("bitch", &["bitch"]),
    ("shit", &["shit"]),
    ("fuck", &["fuck"]),
    ("asshole", &["asshole"]),
    ("whore", &["whore"]),
    ("cunt", &["cunt"]),
    ("self-harm", &["kill yourself", "kys"]),
];

struct FilterTarget {
    label: &'static str,
    pattern: Regex,
}

static TARGETS: Lazy<Vec<FilterTarget>> = Lazy::new(|| {
    TARGET_WORDS
        .iter()
        .flat_map(|(label, spellings)| {
            spellings.iter().map(move |spelling| FilterTarget {
                label,
                pattern: Regex::new(&build_pattern(spelling)).expect("filter pattern is valid"),
            })
        })
        .collect()
});

fn leet_class(c: char) -> String {
    match c {
        'a' => "[a4@]".to_string(),
        'e' => "[e3]".to_string(),
        'i' => "[i1!|]".to_string(),
        'o' => "[o0]".to_string(),
        's' => "[s5$]".to_string(),
        't' => "[t7+]".to_string(),
        'g' => "[g96]".to_string(),
        'u' => "[uv*]".to_string(),
        other => regex::escape(&other.to_string()),
    }
}

fn build_pattern(word: &str) -> String {
    let letters: Vec<String> = word
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| format!("{}+", leet_class(c)))
        .collect();

    format!(
        r"(?i)(?:^|[^a-z0-9]){}{}(?:$|[^a-z0-9])",
        letters.join(SEPARATOR),
        SUFFIXES
    )
}

/// Which target the text hits, if any.
pub fn find_target(text: &str) -> Option<&'static str> {
    TARGETS
        .iter()
        .find(|t| t.pattern.is_match(text))
        .map(|t| t.label)
}
