// Keyword and context scorer for sexual content outside NSFW channels.
//
// The score has three parts:
// - explicit: one point per explicit term group hit in the message
// - contextual: phrase combinations that only mean something together
// - history: the same author's recent messages in the channel

use once_cell::sync::Lazy;
use regex::Regex;

fn word_set(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("nsfw pattern is valid")
}

/// Explicit term groups. A group counts once no matter how many of its terms appear.
static EXPLICIT_GROUPS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        "sex|fuck|shag",
        "blowjob|bj|handjob|hj|titjob",
        "anal|vaginal|penetration",
        "orgasm|climax|cum|sperm|ejaculation",
        r"masturbat\w*|jack off|jerk off|wank",
        "dick|cock|penis|schlong",
        "pussy|vagina|cunt|coochie",
        "boobs|tits|breasts|nipples",
        "ass|butt|booty",
        "smash|tap that|get laid",
        "hook up|one night stand|friends with benefits",
        "sexy|horny|aroused|turned on",
        "send nudes|send pics",
        "wanna fuck|want to fuck|down to fuck",
        "cybersex",
    ]
    .into_iter()
    .map(word_set)
    .collect()
});

static ACTIVITY: Lazy<Regex> = Lazy::new(|| word_set("want to|let's|lets|we should|do you|can we"));
static DESCRIPTIVE: Lazy<Regex> = Lazy::new(|| word_set("big|small|hard|wet|huge|tight"));
static REQUEST: Lazy<Regex> = Lazy::new(|| word_set("send|show|give me|let me see|wanna see"));
static BODY: Lazy<Regex> = Lazy::new(|| word_set("nudes?|pics?|photos?|pictures?|body"));

/// Points for a request phrase next to a body/picture noun.
const REQUEST_WEIGHT: u32 = 2;
/// Points for an activity phrase next to a descriptive adjective.
const ACTIVITY_WEIGHT: u32 = 1;
/// Cumulative explicit hits across the author's history that add points.
const HISTORY_EXPLICIT_HITS: u32 = 3;
const HISTORY_EXPLICIT_WEIGHT: u32 = 2;
const HISTORY_REQUEST_HITS: u32 = 2;
const HISTORY_REQUEST_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NsfwScore {
    pub explicit: u32,
    pub contextual: u32,
    pub history: u32,
}

impl NsfwScore {
    pub fn total(&self) -> u32 {
        self.explicit + self.contextual + self.history
    }

    pub fn is_flagged(&self, threshold: u32) -> bool {
        self.total() >= threshold
    }

    /// What staff see as the severity: explicit hits in the message itself.
    pub fn severity(&self) -> u32 {
        self.explicit
    }
}

/// Number of explicit term groups the text hits.
pub fn explicit_matches(text: &str) -> u32 {
    EXPLICIT_GROUPS.iter().filter(|re| re.is_match(text)).count() as u32
}

fn contextual_score(text: &str) -> u32 {
    let mut score = 0;
    if REQUEST.is_match(text) && BODY.is_match(text) {
        score += REQUEST_WEIGHT;
    }
    if ACTIVITY.is_match(text) && DESCRIPTIVE.is_match(text) {
        score += ACTIVITY_WEIGHT;
    }
    score
}

fn history_score(history: &[&str]) -> u32 {
    let explicit_hits: u32 = history.iter().map(|m| explicit_matches(m)).sum();
    let requests = history.iter().filter(|m| REQUEST.is_match(m)).count() as u32;

    let mut score = 0;
    if explicit_hits >= HISTORY_EXPLICIT_HITS {
        score += HISTORY_EXPLICIT_WEIGHT;
    }
    if requests >= HISTORY_REQUEST_HITS {
        score += HISTORY_REQUEST_WEIGHT;
    }
    score
}

/// Score a message. `history` holds the same author's earlier messages
/// from the channel, excluding `text` itself.
pub fn score(text: &str, history: &[&str]) -> NsfwScore {
    NsfwScore {
        explicit: explicit_matches(text),
        contextual: contextual_score(text),
        history: history_score(history),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u32 = 2;

    #[test]
    fn test_two_explicit_terms_flag() {
        let s = score("so horny, send nudes", &[]);
        assert_eq!(s.explicit, 2);
        assert!(s.is_flagged(THRESHOLD));
    }

    #[test]
    fn test_single_group_does_not_flag() {
        // Both words belong to the same group.
        let s = score("feeling sexy and horny", &[]);
        assert_eq!(s.explicit, 1);
        assert!(!s.is_flagged(THRESHOLD));
    }

    #[test]
    fn test_innocuous_sentences_not_flagged() {
        for text in [
            "I want to buy a big pizza tonight",
            "can you show me the patch notes?",
            "did you see the game last night",
            "the class was hard but fun",
            "assessment tomorrow, wish me luck",
        ] {
            let s = score(text, &[]);
            assert!(!s.is_flagged(THRESHOLD), "{:?} scored {:?}", text, s);
        }
    }

    #[test]
    fn test_request_for_pictures_is_contextual() {
        let s = score("send me a pic of your body", &[]);
        assert_eq!(s.contextual, REQUEST_WEIGHT);
        assert!(s.is_flagged(THRESHOLD));
    }

    #[test]
    fn test_history_pushes_borderline_message_over() {
        let history = ["she has a nice butt", "so horny rn", "tits out"];
        let s = score("so what now", &history);
        assert_eq!(s.explicit, 0);
        assert_eq!(s.history, HISTORY_EXPLICIT_WEIGHT);
        assert!(s.is_flagged(THRESHOLD));
    }

    #[test]
    fn test_history_requests_add_one() {
        let history = ["send it", "show it already"];
        let s = score("hello", &history);
        assert_eq!(s.history, HISTORY_REQUEST_WEIGHT);
        assert!(!s.is_flagged(THRESHOLD));
    }

    #[test]
    fn test_severity_is_explicit_count() {
        let s = score("dick pics, send nudes, horny", &[]);
        assert_eq!(s.severity(), 3);
    }
}
