use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::Palindrome,
    name: "Palindrome Checker",
    description: "Enter words or phrases that read the same backwards",
    rounds: RoundPlan::Fixed {
        default: 5,
        advance_on_miss: true,
    },
    scoring: ScoringRule::Count,
    records: &[RecordSpec::higher("BestAccuracy", Metric::Accuracy)],
    reveal_delay: None,
};

const SUGGESTIONS: [&str; 15] = [
    "racecar",
    "madam",
    "level",
    "deed",
    "radar",
    "civic",
    "rotor",
    "kayak",
    "A man a plan a canal Panama",
    "Do geese see God?",
    "Was it a car or a cat I saw?",
    "Never odd or even",
    "A Toyota! Race fast, safe car! A Toyota!",
    "Taco cat",
    "Evil olive",
];

/// Lowercased ASCII alphanumerics of `text`
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn is_palindrome(text: &str) -> bool {
    let clean = normalize(text);
    !clean.is_empty() && clean.chars().eq(clean.chars().rev())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub suggestion: &'static str,
    checked: Option<String>,
}

impl Prompt {
    pub fn new(suggestion: &'static str) -> Self {
        Self {
            suggestion,
            checked: None,
        }
    }

    /// Last submission for this round, as typed
    pub fn checked(&self) -> Option<&str> {
        self.checked.as_deref()
    }
}

/// What the checker compared on a miss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    pub forward: String,
    pub backward: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PalindromeHunt;

impl Game for PalindromeHunt {
    type Params = ();
    type Challenge = Prompt;
    type Answer = str;
    type Feedback = Mirror;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(&self, _config: &SessionConfig<()>, rng: &mut dyn RandomSource) -> Prompt {
        let idx = rng.below(SUGGESTIONS.len() as u32) as usize;
        Prompt::new(SUGGESTIONS[idx])
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<()>,
        prompt: &mut Prompt,
        text: &str,
    ) -> Outcome<Mirror> {
        prompt.checked = Some(text.to_string());
        if is_palindrome(text) {
            return Outcome::Correct;
        }
        let forward = normalize(text);
        let backward = forward.chars().rev().collect();
        Outcome::Incorrect(Some(Mirror { forward, backward }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;

    #[test]
    fn suggestions_are_palindromes() {
        for s in SUGGESTIONS {
            assert!(is_palindrome(s), "{s}");
        }
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert!(is_palindrome("Was it a car or a cat I saw?"));
        assert!(is_palindrome("12321"));
        assert!(!is_palindrome("hello"));
    }

    #[test]
    fn empty_after_cleanup_is_not_a_palindrome() {
        assert!(!is_palindrome(""));
        assert!(!is_palindrome("  ?!  "));
    }

    #[test]
    fn generate_picks_a_suggestion() {
        let config = SessionConfig::default();
        let p = PalindromeHunt.generate(&config, &mut ScriptedSource::new(vec![0.0]));
        assert_eq!(p.suggestion, "racecar");
        let p = PalindromeHunt.generate(&config, &mut ScriptedSource::new(vec![0.9999]));
        assert_eq!(p.suggestion, "Evil olive");
    }

    #[test]
    fn miss_shows_both_directions() {
        let config = SessionConfig::default();
        let mut prompt = Prompt::new("level");
        assert_eq!(
            PalindromeHunt.evaluate(&config, &mut prompt, "Rust!"),
            Outcome::Incorrect(Some(Mirror {
                forward: "rust".into(),
                backward: "tsur".into()
            }))
        );
        assert_eq!(prompt.checked(), Some("Rust!"));
        assert_eq!(
            PalindromeHunt.evaluate(&config, &mut prompt, "Taco cat"),
            Outcome::Correct
        );
    }
}
