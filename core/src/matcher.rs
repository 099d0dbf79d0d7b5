use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchConfig {
    pub fuzzy: bool,
}

/// Outcome of a successful match. Only carried along with results, the
/// history order is never changed by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub score: f64,
}

/// Case-insensitive text matcher for one query.
///
/// In exact mode every query word must be the prefix of some word of the
/// candidate, so `"a"` hits `"Apple"` but not `"Banana"`. Fuzzy mode defers
/// to the skim algorithm over the whole query.
pub struct Matcher {
    query: String,
    words: Vec<String>,
    fuzzy: Option<SkimMatcherV2>,
}

impl Matcher {
    pub fn new(query: &str, config: MatchConfig) -> Self {
        let query = query.trim().to_lowercase();
        let words = split_words(&query);
        let fuzzy = config.fuzzy.then(|| SkimMatcherV2::default().ignore_case());

        Self { query, words, fuzzy }
    }

    pub fn match_text(&self, candidate: &str) -> Option<Match> {
        if self.words.is_empty() {
            return Some(Match { score: 0.0 });
        }

        match &self.fuzzy {
            Some(skim) => skim
                .fuzzy_match(candidate, &self.query)
                .map(|score| Match { score: score as f64 }),
            None => self.match_prefixes(candidate),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.match_text(candidate).is_some()
    }

    fn match_prefixes(&self, candidate: &str) -> Option<Match> {
        let candidate = candidate.to_lowercase();
        let candidate_words = split_words(&candidate);

        let all_found = self
            .words
            .iter()
            .all(|q| candidate_words.iter().any(|w| w.starts_with(q.as_str())));
        if !all_found {
            return None;
        }

        let query_len: usize = self.words.iter().map(|w| w.chars().count()).sum();
        let candidate_len = candidate.chars().count().max(1);
        Some(Match {
            score: query_len as f64 / candidate_len as f64,
        })
    }
}

fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(query: &str) -> Matcher {
        Matcher::new(query, MatchConfig { fuzzy: false })
    }

    #[test]
    fn exact_matches_word_prefixes() {
        let m = exact("a");
        assert!(m.matches("Apple"));
        assert!(!m.matches("Banana"));
        assert!(m.matches("big apple"));
    }

    #[test]
    fn exact_requires_every_word() {
        let m = exact("hel wor");
        assert!(m.matches("Hello, World!"));
        assert!(!m.matches("Hello there"));
    }

    #[test]
    fn punctuation_separates_words() {
        assert!(exact("com").matches("example.com/path"));
        assert!(exact("path").matches("example.com/path"));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(exact("").matches("anything"));
        assert!(exact("   ").matches("anything"));
    }

    #[test]
    fn fuzzy_matches_subsequences() {
        let m = Matcher::new("bnn", MatchConfig { fuzzy: true });
        assert!(m.matches("Banana"));
        assert!(!m.matches("Apple"));
    }

    #[test]
    fn fuzzy_is_case_insensitive() {
        let m = Matcher::new("APP", MatchConfig { fuzzy: true });
        assert!(m.match_text("apple pie").is_some());
    }
}
