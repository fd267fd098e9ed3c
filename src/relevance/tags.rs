use super::*;

#[derive(Debug, Clone)]
struct TermMatcher {
    term: String,
    pattern: Regex,
    suppressor: Option<Regex>,
}

impl TermMatcher {
    fn matches(&self, text: &str) -> bool {
        if self
            .suppressor
            .as_ref()
            .is_some_and(|suppressor| suppressor.is_match(text))
        {
            return false;
        }
        self.pattern.is_match(text)
    }
}

/// Case-insensitive whole-word vocabulary matcher.
///
/// A term is dropped for the whole text when any suppression phrase occurs
/// somewhere before one of its occurrences ("for example Intel ...").
#[derive(Debug, Clone)]
pub struct TagExtractor {
    terms: Vec<TermMatcher>,
}

impl TagExtractor {
    pub fn new(terms: &[String], suppression_phrases: &[String]) -> Result<Self> {
        let phrases = suppression_phrases
            .iter()
            .map(|phrase| phrase.trim())
            .filter(|phrase| !phrase.is_empty())
            .map(regex::escape)
            .collect::<Vec<String>>();

        let mut matchers = Vec::with_capacity(terms.len());
        for term in terms {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }

            let term_pattern = whole_word_pattern(term);
            let pattern = Regex::new(&format!("(?i){term_pattern}"))
                .with_context(|| format!("failed to compile term regex for '{term}'"))?;
            let suppressor = if phrases.is_empty() {
                None
            } else {
                let source = format!("(?is)(?:{}).*?{term_pattern}", phrases.join("|"));
                Some(
                    Regex::new(&source)
                        .with_context(|| format!("failed to compile suppression regex for '{term}'"))?,
                )
            };

            matchers.push(TermMatcher {
                term: term.to_string(),
                pattern,
                suppressor,
            });
        }

        Ok(Self { terms: matchers })
    }

    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        self.terms
            .iter()
            .filter(|matcher| matcher.matches(text))
            .map(|matcher| matcher.term.clone())
            .collect()
    }

    pub fn matches_any(&self, text: &str) -> bool {
        self.terms.iter().any(|matcher| matcher.matches(text))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|matcher| matcher.term.as_str())
    }

    /// Vocabulary spelling of `value`, compared case-insensitively.
    pub fn canonical(&self, value: &str) -> Option<&str> {
        let value = value.trim();
        self.terms()
            .find(|term| term.to_lowercase() == value.to_lowercase())
    }
}

/// Escaped `term` with word boundaries on the edges that are word characters.
pub(super) fn whole_word_pattern(term: &str) -> String {
    let leading = if term.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let trailing = if term.chars().last().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("{leading}{}{trailing}", regex::escape(term))
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
