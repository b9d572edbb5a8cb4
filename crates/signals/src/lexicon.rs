//! Word lists driving part-of-speech guesses and flags.

use std::collections::HashSet;

const VERBS: &[&str] = &[
    "be", "have", "do", "say", "tell", "ask", "show", "give", "get", "make", "set", "add",
    "remind", "remember", "call", "text", "email", "send", "play", "stop", "start", "open",
    "close", "find", "search", "look", "check", "read", "write", "book", "cancel", "turn",
    "rain", "snow", "know", "want", "need", "like", "help", "go", "come", "take", "buy",
    "meet", "schedule", "wake", "list", "delete", "create", "change", "move", "pay",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("is", "be"),
    ("are", "be"),
    ("am", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("has", "have"),
    ("had", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("said", "say"),
    ("told", "tell"),
    ("gave", "give"),
    ("given", "give"),
    ("got", "get"),
    ("made", "make"),
    ("went", "go"),
    ("gone", "go"),
    ("came", "come"),
    ("took", "take"),
    ("bought", "buy"),
    ("met", "meet"),
    ("woke", "wake"),
    ("knew", "know"),
    ("found", "find"),
    ("sent", "send"),
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "hot", "cold", "warm", "cool", "sunny", "cloudy", "rainy", "windy",
    "early", "late", "new", "old", "big", "small", "important", "urgent", "quick", "long",
    "short", "current", "local", "latest", "next", "last", "nice", "loud", "quiet",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "of", "to", "in", "on", "at", "by", "for",
    "with", "from", "about", "into", "near", "as", "it", "its", "this", "that", "these",
    "those", "i", "me", "my", "mine", "you", "your", "we", "us", "our", "he", "him", "his",
    "she", "her", "they", "them", "their", "what", "when", "where", "who", "whom", "why",
    "how", "which", "whose", "please", "can", "could", "would", "should", "will", "shall",
    "may", "might", "must", "not", "no", "yes", "so", "then", "there", "here", "up", "out",
    "some", "any", "all", "just", "also", "too", "very", "really", "again", "now", "ok",
    "okay", "hey", "hi", "hello", "thanks", "thank", "let", "let's", "it's", "what's",
    "i'm", "don't", "doesn't", "isn't", "won't", "can't", "'s", "be",
];

const QUESTION_WORDS: &[&str] = &[
    "what", "what's", "when", "where", "who", "whom", "why", "how", "which", "whose",
];

/// Auxiliaries that open a yes/no question.
const QUESTION_AUX: &[&str] = &[
    "is", "are", "am", "was", "were", "do", "does", "did", "can", "could", "will", "would",
    "should", "shall", "may", "might", "have", "has",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "none", "neither", "nor", "don't", "doesn't",
    "didn't", "isn't", "aren't", "wasn't", "weren't", "won't", "can't", "cannot",
    "shouldn't", "wouldn't", "couldn't",
];

const FUTURE_MARKERS: &[&str] = &[
    "will", "tomorrow", "tonight", "later", "next", "soon", "gonna", "upcoming", "i'll",
    "we'll", "you'll", "it'll",
];

const PAST_MARKERS: &[&str] = &[
    "was", "were", "did", "yesterday", "ago", "last", "had", "didn't", "wasn't", "weren't",
];

/// The vocabulary a [`LexiconAnalyzer`](crate::LexiconAnalyzer) works with.
#[derive(Debug, Clone)]
pub struct Lexicon {
    verbs: HashSet<String>,
    adjectives: HashSet<String>,
    stopwords: HashSet<String>,
}

impl Lexicon {
    /// Add verbs, given in their base form.
    pub fn with_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs.extend(verbs.into_iter().map(|v| v.into().to_lowercase()));
        self
    }

    pub fn with_adjectives<I, S>(mut self, adjectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adjectives
            .extend(adjectives.into_iter().map(|a| a.into().to_lowercase()));
        self
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    /// Base form of `word` if it is a known verb.
    pub fn verb_lemma(&self, word: &str) -> Option<String> {
        if self.verbs.contains(word) {
            return Some(word.to_string());
        }
        if let Some((_, base)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
            return Some((*base).to_string());
        }
        candidate_stems(word)
            .into_iter()
            .find(|stem| self.verbs.contains(stem))
    }

    pub fn is_adjective(&self, word: &str) -> bool {
        self.adjectives.contains(word)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub(crate) fn is_question_word(word: &str) -> bool {
        QUESTION_WORDS.contains(&word)
    }

    pub(crate) fn is_question_aux(word: &str) -> bool {
        QUESTION_AUX.contains(&word)
    }

    pub(crate) fn is_negation(word: &str) -> bool {
        NEGATIONS.contains(&word) || word.ends_with("n't")
    }

    pub(crate) fn is_future_marker(word: &str) -> bool {
        FUTURE_MARKERS.contains(&word) || word.ends_with("'ll")
    }

    pub(crate) fn is_past_marker(word: &str) -> bool {
        PAST_MARKERS.contains(&word)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            verbs: VERBS.iter().map(|s| s.to_string()).collect(),
            adjectives: ADJECTIVES.iter().map(|s| s.to_string()).collect(),
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Possible base forms of an inflected verb: `calls`, `calling`, `called`,
/// `setting`, `tries`.
fn candidate_stems(word: &str) -> Vec<String> {
    let mut stems = Vec::new();
    if let Some(stem) = word.strip_suffix("ing") {
        stems.push(stem.to_string());
        stems.push(format!("{stem}e"));
        if let Some(undoubled) = undouble(stem) {
            stems.push(undoubled);
        }
    }
    if let Some(stem) = word.strip_suffix("ed") {
        stems.push(stem.to_string());
        stems.push(format!("{stem}e"));
        if let Some(undoubled) = undouble(stem) {
            stems.push(undoubled);
        }
    }
    if let Some(stem) = word.strip_suffix("ies") {
        stems.push(format!("{stem}y"));
    }
    if let Some(stem) = word.strip_suffix("es") {
        stems.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix('s') {
        stems.push(stem.to_string());
    }
    stems
}

/// `sett` → `set`, `stopp` → `stop`.
fn undouble(stem: &str) -> Option<String> {
    let mut chars = stem.chars().rev();
    let last = chars.next()?;
    let before = chars.next()?;
    (last == before).then(|| stem[..stem.len() - last.len_utf8()].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lemmatizes_regular_and_irregular_verbs() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.verb_lemma("tells").as_deref(), Some("tell"));
        assert_eq!(lexicon.verb_lemma("reminding").as_deref(), Some("remind"));
        assert_eq!(lexicon.verb_lemma("called").as_deref(), Some("call"));
        assert_eq!(lexicon.verb_lemma("setting").as_deref(), Some("set"));
        assert_eq!(lexicon.verb_lemma("scheduled").as_deref(), Some("schedule"));
        assert_eq!(lexicon.verb_lemma("told").as_deref(), Some("tell"));
        assert_eq!(lexicon.verb_lemma("is").as_deref(), Some("be"));
        assert_eq!(lexicon.verb_lemma("weather"), None);
    }

    #[test]
    fn custom_words_extend_the_defaults() {
        let lexicon = Lexicon::default().with_verbs(["Brew"]).with_adjectives(["strong"]);
        assert_eq!(lexicon.verb_lemma("brewing").as_deref(), Some("brew"));
        assert!(lexicon.is_adjective("strong"));
        assert!(lexicon.is_adjective("sunny"));
    }

    #[test]
    fn markers() {
        assert!(Lexicon::is_negation("shouldn't"));
        assert!(Lexicon::is_future_marker("she'll"));
        assert!(Lexicon::is_past_marker("yesterday"));
        assert!(Lexicon::is_question_word("where"));
    }
}
