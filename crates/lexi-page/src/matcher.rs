use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

/// What a matched occurrence links back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget {
    /// Stored surface form, the entry key
    pub word: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'t, 'm> {
    Text(&'t str),
    Hit {
        surface: &'t str,
        target: &'m MatchTarget,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Vocabulary pattern could not be compiled: {0}")]
    Pattern(#[from] regex::Error),
}

/// Case-insensitive whole-word matcher over a vocabulary
///
/// All words compile into one alternation. Each alternative is anchored with `\b` on the
/// sides that start or end with a word character, so "cat" never matches inside
/// "category" while "'tis" can still match after a space.
pub struct VocabMatcher {
    regex: Regex,
    targets: HashMap<String, MatchTarget>,
}

impl VocabMatcher {
    /// Returns `None` when there is nothing to match
    pub fn new<'a, I>(entries: I, size_limit: usize) -> Result<Option<Self>, MatcherError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut targets = HashMap::new();
        let mut words = Vec::new();

        for (word, translation) in entries {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            let key = word.to_lowercase();
            if targets.contains_key(&key) {
                continue;
            }
            targets.insert(
                key,
                MatchTarget {
                    word: word.to_string(),
                    translation: translation.to_string(),
                },
            );
            words.push(word);
        }

        if words.is_empty() {
            return Ok(None);
        }

        // Longest first: "ice-cream" must win over "ice" at the same position
        words.sort_by_key(|word| std::cmp::Reverse(word.chars().count()));
        let pattern = words
            .iter()
            .map(|word| anchored(word))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()?;

        Ok(Some(Self { regex, targets }))
    }

    pub fn word_count(&self) -> usize {
        self.targets.len()
    }

    /// Splits `text` into plain runs and hits, in order
    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t, '_>> {
        let mut out = Vec::new();
        let mut last = 0;

        for m in self.regex.find_iter(text) {
            let Some(target) = self.targets.get(&m.as_str().to_lowercase()) else {
                // Regex case folding and to_lowercase disagree on a few scripts
                tracing::debug!("No vocabulary entry for match '{}'", m.as_str());
                continue;
            };
            if m.start() > last {
                out.push(Segment::Text(&text[last..m.start()]));
            }
            out.push(Segment::Hit {
                surface: m.as_str(),
                target,
            });
            last = m.end();
        }

        if last < text.len() {
            out.push(Segment::Text(&text[last..]));
        }
        out
    }
}

pub fn hit_count(segments: &[Segment<'_, '_>]) -> usize {
    segments
        .iter()
        .filter(|s| matches!(s, Segment::Hit { .. }))
        .count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn anchored(word: &str) -> String {
    let escaped = regex::escape(word);
    let start = if word.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let end = if word.chars().last().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("{start}{escaped}{end}")
}
