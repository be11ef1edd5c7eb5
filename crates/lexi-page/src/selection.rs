use lexi_config::page::PageConfig;
use unicode_normalization::UnicodeNormalization;

use crate::dom::{self, Document, NodeRef};
use crate::geometry::Rect;
use crate::highlight::{UI_ATTR, in_ui};

/// Elements whose text is taken as the surrounding context of a selection
const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "dd", "dt", "td", "th", "blockquote", "pre",
    "figcaption", "caption", "article", "section", "aside", "main", "div", "body",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Selection is empty")]
    Empty,

    #[error("Selection is {len} characters long, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Selection contains '{0}', which cannot be part of a word")]
    InvalidCharacter(char),

    #[error("Selection contains no letters")]
    NoLetters,

    #[error("Selection has no visible extent")]
    NoExtent,

    #[error("Selection is inside the vocabulary overlay")]
    OwnInterface,
}

/// Raw selection as reported by the page
#[derive(Debug, Clone, PartialEq)]
pub struct TextSelection {
    pub text: String,
    /// Node the selection starts in
    pub anchor: NodeRef,
    pub rect: Rect,
}

/// A selection accepted as a single word, with the text around it
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionContext {
    pub word: String,
    pub context: String,
    pub anchor: Rect,
}

/// Letters plus the joiners that occur inside English words
pub fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '\'' | '\u{2019}' | '-')
}

/// Trims and NFC-normalizes `raw`, returning it when it is one plausible word
pub fn validate_word(raw: &str, max_chars: usize) -> Result<String, ValidationError> {
    let word: String = raw.trim().nfc().collect();
    if word.is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = word.chars().count();
    if len > max_chars {
        return Err(ValidationError::TooLong {
            len,
            max: max_chars,
        });
    }
    if let Some(c) = word.chars().find(|&c| !is_word_char(c)) {
        return Err(ValidationError::InvalidCharacter(c));
    }
    if !word.chars().any(char::is_alphabetic) {
        return Err(ValidationError::NoLetters);
    }
    Ok(word)
}

/// Nearest block-level element containing `node`, falling back to `body`
pub fn context_block(doc: &Document, node: &NodeRef) -> NodeRef {
    node.inclusive_ancestors()
        .find(|n| dom::tag(n).is_some_and(|tag| BLOCK_TAGS.contains(&tag)))
        .unwrap_or_else(|| doc.body())
}

/// At most `max_chars` of `text`, centered on the first occurrence of `word`
///
/// An occurrence standing as a whole word is preferred over one inside a longer word.
/// Without any occurrence the window starts at the beginning of the text.
pub fn context_window(text: &str, word: &str, max_chars: usize) -> String {
    let text = text.trim();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let needle: Vec<char> = word.chars().collect();
    let start = match find_word(&chars, &needle) {
        Some(pos) => {
            let center = pos + needle.len() / 2;
            center
                .saturating_sub(max_chars / 2)
                .min(chars.len() - max_chars)
        }
        None => 0,
    };
    chars[start..start + max_chars].iter().collect()
}

/// Validates the selection and collects its context
pub fn capture(
    doc: &Document,
    selection: &TextSelection,
    config: &PageConfig,
) -> Result<SelectionContext, ValidationError> {
    if in_ui(&selection.anchor) {
        return Err(ValidationError::OwnInterface);
    }
    if selection.rect.is_empty() {
        return Err(ValidationError::NoExtent);
    }

    let word = validate_word(&selection.text, config.max_word_chars)?;
    let block = context_block(doc, &selection.anchor);
    let context = context_window(
        &block_text(&block),
        &word,
        config.max_context_chars,
    );

    Ok(SelectionContext {
        word,
        context,
        anchor: selection.rect,
    })
}

/// Text content of `block` without the overlay or script bodies
pub fn block_text(block: &NodeRef) -> String {
    let mut out = String::new();
    let mut stack = vec![block.clone()];
    while let Some(node) = stack.pop() {
        if let Some(text) = node.as_text() {
            out.push_str(&text.borrow());
            continue;
        }
        let Some(tag) = dom::tag(&node) else {
            continue;
        };
        if dom::has_attr(&node, UI_ATTR) || matches!(tag, "script" | "style") {
            continue;
        }
        stack.extend(node.children().rev());
    }
    out
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn find_word(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    let mut first = None;
    for pos in 0..=haystack.len() - needle.len() {
        let hit = haystack[pos..pos + needle.len()]
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b));
        if !hit {
            continue;
        }

        let before = pos.checked_sub(1).map(|i| haystack[i]);
        let after = haystack.get(pos + needle.len()).copied();
        if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        {
            return Some(pos);
        }
        first.get_or_insert(pos);
    }
    first
}
