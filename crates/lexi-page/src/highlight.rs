use lexi_config::page::PageConfig;
use lexi_types::{VocabEntry, same_word};

use crate::dom::{self, Document, NodeRef};
use crate::matcher::{MatchTarget, MatcherError, Segment, VocabMatcher, hit_count};

pub const MARKER_TAG: &str = "span";
pub const MARKER_CLASS: &str = "lexi-highlight";
pub const WORD_ATTR: &str = "data-word";
pub const TRANSLATION_ATTR: &str = "data-translation";
/// Set on the root of everything the extension itself draws
pub const UI_ATTR: &str = "data-lexi-ui";

/// Subtrees whose text is never rewritten
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "textarea", "input", "select", "option", "button",
    "iframe", "object", "embed", "svg", "canvas", "video", "audio", "math", "head", "title",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInfo {
    /// Text as it appears on the page
    pub surface: String,
    pub word: String,
    pub translation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub matches: usize,
    pub nodes_rewritten: usize,
    pub markers_removed: usize,
}

/// Wraps vocabulary occurrences in page text with marker elements
#[derive(Debug, Clone)]
pub struct HighlightEngine {
    size_limit: usize,
}

impl HighlightEngine {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            size_limit: config.pattern_size_limit,
        }
    }

    /// Replaces all markers with a fresh pass over every entry
    ///
    /// The pattern is compiled before anything is touched, so a failed scan leaves the page
    /// as it was.
    pub fn scan(
        &self,
        doc: &mut Document,
        entries: &[VocabEntry],
    ) -> Result<ScanReport, MatcherError> {
        let matcher = VocabMatcher::new(
            entries
                .iter()
                .map(|e| (e.word.as_str(), e.translation.as_str())),
            self.size_limit,
        )?;
        let markers_removed = self.remove_all(doc);

        let Some(matcher) = matcher else {
            tracing::debug!("Empty vocabulary, {} markers cleared", markers_removed);
            return Ok(ScanReport {
                markers_removed,
                ..Default::default()
            });
        };

        let mut report = apply(doc, &matcher);
        report.markers_removed = markers_removed;
        tracing::debug!(
            "Scan of {} words: {} matches in {} text nodes",
            matcher.word_count(),
            report.matches,
            report.nodes_rewritten
        );
        Ok(report)
    }

    /// Highlights one word without touching existing markers
    pub fn highlight_one(
        &self,
        doc: &mut Document,
        word: &str,
        translation: &str,
    ) -> Result<ScanReport, MatcherError> {
        match VocabMatcher::new([(word, translation)], self.size_limit)? {
            Some(matcher) => Ok(apply(doc, &matcher)),
            None => Ok(ScanReport::default()),
        }
    }

    /// Returns the number of markers unwrapped
    pub fn remove_all(&self, doc: &mut Document) -> usize {
        unwrap_markers(doc, |_| true)
    }

    pub fn remove_for_word(&self, doc: &mut Document, word: &str) -> usize {
        unwrap_markers(doc, |marker_word| same_word(marker_word, word))
    }
}

/// Markers currently attached to the page, in document order
pub fn markers(doc: &Document) -> Vec<NodeRef> {
    doc.body().descendants().filter(is_marker).collect()
}

pub fn is_marker(node: &NodeRef) -> bool {
    dom::tag(node) == Some(MARKER_TAG) && dom::has_class(node, MARKER_CLASS)
}

/// The marker containing `node`, including `node` itself
pub fn marker_at(node: &NodeRef) -> Option<NodeRef> {
    node.inclusive_ancestors().find(is_marker)
}

pub fn marker_info(node: &NodeRef) -> Option<MarkerInfo> {
    let marker = marker_at(node)?;
    Some(MarkerInfo {
        surface: marker.text_contents(),
        word: dom::attr(&marker, WORD_ATTR)?,
        translation: dom::attr(&marker, TRANSLATION_ATTR).unwrap_or_default(),
    })
}

/// Whether `node` sits inside the extension's own UI
pub fn in_ui(node: &NodeRef) -> bool {
    node.inclusive_ancestors()
        .any(|n| dom::has_attr(&n, UI_ATTR))
}

fn is_editable(node: &NodeRef) -> bool {
    dom::attr(node, "contenteditable").is_some_and(|value| !value.eq_ignore_ascii_case("false"))
}

fn is_excluded(node: &NodeRef) -> bool {
    dom::tag(node).is_some_and(|tag| SKIPPED_TAGS.contains(&tag))
        || dom::has_attr(node, UI_ATTR)
        || is_marker(node)
        || is_editable(node)
}

fn candidate_text_nodes(doc: &Document) -> Vec<NodeRef> {
    let body = doc.body();
    if is_excluded(&body) {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut stack: Vec<NodeRef> = body.children().rev().collect();
    while let Some(node) = stack.pop() {
        if let Some(text) = node.as_text() {
            if !text.borrow().trim().is_empty() {
                out.push(node);
            }
        } else if node.as_element().is_some() && !is_excluded(&node) {
            stack.extend(node.children().rev());
        }
    }
    out
}

fn create_marker(surface: &str, target: &MatchTarget) -> NodeRef {
    let marker = dom::create_element(MARKER_TAG);
    dom::set_attr(&marker, "class", MARKER_CLASS);
    dom::set_attr(&marker, WORD_ATTR, target.word.as_str());
    dom::set_attr(&marker, TRANSLATION_ATTR, target.translation.as_str());
    dom::append_text(&marker, surface);
    marker
}

fn apply(doc: &mut Document, matcher: &VocabMatcher) -> ScanReport {
    let mut report = ScanReport::default();

    // Collected up front, so freshly created markers are never revisited
    for node in candidate_text_nodes(doc) {
        let Some(text) = dom::text(&node) else {
            continue;
        };
        let segments = matcher.segments(&text);
        let hits = hit_count(&segments);
        if hits == 0 {
            continue;
        }

        let replacements = segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(plain) => NodeRef::new_text(*plain),
                Segment::Hit { surface, target } => create_marker(surface, target),
            })
            .collect();

        if dom::replace_with(&node, replacements) {
            report.matches += hits;
            report.nodes_rewritten += 1;
        }
    }
    report
}

fn unwrap_markers(doc: &mut Document, matches_word: impl Fn(&str) -> bool) -> usize {
    markers(doc)
        .into_iter()
        .filter(|marker| matches_word(&dom::attr(marker, WORD_ATTR).unwrap_or_default()))
        .filter(|marker| dom::replace_with_text(marker, &marker.text_contents()))
        .count()
}
