use lexi_types::{ListResponse, VocabEntry, same_word};

use crate::client::BackendClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub word: String,
    pub draft: String,
}

/// Vocabulary list shown in the extension popup
///
/// Rows are newest first. Deleting a word also clears its highlights on the attached page,
/// and a committed edit triggers a rescan so markers pick up the new translation.
#[derive(Debug, Default)]
pub struct VocabListView {
    entries: Vec<VocabEntry>,
    filter: String,
    editing: Option<EditState>,
    error: Option<String>,
}

impl VocabListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entries(&mut self, mut entries: Vec<VocabEntry>) {
        entries.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        self.entries = entries;
        if let Some(edit) = &self.editing
            && !self.entries.iter().any(|e| e.is_word(&edit.word))
        {
            self.editing = None;
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows matching the filter against word or translation, case-insensitively
    pub fn visible(&self) -> Vec<&VocabEntry> {
        let needle = self.filter.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.word.to_lowercase().contains(&needle)
                    || e.translation.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        if self.entries.is_empty() {
            Some("No words saved yet. Select a word on any page to add it.")
        } else if self.visible().is_empty() {
            Some("No words match the filter.")
        } else {
            None
        }
    }

    pub fn begin_edit(&mut self, word: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.is_word(word)) else {
            return false;
        };
        self.editing = Some(EditState {
            word: entry.word.clone(),
            draft: entry.translation.clone(),
        });
        true
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        if let Some(edit) = &mut self.editing {
            edit.draft = draft.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub async fn refresh(&mut self, client: &BackendClient) -> anyhow::Result<()> {
        let entries = client.scan_page().await?;
        self.error = None;
        self.set_entries(entries);
        Ok(())
    }

    pub async fn delete(&mut self, client: &BackendClient, word: &str) -> anyhow::Result<()> {
        let response = client.delete_word(word).await?;
        self.apply(response);

        if self.editing.as_ref().is_some_and(|e| same_word(&e.word, word)) {
            self.editing = None;
        }

        // The page may be gone; the list is still correct
        match client.remove_highlight(word).await {
            Ok(ack) if !ack.success => {
                tracing::debug!("Highlights for '{}' not removed: {:?}", word, ack.error)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Highlights for '{}' not removed: {}", word, e),
        }
        Ok(())
    }

    /// Saves the draft; an empty draft keeps the editor open and returns false
    pub async fn commit_edit(&mut self, client: &BackendClient) -> anyhow::Result<bool> {
        let Some(edit) = self.editing.clone() else {
            return Ok(false);
        };
        let draft = edit.draft.trim();
        if draft.is_empty() {
            return Ok(false);
        }

        let response = client.update_word(&edit.word, draft).await?;
        let saved = response.success;
        self.apply(response);
        if !saved {
            return Ok(false);
        }
        self.editing = None;

        match client.trigger_scan().await {
            Ok(ack) if !ack.success => {
                tracing::debug!("Rescan after edit skipped: {:?}", ack.error)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Rescan after edit failed: {}", e),
        }
        Ok(true)
    }

    fn apply(&mut self, response: ListResponse) {
        self.error = response.error;
        self.set_entries(response.list);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn entry(word: &str, translation: &str, age_minutes: i64) -> VocabEntry {
        VocabEntry {
            word: word.to_string(),
            translation: translation.to_string(),
            context: String::new(),
            source_url: String::new(),
            added_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    fn words(view: &VocabListView) -> Vec<&str> {
        view.visible().iter().map(|e| e.word.as_str()).collect()
    }

    #[test]
    fn test_newest_first() {
        let mut view = VocabListView::new();
        view.set_entries(vec![
            entry("old", "旧", 30),
            entry("newest", "最新", 1),
            entry("middle", "中间", 10),
        ]);

        assert_eq!(words(&view), vec!["newest", "middle", "old"]);
    }

    #[test]
    fn test_filter_matches_word_or_translation() {
        let mut view = VocabListView::new();
        view.set_entries(vec![
            entry("Ephemeral", "短暂的", 2),
            entry("cat", "猫", 1),
        ]);

        view.set_filter("EPHEM");
        assert_eq!(words(&view), vec!["Ephemeral"]);

        view.set_filter("猫");
        assert_eq!(words(&view), vec!["cat"]);

        view.set_filter("zebra");
        assert_eq!(view.empty_message(), Some("No words match the filter."));

        view.set_filter("  ");
        assert_eq!(view.visible().len(), 2);
        assert_eq!(view.empty_message(), None);
    }

    #[test]
    fn test_empty_list_message() {
        let view = VocabListView::new();
        assert!(view.is_empty());
        assert!(view.empty_message().unwrap().starts_with("No words saved yet"));
    }

    #[test]
    fn test_edit_lifecycle() {
        let mut view = VocabListView::new();
        view.set_entries(vec![entry("Cat", "猫", 1)]);

        assert!(!view.begin_edit("dog"));
        assert!(view.begin_edit("cat"));
        assert_eq!(
            view.editing(),
            Some(&EditState {
                word: "Cat".to_string(),
                draft: "猫".to_string()
            })
        );

        view.set_draft("猫咪");
        assert_eq!(view.editing().unwrap().draft, "猫咪");

        view.cancel_edit();
        assert!(view.editing().is_none());
    }

    #[test]
    fn test_editor_closes_when_word_disappears() {
        let mut view = VocabListView::new();
        view.set_entries(vec![entry("cat", "猫", 1)]);
        view.begin_edit("cat");

        view.set_entries(vec![entry("dog", "狗", 1)]);
        assert!(view.editing().is_none());
    }
}
