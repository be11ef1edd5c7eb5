use std::time::{Duration, Instant};

use crate::geometry::Rect;
use crate::selection::SelectionContext;

pub const TRANSLATE_LABEL: &str = "Translate";
pub const TRANSLATING_LABEL: &str = "Translating...";
pub const RETRY_LABEL: &str = "Retry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Added,
    Updated,
}

impl SaveKind {
    pub fn from_updated(updated: bool) -> Self {
        if updated { Self::Updated } else { Self::Added }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "Saved to vocabulary",
            Self::Updated => "Updated in vocabulary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupFailure {
    /// No credential configured, retrying cannot help
    Auth(String),
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupPhase {
    Idle,
    Shown,
    Translating,
    Result {
        translation: String,
        saved: SaveKind,
        at: Instant,
    },
    Error(PopupFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    CloseButton,
    CancelKey,
    OutsideClick,
}

/// Handed out when a translation starts; a result only lands if its ticket is current
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateTicket {
    generation: u64,
    pub word: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupBody {
    Prompt,
    Loading,
    Translation { text: String, saved: SaveKind },
    Failure { message: String },
    AuthHint { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub word: String,
    pub anchor: Rect,
    pub body: PopupBody,
    pub button: Option<ButtonView>,
    pub retry: bool,
}

/// Selection popup lifecycle: Idle -> Shown -> Translating -> Result | Error
#[derive(Debug, Clone)]
pub struct PopupState {
    phase: PopupPhase,
    selection: Option<SelectionContext>,
    generation: u64,
}

impl PopupState {
    pub fn new() -> Self {
        Self {
            phase: PopupPhase::Idle,
            selection: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> &PopupPhase {
        &self.phase
    }

    pub fn selection(&self) -> Option<&SelectionContext> {
        self.selection.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.phase != PopupPhase::Idle
    }

    pub fn is_busy(&self) -> bool {
        self.phase == PopupPhase::Translating
    }

    /// Opens the popup for a new selection, unless a translation is in flight
    pub fn show(&mut self, selection: SelectionContext) -> bool {
        if self.is_busy() {
            return false;
        }
        self.generation += 1;
        self.selection = Some(selection);
        self.phase = PopupPhase::Shown;
        true
    }

    /// Moves to Translating; `None` when the button is not clickable
    pub fn begin_translate(&mut self) -> Option<TranslateTicket> {
        let clickable = matches!(
            self.phase,
            PopupPhase::Shown | PopupPhase::Error(PopupFailure::Other(_))
        );
        if !clickable {
            return None;
        }

        let selection = self.selection.as_ref()?;
        let ticket = TranslateTicket {
            generation: self.generation,
            word: selection.word.clone(),
            context: selection.context.clone(),
        };
        self.phase = PopupPhase::Translating;
        Some(ticket)
    }

    /// Applies a response; stale tickets are ignored and return false
    pub fn finish(
        &mut self,
        ticket: &TranslateTicket,
        outcome: Result<(String, SaveKind), PopupFailure>,
        now: Instant,
    ) -> bool {
        if ticket.generation != self.generation || !self.is_busy() {
            tracing::debug!("Dropping stale translation for '{}'", ticket.word);
            return false;
        }

        self.phase = match outcome {
            Ok((translation, saved)) => PopupPhase::Result {
                translation,
                saved,
                at: now,
            },
            Err(failure) => PopupPhase::Error(failure),
        };
        true
    }

    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        match (&self.phase, reason) {
            (PopupPhase::Idle, _) => false,
            // A click elsewhere must not lose a request the user is waiting on
            (PopupPhase::Translating, DismissReason::OutsideClick) => false,
            _ => {
                self.reset();
                true
            }
        }
    }

    /// Closes a finished result once it has been on screen for `linger`
    pub fn expire(&mut self, now: Instant, linger: Duration) -> bool {
        match self.phase {
            PopupPhase::Result { at, .. } if now.saturating_duration_since(at) >= linger => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    pub fn view(&self) -> Option<PopupView> {
        let selection = self.selection.as_ref()?;
        let translate = |enabled| {
            Some(ButtonView {
                label: TRANSLATE_LABEL,
                enabled,
                busy: false,
            })
        };

        let (body, button, retry) = match &self.phase {
            PopupPhase::Idle => return None,
            PopupPhase::Shown => (PopupBody::Prompt, translate(true), false),
            PopupPhase::Translating => (
                PopupBody::Loading,
                Some(ButtonView {
                    label: TRANSLATING_LABEL,
                    enabled: false,
                    busy: true,
                }),
                false,
            ),
            PopupPhase::Result {
                translation, saved, ..
            } => (
                PopupBody::Translation {
                    text: translation.clone(),
                    saved: *saved,
                },
                None,
                false,
            ),
            PopupPhase::Error(PopupFailure::Auth(message)) => (
                PopupBody::AuthHint {
                    message: message.clone(),
                },
                translate(false),
                false,
            ),
            PopupPhase::Error(PopupFailure::Other(message)) => (
                PopupBody::Failure {
                    message: message.clone(),
                },
                None,
                true,
            ),
        };

        Some(PopupView {
            word: selection.word.clone(),
            anchor: selection.anchor,
            body,
            button,
            retry,
        })
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.selection = None;
        self.phase = PopupPhase::Idle;
    }
}

impl Default for PopupState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(word: &str) -> SelectionContext {
        SelectionContext {
            word: word.to_string(),
            context: format!("The {word} moment."),
            anchor: Rect::new(10.0, 10.0, 40.0, 16.0),
        }
    }

    #[test]
    fn test_happy_path() {
        let mut popup = PopupState::new();
        assert!(popup.view().is_none());

        assert!(popup.show(selection("ephemeral")));
        let view = popup.view().unwrap();
        assert_eq!(view.body, PopupBody::Prompt);
        assert_eq!(
            view.button,
            Some(ButtonView {
                label: TRANSLATE_LABEL,
                enabled: true,
                busy: false
            })
        );

        let ticket = popup.begin_translate().unwrap();
        assert_eq!(ticket.word, "ephemeral");
        assert_eq!(ticket.context, "The ephemeral moment.");
        let view = popup.view().unwrap();
        assert_eq!(view.body, PopupBody::Loading);
        assert_eq!(
            view.button,
            Some(ButtonView {
                label: TRANSLATING_LABEL,
                enabled: false,
                busy: true
            })
        );

        let now = Instant::now();
        assert!(popup.finish(
            &ticket,
            Ok(("短暂的".to_string(), SaveKind::Added)),
            now
        ));
        let view = popup.view().unwrap();
        assert_eq!(
            view.body,
            PopupBody::Translation {
                text: "短暂的".to_string(),
                saved: SaveKind::Added
            }
        );
        assert!(view.button.is_none());

        assert!(!popup.expire(now + Duration::from_millis(2999), Duration::from_secs(3)));
        assert!(popup.expire(now + Duration::from_secs(3), Duration::from_secs(3)));
        assert_eq!(popup.phase(), &PopupPhase::Idle);
        assert!(popup.view().is_none());
    }

    #[test]
    fn test_double_click_sends_once() {
        let mut popup = PopupState::new();
        popup.show(selection("cat"));

        assert!(popup.begin_translate().is_some());
        assert!(popup.begin_translate().is_none());
    }

    #[test]
    fn test_auth_error_disables_button() {
        let mut popup = PopupState::new();
        popup.show(selection("cat"));
        let ticket = popup.begin_translate().unwrap();

        popup.finish(
            &ticket,
            Err(PopupFailure::Auth("Set an API key".to_string())),
            Instant::now(),
        );

        let view = popup.view().unwrap();
        assert_eq!(
            view.body,
            PopupBody::AuthHint {
                message: "Set an API key".to_string()
            }
        );
        assert_eq!(view.button.map(|b| b.enabled), Some(false));
        assert!(!view.retry);
        assert!(popup.begin_translate().is_none());
    }

    #[test]
    fn test_other_error_offers_retry() {
        let mut popup = PopupState::new();
        popup.show(selection("cat"));
        let ticket = popup.begin_translate().unwrap();
        popup.finish(
            &ticket,
            Err(PopupFailure::Other("Upstream returned 500".to_string())),
            Instant::now(),
        );

        let view = popup.view().unwrap();
        assert!(view.retry);
        assert!(view.button.is_none());

        let retry = popup.begin_translate().unwrap();
        assert!(popup.is_busy());
        assert!(popup.finish(
            &retry,
            Ok(("猫".to_string(), SaveKind::Updated)),
            Instant::now()
        ));
    }

    #[test]
    fn test_outside_click_ignored_while_translating() {
        let mut popup = PopupState::new();
        popup.show(selection("cat"));
        let ticket = popup.begin_translate().unwrap();

        assert!(!popup.dismiss(DismissReason::OutsideClick));
        assert!(!popup.show(selection("dog")));
        assert!(popup.is_busy());
        assert!(popup.finish(
            &ticket,
            Ok(("猫".to_string(), SaveKind::Added)),
            Instant::now()
        ));
    }

    #[test]
    fn test_close_during_translation_drops_late_result() {
        let mut popup = PopupState::new();
        popup.show(selection("cat"));
        let ticket = popup.begin_translate().unwrap();

        assert!(popup.dismiss(DismissReason::CancelKey));
        assert!(!popup.finish(
            &ticket,
            Ok(("猫".to_string(), SaveKind::Added)),
            Instant::now()
        ));
        assert_eq!(popup.phase(), &PopupPhase::Idle);

        // A new selection's popup is not affected by the old ticket either
        popup.show(selection("dog"));
        assert!(!popup.finish(
            &ticket,
            Ok(("猫".to_string(), SaveKind::Added)),
            Instant::now()
        ));
        assert_eq!(popup.phase(), &PopupPhase::Shown);
    }

    #[test]
    fn test_dismiss_reasons() {
        let mut popup = PopupState::new();
        assert!(!popup.dismiss(DismissReason::CloseButton));

        popup.show(selection("cat"));
        assert!(popup.dismiss(DismissReason::OutsideClick));
        assert!(!popup.is_open());

        popup.show(selection("cat"));
        assert!(popup.dismiss(DismissReason::CloseButton));
        assert!(popup.selection().is_none());
    }

    #[test]
    fn test_reselect_replaces_shown_popup() {
        let mut popup = PopupState::new();
        popup.show(selection("cat"));
        popup.show(selection("dog"));

        assert_eq!(popup.view().unwrap().word, "dog");
    }
}
