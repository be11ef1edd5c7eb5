//! Page-side half of the vocabulary tool: the page tree, highlighting and the overlay UI models

pub mod badge;
pub mod dom;
pub mod geometry;
pub mod highlight;
pub mod matcher;
pub mod overlay;
pub mod popup;
pub mod selection;
pub mod tooltip;

pub use badge::{Badge, BadgePhase, BadgeTiming, BadgeView};
pub use dom::{Document, NodePath, NodeRef};
pub use geometry::{Point, Rect, Size};
pub use highlight::{HighlightEngine, MarkerInfo, ScanReport};
pub use matcher::{MatcherError, VocabMatcher};
pub use overlay::Overlay;
pub use popup::{DismissReason, PopupFailure, PopupPhase, PopupState, PopupView, SaveKind, TranslateTicket};
pub use selection::{SelectionContext, TextSelection, ValidationError};
pub use tooltip::{Placement, TooltipState, TooltipView};
