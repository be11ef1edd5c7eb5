use lexi_config::page::PageConfig;

use crate::dom::NodeRef;
use crate::geometry::{Point, Rect, Size};
use crate::highlight::MarkerInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipView {
    pub word: String,
    pub translation: String,
    pub position: Point,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveTooltip {
    marker: NodeRef,
    info: MarkerInfo,
    anchor: Rect,
}

/// Hover tooltip over a highlighted word
#[derive(Debug, Clone, Default)]
pub struct TooltipState {
    active: Option<ActiveTooltip>,
}

impl TooltipState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, marker: NodeRef, info: MarkerInfo, anchor: Rect) {
        self.active = Some(ActiveTooltip {
            marker,
            info,
            anchor,
        });
    }

    /// Hides the tooltip if `marker` is the one it belongs to
    pub fn leave(&mut self, marker: &NodeRef) -> bool {
        if self.active.as_ref().is_some_and(|a| a.marker == *marker) {
            self.active = None;
            return true;
        }
        false
    }

    pub fn hide(&mut self) {
        self.active = None;
    }

    pub fn active_marker(&self) -> Option<&NodeRef> {
        self.active.as_ref().map(|a| &a.marker)
    }

    pub fn view(&self, viewport: Size, config: &PageConfig) -> Option<TooltipView> {
        let active = self.active.as_ref()?;
        let size = estimate_size(&active.info);
        let (position, placement) = place_tooltip(
            active.anchor,
            size,
            viewport,
            config.tooltip_gap,
            config.tooltip_margin,
        );

        Some(TooltipView {
            word: active.info.word.clone(),
            translation: active.info.translation.clone(),
            position,
            placement,
        })
    }
}

/// Rough rendered size: one line for the word, one for the translation
pub fn estimate_size(info: &MarkerInfo) -> Size {
    let line_width = |text: &str| {
        text.chars()
            .map(|c| if c.is_ascii() { 7.5 } else { 14.0 })
            .sum::<f64>()
    };
    let content = line_width(&info.word).max(line_width(&info.translation));
    Size::new(content + 16.0, 48.0)
}

/// Centers the tooltip above `anchor`, flipping below only when it would leave the top edge
///
/// The horizontal position is clamped so the box stays `margin` away from both viewport edges.
/// The margin does not apply vertically.
pub fn place_tooltip(
    anchor: Rect,
    size: Size,
    viewport: Size,
    gap: f64,
    margin: f64,
) -> (Point, Placement) {
    let max_x = (viewport.width - size.width - margin).max(margin);
    let x = (anchor.center_x() - size.width / 2.0).clamp(margin, max_x);

    let above = anchor.y - gap - size.height;
    if above >= 0.0 {
        (Point::new(x, above), Placement::Above)
    } else {
        (Point::new(x, anchor.bottom() + gap), Placement::Below)
    }
}
