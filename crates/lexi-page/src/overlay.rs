use crate::badge::BadgeView;
use crate::dom::{self, Document, NodeRef};
use crate::highlight::UI_ATTR;
use crate::popup::{PopupBody, PopupView, RETRY_LABEL};
use crate::tooltip::{Placement, TooltipView};

const POPUP_OFFSET: f64 = 8.0;

/// Renders popup, tooltip and badge views into one subtree under `body`
///
/// The subtree carries the UI attribute, so scans and selections never treat it as page text.
#[derive(Debug, Default)]
pub struct Overlay {
    root: Option<NodeRef>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    pub fn sync(
        &mut self,
        doc: &Document,
        popup: Option<&PopupView>,
        tooltip: Option<&TooltipView>,
        badge: Option<&BadgeView>,
    ) {
        if popup.is_none() && tooltip.is_none() && badge.is_none() {
            self.teardown();
            return;
        }

        let root = self.ensure_root(doc);
        for child in dom::children(&root) {
            child.detach();
        }

        if let Some(popup) = popup {
            render_popup(&root, popup);
        }
        if let Some(tooltip) = tooltip {
            render_tooltip(&root, tooltip);
        }
        if let Some(badge) = badge {
            render_badge(&root, badge);
        }
    }

    pub fn teardown(&mut self) {
        if let Some(root) = self.root.take() {
            root.detach();
        }
    }

    fn ensure_root(&mut self, doc: &Document) -> NodeRef {
        match &self.root {
            Some(root) if doc.is_attached(root) => root.clone(),
            _ => {
                let root = dom::append_element(&doc.body(), "div");
                dom::set_attr(&root, UI_ATTR, "");
                self.root = Some(root.clone());
                root
            }
        }
    }
}

fn position_style(x: f64, y: f64) -> String {
    format!("position:fixed;left:{x}px;top:{y}px")
}

fn div_with_text(parent: &NodeRef, class: &str, text: &str) -> NodeRef {
    let div = dom::append_element(parent, "div");
    dom::set_attr(&div, "class", class);
    dom::append_text(&div, text);
    div
}

fn render_popup(root: &NodeRef, view: &PopupView) {
    let popup = dom::append_element(root, "div");
    dom::set_attr(&popup, "class", "lexi-popup");
    dom::set_attr(
        &popup,
        "style",
        position_style(view.anchor.x, view.anchor.bottom() + POPUP_OFFSET),
    );

    let close = dom::append_element(&popup, "button");
    dom::set_attr(&close, "class", "lexi-close");
    dom::append_text(&close, "\u{d7}");

    div_with_text(&popup, "lexi-word", &view.word);

    match &view.body {
        PopupBody::Prompt => {}
        PopupBody::Loading => {
            div_with_text(&popup, "lexi-loading", "");
        }
        PopupBody::Translation { text, saved } => {
            div_with_text(&popup, "lexi-translation", text);
            div_with_text(&popup, "lexi-saved", saved.label());
        }
        PopupBody::Failure { message } => {
            div_with_text(&popup, "lexi-error", message);
        }
        PopupBody::AuthHint { message } => {
            div_with_text(&popup, "lexi-error lexi-auth", message);
        }
    }

    if let Some(button) = &view.button {
        let el = dom::append_element(&popup, "button");
        dom::set_attr(&el, "class", "lexi-translate");
        if !button.enabled {
            dom::set_attr(&el, "disabled", "");
        }
        if button.busy {
            dom::set_attr(&el, "aria-busy", "true");
        }
        dom::append_text(&el, button.label);
    }

    if view.retry {
        let el = dom::append_element(&popup, "button");
        dom::set_attr(&el, "class", "lexi-retry");
        dom::append_text(&el, RETRY_LABEL);
    }
}

fn render_tooltip(root: &NodeRef, view: &TooltipView) {
    let tooltip = dom::append_element(root, "div");
    let class = match view.placement {
        Placement::Above => "lexi-tooltip lexi-above",
        Placement::Below => "lexi-tooltip lexi-below",
    };
    dom::set_attr(&tooltip, "class", class);
    dom::set_attr(
        &tooltip,
        "style",
        position_style(view.position.x, view.position.y),
    );
    div_with_text(&tooltip, "lexi-word", &view.word);
    div_with_text(&tooltip, "lexi-translation", &view.translation);
}

fn render_badge(root: &NodeRef, view: &BadgeView) {
    let badge = div_with_text(root, "lexi-badge", &view.text);
    dom::set_attr(&badge, "style", format!("opacity:{:.2}", view.opacity));
}
