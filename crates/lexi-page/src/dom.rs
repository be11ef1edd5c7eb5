use html5ever::{LocalName, Namespace, QualName};
use kuchiki::traits::TendrilSink;
use kuchiki::{Attribute, ExpandedName};

pub use kuchiki::NodeRef;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed page
///
/// Nodes are reference counted, so anything detached from the tree is freed once the last
/// handle to it goes away.
#[derive(Debug, Clone)]
pub struct Document {
    root: NodeRef,
    body: NodeRef,
}

impl Document {
    /// Empty page with `head` and `body`
    pub fn new() -> Self {
        Self::parse("")
    }

    pub fn parse(html: &str) -> Self {
        let root = kuchiki::parse_html().one(html);
        let body = root
            .select_first("body")
            .map(|body| body.as_node().clone())
            .unwrap_or_else(|_| root.clone());
        Self { root, body }
    }

    /// The document node itself
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn body(&self) -> NodeRef {
        self.body.clone()
    }

    /// Whether `node` is reachable from the document root
    pub fn is_attached(&self, node: &NodeRef) -> bool {
        node.inclusive_ancestors().any(|a| a == self.root)
    }

    /// Serialized `body` content
    pub fn body_html(&self) -> String {
        inner_html(&self.body)
    }

    pub fn to_html(&self) -> String {
        self.root.to_string()
    }

    /// Path of an attached node, `None` once it left the tree
    pub fn path_of(&self, node: &NodeRef) -> Option<NodePath> {
        let mut indices = Vec::new();
        let mut current = node.clone();
        while let Some(parent) = current.parent() {
            indices.push(current.preceding_siblings().count());
            current = parent;
        }
        if current != self.root {
            return None;
        }
        indices.reverse();
        Some(NodePath(indices))
    }

    pub fn resolve(&self, path: &NodePath) -> Option<NodeRef> {
        path.0
            .iter()
            .try_fold(self.root.clone(), |node, &index| node.children().nth(index))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Child indices from the document root down to a node
///
/// Node handles stay on the thread owning the page; hosts on other threads name nodes by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

pub fn create_element(tag: &str) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        std::iter::empty::<(ExpandedName, Attribute)>(),
    )
}

pub fn append_element(parent: &NodeRef, tag: &str) -> NodeRef {
    let node = create_element(tag);
    parent.append(node.clone());
    node
}

pub fn append_text(parent: &NodeRef, text: impl Into<String>) -> NodeRef {
    let node = NodeRef::new_text(text);
    parent.append(node.clone());
    node
}

/// Local tag name of an element
pub fn tag(node: &NodeRef) -> Option<&str> {
    node.as_element().map(|el| &*el.name.local)
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let el = node.as_element()?;
    el.attributes.borrow().get(name).map(str::to_string)
}

pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|el| el.attributes.borrow().contains(name))
}

pub fn set_attr(node: &NodeRef, name: &str, value: impl Into<String>) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.into());
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class").is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
}

/// Contents of a text node
pub fn text(node: &NodeRef) -> Option<String> {
    node.as_text().map(|text| text.borrow().clone())
}

pub fn children(node: &NodeRef) -> Vec<NodeRef> {
    node.children().collect()
}

pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

/// Swaps `node` for `replacements`, in order
///
/// Returns false and changes nothing when `node` has no parent.
pub fn replace_with(node: &NodeRef, replacements: Vec<NodeRef>) -> bool {
    if node.parent().is_none() {
        return false;
    }
    for replacement in replacements {
        node.insert_before(replacement);
    }
    node.detach();
    true
}

/// Replaces `node` with plain `content`, merged into neighbouring text nodes
pub fn replace_with_text(node: &NodeRef, content: &str) -> bool {
    if node.parent().is_none() {
        return false;
    }

    let previous = node.previous_sibling().filter(|n| n.as_text().is_some());
    let next = node.next_sibling().filter(|n| n.as_text().is_some());

    let target = match previous {
        Some(previous) => previous,
        None => {
            let fresh = NodeRef::new_text(String::new());
            node.insert_before(fresh.clone());
            fresh
        }
    };
    if let Some(text) = target.as_text() {
        let mut text = text.borrow_mut();
        text.push_str(content);
        if let Some(next) = next.as_ref().and_then(|n| n.as_text()) {
            text.push_str(&next.borrow());
        }
    }

    if let Some(next) = next {
        next.detach();
    }
    node.detach();
    true
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let doc = Document::parse(r#"<p class="lead">Tom &amp; "Jerry" &lt;3<br></p>"#);

        assert_eq!(
            doc.body_html(),
            r#"<p class="lead">Tom &amp; "Jerry" &lt;3<br></p>"#
        );
        assert_eq!(doc.body().text_contents(), "Tom & \"Jerry\" <3");
    }

    #[test]
    fn test_built_nodes_serialize_escaped() {
        let doc = Document::new();
        let p = append_element(&doc.body(), "p");
        set_attr(&p, "title", "say \"hi\"");
        append_text(&p, "a < b");

        assert_eq!(tag(&p), Some("p"));
        assert_eq!(
            doc.body_html(),
            "<p title=\"say &quot;hi&quot;\">a &lt; b</p>"
        );
    }

    #[test]
    fn test_replace_with_keeps_sibling_order() {
        let doc = Document::parse("<p>a<i>old</i>z</p>");
        let p = doc.body().first_child().unwrap();
        let old = children(&p)[1].clone();

        assert!(replace_with(
            &old,
            vec![NodeRef::new_text("x"), create_element("b")]
        ));

        assert_eq!(inner_html(&p), "ax<b></b>z");
        assert!(old.parent().is_none());
        assert!(!replace_with(&old, Vec::new()));
    }

    #[test]
    fn test_replace_with_text_merges_neighbours() {
        let doc = Document::parse("<p>one <em>two</em> three</p>");
        let p = doc.body().first_child().unwrap();
        let em = children(&p)[1].clone();

        assert!(replace_with_text(&em, "two"));

        let kids = children(&p);
        assert_eq!(kids.len(), 1);
        assert_eq!(text(&kids[0]).as_deref(), Some("one two three"));
    }

    #[test]
    fn test_replace_with_text_at_start() {
        let doc = Document::parse("<p><em>one</em> two</p>");
        let p = doc.body().first_child().unwrap();

        replace_with_text(&p.first_child().unwrap(), "one");

        assert_eq!(children(&p).len(), 1);
        assert_eq!(inner_html(&p), "one two");
    }

    #[test]
    fn test_paths_round_trip() {
        let doc = Document::parse("<p>first</p><p>second <b>bold</b></p>");
        let bold = doc
            .body()
            .descendants()
            .find(|n| text(n).as_deref() == Some("bold"))
            .unwrap();

        let path = doc.path_of(&bold).unwrap();
        assert_eq!(doc.resolve(&path), Some(bold.clone()));

        let parsed_again = Document::parse("<p>first</p><p>second <b>bold</b></p>");
        let same = parsed_again.resolve(&path).unwrap();
        assert_eq!(text(&same).as_deref(), Some("bold"));

        bold.detach();
        assert!(doc.path_of(&bold).is_none());
        assert!(!doc.is_attached(&bold));
    }

    #[test]
    fn test_detached_nodes_are_freed() {
        let doc = Document::new();
        let div = append_element(&doc.body(), "div");
        append_text(&div, "gone soon");
        let weak = Rc::downgrade(&div.0);

        div.detach();
        drop(div);

        assert!(weak.upgrade().is_none());
        assert_eq!(doc.body_html(), "");
    }
}
