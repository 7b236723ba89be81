//! A small owned document tree.
//!
//! Nodes are shared `Rc<RefCell<_>>` handles, so a patched tree keeps the identity of every
//! node it did not replace. Equality on [`Node`] is structural: same kind, tag, attributes
//! and children.

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type NodeRef = Rc<RefCell<Node>>;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<NodeRef>,
}

impl Node {
    pub fn element<K, V>(
        name: &str,
        attrs: impl IntoIterator<Item = (K, V)>,
        children: Vec<NodeRef>,
    ) -> NodeRef
    where
        K: Into<String>,
        V: Into<String>,
    {
        Rc::new(RefCell::new(Node::Element(Element {
            name: name.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            children,
        })))
    }

    pub fn text(content: &str) -> NodeRef {
        Rc::new(RefCell::new(Node::Text(content.to_string())))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    /// Concatenated text of this node and all its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.borrow().collect_text(out);
                }
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&encode_text(text)),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    return;
                }
                for child in &element.children {
                    child.borrow().write_html(out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// Parse markup into detached top-level nodes. Comments and doctypes are dropped.
pub fn parse_fragment(markup: &str) -> Vec<NodeRef> {
    let fragment = Html::parse_fragment(markup);
    convert_children(fragment.root_element())
}

fn convert_children(element: ElementRef<'_>) -> Vec<NodeRef> {
    element
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::text(text)),
            scraper::Node::Element(_) => ElementRef::wrap(child).map(convert_element),
            _ => None,
        })
        .collect()
}

fn convert_element(element: ElementRef<'_>) -> NodeRef {
    let value = element.value();
    Node::element(value.name(), value.attrs(), convert_children(element))
}

/// Every element below `roots` (roots included), in document order
pub fn descendant_elements(roots: &[NodeRef]) -> Vec<NodeRef> {
    let mut out = Vec::new();
    for root in roots {
        collect_elements(root, &mut out);
    }
    out
}

fn collect_elements(node: &NodeRef, out: &mut Vec<NodeRef>) {
    if let Node::Element(element) = &*node.borrow() {
        out.push(Rc::clone(node));
        for child in &element.children {
            collect_elements(child, out);
        }
    }
}

/// Serialize nodes back to markup
pub fn to_html(nodes: &[NodeRef]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.borrow().write_html(&mut out);
    }
    out
}

/// A mounted container whose content is a list of live nodes
#[derive(Debug, Default)]
pub struct Container {
    children: Vec<NodeRef>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markup(markup: &str) -> Self {
        Self {
            children: parse_fragment(markup),
        }
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Remove all content
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Clear and insert `markup`, discarding every existing node
    pub fn replace(&mut self, markup: &str) {
        self.children = parse_fragment(markup);
    }

    pub fn elements(&self) -> Vec<NodeRef> {
        descendant_elements(&self.children)
    }

    /// First element carrying `class`, in document order
    pub fn find_by_class(&self, class: &str) -> Option<NodeRef> {
        self.elements().into_iter().find(|node| {
            node.borrow()
                .as_element()
                .is_some_and(|element| element.has_class(class))
        })
    }

    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .map(|child| child.borrow().text_content())
            .collect()
    }

    pub fn to_html(&self) -> String {
        to_html(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_keeps_structure_and_text() {
        let nodes = parse_fragment(r#"<div class="a"><span>4</span> servings</div>"#);
        assert_eq!(nodes.len(), 1);

        let root = nodes[0].borrow();
        let element = root.as_element().unwrap();
        assert_eq!(element.name, "div");
        assert_eq!(element.attr("class"), Some("a"));
        assert_eq!(element.children.len(), 2);
        assert_eq!(root.text_content(), "4 servings");
    }

    #[test]
    fn test_parse_fragment_drops_comments() {
        let nodes = parse_fragment("<p>a<!-- note -->b</p>");
        let text_children = nodes[0]
            .borrow()
            .as_element()
            .unwrap()
            .children
            .iter()
            .filter(|child| child.borrow().as_text().is_some())
            .count();
        assert_eq!(text_children, 2);
    }

    #[test]
    fn test_parse_svg_use_href() {
        let nodes = parse_fragment(r#"<svg><use href="icons.svg#icon-check"></use></svg>"#);
        let elements = descendant_elements(&nodes);
        assert_eq!(elements.len(), 2);
        let node = elements[1].borrow();
        let element = node.as_element().unwrap();
        assert_eq!(element.name, "use");
        assert_eq!(element.attr("href"), Some("icons.svg#icon-check"));
    }

    #[test]
    fn test_descendant_elements_document_order() {
        let nodes = parse_fragment("<ul><li><b>1</b></li><li>2</li></ul><p>x</p>");
        let names: Vec<String> = descendant_elements(&nodes)
            .iter()
            .map(|node| node.borrow().as_element().unwrap().name.clone())
            .collect();
        assert_eq!(names, ["ul", "li", "b", "li", "p"]);
    }

    #[test]
    fn test_structural_equality() {
        let a = parse_fragment(r#"<p class="x" id="y">hi</p>"#);
        let b = parse_fragment(r#"<p id="y" class="x">hi</p>"#);
        let c = parse_fragment(r#"<p class="x" id="y">ho</p>"#);
        assert_eq!(*a[0].borrow(), *b[0].borrow());
        assert_ne!(*a[0].borrow(), *c[0].borrow());
    }

    #[test]
    fn test_to_html_escapes_and_handles_void_elements() {
        let nodes = vec![Node::element(
            "div",
            [("title", "a \"quoted\" & title")],
            vec![
                Node::element("img", [("src", "x.jpg")], Vec::new()),
                Node::text("Fish & Chips"),
            ],
        )];
        assert_eq!(
            to_html(&nodes),
            r#"<div title="a &quot;quoted&quot; &amp; title"><img src="x.jpg">Fish &amp; Chips</div>"#
        );
    }

    #[test]
    fn test_container_replace_and_find() {
        let mut container = Container::new();
        assert!(container.is_empty());

        container.replace(r#"<div class="recipe"><h1 class="recipe__title">Soup</h1></div>"#);
        let title = container.find_by_class("recipe__title").unwrap();
        assert_eq!(title.borrow().text_content(), "Soup");
        assert!(container.find_by_class("missing").is_none());

        container.clear();
        assert!(container.is_empty());
        assert_eq!(container.to_html(), "");
    }
}
