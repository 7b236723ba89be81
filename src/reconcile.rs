//! Incremental patching of a live tree from freshly generated markup.
//!
//! Live and candidate elements are paired purely by their position in document order. The
//! pass never inserts or removes elements, so it is only correct when both trees share the
//! same element skeleton and differ in text or attribute values. When the shape can change
//! (first render, list length changes, error or empty states) use [`Container::replace`].

use crate::dom::{descendant_elements, parse_fragment, Container, Node, NodeRef};
use log::{debug, warn};

/// What a patch pass wrote into the live tree
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    pub text_writes: usize,
    pub attribute_writes: usize,
    /// Elements left without a partner because the two trees differ in size
    pub unmatched: usize,
}

impl PatchReport {
    pub fn is_noop(&self) -> bool {
        self.text_writes == 0 && self.attribute_writes == 0
    }
}

impl Container {
    /// Patch the live content to match `markup` in place
    pub fn patch(&self, markup: &str) -> PatchReport {
        patch(self.children(), markup)
    }
}

/// Patch the live nodes `live` to match `markup`
pub fn patch(live: &[NodeRef], markup: &str) -> PatchReport {
    let candidate = parse_fragment(markup);
    patch_nodes(live, &candidate)
}

/// Patch the live nodes `live` to match the detached nodes `candidate`
pub fn patch_nodes(live: &[NodeRef], candidate: &[NodeRef]) -> PatchReport {
    let live = descendant_elements(live);
    let candidate = descendant_elements(candidate);

    let mut report = PatchReport {
        unmatched: live.len().abs_diff(candidate.len()),
        ..PatchReport::default()
    };
    if report.unmatched > 0 {
        warn!(
            "Patching trees of different shape ({} live vs {} new elements); result is undefined",
            live.len(),
            candidate.len()
        );
    }

    for (live_node, candidate_node) in live.iter().zip(&candidate) {
        if *live_node.borrow() == *candidate_node.borrow() {
            continue;
        }

        if starts_with_text(candidate_node) {
            report.text_writes += sync_text(live_node, candidate_node);
        }
        report.attribute_writes += sync_attributes(live_node, candidate_node);
    }

    debug!(
        "Patched {} elements: {} text writes, {} attribute writes",
        live.len().min(candidate.len()),
        report.text_writes,
        report.attribute_writes
    );
    report
}

/// The node's first child is a text node with something other than whitespace in it
fn starts_with_text(node: &NodeRef) -> bool {
    let node = node.borrow();
    node.as_element()
        .and_then(|element| element.children.first())
        .is_some_and(|first| {
            first
                .borrow()
                .as_text()
                .is_some_and(|text| !text.trim().is_empty())
        })
}

fn text_children(node: &NodeRef) -> Vec<NodeRef> {
    node.borrow()
        .as_element()
        .map(|element| {
            element
                .children
                .iter()
                .filter(|child| child.borrow().as_text().is_some())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Overwrite the live element's own text nodes with the candidate's, pairwise.
///
/// Child elements are left in place. A live element with no text gets the candidate's text
/// appended as new nodes; live text nodes beyond the candidate's count are emptied, not removed.
fn sync_text(live: &NodeRef, candidate: &NodeRef) -> usize {
    let wanted: Vec<String> = text_children(candidate)
        .iter()
        .filter_map(|text| text.borrow().as_text().map(str::to_string))
        .collect();
    let existing = text_children(live);

    if existing.is_empty() {
        let mut live = live.borrow_mut();
        let Some(element) = live.as_element_mut() else {
            return 0;
        };
        element
            .children
            .extend(wanted.iter().map(|text| Node::text(text)));
        return wanted.len();
    }

    let mut writes = 0;
    let blanks = std::iter::repeat(String::new());
    for (node, text) in existing.iter().zip(wanted.iter().cloned().chain(blanks)) {
        let mut node = node.borrow_mut();
        if let Node::Text(current) = &mut *node {
            if *current != text {
                *current = text;
                writes += 1;
            }
        }
    }
    writes
}

/// Copy every candidate attribute onto the live element; attributes only on the live side stay
fn sync_attributes(live: &NodeRef, candidate: &NodeRef) -> usize {
    let candidate = candidate.borrow();
    let Some(source) = candidate.as_element() else {
        return 0;
    };
    let mut live = live.borrow_mut();
    let Some(target) = live.as_element_mut() else {
        return 0;
    };

    let mut writes = 0;
    for (name, value) in &source.attrs {
        if target.attrs.get(name) != Some(value) {
            target.attrs.insert(name.clone(), value.clone());
            writes += 1;
        }
    }
    writes
}
