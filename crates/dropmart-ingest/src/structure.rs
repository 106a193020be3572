//! Bounded structural profiling of a feed document.
//!
//! Produces the human-readable shape preview shown next to a mapping
//! suggestion. Extraction never consults this; it exists so a reviewer can
//! see what the feed looks like before confirming a mapping.
//!
//! Cost is deliberately bounded: only the first occurrence of each
//! distinct child tag is expanded (repeated siblings fold into `count`)
//! and recursion stops at `max_depth`, so analysis scales with depth ×
//! distinct-tag-count rather than total node count. Keep the default depth
//! of 3 when profiling arbitrary catalogs; huge feeds are exactly where
//! the bound matters.

use serde::Serialize;

use crate::tree::Element;

/// Default recursion depth for [`analyze`].
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// One node of the structure preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    pub name: String,
    /// Attribute names observed on the profiled occurrence.
    pub attributes: Vec<String>,
    /// How many direct siblings share this tag name.
    pub count: usize,
    pub children: Vec<StructureNode>,
    /// `true` when the depth cap hid this element's children.
    pub truncated: bool,
}

/// Profiles `element` down to `max_depth` levels of children.
///
/// For each distinct child tag at a level, only the first occurrence is
/// recursed into; later same-named siblings contribute to `count` only.
#[must_use]
pub fn analyze(element: &Element, max_depth: usize) -> StructureNode {
    node_at(element, 1, max_depth)
}

fn node_at(element: &Element, count: usize, depth_left: usize) -> StructureNode {
    let attributes = element
        .attributes
        .iter()
        .map(|(name, _)| name.clone())
        .collect();

    if depth_left == 0 {
        return StructureNode {
            name: element.name.clone(),
            attributes,
            count,
            children: Vec::new(),
            truncated: !element.children.is_empty(),
        };
    }

    let mut seen: Vec<&str> = Vec::new();
    for child in &element.children {
        if !seen.contains(&child.name.as_str()) {
            seen.push(&child.name);
        }
    }

    let mut children = Vec::new();
    for tag in seen {
        let mut matches = element.children_by_tag(tag);
        if let Some(first) = matches.next() {
            let tag_count = 1 + matches.count();
            children.push(node_at(first, tag_count, depth_left - 1));
        }
    }

    StructureNode {
        name: element.name.clone(),
        attributes,
        count,
        children,
        truncated: false,
    }
}
