//! Owned XML element tree and path-based accessors.
//!
//! Feeds arrive as raw XML text of unknown shape, so the engine needs a
//! navigable tree rather than a streaming pass: candidate detection and
//! extraction both revisit the same elements. [`Document::parse`] builds
//! that tree once per ingestion call with `quick_xml`; everything after it
//! is read-only traversal.
//!
//! Path resolution is **first-match-only**: every `/`-separated segment
//! advances to the first matching element in document order. Feeds with
//! multiple same-named sibling containers therefore resolve only the first
//! one. That matches how confirmed mappings are authored (against the
//! first occurrence shown in the structure preview) but is worth keeping
//! in mind when a feed repeats container tags.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::IngestError;

/// A single element of a parsed feed document.
///
/// Tag matching everywhere in this crate is case-sensitive and exact; no
/// namespace handling is performed. Children preserve document order.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    /// Attribute name/value pairs in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Element {
            name,
            attributes,
            children: Vec::new(),
            text: None,
        }
    }

    /// Returns this element's own text content, if any non-whitespace text
    /// was present. Text split by child elements is joined with single
    /// spaces.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the value of the named attribute, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates the *direct* children with the given tag name, in document
    /// order.
    pub fn children_by_tag<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Collects every descendant with the given tag name, in document
    /// order. The element itself is never included.
    #[must_use]
    pub fn descendants_by_tag<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    /// Returns the first descendant with the given tag name in document
    /// order, or `None`.
    #[must_use]
    pub fn first_descendant<'a>(&'a self, name: &str) -> Option<&'a Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    fn append_text(&mut self, chunk: &str) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            return;
        }
        match &mut self.text {
            Some(text) => {
                text.push(' ');
                text.push_str(chunk);
            }
            None => self.text = Some(chunk.to_owned()),
        }
    }
}

/// An immutable, fully-parsed feed document. Built once per ingestion
/// call and discarded after extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Parses raw XML text into an owned element tree.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Xml`] for malformed markup,
    /// [`IngestError::EmptyDocument`] when no root element exists, and
    /// [`IngestError::UnclosedTag`] when the document ends mid-element.
    pub fn parse(xml: &str) -> Result<Self, IngestError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(tag) => stack.push(element_from_tag(&tag)?),
                Event::Empty(tag) => {
                    let element = element_from_tag(&tag)?;
                    attach(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(element, &mut stack, &mut root);
                    }
                }
                Event::Text(text) => {
                    if let Some(open) = stack.last_mut() {
                        let chunk = text.unescape().unwrap_or_default();
                        open.append_text(&chunk);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(open) = stack.last_mut() {
                        let chunk = String::from_utf8_lossy(cdata.as_ref());
                        open.append_text(&chunk);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = stack.last() {
            return Err(IngestError::UnclosedTag {
                tag: unclosed.name.clone(),
            });
        }
        root.map(|root| Document { root })
            .ok_or(IngestError::EmptyDocument)
    }

    /// Resolves a `/`-separated path at document level.
    ///
    /// The first segment may match the document's root element itself (DOM
    /// `document.getElementsByTagName` semantics); every later segment is a
    /// first-match descendant search under the previous one.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Element> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut current = if self.root.name == first {
            &self.root
        } else {
            self.root.first_descendant(first)?
        };
        for segment in segments {
            current = current.first_descendant(segment)?;
        }
        Some(current)
    }
}

/// Walks a `/`-separated path relative to `element`, taking the first
/// matching descendant at every segment. Returns `None` (never an error)
/// as soon as any segment has no match — an absent path signals "field not
/// present", which callers interpret as "use default / skip".
#[must_use]
pub fn resolve_element<'a>(element: &'a Element, path: &str) -> Option<&'a Element> {
    let mut current = element;
    for segment in path.split('/') {
        current = current.first_descendant(segment)?;
    }
    Some(current)
}

/// Resolves a path like [`resolve_element`] and returns the text content
/// of the final element. `None` when the path is absent or the element has
/// no text.
#[must_use]
pub fn resolve_text(element: &Element, path: &str) -> Option<String> {
    resolve_element(element, path)?.text().map(str::to_owned)
}

fn element_from_tag(tag: &BytesStart<'_>) -> Result<Element, IngestError> {
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in tag.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attribute.value).into_owned();
        attributes.push((key, value));
    }
    Ok(Element::new(name, attributes))
}

fn attach(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        // Anything after the first root-level element is ignored; feeds
        // are single-rooted documents.
        *root = Some(element);
    }
}
