use crate::dom::selector::Selector;
use crate::dom::style::InlineStyle;
use crate::prelude::HashMap;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an element inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of the host page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    data: HashMap<String, String>,
    /// Raw markup held directly by the element, rendered before its children
    text: String,
    style: InlineStyle,
    /// Size the page's stylesheet gives the element, zero when it has none
    layout_width: f64,
    layout_height: f64,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
        self
    }

    /// Sets a `data-*` attribute; `key` is given without the prefix
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.text = markup.into();
        self
    }

    pub fn with_style(mut self, css: &str) -> Self {
        self.style = InlineStyle::parse(css);
        self
    }

    pub fn with_layout_size(mut self, width: f64, height: f64) -> Self {
        self.layout_width = width;
        self.layout_height = height;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut InlineStyle {
        &mut self.style
    }

    pub fn layout_width(&self) -> f64 {
        self.layout_width
    }

    pub fn layout_height(&self) -> f64 {
        self.layout_height
    }

    pub fn set_layout_size(&mut self, width: f64, height: f64) {
        self.layout_width = width;
        self.layout_height = height;
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    fn open_tag(&self) -> String {
        let mut tag = format!("<{}", self.tag);
        if let Some(id) = &self.id {
            tag.push_str(&format!(" id=\"{id}\""));
        }
        if !self.classes.is_empty() {
            tag.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        let mut data: Vec<_> = self.data.iter().collect();
        data.sort();
        for (key, value) in data {
            tag.push_str(&format!(" data-{key}=\"{value}\""));
        }
        if !self.style.is_empty() {
            tag.push_str(&format!(" style=\"{}\"", self.style));
        }
        tag.push('>');
        tag
    }
}

/// Arena of elements rooted at `<body>`
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Element>,
    root: ElementId,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            root: ElementId(0),
        }
    }

    /// A document whose body has a layout width, so block children inherit it
    pub fn with_viewport_width(width: f64) -> Self {
        let mut document = Self::new();
        document.nodes[0].layout_width = width;
        document
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.0 < self.nodes.len()
    }

    fn require(&self, id: ElementId) -> Result<&Element> {
        self.get(id).ok_or(MapError::ElementNotFound(id))
    }

    fn require_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.get_mut(id).ok_or(MapError::ElementNotFound(id))
    }

    /// Appends `element` as the last child of `parent`
    pub fn append(&mut self, parent: ElementId, mut element: Element) -> Result<ElementId> {
        self.require(parent)?;
        let id = ElementId(self.nodes.len());
        element.parent = Some(parent);
        element.children.clear();
        self.nodes.push(element);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Wraps `target` in `wrapper`, which takes `target`'s place among its siblings
    pub fn wrap(&mut self, target: ElementId, mut wrapper: Element) -> Result<ElementId> {
        let parent = self.require(target)?.parent;
        let wrapper_id = ElementId(self.nodes.len());

        wrapper.parent = parent;
        wrapper.children = vec![target];
        self.nodes.push(wrapper);

        if let Some(parent) = parent {
            let siblings = &mut self.nodes[parent.0].children;
            if let Some(slot) = siblings.iter_mut().find(|child| **child == target) {
                *slot = wrapper_id;
            }
        }
        self.nodes[target.0].parent = Some(wrapper_id);
        Ok(wrapper_id)
    }

    /// Removes every child and all raw markup from an element
    pub fn empty(&mut self, id: ElementId) -> Result<()> {
        let children = std::mem::take(&mut self.require_mut(id)?.children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[id.0].text.clear();
        Ok(())
    }

    pub fn set_style(&mut self, id: ElementId, name: &str, value: impl Into<String>) -> Result<()> {
        self.require_mut(id)?.style.set(name, value);
        Ok(())
    }

    pub fn clear_style(&mut self, id: ElementId) -> Result<()> {
        self.require_mut(id)?.style.clear();
        Ok(())
    }

    /// Descendants of `scope` matching `selector`, in document order
    pub fn find(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut stack: Vec<ElementId> = match self.get(scope) {
            Some(element) => element.children.iter().rev().copied().collect(),
            None => return found,
        };

        while let Some(id) = stack.pop() {
            let element = &self.nodes[id.0];
            if selector.matches(element) {
                found.push(id);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        found
    }

    /// Elements anywhere in the document matching a selector string
    pub fn query(&self, selector: &str) -> Result<Vec<ElementId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.find(self.root, &selector))
    }

    /// Serialized markup of an element's content
    pub fn inner_html(&self, id: ElementId) -> String {
        let Some(element) = self.get(id) else {
            return String::new();
        };
        let mut html = element.text.clone();
        for child in &element.children {
            html.push_str(&self.outer_html(*child));
        }
        html
    }

    /// Serialized markup of an element including its own tag
    pub fn outer_html(&self, id: ElementId) -> String {
        match self.get(id) {
            Some(element) => format!(
                "{}{}</{}>",
                element.open_tag(),
                self.inner_html(id),
                element.tag
            ),
            None => String::new(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
