//! Box geometry of page elements and the aspect-ratio reflow

use crate::constants::FALLBACK_WIDTH;
use crate::core::geo::Point;
use crate::dom::element::{Document, ElementId};
use crate::dom::style::{parse_percent, parse_px};
use crate::Result;

/// Height an element renders at.
///
/// An explicit pixel height wins. An absolutely positioned element stretched
/// between `top: 0` and `bottom: 0` fills a parent whose height comes from a
/// percentage `padding-top`. Otherwise the stylesheet height applies.
pub fn rendered_height(document: &Document, id: ElementId) -> f64 {
    let Some(element) = document.get(id) else {
        return 0.0;
    };
    let style = element.style();

    if let Some(height) = style.get("height").and_then(parse_px) {
        return height;
    }

    let stretched = style.get("position") == Some("absolute")
        && style.get("top").and_then(parse_px) == Some(0.0)
        && style.get("bottom").and_then(parse_px) == Some(0.0);
    if stretched {
        if let Some(parent) = element.parent() {
            let padding = document
                .get(parent)
                .and_then(|p| p.style().get("padding-top"))
                .and_then(parse_percent);
            if let Some(percent) = padding {
                return rendered_width(document, parent) * percent / 100.0;
            }
            return rendered_height(document, parent);
        }
    }

    element.layout_height()
}

/// Width an element renders at; block elements take their nearest sized
/// ancestor's width
pub fn rendered_width(document: &Document, id: ElementId) -> f64 {
    let mut current = Some(id);
    while let Some(id) = current {
        let Some(element) = document.get(id) else {
            break;
        };
        if let Some(width) = element.style().get("width").and_then(parse_px) {
            return width;
        }
        if element.layout_width() > 0.0 {
            return element.layout_width();
        }
        current = element.parent();
    }
    FALLBACK_WIDTH
}

pub fn rendered_size(document: &Document, id: ElementId) -> Point {
    Point::new(rendered_width(document, id), rendered_height(document, id))
}

/// Locks `element` to an aspect ratio by letting `parent` size itself through
/// a percentage top padding and stretching `element` over it
pub fn reflow_to_aspect_ratio(
    document: &mut Document,
    element: ElementId,
    parent: ElementId,
    padding_percent: f64,
) -> Result<()> {
    document.set_style(parent, "position", "relative")?;
    document.set_style(parent, "padding-top", format!("{padding_percent}%"))?;

    document.set_style(element, "position", "absolute")?;
    for side in ["top", "bottom", "left", "right"] {
        document.set_style(element, side, "0")?;
    }
    document.set_style(element, "height", "auto")?;
    Ok(())
}
