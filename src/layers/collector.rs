//! Gathers the markers a map should show
//!
//! Declarative markers come first, in document order: `div.marker` elements
//! inside the container carrying `data-lat`, `data-lng` and popup markup.
//! Markers from the options follow in list order. Nothing is de-duplicated.

use crate::constants::{MARKER_LAT_ATTR, MARKER_LNG_ATTR, MARKER_SELECTOR};
use crate::core::config::MapSettings;
use crate::core::geo::MAX_LATITUDE;
use crate::dom::element::{Document, ElementId};
use crate::dom::selector::Selector;
use crate::layers::marker::MarkerDescriptor;
use crate::{MapError, Result};

/// Collects declarative and configured markers, validating every coordinate
pub fn collect_markers(
    document: &Document,
    container: ElementId,
    settings: &MapSettings,
) -> Result<Vec<MarkerDescriptor>> {
    if !document.contains(container) {
        return Err(MapError::ElementNotFound(container));
    }

    let selector = Selector::parse(MARKER_SELECTOR)?;
    let mut markers = Vec::new();

    for element in document.find(container, &selector) {
        let index = markers.len();
        let lat = read_coordinate(document, element, MARKER_LAT_ATTR, index)?;
        let lng = read_coordinate(document, element, MARKER_LNG_ATTR, index)?;

        let markup = document.inner_html(element);
        let content = Some(markup.trim())
            .filter(|markup| !markup.is_empty())
            .map(str::to_string);

        let descriptor = MarkerDescriptor {
            content,
            ..MarkerDescriptor::new(lat, lng)
        };
        validate_descriptor(&descriptor, index)?;
        markers.push(descriptor);
    }

    let declared = markers.len();
    for descriptor in settings.markers.iter().flatten() {
        validate_descriptor(descriptor, markers.len())?;
        markers.push(descriptor.clone());
    }

    log::debug!(
        "collected {} markers ({} declared in markup)",
        markers.len(),
        declared
    );
    Ok(markers)
}

/// Checks that a descriptor sits where the map can show it unclamped
pub fn validate_descriptor(descriptor: &MarkerDescriptor, index: usize) -> Result<()> {
    let position = descriptor.position();
    if position.is_valid() {
        return Ok(());
    }

    let reason = if !position.lat.is_finite() || !position.lng.is_finite() {
        format!(
            "coordinates ({}, {}) are not finite",
            position.lat, position.lng
        )
    } else if position.lat.abs() > MAX_LATITUDE {
        format!(
            "latitude {} is outside [-{MAX_LATITUDE}, {MAX_LATITUDE}]",
            position.lat
        )
    } else {
        format!("longitude {} is outside [-180, 180]", position.lng)
    };
    Err(MapError::InvalidMarker { index, reason })
}

fn read_coordinate(
    document: &Document,
    element: ElementId,
    attribute: &str,
    index: usize,
) -> Result<f64> {
    let raw = document
        .get(element)
        .and_then(|el| el.data(attribute))
        .ok_or_else(|| MapError::InvalidMarker {
            index,
            reason: format!("missing data-{attribute}"),
        })?;

    raw.trim().parse::<f64>().map_err(|_| MapError::InvalidMarker {
        index,
        reason: format!("data-{attribute}=\"{raw}\" is not a number"),
    })
}
