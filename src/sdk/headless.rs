//! Mapping backend with no rendering surface
//!
//! Keeps the camera in a Web Mercator [`Viewport`] and markers in memory, so
//! the widget's full pipeline runs in tests and on servers.

use crate::constants::{FIT_BOUNDS_PADDING, MAX_ZOOM, MIN_ZOOM};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::core::viewport::Viewport;
use crate::sdk::{MapTypeId, MapView, MapViewOptions, MapsApi, MarkerId};
use crate::{MapError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
pub struct HeadlessMaps {
    padding: f64,
}

impl HeadlessMaps {
    pub fn new() -> Self {
        Self {
            padding: FIT_BOUNDS_PADDING,
        }
    }

    /// Pixel padding kept around fitted bounds
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }
}

impl Default for HeadlessMaps {
    fn default() -> Self {
        Self::new()
    }
}

impl MapsApi for HeadlessMaps {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_map(&self, options: MapViewOptions) -> Result<Box<dyn MapView>> {
        if !(options.size.x.is_finite() && options.size.y.is_finite()) {
            return Err(MapError::Backend(format!(
                "cannot render into a {}x{} box",
                options.size.x, options.size.y
            )));
        }
        Ok(Box::new(HeadlessMapView::new(options, self.padding)))
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessMapView {
    viewport: Viewport,
    map_type: MapTypeId,
    padding: f64,
    next_marker: u64,
    markers: BTreeMap<MarkerId, LatLng>,
    info_windows: Vec<(MarkerId, String)>,
}

impl HeadlessMapView {
    pub fn new(options: MapViewOptions, padding: f64) -> Self {
        let mut viewport = Viewport::new(options.center, options.zoom, options.size);
        viewport.set_zoom_limits(MIN_ZOOM, MAX_ZOOM);
        Self {
            viewport,
            map_type: options.map_type,
            padding,
            next_marker: 1,
            markers: BTreeMap::new(),
            info_windows: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl MapView for HeadlessMapView {
    fn center(&self) -> LatLng {
        self.viewport.center
    }

    fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    fn map_type(&self) -> MapTypeId {
        self.map_type
    }

    fn size(&self) -> Point {
        self.viewport.size
    }

    fn set_center(&mut self, center: LatLng) {
        self.viewport.set_center(center);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        self.viewport.fit_bounds(bounds, Some(self.padding));
    }

    fn visible_bounds(&self) -> LatLngBounds {
        self.viewport.bounds()
    }

    fn resize(&mut self, size: Point) {
        // Keep the center fixed while the box changes
        let center = self.viewport.center;
        self.viewport.set_size(size);
        self.viewport.set_center(center);
    }

    fn add_marker(&mut self, position: LatLng) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(id, position);
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) -> bool {
        self.info_windows.retain(|(anchor, _)| *anchor != marker);
        self.markers.remove(&marker).is_some()
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn marker_position(&self, marker: MarkerId) -> Option<LatLng> {
        self.markers.get(&marker).copied()
    }

    fn open_info_window(&mut self, marker: MarkerId, content: &str) -> Result<()> {
        if !self.markers.contains_key(&marker) {
            return Err(MapError::Backend(format!(
                "no marker {} to anchor an info window",
                marker.0
            )));
        }
        match self.info_windows.iter_mut().find(|(anchor, _)| *anchor == marker) {
            Some((_, existing)) => *existing = content.to_string(),
            None => self.info_windows.push((marker, content.to_string())),
        }
        Ok(())
    }

    fn open_info_windows(&self) -> Vec<(MarkerId, String)> {
        self.info_windows.clone()
    }
}
