//! Mapping SDK capability
//!
//! The map widget never talks to a concrete mapping library. It asks a
//! [`MapsApi`] for a [`MapView`] and drives that view through the trait.

pub mod headless;

use crate::core::config::MapStyle;
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Map type identifiers understood by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapTypeId {
    Roadmap,
    Satellite,
    Terrain,
    Hybrid,
}

impl MapTypeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapTypeId::Roadmap => "roadmap",
            MapTypeId::Satellite => "satellite",
            MapTypeId::Terrain => "terrain",
            MapTypeId::Hybrid => "hybrid",
        }
    }
}

impl From<MapStyle> for MapTypeId {
    fn from(style: MapStyle) -> Self {
        match style {
            MapStyle::Road => MapTypeId::Roadmap,
            MapStyle::Satellite => MapTypeId::Satellite,
            MapStyle::Terrain => MapTypeId::Terrain,
            MapStyle::Hybrid => MapTypeId::Hybrid,
        }
    }
}

impl fmt::Display for MapTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a marker owned by a [`MapView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

/// Parameters a view is created with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub map_type: MapTypeId,
    /// Pixel size of the element the view renders into
    pub size: Point,
}

/// Entry point of a mapping SDK
pub trait MapsApi: Send + Sync {
    /// Name of the backend, for diagnostics
    fn name(&self) -> &str;

    /// Create a view rendering into a box of `options.size`
    fn create_map(&self, options: MapViewOptions) -> Result<Box<dyn MapView>>;
}

/// A live map view
pub trait MapView: Send {
    fn center(&self) -> LatLng;

    fn zoom(&self) -> f64;

    fn map_type(&self) -> MapTypeId;

    fn size(&self) -> Point;

    fn set_center(&mut self, center: LatLng);

    fn set_zoom(&mut self, zoom: f64);

    /// Choose center and zoom so every point of `bounds` is visible
    fn fit_bounds(&mut self, bounds: &LatLngBounds);

    /// Geographic region currently visible
    fn visible_bounds(&self) -> LatLngBounds;

    /// Notify the view that its element changed size
    fn resize(&mut self, size: Point);

    fn add_marker(&mut self, position: LatLng) -> MarkerId;

    /// Returns false when the view holds no such marker
    fn remove_marker(&mut self, marker: MarkerId) -> bool;

    fn marker_count(&self) -> usize;

    fn marker_position(&self, marker: MarkerId) -> Option<LatLng>;

    /// Open an info window anchored to `marker`; other open windows stay open
    fn open_info_window(&mut self, marker: MarkerId, content: &str) -> Result<()>;

    /// Info windows currently open, in the order they were opened
    fn open_info_windows(&self) -> Vec<(MarkerId, String)>;
}

impl fmt::Debug for dyn MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapView")
            .field("center", &self.center())
            .field("zoom", &self.zoom())
            .field("map_type", &self.map_type())
            .field("markers", &self.marker_count())
            .finish()
    }
}
