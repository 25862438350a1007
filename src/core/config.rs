//! Option resolution for map instances
//!
//! Callers hand in a partial [`MapOptions`]; [`MapSettings::resolve`] fills
//! every field the caller left out from the default table in
//! [`crate::core::constants`]. The override is shallow: a provided value
//! always wins, including `false`, `0` and empty lists.

use crate::core::constants::{
    DEFAULT_HEIGHT, DEFAULT_LAT, DEFAULT_LNG, DEFAULT_ZOOM,
};
use crate::core::geo::LatLng;
use crate::core::map::JMap;
use crate::layers::marker::MarkerDescriptor;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Base map style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum MapStyle {
    #[default]
    Road,
    Satellite,
    Terrain,
    Hybrid,
}

impl MapStyle {
    pub const ALL: [MapStyle; 4] = [
        MapStyle::Road,
        MapStyle::Satellite,
        MapStyle::Terrain,
        MapStyle::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::Road => "roadmap",
            MapStyle::Satellite => "satellite",
            MapStyle::Terrain => "terrain",
            MapStyle::Hybrid => "hybrid",
        }
    }
}

/// Unrecognized names resolve to [`MapStyle::Road`].
impl From<&str> for MapStyle {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "satellite" => MapStyle::Satellite,
            "terrain" => MapStyle::Terrain,
            "hybrid" => MapStyle::Hybrid,
            _ => MapStyle::Road,
        }
    }
}

impl From<String> for MapStyle {
    fn from(value: String) -> Self {
        MapStyle::from(value.as_str())
    }
}

impl From<MapStyle> for &'static str {
    fn from(value: MapStyle) -> Self {
        value.as_str()
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aspect ratio the map element is locked to, or none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AspectRatioRepr", into = "AspectRatioRepr")]
pub enum AspectRatio {
    Disabled,
    Ratio { width: f64, height: f64 },
}

impl AspectRatio {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(MapError::InvalidAspectRatio(format!("{width}/{height}")));
        }
        Ok(Self::Ratio { width, height })
    }

    /// Top padding, in percent of the parent's width, that gives the parent
    /// this aspect ratio
    pub fn padding_percent(&self) -> Option<f64> {
        match self {
            AspectRatio::Disabled => None,
            AspectRatio::Ratio { width, height } => Some(height / width * 100.0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, AspectRatio::Ratio { .. })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Ratio {
            width: 16.0,
            height: 9.0,
        }
    }
}

impl FromStr for AspectRatio {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MapError::InvalidAspectRatio(s.to_string());
        let (width, height) = s.split_once('/').ok_or_else(invalid)?;
        let width: f64 = width.trim().parse().map_err(|_| invalid())?;
        let height: f64 = height.trim().parse().map_err(|_| invalid())?;
        AspectRatio::new(width, height).map_err(|_| invalid())
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Disabled => f.write_str("false"),
            AspectRatio::Ratio { width, height } => write!(f, "{width}/{height}"),
        }
    }
}

/// Wire form of [`AspectRatio`]: `"16/9"`, `false`, or `true` for the default
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AspectRatioRepr {
    Flag(bool),
    Ratio(String),
}

impl TryFrom<AspectRatioRepr> for AspectRatio {
    type Error = MapError;

    fn try_from(value: AspectRatioRepr) -> Result<Self> {
        match value {
            AspectRatioRepr::Flag(false) => Ok(AspectRatio::Disabled),
            AspectRatioRepr::Flag(true) => Ok(AspectRatio::default()),
            AspectRatioRepr::Ratio(ratio) => ratio.parse(),
        }
    }
}

impl From<AspectRatio> for AspectRatioRepr {
    fn from(value: AspectRatio) -> Self {
        match value {
            AspectRatio::Disabled => AspectRatioRepr::Flag(false),
            ratio => AspectRatioRepr::Ratio(ratio.to_string()),
        }
    }
}

/// Callback run at a point in the render sequence, with the instance as context
pub type Hook = Arc<dyn Fn(&JMap) + Send + Sync>;

/// Named points in the render sequence where hooks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeMapInit,
    AfterMapInit,
    BeforeMarkerAdd,
    AfterMarkerAdd,
    BeforeCenter,
    AfterCenter,
    BeforeGeoCenter,
    AfterGeoCenter,
}

impl HookPoint {
    pub const ALL: [HookPoint; 8] = [
        HookPoint::BeforeMapInit,
        HookPoint::AfterMapInit,
        HookPoint::BeforeMarkerAdd,
        HookPoint::AfterMarkerAdd,
        HookPoint::BeforeCenter,
        HookPoint::AfterCenter,
        HookPoint::BeforeGeoCenter,
        HookPoint::AfterGeoCenter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::BeforeMapInit => "beforeMapInit",
            HookPoint::AfterMapInit => "afterMapInit",
            HookPoint::BeforeMarkerAdd => "beforeMarkerAdd",
            HookPoint::AfterMarkerAdd => "afterMarkerAdd",
            HookPoint::BeforeCenter => "beforeCenter",
            HookPoint::AfterCenter => "afterCenter",
            HookPoint::BeforeGeoCenter => "beforeGeoCenter",
            HookPoint::AfterGeoCenter => "afterGeoCenter",
        }
    }
}

/// One optional callback per [`HookPoint`]
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub before_map_init: Option<Hook>,
    pub after_map_init: Option<Hook>,
    pub before_marker_add: Option<Hook>,
    pub after_marker_add: Option<Hook>,
    pub before_center: Option<Hook>,
    pub after_center: Option<Hook>,
    pub before_geo_center: Option<Hook>,
    pub after_geo_center: Option<Hook>,
}

impl LifecycleHooks {
    pub fn get(&self, point: HookPoint) -> Option<&Hook> {
        self.slot(point).as_ref()
    }

    pub fn set<F>(&mut self, point: HookPoint, hook: F)
    where
        F: Fn(&JMap) + Send + Sync + 'static,
    {
        *self.slot_mut(point) = Some(Arc::new(hook));
    }

    pub fn clear(&mut self, point: HookPoint) {
        *self.slot_mut(point) = None;
    }

    /// Hooks set here win; unset points fall back to `base`
    pub fn merged_over(&self, base: &LifecycleHooks) -> LifecycleHooks {
        let mut merged = base.clone();
        for point in HookPoint::ALL {
            if let Some(hook) = self.get(point) {
                *merged.slot_mut(point) = Some(Arc::clone(hook));
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        HookPoint::ALL.iter().all(|point| self.get(*point).is_none())
    }

    fn slot(&self, point: HookPoint) -> &Option<Hook> {
        match point {
            HookPoint::BeforeMapInit => &self.before_map_init,
            HookPoint::AfterMapInit => &self.after_map_init,
            HookPoint::BeforeMarkerAdd => &self.before_marker_add,
            HookPoint::AfterMarkerAdd => &self.after_marker_add,
            HookPoint::BeforeCenter => &self.before_center,
            HookPoint::AfterCenter => &self.after_center,
            HookPoint::BeforeGeoCenter => &self.before_geo_center,
            HookPoint::AfterGeoCenter => &self.after_geo_center,
        }
    }

    fn slot_mut(&mut self, point: HookPoint) -> &mut Option<Hook> {
        match point {
            HookPoint::BeforeMapInit => &mut self.before_map_init,
            HookPoint::AfterMapInit => &mut self.after_map_init,
            HookPoint::BeforeMarkerAdd => &mut self.before_marker_add,
            HookPoint::AfterMarkerAdd => &mut self.after_marker_add,
            HookPoint::BeforeCenter => &mut self.before_center,
            HookPoint::AfterCenter => &mut self.after_center,
            HookPoint::BeforeGeoCenter => &mut self.before_geo_center,
            HookPoint::AfterGeoCenter => &mut self.after_geo_center,
        }
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = HookPoint::ALL
            .iter()
            .filter(|point| self.get(**point).is_some())
            .map(|point| point.name())
            .collect();
        f.debug_struct("LifecycleHooks").field("set", &set).finish()
    }
}

/// Hooks compare by identity.
impl PartialEq for LifecycleHooks {
    fn eq(&self, other: &Self) -> bool {
        HookPoint::ALL
            .iter()
            .all(|point| match (self.get(*point), other.get(*point)) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            })
    }
}

/// Caller-supplied options; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<i32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub map_type: Option<MapStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_markers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_resize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<MarkerDescriptor>>,
    #[serde(skip)]
    pub hooks: LifecycleHooks,
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON options object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fields set on `self` win; unset fields fall back to `base`
    pub fn merged_over(&self, base: &MapOptions) -> MapOptions {
        MapOptions {
            lat: self.lat.or(base.lat),
            lng: self.lng.or(base.lng),
            zoom: self.zoom.or(base.zoom),
            map_type: self.map_type.or(base.map_type),
            height: self.height.or(base.height),
            aspect_ratio: self.aspect_ratio.or(base.aspect_ratio),
            center_markers: self.center_markers.or(base.center_markers),
            center_resize: self.center_resize.or(base.center_resize),
            debug: self.debug.or(base.debug),
            markers: self.markers.clone().or_else(|| base.markers.clone()),
            hooks: self.hooks.merged_over(&base.hooks),
        }
    }
}

/// Fully resolved options of one map instance, immutable after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub lat: f64,
    pub lng: f64,
    pub zoom: i32,
    pub map_type: MapStyle,
    pub height: u32,
    pub aspect_ratio: AspectRatio,
    pub center_markers: bool,
    pub center_resize: bool,
    pub debug: bool,
    pub markers: Option<Vec<MarkerDescriptor>>,
    pub hooks: LifecycleHooks,
}

impl MapSettings {
    /// Fills every field `options` leaves unset from the default table
    pub fn resolve(options: &MapOptions) -> Self {
        Self {
            lat: options.lat.unwrap_or(DEFAULT_LAT),
            lng: options.lng.unwrap_or(DEFAULT_LNG),
            zoom: options.zoom.unwrap_or(DEFAULT_ZOOM),
            map_type: options.map_type.unwrap_or_default(),
            height: options.height.unwrap_or(DEFAULT_HEIGHT),
            aspect_ratio: options.aspect_ratio.unwrap_or_default(),
            center_markers: options.center_markers.unwrap_or(true),
            center_resize: options.center_resize.unwrap_or(true),
            debug: options.debug.unwrap_or(false),
            markers: options.markers.clone(),
            hooks: options.hooks.clone(),
        }
    }

    /// The configured initial center
    pub fn center(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self::resolve(&MapOptions::default())
    }
}

impl From<&MapSettings> for MapOptions {
    fn from(settings: &MapSettings) -> Self {
        MapOptions {
            lat: Some(settings.lat),
            lng: Some(settings.lng),
            zoom: Some(settings.zoom),
            map_type: Some(settings.map_type),
            height: Some(settings.height),
            aspect_ratio: Some(settings.aspect_ratio),
            center_markers: Some(settings.center_markers),
            center_resize: Some(settings.center_resize),
            debug: Some(settings.debug),
            markers: settings.markers.clone(),
            hooks: settings.hooks.clone(),
        }
    }
}
