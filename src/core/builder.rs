//! Fluent builder for map options
//!
//! This module provides a MapOptionsBuilder that assembles a [`MapOptions`]
//! value field by field, including lifecycle hooks, without spelling out the
//! `Option` wrappers.

use crate::{
    core::{
        config::{AspectRatio, HookPoint, MapOptions, MapSettings, MapStyle},
        geo::LatLng,
        map::JMap,
    },
    layers::marker::MarkerDescriptor,
};

/// Builder for [`MapOptions`]
#[derive(Debug, Clone, Default)]
pub struct MapOptionsBuilder {
    options: MapOptions,
}

impl MapOptionsBuilder {
    /// Create a new builder with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options
    pub fn from_options(options: MapOptions) -> Self {
        Self { options }
    }

    /// Set the initial center
    pub fn with_center(mut self, center: LatLng) -> Self {
        self.options.lat = Some(center.lat);
        self.options.lng = Some(center.lng);
        self
    }

    /// Set the initial zoom level
    pub fn with_zoom(mut self, zoom: i32) -> Self {
        self.options.zoom = Some(zoom);
        self
    }

    /// Set the base map style
    pub fn with_map_type(mut self, style: MapStyle) -> Self {
        self.options.map_type = Some(style);
        self
    }

    /// Set the height forced onto a container with no height
    pub fn with_height(mut self, height: u32) -> Self {
        self.options.height = Some(height);
        self
    }

    /// Lock the map to an aspect ratio
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.options.aspect_ratio = Some(ratio);
        self
    }

    /// Let the map keep whatever height the page gives it
    pub fn without_aspect_ratio(mut self) -> Self {
        self.options.aspect_ratio = Some(AspectRatio::Disabled);
        self
    }

    /// Fit the view to the markers (`true`) or to the user's location (`false`)
    pub fn center_on_markers(mut self, enabled: bool) -> Self {
        self.options.center_markers = Some(enabled);
        self
    }

    /// Re-apply the last center whenever the window resizes
    pub fn center_on_resize(mut self, enabled: bool) -> Self {
        self.options.center_resize = Some(enabled);
        self
    }

    /// Report soft failures through the logger
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.options.debug = Some(enabled);
        self
    }

    /// Append one configured marker
    pub fn with_marker(mut self, marker: MarkerDescriptor) -> Self {
        self.options.markers.get_or_insert_with(Vec::new).push(marker);
        self
    }

    /// Replace the configured marker list
    pub fn with_markers(mut self, markers: Vec<MarkerDescriptor>) -> Self {
        self.options.markers = Some(markers);
        self
    }

    /// Attach a lifecycle hook
    pub fn on<F>(mut self, point: HookPoint, hook: F) -> Self
    where
        F: Fn(&JMap) + Send + Sync + 'static,
    {
        self.options.hooks.set(point, hook);
        self
    }

    pub fn before_map_init<F>(self, hook: F) -> Self
    where
        F: Fn(&JMap) + Send + Sync + 'static,
    {
        self.on(HookPoint::BeforeMapInit, hook)
    }

    pub fn after_map_init<F>(self, hook: F) -> Self
    where
        F: Fn(&JMap) + Send + Sync + 'static,
    {
        self.on(HookPoint::AfterMapInit, hook)
    }

    pub fn after_marker_add<F>(self, hook: F) -> Self
    where
        F: Fn(&JMap) + Send + Sync + 'static,
    {
        self.on(HookPoint::AfterMarkerAdd, hook)
    }

    pub fn after_center<F>(self, hook: F) -> Self
    where
        F: Fn(&JMap) + Send + Sync + 'static,
    {
        self.on(HookPoint::AfterCenter, hook)
    }

    /// Finish with the partial options
    pub fn build(self) -> MapOptions {
        self.options
    }

    /// Finish and resolve against the default table
    pub fn resolve(self) -> MapSettings {
        MapSettings::resolve(&self.options)
    }
}
