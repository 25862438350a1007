//! Prelude module for common jmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use jmap::prelude::*;`

pub use crate::core::{
    builder::MapOptionsBuilder,
    config::{AspectRatio, Hook, HookPoint, LifecycleHooks, MapOptions, MapSettings, MapStyle},
    geo::{LatLng, LatLngBounds, Point},
    map::JMap,
    viewport::Viewport,
};

pub use crate::dom::{Document, Element, ElementId, Page, Selector, Window};

pub use crate::geolocation::{
    DeniedLocator, GeoLocator, GeoPosition, GeoRequestStatus, GeolocationError, ManualLocator,
    StaticLocator,
};

pub use crate::layers::marker::{MarkerDescriptor, MarkerEvents, MarkerHandler, PlacedMarker};

pub use crate::plugins::{
    method::{CallOutcome, MapState, Method, MethodValue},
    registry::JMapPlugin,
};

pub use crate::sdk::{headless::HeadlessMaps, MapTypeId, MapView, MapViewOptions, MapsApi, MarkerId};

pub use crate::ui::popup::Popup;

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
