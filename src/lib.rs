//! # jmap
//!
//! A map widget that renders a map inside a page element, places markers
//! declared in markup or passed in configuration, and fits the view around
//! them or around the user's location.
//!
//! The mapping SDK, the host page and the geolocation capability sit behind
//! the [`MapsApi`], [`Document`] and [`GeoLocator`] seams. A headless map
//! backend ships with the crate so the full pipeline runs without a browser.

pub mod core;
pub mod dom;
pub mod geolocation;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod sdk;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::MapOptionsBuilder,
    config::{AspectRatio, HookPoint, LifecycleHooks, MapOptions, MapSettings, MapStyle},
    geo::{LatLng, LatLngBounds, Point},
    map::JMap,
    viewport::Viewport,
};

pub use dom::{Document, Element, ElementId, Page, Selector, Window};

pub use geolocation::{GeoLocator, GeoPosition, GeoRequestStatus, GeolocationError};

pub use layers::{
    collector::collect_markers,
    marker::{MarkerDescriptor, MarkerEvents, PlacedMarker},
};

pub use plugins::{
    method::{CallOutcome, MapState, Method, MethodValue},
    registry::JMapPlugin,
};

pub use sdk::{headless::HeadlessMaps, MapTypeId, MapView, MapViewOptions, MapsApi, MarkerId};

pub use ui::popup::Popup;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Mapping API is not loaded. Load it before initializing the map.")]
    ApiUnavailable,

    #[error("No map exists for element {0}")]
    NotInitialized(ElementId),

    #[error("Element {0} does not exist")]
    ElementNotFound(ElementId),

    #[error("Invalid marker #{index}: {reason}")]
    InvalidMarker { index: usize, reason: String },

    #[error("No marker at index {0}")]
    MarkerNotFound(usize),

    #[error("Invalid aspect ratio '{0}', expected \"width/height\"")]
    InvalidAspectRatio(String),

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Geolocation failed: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("Method {0} does not exist")]
    UnknownMethod(String),

    #[error("Method {0} is not publicly callable")]
    PrivateMethod(String),

    #[error("Invalid argument for {method}: {reason}")]
    InvalidArgument { method: String, reason: String },

    #[error("Map backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, defaulting to `info`.
///
/// Debug diagnostics from maps with `debug: true` are emitted at `warn` and
/// `error`, so they show up without further configuration. `RUST_LOG`
/// overrides the default filter.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
