//! Engine-wide defaults. Keeping them in a single place makes it easier to
//! tweak the values the option resolver falls back to.

/// Fallback center latitude when none is configured.
pub const DEFAULT_LAT: f64 = 62.10;

/// Fallback center longitude when none is configured.
pub const DEFAULT_LNG: f64 = 10.10;

/// Initial zoom level.
pub const DEFAULT_ZOOM: i32 = 16;

/// Height in pixels forced onto a container that renders with no height.
pub const DEFAULT_HEIGHT: u32 = 350;

/// Default aspect ratio, `width/height`.
pub const DEFAULT_ASPECT_RATIO: &str = "16/9";

/// Zoom applied when centering on exactly one marker.
pub const SINGLE_MARKER_ZOOM: f64 = 16.0;

/// Markup convention for declarative markers inside the container.
pub const MARKER_SELECTOR: &str = "div.marker";

/// Data attribute holding a declarative marker's latitude.
pub const MARKER_LAT_ATTR: &str = "lat";

/// Data attribute holding a declarative marker's longitude.
pub const MARKER_LNG_ATTR: &str = "lng";

/// Class of the element the map element is wrapped in.
pub const CONTAINER_CLASS: &str = "jmap-container";

/// Pixel padding kept around a fitted bounding region.
pub const FIT_BOUNDS_PADDING: f64 = 20.0;

/// Zoom range the headless view accepts.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 21.0;

/// Width assumed for a container with no layout width.
pub const FALLBACK_WIDTH: f64 = 640.0;

/// How often a bounded geolocation wait re-checks pending requests.
pub const GEOLOCATION_POLL_INTERVAL_MS: u64 = 10;
