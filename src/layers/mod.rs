pub mod collector;
pub mod marker;

pub use collector::collect_markers;
pub use marker::{MarkerDescriptor, MarkerEvents, MarkerHandler, PlacedMarker};
