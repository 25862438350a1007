use crate::{
    core::{geo::LatLng, map::JMap},
    prelude::HashMap,
    sdk::MarkerId,
    ui::popup::Popup,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Handler for a named marker interaction, called with the owning instance,
/// the placed marker and the descriptor it was created from
pub type MarkerHandler = Arc<dyn Fn(&JMap, &PlacedMarker, &MarkerDescriptor) + Send + Sync>;

/// Interaction name → handlers
#[derive(Clone, Default)]
pub struct MarkerEvents {
    handlers: HashMap<String, Vec<MarkerHandler>>,
}

impl MarkerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an interaction
    pub fn on<F>(&mut self, event: &str, handler: F)
    where
        F: Fn(&JMap, &PlacedMarker, &MarkerDescriptor) + Send + Sync + 'static,
    {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Handlers registered for an interaction, in registration order
    pub fn handlers(&self, event: &str) -> &[MarkerHandler] {
        self.handlers.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of all interactions with at least one handler
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MarkerEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerEvents")
            .field("events", &self.names())
            .finish()
    }
}

impl PartialEq for MarkerEvents {
    fn eq(&self, other: &Self) -> bool {
        self.handlers.len() == other.handlers.len()
            && self.handlers.iter().all(|(name, mine)| {
                other.handlers.get(name).is_some_and(|theirs| {
                    mine.len() == theirs.len()
                        && mine.iter().zip(theirs).all(|(a, b)| Arc::ptr_eq(a, b))
                })
            })
    }
}

/// A point of interest before it is realized on a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDescriptor {
    pub lat: f64,
    pub lng: f64,
    /// Markup shown in the marker's popup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip)]
    pub events: MarkerEvents,
}

impl MarkerDescriptor {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            content: None,
            events: MarkerEvents::default(),
        }
    }

    pub fn at(position: LatLng) -> Self {
        Self::new(position.lat, position.lng)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Register a handler for a named interaction on the placed marker
    pub fn on<F>(mut self, event: &str, handler: F) -> Self
    where
        F: Fn(&JMap, &PlacedMarker, &MarkerDescriptor) + Send + Sync + 'static,
    {
        self.events.on(event, handler);
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A marker rendered on a map view, with the popup its click opens
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    id: MarkerId,
    position: LatLng,
    popup: Option<Popup>,
}

impl PlacedMarker {
    pub fn new(id: MarkerId, position: LatLng, content: Option<String>) -> Self {
        Self {
            id,
            position,
            popup: content.map(|content| Popup::new(id, position, content)),
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn popup_mut(&mut self) -> Option<&mut Popup> {
        self.popup.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_json() {
        let descriptor: MarkerDescriptor =
            serde_json::from_str(r#"{ "lat": 10, "lng": 20 }"#).unwrap();

        assert_eq!(descriptor.position(), LatLng::new(10.0, 20.0));
        assert!(descriptor.content.is_none());
        assert!(descriptor.events.is_empty());
    }

    #[test]
    fn test_descriptor_rejects_non_numeric_json() {
        let parsed = serde_json::from_str::<MarkerDescriptor>(r#"{ "lat": "ten", "lng": 20 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_events_registration() {
        let descriptor = MarkerDescriptor::new(0.0, 0.0)
            .on("click", |_, _, _| {})
            .on("click", |_, _, _| {})
            .on("dblclick", |_, _, _| {});

        assert_eq!(descriptor.events.handlers("click").len(), 2);
        assert_eq!(descriptor.events.handlers("mouseover").len(), 0);
        assert_eq!(descriptor.events.names(), vec!["click", "dblclick"]);
        assert_eq!(descriptor.events.len(), 3);
    }

    #[test]
    fn test_placed_marker_popup_only_with_content() {
        let bare = PlacedMarker::new(MarkerId(1), LatLng::new(1.0, 1.0), None);
        let rich = PlacedMarker::new(MarkerId(2), LatLng::new(1.0, 1.0), Some("<b>Hi</b>".into()));

        assert!(bare.popup().is_none());
        assert_eq!(rich.popup().map(|p| p.content()), Some("<b>Hi</b>"));
        assert!(!rich.popup().unwrap().is_open());
    }
}
