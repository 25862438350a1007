use crate::dom::element::Document;
use crate::dom::window::Window;
use crate::geolocation::GeoLocator;
use crate::sdk::{headless::HeadlessMaps, MapsApi};
use std::fmt;
use std::sync::Arc;

/// Everything a map instance reaches for in its host page: the element tree,
/// the window, and the optional mapping and geolocation capabilities
pub struct Page {
    pub document: Document,
    pub window: Window,
    maps_api: Option<Arc<dyn MapsApi>>,
    geolocation: Option<Arc<dyn GeoLocator>>,
}

impl Page {
    /// A page with no mapping SDK loaded and no geolocation
    pub fn new(document: Document) -> Self {
        Self {
            document,
            window: Window::default(),
            maps_api: None,
            geolocation: None,
        }
    }

    /// A page with the headless mapping backend loaded
    pub fn headless(document: Document) -> Self {
        Self::new(document).with_maps_api(Arc::new(HeadlessMaps::new()))
    }

    pub fn with_maps_api(mut self, api: Arc<dyn MapsApi>) -> Self {
        self.maps_api = Some(api);
        self
    }

    pub fn with_geolocation(mut self, locator: Arc<dyn GeoLocator>) -> Self {
        self.geolocation = Some(locator);
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    pub fn maps_api(&self) -> Option<Arc<dyn MapsApi>> {
        self.maps_api.clone()
    }

    pub fn geolocation(&self) -> Option<Arc<dyn GeoLocator>> {
        self.geolocation.clone()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("document", &self.document)
            .field("window", &self.window)
            .field("maps_api", &self.maps_api.as_ref().map(|api| api.name()))
            .field("geolocation", &self.geolocation.is_some())
            .finish()
    }
}
