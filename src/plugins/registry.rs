//! Per-element map instances and the string-dispatched method surface

use crate::{
    core::config::MapOptions,
    core::map::JMap,
    dom::{element::ElementId, page::Page},
    geolocation::GeoRequestStatus,
    layers::marker::MarkerDescriptor,
    plugins::method::{CallOutcome, MapState, Method, MethodValue},
    prelude::HashMap,
    MapError, Result,
};
use serde_json::Value;

/// Owns the page and one [`JMap`] per element the plugin was applied to
#[derive(Debug)]
pub struct JMapPlugin {
    page: Page,
    instances: HashMap<ElementId, JMap>,
    defaults: MapOptions,
}

impl JMapPlugin {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            instances: HashMap::default(),
            defaults: MapOptions::default(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    /// Options every later [`apply`](Self::apply) falls back to before the
    /// built-in defaults
    pub fn defaults(&self) -> &MapOptions {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: MapOptions) {
        self.defaults = defaults;
    }

    /// Creates and renders a map on every element that has none yet.
    ///
    /// Returns how many maps were created. An instance whose render failed is
    /// still registered, so it can be inspected or destroyed. A failing
    /// element does not stop the rest; the first failure is returned once
    /// every element has been visited.
    pub fn apply(&mut self, elements: &[ElementId], options: &MapOptions) -> Result<usize> {
        let options = options.merged_over(&self.defaults);
        let mut created = 0;
        let mut first_error = None;

        for &element in elements {
            if self.instances.contains_key(&element) {
                log::debug!("element {element} already has a map");
                continue;
            }

            let mut map = match JMap::new(&mut self.page, element, &options) {
                Ok(map) => map,
                Err(error) => {
                    first_error.get_or_insert(error);
                    continue;
                }
            };
            let rendered = map.init(&mut self.page);
            self.instances.insert(element, map);
            match rendered {
                Ok(()) => created += 1,
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(created),
        }
    }

    /// [`apply`](Self::apply) on every element matching `selector`
    pub fn apply_selector(&mut self, selector: &str, options: &MapOptions) -> Result<Vec<ElementId>> {
        let elements = self.page.document.query(selector)?;
        self.apply(&elements, options)?;
        Ok(elements)
    }

    /// Calls a public method by name.
    ///
    /// Getters called without arguments answer for the first element.
    /// Everything else runs on each element that has a map, skipping the rest.
    /// An element that fails does not stop the chain; the first failure is
    /// returned after every element has run.
    pub fn call(&mut self, elements: &[ElementId], name: &str, args: &[Value]) -> Result<CallOutcome> {
        let method = Method::parse(name)?;

        if method.is_getter() && args.is_empty() {
            let first = elements.first().ok_or_else(|| MapError::InvalidArgument {
                method: method.name().to_string(),
                reason: "no element selected".to_string(),
            })?;
            return Ok(CallOutcome::Value(self.invoke(*first, method, args)?));
        }

        let mut called = 0;
        let mut first_error = None;
        for &element in elements {
            if !self.instances.contains_key(&element) {
                continue;
            }
            match self.invoke(element, method, args) {
                Ok(_) => called += 1,
                Err(error) => {
                    log::debug!("{} failed on element {element}: {error}", method.name());
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(CallOutcome::Chained(called)),
        }
    }

    fn invoke(&mut self, element: ElementId, method: Method, args: &[Value]) -> Result<MethodValue> {
        let not_initialized = || MapError::NotInitialized(element);

        match method {
            Method::Destroy => {
                self.destroy(element)?;
                Ok(MethodValue::Destroyed)
            }
            Method::Get => {
                let map = self.instances.get(&element).ok_or_else(not_initialized)?;
                Ok(MethodValue::Map(MapState::capture(map.get()?)))
            }
            Method::CenterMap => {
                let map = self.instances.get_mut(&element).ok_or_else(not_initialized)?;
                Ok(MethodValue::Center(map.center_map()?))
            }
            Method::GeoCenter => {
                let map = self.instances.get_mut(&element).ok_or_else(not_initialized)?;
                Ok(MethodValue::Geo(map.geo_center(&self.page)?))
            }
            Method::AddMarker => {
                let map = self.instances.get_mut(&element).ok_or_else(not_initialized)?;
                let descriptor = marker_argument(method, args)?;
                Ok(MethodValue::Added(map.add_marker(descriptor)?))
            }
        }
    }

    /// Destroys the map on `element` and forgets it
    pub fn destroy(&mut self, element: ElementId) -> Result<()> {
        let map = self
            .instances
            .remove(&element)
            .ok_or(MapError::NotInitialized(element))?;
        map.destroy(&mut self.page)
    }

    pub fn instance(&self, element: ElementId) -> Option<&JMap> {
        self.instances.get(&element)
    }

    pub fn instance_mut(&mut self, element: ElementId) -> Option<&mut JMap> {
        self.instances.get_mut(&element)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Delivers a marker interaction to the map on `element`
    pub fn trigger_marker_event(&mut self, element: ElementId, index: usize, event: &str) -> Result<()> {
        self.instances
            .get_mut(&element)
            .ok_or(MapError::NotInitialized(element))?
            .trigger_marker_event(index, event)
    }

    /// Notifies every subscribed map that the window was resized; returns how
    /// many maps handled it
    pub fn dispatch_resize(&mut self) -> usize {
        let mut handled = 0;
        for target in self.page.window.resize_targets() {
            if let Some(map) = self.instances.get_mut(&target) {
                map.handle_resize(&self.page);
                handled += 1;
            }
        }
        handled
    }

    /// Polls every pending geolocation request once without blocking
    pub fn poll(&mut self) -> Vec<(ElementId, GeoRequestStatus)> {
        let mut settled = Vec::new();
        for element in self.pending_elements() {
            if let Some(map) = self.instances.get_mut(&element) {
                let status = map.poll_geolocation();
                if !status.is_pending() {
                    settled.push((element, status));
                }
            }
        }
        settled
    }

    /// Waits until every pending geolocation request has settled
    pub async fn settle(&mut self) -> Vec<(ElementId, GeoRequestStatus)> {
        let mut settled = Vec::new();
        for element in self.pending_elements() {
            if let Some(map) = self.instances.get_mut(&element) {
                settled.push((element, map.settle_geolocation().await));
            }
        }
        settled
    }

    /// Like [`settle`](Self::settle), but stops waiting after `limit`.
    ///
    /// Requests still open at the deadline stay pending and can be polled later.
    #[cfg(feature = "tokio-runtime")]
    pub async fn settle_within(&mut self, limit: std::time::Duration) -> Vec<(ElementId, GeoRequestStatus)> {
        let interval = std::time::Duration::from_millis(crate::constants::GEOLOCATION_POLL_INTERVAL_MS);
        let deadline = tokio::time::Instant::now() + limit;
        let mut settled = Vec::new();

        loop {
            settled.extend(self.poll());
            if self.pending_elements().is_empty() || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(interval).await;
        }
        settled
    }

    fn pending_elements(&self) -> Vec<ElementId> {
        let mut elements: Vec<ElementId> = self
            .instances
            .iter()
            .filter(|(_, map)| map.geolocation_pending())
            .map(|(element, _)| *element)
            .collect();
        elements.sort_unstable();
        elements
    }
}

fn marker_argument(method: Method, args: &[Value]) -> Result<MarkerDescriptor> {
    let invalid = |reason: String| MapError::InvalidArgument {
        method: method.name().to_string(),
        reason,
    };
    let raw = args
        .first()
        .ok_or_else(|| invalid("expected a marker object".to_string()))?;
    serde_json::from_value(raw.clone()).map_err(|err| invalid(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::MapOptionsBuilder;
    use crate::dom::element::{Document, Element};
    use serde_json::json;

    fn plugin_with_maps(count: usize) -> (JMapPlugin, Vec<ElementId>) {
        let mut document = Document::with_viewport_width(800.0);
        let elements = (0..count)
            .map(|_| {
                document
                    .append(document.root(), Element::new("div").with_class("map"))
                    .unwrap()
            })
            .collect();
        (JMapPlugin::new(Page::headless(document)), elements)
    }

    #[test]
    fn test_apply_once_per_element() {
        let (mut plugin, elements) = plugin_with_maps(2);

        assert_eq!(plugin.apply(&elements, &MapOptions::default()).unwrap(), 2);
        assert_eq!(plugin.apply(&elements, &MapOptions::default()).unwrap(), 0);
        assert_eq!(plugin.len(), 2);
    }

    #[test]
    fn test_apply_selector() {
        let (mut plugin, elements) = plugin_with_maps(3);
        let applied = plugin
            .apply_selector("div.map", &MapOptions::default())
            .unwrap();

        assert_eq!(applied, elements);
        assert!(applied.iter().all(|el| plugin.instance(*el).is_some()));
    }

    #[test]
    fn test_defaults_sit_under_options() {
        let (mut plugin, elements) = plugin_with_maps(1);
        plugin.set_defaults(MapOptionsBuilder::new().with_zoom(4).with_height(200).build());

        let options = MapOptionsBuilder::new().with_zoom(9).build();
        plugin.apply(&elements, &options).unwrap();

        let settings = plugin.instance(elements[0]).unwrap().settings();
        assert_eq!(settings.zoom, 9);
        assert_eq!(settings.height, 200);
    }

    #[test]
    fn test_getter_reads_first_element() {
        let (mut plugin, elements) = plugin_with_maps(2);
        plugin.apply(&elements, &MapOptions::default()).unwrap();

        let outcome = plugin.call(&elements, "get", &[]).unwrap();
        match outcome {
            CallOutcome::Value(MethodValue::Map(state)) => {
                assert_eq!(state.zoom, 16.0);
                assert_eq!(state.marker_count, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_actions_chain_over_initialized_elements() {
        let (mut plugin, mut elements) = plugin_with_maps(3);
        plugin.apply(&elements[..2], &MapOptions::default()).unwrap();
        elements.push(elements[2]);

        let marker = json!({ "lat": 10.0, "lng": 20.0, "content": "<b>Hi</b>" });
        let outcome = plugin.call(&elements, "addMarker", &[marker]).unwrap();

        assert_eq!(outcome, CallOutcome::Chained(2));
        for el in &elements[..2] {
            assert_eq!(plugin.instance(*el).unwrap().placed_markers().len(), 1);
        }
    }

    #[test]
    fn test_failed_element_does_not_stop_the_chain() {
        let (mut plugin, elements) = plugin_with_maps(2);
        let (bad, good) = (elements[0], elements[1]);
        plugin
            .page_mut()
            .document
            .append(
                bad,
                Element::new("div")
                    .with_class("marker")
                    .with_data("lat", "x")
                    .with_data("lng", "20"),
            )
            .unwrap();

        assert!(matches!(
            plugin.apply(&elements, &MapOptions::default()),
            Err(MapError::InvalidMarker { index: 0, .. })
        ));
        assert!(!plugin.instance(bad).unwrap().is_rendered());
        assert!(plugin.instance(good).unwrap().is_rendered());

        let marker = json!({ "lat": 10.0, "lng": 20.0 });
        assert!(matches!(
            plugin.call(&elements, "addMarker", &[marker]),
            Err(MapError::NotInitialized(el)) if el == bad
        ));
        assert_eq!(plugin.instance(good).unwrap().placed_markers().len(), 1);
    }

    #[test]
    fn test_getter_with_arguments_chains() {
        let (mut plugin, elements) = plugin_with_maps(2);
        plugin.apply(&elements, &MapOptions::default()).unwrap();

        let outcome = plugin.call(&elements, "centerMap", &[json!(true)]).unwrap();
        assert_eq!(outcome, CallOutcome::Chained(2));
    }

    #[test]
    fn test_add_marker_argument_errors() {
        let (mut plugin, elements) = plugin_with_maps(1);
        plugin.apply(&elements, &MapOptions::default()).unwrap();

        assert!(matches!(
            plugin.call(&elements, "addMarker", &[json!({ "lat": "x" })]),
            Err(MapError::InvalidArgument { .. })
        ));
        assert!(matches!(
            plugin.call(&elements, "addMarker", &[json!({ "lat": 99, "lng": 0 })]),
            Err(MapError::InvalidMarker { .. })
        ));
    }

    #[test]
    fn test_private_and_unknown_methods() {
        let (mut plugin, elements) = plugin_with_maps(1);
        plugin.apply(&elements, &MapOptions::default()).unwrap();

        assert!(matches!(
            plugin.call(&elements, "_renderMap", &[]),
            Err(MapError::PrivateMethod(_))
        ));
        assert!(matches!(
            plugin.call(&elements, "init", &[]),
            Err(MapError::PrivateMethod(_))
        ));
        assert!(matches!(
            plugin.call(&elements, "panTo", &[]),
            Err(MapError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_destroy_then_call() {
        let (mut plugin, elements) = plugin_with_maps(1);
        plugin.apply(&elements, &MapOptions::default()).unwrap();

        assert_eq!(
            plugin.call(&elements, "destroy", &[]).unwrap(),
            CallOutcome::Chained(1)
        );
        assert!(plugin.is_empty());
        assert!(matches!(
            plugin.call(&elements, "get", &[]),
            Err(MapError::NotInitialized(_))
        ));
        assert_eq!(
            plugin.call(&elements, "destroy", &[]).unwrap(),
            CallOutcome::Chained(0)
        );
        assert_eq!(plugin.dispatch_resize(), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_settle_within_leaves_slow_requests_pending() {
        use crate::geolocation::ManualLocator;
        use crate::prelude::{Arc, LatLng};
        use std::time::Duration;

        let (plugin, elements) = plugin_with_maps(1);
        let locator = Arc::new(ManualLocator::new());
        let page = plugin.into_page().with_geolocation(locator.clone());
        let mut plugin = JMapPlugin::new(page);
        plugin
            .apply(&elements, &MapOptionsBuilder::new().center_on_markers(false).build())
            .unwrap();

        assert!(plugin.settle_within(Duration::from_millis(30)).await.is_empty());
        assert!(plugin.instance(elements[0]).unwrap().geolocation_pending());

        locator.resolve(LatLng::new(3.0, 4.0));
        let settled = plugin.settle_within(Duration::from_millis(30)).await;
        assert_eq!(
            settled,
            vec![(elements[0], GeoRequestStatus::Resolved(LatLng::new(3.0, 4.0)))]
        );
    }

    #[test]
    fn test_getter_without_elements() {
        let (mut plugin, _) = plugin_with_maps(0);
        assert!(matches!(
            plugin.call(&[], "get", &[]),
            Err(MapError::InvalidArgument { .. })
        ));
    }
}
