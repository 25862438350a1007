use jmap::prelude::*;
use serde_json::json;

/// End-to-end scenarios driven through the plugin surface, the way a page
/// script would use the widget
#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Mutex;

    /// A page with one sized map element and the headless SDK loaded
    fn page() -> (Page, ElementId) {
        let mut document = Document::with_viewport_width(960.0);
        let map = document
            .append(document.root(), Element::new("div").with_id("map"))
            .unwrap();
        (Page::headless(document), map)
    }

    fn add_marker(page: &mut Page, parent: ElementId, lat: &str, lng: &str, markup: &str) {
        page.document
            .append(
                parent,
                Element::new("div")
                    .with_class("marker")
                    .with_data("lat", lat)
                    .with_data("lng", lng)
                    .with_markup(markup),
            )
            .unwrap();
    }

    fn view_state(plugin: &mut JMapPlugin, el: ElementId) -> MapState {
        match plugin.call(&[el], "get", &[]).unwrap() {
            CallOutcome::Value(MethodValue::Map(state)) => state,
            other => panic!("expected map state, got {other:?}"),
        }
    }

    #[test]
    fn test_single_markup_marker_scenario() {
        println!("🧪 [TEST] div.marker scenario");

        let (mut page, el) = page();
        add_marker(&mut page, el, "10", "20", "<b>Hi</b>");
        let mut plugin = JMapPlugin::new(page);

        plugin
            .apply(&[el], &MapOptionsBuilder::new().center_on_markers(true).build())
            .unwrap();

        let map = plugin.instance(el).unwrap();
        assert_eq!(map.placed_markers().len(), 1);
        let placed = &map.placed_markers()[0];
        assert_eq!(placed.position(), LatLng::new(10.0, 20.0));
        assert_eq!(placed.popup().map(Popup::content), Some("<b>Hi</b>"));

        let state = view_state(&mut plugin, el);
        assert_eq!(state.center, LatLng::new(10.0, 20.0));
        assert_eq!(state.zoom, 16.0);
        assert_eq!(state.marker_count, 1);

        plugin.trigger_marker_event(el, 0, "click").unwrap();
        let popup = plugin.instance(el).unwrap().placed_markers()[0].popup().unwrap();
        assert!(popup.is_open());
        println!("✅ [TEST] div.marker scenario passed");
    }

    #[test]
    fn test_markup_and_option_markers_fit() {
        let (mut page, el) = page();
        add_marker(&mut page, el, "59.9139", "10.7522", "Oslo");
        add_marker(&mut page, el, "60.3913", "5.3221", "Bergen");
        let mut plugin = JMapPlugin::new(page);

        let options = MapOptions::from_json(
            r#"{
                "zoom": 2,
                "markers": [
                    { "lat": 63.4305, "lng": 10.3951, "content": "Trondheim" },
                    { "lat": 69.6492, "lng": 18.9553 }
                ]
            }"#,
        )
        .unwrap();
        plugin.apply(&[el], &options).unwrap();

        let map = plugin.instance(el).unwrap();
        let contents: Vec<Option<&str>> = map
            .markers()
            .iter()
            .map(|m| m.content.as_deref())
            .collect();
        assert_eq!(
            contents,
            vec![Some("Oslo"), Some("Bergen"), Some("Trondheim"), None]
        );

        let state = view_state(&mut plugin, el);
        for marker in plugin.instance(el).unwrap().placed_markers() {
            assert!(
                state.bounds.contains(&marker.position()),
                "{:?} outside {:?}",
                marker.position(),
                state.bounds
            );
        }
        assert_eq!(state.marker_count, 4);
    }

    #[test]
    fn test_zero_markers_stay_at_configured_center() {
        let (page, el) = page();
        let mut plugin = JMapPlugin::new(page);
        plugin
            .apply(&[el], &MapOptionsBuilder::new().with_zoom(7).build())
            .unwrap();

        let state = view_state(&mut plugin, el);
        assert!((state.center.lat - 62.10).abs() < 1e-9);
        assert!((state.center.lng - 10.10).abs() < 1e-9);
        assert_eq!(state.zoom, 7.0);

        assert_eq!(
            plugin.call(&[el], "centerMap", &[]).unwrap(),
            CallOutcome::Value(MethodValue::Center(None))
        );
        assert!(plugin.instance(el).unwrap().center().is_none());
    }

    #[test]
    fn test_add_marker_then_center_on_demand() {
        let (page, el) = page();
        let mut plugin = JMapPlugin::new(page);
        plugin.apply(&[el], &MapOptions::default()).unwrap();

        for marker in [json!({ "lat": 10, "lng": 10 }), json!({ "lat": 20, "lng": 30 })] {
            assert_eq!(
                plugin.call(&[el], "addMarker", &[marker]).unwrap(),
                CallOutcome::Chained(1)
            );
        }

        let outcome = plugin.call(&[el], "centerMap", &[]).unwrap();
        assert_eq!(
            outcome,
            CallOutcome::Value(MethodValue::Center(Some(LatLng::new(15.0, 20.0))))
        );

        let state = view_state(&mut plugin, el);
        assert!(state.bounds.contains(&LatLng::new(10.0, 10.0)));
        assert!(state.bounds.contains(&LatLng::new(20.0, 30.0)));
    }

    #[test]
    fn test_missing_sdk() {
        let mut document = Document::new();
        let el = document
            .append(document.root(), Element::new("div"))
            .unwrap();
        let mut plugin = JMapPlugin::new(Page::new(document));

        plugin
            .apply(&[el], &MapOptionsBuilder::new().with_debug(true).build())
            .unwrap();

        assert!(!plugin.instance(el).unwrap().is_rendered());
        assert!(matches!(
            plugin.call(&[el], "get", &[]),
            Err(MapError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_destroy_is_final() {
        let (mut page, el) = page();
        add_marker(&mut page, el, "10", "20", "<b>Hi</b>");
        let mut plugin = JMapPlugin::new(page);
        plugin.apply(&[el], &MapOptions::default()).unwrap();
        assert_eq!(plugin.page().window.subscriber_count(), 1);

        plugin.call(&[el], "destroy", &[]).unwrap();

        let element = plugin.page().document.get(el).unwrap();
        assert!(element.children().is_empty());
        assert!(element.style().is_empty());
        assert_eq!(plugin.page().document.inner_html(el), "");
        assert_eq!(plugin.page().window.subscriber_count(), 0);

        for method in ["get", "centerMap", "geoCenter"] {
            assert!(matches!(
                plugin.call(&[el], method, &[]),
                Err(MapError::NotInitialized(_))
            ));
        }
        assert!(matches!(
            plugin.trigger_marker_event(el, 0, "click"),
            Err(MapError::NotInitialized(_))
        ));
        assert_eq!(plugin.dispatch_resize(), 0);

        // A destroyed element can host a fresh map
        assert_eq!(plugin.apply(&[el], &MapOptions::default()).unwrap(), 1);
    }

    #[test]
    fn test_resize_reapplies_center() {
        let (mut page, el) = page();
        add_marker(&mut page, el, "48.8566", "2.3522", "Paris");
        let mut plugin = JMapPlugin::new(page);
        plugin.apply(&[el], &MapOptions::default()).unwrap();

        plugin.page_mut().document.set_style(el, "width", "500px").unwrap();
        assert_eq!(plugin.dispatch_resize(), 1);

        let state = view_state(&mut plugin, el);
        assert_eq!(state.center, LatLng::new(48.8566, 2.3522));
        assert_eq!(state.size.x, 500.0);
    }

    #[test]
    fn test_hooks_wrap_each_phase() {
        let (page, el) = page();
        let mut plugin = JMapPlugin::new(page);
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut options = MapOptionsBuilder::new();
        for point in HookPoint::ALL {
            let log = Arc::clone(&log);
            options = options.on(point, move |map: &JMap| {
                log.lock()
                    .unwrap()
                    .push((point.name(), map.is_rendered()));
            });
        }
        plugin.apply(&[el], &options.build()).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("beforeMapInit", false),
                ("afterMapInit", true),
                ("beforeMarkerAdd", true),
                ("afterMarkerAdd", true),
                ("beforeCenter", true),
                ("afterCenter", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_geolocation_centers_map() {
        println!("🧪 [TEST] geolocation centering");

        let (page, el) = page();
        let locator = Arc::new(ManualLocator::new());
        let mut plugin = JMapPlugin::new(page.with_geolocation(locator.clone()));

        let calls = Arc::new(Mutex::new(Vec::new()));
        let options = {
            let before = Arc::clone(&calls);
            let after = Arc::clone(&calls);
            MapOptionsBuilder::new()
                .center_on_markers(false)
                .on(HookPoint::BeforeGeoCenter, move |_| {
                    before.lock().unwrap().push("beforeGeoCenter")
                })
                .on(HookPoint::AfterGeoCenter, move |_| {
                    after.lock().unwrap().push("afterGeoCenter")
                })
                .build()
        };
        plugin.apply(&[el], &options).unwrap();

        // Rendering finished while the position request is still open
        assert_eq!(*calls.lock().unwrap(), vec!["beforeGeoCenter", "afterGeoCenter"]);
        assert!(plugin.poll().is_empty());
        assert_eq!(locator.pending(), 1);

        locator.resolve(LatLng::new(35.6762, 139.6503));
        let settled = plugin.settle().await;
        assert_eq!(
            settled,
            vec![(el, GeoRequestStatus::Resolved(LatLng::new(35.6762, 139.6503)))]
        );

        let state = view_state(&mut plugin, el);
        assert_eq!(state.center, LatLng::new(35.6762, 139.6503));

        // The recorded position is what a resize restores
        plugin.page_mut().document.set_style(el, "width", "300px").unwrap();
        plugin.dispatch_resize();
        assert_eq!(view_state(&mut plugin, el).center, LatLng::new(35.6762, 139.6503));
        println!("✅ [TEST] geolocation centering passed");
    }

    #[tokio::test]
    async fn test_geolocation_denied_keeps_center() {
        let (page, el) = page();
        let mut plugin = JMapPlugin::new(page.with_geolocation(Arc::new(DeniedLocator)));
        let options = MapOptionsBuilder::new()
            .center_on_markers(false)
            .with_center(LatLng::new(40.0, -74.0))
            .with_debug(true)
            .build();
        plugin.apply(&[el], &options).unwrap();

        let settled = plugin.settle().await;
        assert_eq!(
            settled,
            vec![(el, GeoRequestStatus::Failed(GeolocationError::PermissionDenied))]
        );
        assert_eq!(view_state(&mut plugin, el).center, LatLng::new(40.0, -74.0));
        assert!(plugin.instance(el).unwrap().center().is_none());
    }

    #[tokio::test]
    async fn test_geo_center_on_demand() {
        let (mut page, el) = page();
        add_marker(&mut page, el, "10", "20", "");
        let page = page.with_geolocation(Arc::new(StaticLocator::new(LatLng::new(-1.0, -2.0))));
        let mut plugin = JMapPlugin::new(page);
        plugin.apply(&[el], &MapOptions::default()).unwrap();

        let outcome = plugin.call(&[el], "geoCenter", &[]).unwrap();
        assert_eq!(outcome, CallOutcome::Value(MethodValue::Geo(GeoRequestStatus::Pending)));

        plugin.settle().await;
        assert_eq!(plugin.instance(el).unwrap().center(), Some(LatLng::new(-1.0, -2.0)));
    }

    #[test]
    fn test_each_element_gets_its_own_map() {
        let mut document = Document::with_viewport_width(800.0);
        let first = document
            .append(document.root(), Element::new("div").with_class("map"))
            .unwrap();
        let second = document
            .append(document.root(), Element::new("div").with_class("map"))
            .unwrap();
        for (parent, lat) in [(first, "10"), (second, "-10")] {
            document
                .append(
                    parent,
                    Element::new("div")
                        .with_class("marker")
                        .with_data("lat", lat)
                        .with_data("lng", "0"),
                )
                .unwrap();
        }
        let mut plugin = JMapPlugin::new(Page::headless(document));

        let maps = plugin
            .apply_selector("div.map", &MapOptions::default())
            .unwrap();
        assert_eq!(maps, vec![first, second]);

        assert_eq!(view_state(&mut plugin, first).center, LatLng::new(10.0, 0.0));
        assert_eq!(view_state(&mut plugin, second).center, LatLng::new(-10.0, 0.0));

        plugin.call(&[first], "destroy", &[]).unwrap();
        assert!(plugin.instance(second).unwrap().is_rendered());
        assert_eq!(plugin.page().window.resize_targets(), vec![second]);
    }
}
