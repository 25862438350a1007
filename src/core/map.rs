use crate::{
    constants::{CONTAINER_CLASS, SINGLE_MARKER_ZOOM},
    core::{
        config::{HookPoint, MapOptions, MapSettings},
        geo::{LatLng, LatLngBounds},
    },
    dom::{
        element::{Element, ElementId},
        layout::{reflow_to_aspect_ratio, rendered_height, rendered_size},
        page::Page,
        window::ResizeSubscription,
    },
    geolocation::{GeoPosition, GeoRequestStatus, GeolocationError, PendingPosition},
    layers::{
        collector::{collect_markers, validate_descriptor},
        marker::{MarkerDescriptor, PlacedMarker},
    },
    sdk::{MapTypeId, MapView, MapViewOptions},
    MapError, Result,
};
use futures::FutureExt;
use std::fmt;

/// One map widget bound to one page element.
///
/// Construction wraps the element in a `div.jmap-container`. [`JMap::init`]
/// then renders: it sizes the element, creates the map view, places the
/// markers, applies the aspect ratio, centers the view and subscribes to
/// window resizes. Lifecycle hooks from the options run around each phase.
pub struct JMap {
    element: ElementId,
    container: ElementId,
    settings: MapSettings,
    view: Option<Box<dyn MapView>>,
    /// Last computed center, re-applied on resize
    center: Option<LatLng>,
    markers: Vec<MarkerDescriptor>,
    placed: Vec<PlacedMarker>,
    resize: Option<ResizeSubscription>,
    pending_geo: Option<PendingPosition>,
    geo_status: GeoRequestStatus,
}

impl JMap {
    /// Resolves the options and wraps `element` in its container.
    ///
    /// A container left behind by a destroyed map is reused with its style
    /// reset. Nothing is rendered until [`JMap::init`] runs.
    pub fn new(page: &mut Page, element: ElementId, options: &MapOptions) -> Result<Self> {
        let Some(target) = page.document.get(element) else {
            return Err(MapError::ElementNotFound(element));
        };

        let settings = MapSettings::resolve(options);
        let leftover = target.parent().filter(|parent| {
            page.document.get(*parent).is_some_and(|node| {
                node.has_class(CONTAINER_CLASS) && node.children() == [element]
            })
        });
        let container = match leftover {
            Some(container) => {
                page.document.clear_style(container)?;
                container
            }
            None => page
                .document
                .wrap(element, Element::new("div").with_class(CONTAINER_CLASS))?,
        };

        Ok(Self {
            element,
            container,
            settings,
            view: None,
            center: None,
            markers: Vec::new(),
            placed: Vec::new(),
            resize: None,
            pending_geo: None,
            geo_status: GeoRequestStatus::Idle,
        })
    }

    /// Renders the map into its element.
    ///
    /// A page without a mapping SDK is reported when debugging and leaves the
    /// instance without a view.
    pub fn init(&mut self, page: &mut Page) -> Result<()> {
        let Some(api) = page.maps_api() else {
            self.report_error(&MapError::ApiUnavailable);
            return Ok(());
        };
        log::debug!("rendering map into element {} with {}", self.element, api.name());

        self.markers = collect_markers(&page.document, self.element, &self.settings)?;

        if rendered_height(&page.document, self.element) <= 0.0 {
            self.report_warning(format!(
                "Container has no height. Setting it to {}px.",
                self.settings.height
            ));
            page.document
                .set_style(self.element, "height", format!("{}px", self.settings.height))?;
        }

        let options = MapViewOptions {
            center: self.settings.center(),
            zoom: f64::from(self.settings.zoom),
            map_type: MapTypeId::from(self.settings.map_type),
            size: rendered_size(&page.document, self.element),
        };

        self.run_hook(HookPoint::BeforeMapInit);
        self.view = Some(api.create_map(options)?);
        self.run_hook(HookPoint::AfterMapInit);

        self.run_hook(HookPoint::BeforeMarkerAdd);
        if let Some(view) = self.view.as_deref_mut() {
            self.placed = self
                .markers
                .iter()
                .map(|descriptor| place(view, descriptor))
                .collect();
        }
        self.run_hook(HookPoint::AfterMarkerAdd);

        if let Some(percent) = self.settings.aspect_ratio.padding_percent() {
            reflow_to_aspect_ratio(&mut page.document, self.element, self.container, percent)?;
            let size = rendered_size(&page.document, self.element);
            if let Some(view) = self.view.as_deref_mut() {
                view.resize(size);
            }
        }

        if self.settings.center_markers {
            self.run_hook(HookPoint::BeforeCenter);
            self.center_map()?;
            self.run_hook(HookPoint::AfterCenter);
        } else {
            self.run_hook(HookPoint::BeforeGeoCenter);
            self.geo_center(page)?;
            self.run_hook(HookPoint::AfterGeoCenter);
        }

        if self.settings.center_resize {
            self.resize = Some(page.window.subscribe_resize(self.element));
        }

        log::debug!(
            "map on element {} ready with {} markers",
            self.element,
            self.placed.len()
        );
        Ok(())
    }

    /// Places one more marker on the map
    pub fn add_marker(&mut self, descriptor: MarkerDescriptor) -> Result<bool> {
        validate_descriptor(&descriptor, self.markers.len())?;
        let view = self.view_mut()?;
        let placed = place(view, &descriptor);

        self.markers.push(descriptor);
        self.placed.push(placed);
        Ok(true)
    }

    /// Fits the view around every placed marker.
    ///
    /// A single marker is centered at a fixed zoom. With no markers the view
    /// keeps its current camera and no center is recorded.
    pub fn center_map(&mut self) -> Result<Option<LatLng>> {
        let positions: Vec<LatLng> = self.placed.iter().map(PlacedMarker::position).collect();
        let view = self.view_mut()?;

        let Some(bounds) = LatLngBounds::from_points(positions.iter().copied()) else {
            self.report_warning("No markers to center the map on.");
            return Ok(None);
        };

        if let [only] = positions.as_slice() {
            view.set_center(*only);
            view.set_zoom(SINGLE_MARKER_ZOOM);
        } else {
            view.fit_bounds(&bounds);
        }

        let center = bounds.center();
        self.center = Some(center);
        log::debug!("centered element {} on {} markers", self.element, positions.len());
        Ok(Some(center))
    }

    /// Asks the page for the user's position.
    ///
    /// The request runs in the background; drive it with
    /// [`JMap::poll_geolocation`] or [`JMap::settle_geolocation`]. A request
    /// already in flight is replaced.
    pub fn geo_center(&mut self, page: &Page) -> Result<GeoRequestStatus> {
        if self.view.is_none() {
            return Err(MapError::NotInitialized(self.element));
        }

        let Some(locator) = page.geolocation() else {
            self.report_warning("Geolocation is not available on this page.");
            self.pending_geo = None;
            self.geo_status = GeoRequestStatus::Unavailable;
            return Ok(self.geo_status.clone());
        };

        self.pending_geo = Some(async move { locator.current_position().await }.boxed());
        self.geo_status = GeoRequestStatus::Pending;
        Ok(GeoRequestStatus::Pending)
    }

    /// Checks the pending geolocation request without blocking
    pub fn poll_geolocation(&mut self) -> GeoRequestStatus {
        let Some(request) = self.pending_geo.as_mut() else {
            return self.geo_status.clone();
        };

        match request.now_or_never() {
            Some(result) => {
                self.pending_geo = None;
                self.apply_geolocation(result)
            }
            None => GeoRequestStatus::Pending,
        }
    }

    /// Waits for the pending geolocation request to settle
    pub async fn settle_geolocation(&mut self) -> GeoRequestStatus {
        match self.pending_geo.take() {
            Some(request) => {
                let result = request.await;
                self.apply_geolocation(result)
            }
            None => self.geo_status.clone(),
        }
    }

    fn apply_geolocation(
        &mut self,
        result: std::result::Result<GeoPosition, GeolocationError>,
    ) -> GeoRequestStatus {
        self.geo_status = match result {
            Ok(position) => match self.view.as_deref_mut() {
                Some(view) => {
                    view.set_center(position.coords);
                    self.center = Some(view.center());
                    log::debug!("element {} centered on user position", self.element);
                    GeoRequestStatus::Resolved(position.coords)
                }
                None => GeoRequestStatus::Idle,
            },
            Err(error) => {
                self.report_warning(&error);
                GeoRequestStatus::Failed(error)
            }
        };
        self.geo_status.clone()
    }

    /// Delivers a named interaction to the marker at `index`.
    ///
    /// `click` opens the marker's popup, leaving other popups open. Handlers
    /// registered for the interaction run afterwards, in registration order.
    pub fn trigger_marker_event(&mut self, index: usize, event: &str) -> Result<()> {
        if self.view.is_none() {
            return Err(MapError::NotInitialized(self.element));
        }
        let placed = self
            .placed
            .get_mut(index)
            .ok_or(MapError::MarkerNotFound(index))?;

        if event == "click" {
            if let (Some(popup), Some(view)) = (placed.popup_mut(), self.view.as_deref_mut()) {
                view.open_info_window(popup.anchor(), popup.content())?;
                popup.show();
            }
        }

        let placed = &self.placed[index];
        let descriptor = &self.markers[index];
        for handler in descriptor.events.handlers(event) {
            handler(self, placed, descriptor);
        }
        Ok(())
    }

    /// Re-fits the view to its element and restores the last computed center
    pub fn handle_resize(&mut self, page: &Page) {
        let size = rendered_size(&page.document, self.element);
        let center = self.center;
        if let Some(view) = self.view.as_deref_mut() {
            view.resize(size);
            if let Some(center) = center {
                view.set_center(center);
            }
        }
    }

    /// The live map view
    pub fn get(&self) -> Result<&dyn MapView> {
        self.view
            .as_deref()
            .ok_or(MapError::NotInitialized(self.element))
    }

    /// Tears the widget down: markers leave the view, the element loses its
    /// markup and inline style, and the pending geolocation request and
    /// resize subscription are released
    pub fn destroy(mut self, page: &mut Page) -> Result<()> {
        if let Some(view) = self.view.as_deref_mut() {
            for placed in &self.placed {
                view.remove_marker(placed.id());
            }
        }
        self.pending_geo = None;
        self.resize = None;

        page.document.empty(self.element)?;
        page.document.clear_style(self.element)?;
        log::debug!("map on element {} destroyed", self.element);
        Ok(())
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Last center computed by marker fitting or geolocation
    pub fn center(&self) -> Option<LatLng> {
        self.center
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        &self.markers
    }

    pub fn placed_markers(&self) -> &[PlacedMarker] {
        &self.placed
    }

    pub fn geo_status(&self) -> &GeoRequestStatus {
        &self.geo_status
    }

    pub fn geolocation_pending(&self) -> bool {
        self.pending_geo.is_some()
    }

    pub fn is_rendered(&self) -> bool {
        self.view.is_some()
    }

    pub fn listens_for_resize(&self) -> bool {
        self.resize.as_ref().is_some_and(ResizeSubscription::is_active)
    }

    fn view_mut(&mut self) -> Result<&mut dyn MapView> {
        match self.view.as_mut() {
            Some(view) => Ok(&mut **view),
            None => Err(MapError::NotInitialized(self.element)),
        }
    }

    fn run_hook(&self, point: HookPoint) {
        if let Some(hook) = self.settings.hooks.get(point) {
            log::debug!("running {} hook", point.name());
            hook(self);
        }
    }

    fn report_error(&self, message: impl fmt::Display) {
        if self.settings.debug {
            log::error!("{message}");
        }
    }

    fn report_warning(&self, message: impl fmt::Display) {
        if self.settings.debug {
            log::warn!("{message}");
        }
    }
}

fn place(view: &mut dyn MapView, descriptor: &MarkerDescriptor) -> PlacedMarker {
    let position = descriptor.position();
    let id = view.add_marker(position);
    PlacedMarker::new(id, position, descriptor.content.clone())
}

impl fmt::Debug for JMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JMap")
            .field("element", &self.element)
            .field("container", &self.container)
            .field("settings", &self.settings)
            .field("view", &self.view)
            .field("center", &self.center)
            .field("markers", &self.placed.len())
            .field("geo_status", &self.geo_status)
            .finish()
    }
}
