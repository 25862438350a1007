//! Names and results of the methods callable through [`JMapPlugin::call`]
//!
//! [`JMapPlugin::call`]: crate::plugins::registry::JMapPlugin::call

use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::geolocation::GeoRequestStatus;
use crate::sdk::{MapTypeId, MapView};
use crate::{MapError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Publicly callable instance methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    AddMarker,
    CenterMap,
    GeoCenter,
    Get,
    Destroy,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::AddMarker,
        Method::CenterMap,
        Method::GeoCenter,
        Method::Get,
        Method::Destroy,
    ];

    /// Methods that return a value from the first element when called
    /// without arguments
    pub const GETTERS: [Method; 3] = [Method::Get, Method::GeoCenter, Method::CenterMap];

    /// Resolves a public method name.
    ///
    /// Underscore-prefixed names and `init` are internal and never callable.
    pub fn parse(name: &str) -> Result<Self> {
        if name.starts_with('_') || name == "init" {
            return Err(MapError::PrivateMethod(name.to_string()));
        }
        Method::ALL
            .into_iter()
            .find(|method| method.name() == name)
            .ok_or_else(|| MapError::UnknownMethod(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::AddMarker => "addMarker",
            Method::CenterMap => "centerMap",
            Method::GeoCenter => "geoCenter",
            Method::Get => "get",
            Method::Destroy => "destroy",
        }
    }

    pub fn is_getter(&self) -> bool {
        Method::GETTERS.contains(self)
    }
}

impl FromStr for Method {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        Method::parse(s)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of a live map view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapState {
    pub center: LatLng,
    pub zoom: f64,
    pub map_type: MapTypeId,
    pub bounds: LatLngBounds,
    pub size: Point,
    pub marker_count: usize,
}

impl MapState {
    pub fn capture(view: &dyn MapView) -> Self {
        Self {
            center: view.center(),
            zoom: view.zoom(),
            map_type: view.map_type(),
            bounds: view.visible_bounds(),
            size: view.size(),
            marker_count: view.marker_count(),
        }
    }
}

/// What a method call produced on one instance
#[derive(Debug, Clone, PartialEq)]
pub enum MethodValue {
    Map(MapState),
    /// Center computed by marker fitting, if there were markers
    Center(Option<LatLng>),
    Geo(GeoRequestStatus),
    Added(bool),
    Destroyed,
}

impl MethodValue {
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            MethodValue::Map(state) => serde_json::to_value(state)?,
            MethodValue::Center(center) => serde_json::to_value(center)?,
            MethodValue::Geo(status) => match status {
                GeoRequestStatus::Idle => json!({ "status": "idle" }),
                GeoRequestStatus::Pending => json!({ "status": "pending" }),
                GeoRequestStatus::Unavailable => json!({ "status": "unavailable" }),
                GeoRequestStatus::Resolved(position) => {
                    json!({ "status": "resolved", "position": position })
                }
                GeoRequestStatus::Failed(error) => {
                    json!({ "status": "failed", "error": error.to_string() })
                }
            },
            MethodValue::Added(added) => Value::Bool(*added),
            MethodValue::Destroyed => Value::Null,
        })
    }
}

/// Result of [`JMapPlugin::call`](crate::plugins::registry::JMapPlugin::call)
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// A getter's value, taken from the first element
    Value(MethodValue),
    /// The method ran on this many elements; the selection chains
    Chained(usize),
}

impl CallOutcome {
    pub fn value(&self) -> Option<&MethodValue> {
        match self {
            CallOutcome::Value(value) => Some(value),
            CallOutcome::Chained(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_public_names() {
        for method in Method::ALL {
            assert_eq!(Method::parse(method.name()).unwrap(), method);
        }
        assert!(Method::Get.is_getter());
        assert!(Method::CenterMap.is_getter());
        assert!(!Method::AddMarker.is_getter());
        assert!(!Method::Destroy.is_getter());
    }

    #[test]
    fn test_reject_private_and_unknown() {
        assert!(matches!(Method::parse("init"), Err(MapError::PrivateMethod(_))));
        assert!(matches!(Method::parse("_renderMap"), Err(MapError::PrivateMethod(_))));
        assert!(matches!(Method::parse("_"), Err(MapError::PrivateMethod(_))));
        assert!(matches!(Method::parse("zoomIn"), Err(MapError::UnknownMethod(_))));
        assert!(matches!(Method::parse("AddMarker"), Err(MapError::UnknownMethod(_))));
    }

    #[test]
    fn test_geo_value_json() {
        let value = MethodValue::Geo(GeoRequestStatus::Resolved(LatLng::new(1.0, 2.0)));
        assert_eq!(
            value.to_json().unwrap(),
            json!({ "status": "resolved", "position": { "lat": 1.0, "lng": 2.0 } })
        );
        assert_eq!(MethodValue::Center(None).to_json().unwrap(), Value::Null);
    }
}
