//! Geolocation capability
//!
//! A position request is asynchronous and may never settle. The map stores the
//! request as a boxed future and drives it from its own event loop.

use crate::core::geo::LatLng;
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// A fix reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub coords: LatLng,
    /// Accuracy radius in meters, when known
    pub accuracy: Option<f64>,
}

impl GeoPosition {
    pub fn new(coords: LatLng) -> Self {
        Self {
            coords,
            accuracy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("timed out")]
    Timeout,
}

/// Source of the user's current position
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn current_position(&self) -> Result<GeoPosition, GeolocationError>;
}

/// In-flight position request owned by a map instance
pub(crate) type PendingPosition = BoxFuture<'static, Result<GeoPosition, GeolocationError>>;

/// Where a map's geolocation request stands
#[derive(Debug, Clone, PartialEq)]
pub enum GeoRequestStatus {
    /// No request was made, or the last one was dropped
    Idle,
    Pending,
    /// The page has no geolocation capability
    Unavailable,
    Resolved(LatLng),
    Failed(GeolocationError),
}

impl GeoRequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, GeoRequestStatus::Pending)
    }
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct StaticLocator {
    position: GeoPosition,
}

impl StaticLocator {
    pub fn new(coords: LatLng) -> Self {
        Self {
            position: GeoPosition::new(coords),
        }
    }
}

#[async_trait]
impl GeoLocator for StaticLocator {
    async fn current_position(&self) -> Result<GeoPosition, GeolocationError> {
        Ok(self.position)
    }
}

/// Always refuses, like a user declining the permission prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocator;

#[async_trait]
impl GeoLocator for DeniedLocator {
    async fn current_position(&self) -> Result<GeoPosition, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

type Responder = oneshot::Sender<Result<GeoPosition, GeolocationError>>;

/// Holds requests open until the caller answers them
///
/// Useful for exercising the window between asking for a position and
/// receiving it.
#[derive(Debug, Default)]
pub struct ManualLocator {
    waiting: Mutex<Vec<Responder>>,
}

impl ManualLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests waiting for an answer
    pub fn pending(&self) -> usize {
        self.lock().iter().filter(|tx| !tx.is_canceled()).count()
    }

    /// Answers every waiting request with `coords`; returns how many were answered
    pub fn resolve(&self, coords: LatLng) -> usize {
        self.answer(Ok(GeoPosition::new(coords)))
    }

    /// Fails every waiting request; returns how many were answered
    pub fn fail(&self, error: GeolocationError) -> usize {
        self.answer(Err(error))
    }

    fn answer(&self, result: Result<GeoPosition, GeolocationError>) -> usize {
        let waiting = std::mem::take(&mut *self.lock());
        waiting
            .into_iter()
            .filter(|tx| !tx.is_canceled())
            .filter_map(|tx| tx.send(result.clone()).ok())
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Responder>> {
        self.waiting
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl GeoLocator for ManualLocator {
    async fn current_position(&self) -> Result<GeoPosition, GeolocationError> {
        let (tx, rx) = oneshot::channel();
        self.lock().push(tx);
        rx.await.unwrap_or_else(|_| {
            Err(GeolocationError::PositionUnavailable(
                "request abandoned".to_string(),
            ))
        })
    }
}
