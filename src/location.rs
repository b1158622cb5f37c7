//! Device location for maps-grounded queries.

use crate::models::Location;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub const LOCATION_DENIED_MESSAGE: &str = "Could not get location. Please allow location access.";

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Location>;
}

/// Location fixed by configuration or CLI flags; `None` behaves like a denied permission.
pub struct FixedLocationProvider {
    location: Option<Location>,
}

impl FixedLocationProvider {
    pub fn new(location: Option<Location>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<Location> {
        self.location.ok_or_else(|| {
            tracing::warn!("No location configured (set STUDIO_LATITUDE/STUDIO_LONGITUDE)");
            Error::Location(LOCATION_DENIED_MESSAGE.to_string())
        })
    }
}

#[derive(Clone)]
pub struct MockLocationProvider {
    location: Option<Location>,
    call_count: Arc<Mutex<usize>>,
}

impl MockLocationProvider {
    pub fn new(location: Option<Location>) -> Self {
        Self {
            location,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl LocationProvider for MockLocationProvider {
    async fn current_position(&self) -> Result<Location> {
        *self.call_count.lock().unwrap() += 1;
        self.location
            .ok_or_else(|| Error::Location(LOCATION_DENIED_MESSAGE.to_string()))
    }
}
