//! Location Integrity Gate
//!
//! Wraps the device geolocation provider and refuses any fix that cannot be
//! trusted for a transfer: permission denied, timed out, stale, out of range,
//! or reported by a mock provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::LocationError;

/// Location fix handed to the transfer flow. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub lat: f64,
    pub lon: f64,
    pub suspected_spoofed: bool,
}

/// Location permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Raw fix as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderFix {
    pub lat: f64,
    pub lon: f64,
    /// Provider flagged this fix as coming from a mock/test source
    pub is_mock: bool,
    /// Time since the fix was taken
    pub age: Duration,
}

/// Device geolocation provider
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn permission_status(&self) -> PermissionStatus;

    async fn request_permission(&self) -> PermissionStatus;

    /// Current fix. Implementations should give up after `timeout`; the gate
    /// enforces the bound regardless.
    async fn current_fix(&self, timeout: Duration) -> Result<ProviderFix, String>;
}

/// Result of a single acquisition
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    Fix(GeoFix),
    Unavailable(String),
    PermissionDenied,
}

/// Rejects spoofed or unobtainable location fixes
pub struct LocationIntegrityGate {
    provider: Arc<dyn GeolocationProvider>,
    timeout: Duration,
    max_age: Duration,
}

impl LocationIntegrityGate {
    pub fn new(provider: Arc<dyn GeolocationProvider>, timeout: Duration, max_age: Duration) -> Self {
        Self {
            provider,
            timeout,
            max_age,
        }
    }

    /// Acquire one fix. No retries: a failed acquisition fails the attempt.
    ///
    /// A mock-provider fix is returned with `suspected_spoofed = true`;
    /// callers must not use its coordinates.
    pub async fn acquire(&self) -> Acquisition {
        if self.provider.permission_status().await != PermissionStatus::Granted
            && self.provider.request_permission().await != PermissionStatus::Granted
        {
            warn!("Location permission denied");
            return Acquisition::PermissionDenied;
        }

        let raw = match tokio::time::timeout(self.timeout, self.provider.current_fix(self.timeout))
            .await
        {
            Ok(Ok(fix)) => fix,
            Ok(Err(e)) => {
                warn!(error = %e, "Location provider failed");
                return Acquisition::Unavailable(e);
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Location acquisition timed out"
                );
                return Acquisition::Unavailable("timed out".to_string());
            }
        };

        if !raw.lat.is_finite()
            || !raw.lon.is_finite()
            || !(-90.0..=90.0).contains(&raw.lat)
            || !(-180.0..=180.0).contains(&raw.lon)
        {
            warn!(lat = raw.lat, lon = raw.lon, "Location fix out of range");
            return Acquisition::Unavailable("invalid coordinates".to_string());
        }

        if raw.age > self.max_age {
            warn!(
                age_ms = raw.age.as_millis() as u64,
                max_age_ms = self.max_age.as_millis() as u64,
                "Location fix is stale"
            );
            return Acquisition::Unavailable("stale fix".to_string());
        }

        if raw.is_mock {
            warn!("Location fix reported by mock provider");
        } else {
            debug!("Location fix acquired");
        }

        Acquisition::Fix(GeoFix {
            lat: raw.lat,
            lon: raw.lon,
            suspected_spoofed: raw.is_mock,
        })
    }

    /// Acquire a fix usable for a transfer. Spoofed fixes are refused.
    pub async fn acquire_for_transfer(&self) -> Result<GeoFix, LocationError> {
        match self.acquire().await {
            Acquisition::Fix(fix) if fix.suspected_spoofed => Err(LocationError::Spoofed),
            Acquisition::Fix(fix) => Ok(fix),
            Acquisition::Unavailable(reason) => Err(LocationError::Unavailable(reason)),
            Acquisition::PermissionDenied => Err(LocationError::PermissionDenied),
        }
    }
}

/// Provider that always reports the same coordinates (CLI use)
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    lat: f64,
    lon: f64,
}

impl FixedLocationProvider {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocationProvider {
    async fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_fix(&self, _timeout: Duration) -> Result<ProviderFix, String> {
        Ok(ProviderFix {
            lat: self.lat,
            lon: self.lon,
            is_mock: false,
            age: Duration::ZERO,
        })
    }
}
