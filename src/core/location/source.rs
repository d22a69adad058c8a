//=========================================================================
// Location Source Contract
//=========================================================================
//
// Host-provided provider of position fixes.
//
// Fixes are pushed into a crossbeam sender handed over at subscription
// time; the source may send from any thread.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::time::Duration;

use crossbeam_channel::Sender;

//=== Internal Dependencies ===============================================

use super::LocationFix;

//=== UpdateRequest =======================================================

/// Requested update cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRequest {
    /// Minimum time between fixes.
    pub min_interval: Duration,

    /// Minimum displacement in meters between fixes.
    pub min_distance_m: f32,
}

impl Default for UpdateRequest {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1000),
            min_distance_m: 2.0,
        }
    }
}

//=== SubscriptionId ======================================================

/// Token returned by a source for one active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

//=== LocationSource ======================================================

/// Platform location provider.
pub trait LocationSource: Send + Sync {
    /// Begins delivering fixes into `sink` at roughly the requested
    /// cadence.
    fn request_updates(
        &self,
        request: &UpdateRequest,
        sink: Sender<LocationFix>,
    ) -> Result<SubscriptionId, LocationError>;

    /// Ends a subscription. Unknown ids are ignored.
    fn remove_updates(&self, subscription: SubscriptionId);

    /// Most recent cached fix, if the provider has one.
    fn last_known_location(&self) -> Option<LocationFix>;
}

//=== LocationError =======================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    /// The user or OS has not granted location access.
    PermissionDenied,

    /// No provider can deliver fixes (disabled, missing hardware).
    ProviderUnavailable(String),

    /// The source refused the subscription for another reason.
    Subscription(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "Location permission denied"),
            LocationError::ProviderUnavailable(provider) => {
                write!(f, "Location provider unavailable: {}", provider)
            }
            LocationError::Subscription(reason) => {
                write!(f, "Location subscription failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for LocationError {}

//=========================================================================
// Unit Tests
//=========================================================================
