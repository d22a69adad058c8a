//=========================================================================
// Location Fix
//=========================================================================
//
// Position sample reported by a location source, and its normalization
// before it reaches the engine.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::SystemTime;

//=== LocationFix =========================================================

/// One position report.
///
/// `bearing` is only meaningful when the source reports it; the optional
/// accuracy (degrees, 68% confidence) lets normalization drop bearings
/// too uncertain to steer the camera with.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing: Option<f32>,
    pub bearing_accuracy_deg: Option<f32>,
    pub timestamp: SystemTime,
}

impl LocationFix {
    /// Creates a fix without bearing, stamped now.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            bearing: None,
            bearing_accuracy_deg: None,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_bearing(mut self, bearing: f32) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn with_bearing_accuracy(mut self, accuracy_deg: f32) -> Self {
        self.bearing_accuracy_deg = Some(accuracy_deg);
        self
    }

    pub fn at(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    //--- Validation -------------------------------------------------------

    /// True if the coordinates are finite and on the globe.
    pub fn has_valid_position(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    //--- Normalization ----------------------------------------------------

    /// Drops the bearing unless it is present, finite and, when a limit
    /// is given, reported with accuracy within `max_bearing_error_deg`.
    ///
    /// Kept bearings are wrapped into `[0, 360)`.
    pub fn normalized(mut self, max_bearing_error_deg: Option<f32>) -> Self {
        self.bearing = self
            .bearing
            .filter(|b| b.is_finite())
            .filter(|_| match (max_bearing_error_deg, self.bearing_accuracy_deg) {
                (Some(limit), Some(accuracy)) => accuracy.is_finite() && accuracy <= limit,
                _ => true,
            })
            .map(|b| b.rem_euclid(360.0));
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bearing_stays_unknown() {
        let fix = LocationFix::new(35.72, 139.77).normalized(None);
        assert_eq!(fix.bearing, None);
    }

    #[test]
    fn reported_bearing_is_kept() {
        let fix = LocationFix::new(35.72, 139.77).with_bearing(90.0).normalized(None);
        assert_eq!(fix.bearing, Some(90.0));
    }

    #[test]
    fn bearing_is_wrapped() {
        let fix = LocationFix::new(0.0, 0.0).with_bearing(-90.0).normalized(None);
        assert_eq!(fix.bearing, Some(270.0));
    }

    #[test]
    fn non_finite_bearing_is_dropped() {
        let fix = LocationFix::new(0.0, 0.0).with_bearing(f32::NAN).normalized(None);
        assert_eq!(fix.bearing, None);
    }

    #[test]
    fn low_confidence_bearing_is_dropped() {
        let fix = LocationFix::new(0.0, 0.0)
            .with_bearing(45.0)
            .with_bearing_accuracy(40.0)
            .normalized(Some(30.0));
        assert_eq!(fix.bearing, None);
    }

    #[test]
    fn confident_bearing_is_kept() {
        let fix = LocationFix::new(0.0, 0.0)
            .with_bearing(45.0)
            .with_bearing_accuracy(5.0)
            .normalized(Some(30.0));
        assert_eq!(fix.bearing, Some(45.0));
    }

    #[test]
    fn unknown_accuracy_passes_limit() {
        let fix = LocationFix::new(0.0, 0.0).with_bearing(45.0).normalized(Some(30.0));
        assert_eq!(fix.bearing, Some(45.0));
    }

    #[test]
    fn position_validation() {
        assert!(LocationFix::new(35.72, 139.77).has_valid_position());
        assert!(!LocationFix::new(91.0, 0.0).has_valid_position());
        assert!(!LocationFix::new(0.0, f64::NAN).has_valid_position());
    }
}
