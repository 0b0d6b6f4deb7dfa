//! Boundary data model for the fusion cycle.
//!
//! Input shapes mirror what the radar interface, the vision model and the
//! car-state feed deliver each cycle; output shapes are what gets published
//! to the downstream planner. All of these are plain data: the orchestrator
//! consumes inputs read-only and produces a fresh output record set every
//! cycle, nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::common::interp;

/// Radar-assigned track identifier.
pub type TrackId = u32;

/// One radar point return for a single tracked identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    /// Radar-assigned identifier, stable while the target stays acquired
    pub track_id: TrackId,
    /// Relative longitudinal distance (m)
    pub d_rel: f64,
    /// Lateral offset, positive left (m)
    pub y_rel: f64,
    /// Relative longitudinal velocity (m/s)
    pub v_rel: f64,
    /// Relative longitudinal acceleration (m/s^2)
    pub a_rel: f64,
    /// Sensor-reported measurement vs. internally estimated return
    pub measured: bool,
}

/// Radar-interface error conditions reported alongside a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadarError {
    /// CAN traffic from the radar missing or malformed
    CanError,
    /// Radar self-reported fault
    Fault,
    /// Radar present but configured for a different mode
    WrongConfig,
}

/// One cycle worth of radar data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadarScan {
    /// Point returns, at most one per track identifier
    pub points: Vec<RadarPoint>,
    /// Interface errors; any entry clears the published validity flag
    pub errors: Vec<RadarError>,
}

/// Camera-derived lead candidate, current-instant values.
///
/// The vision model reports short time series per field; the upstream
/// adapter hands the first (current-instant) element of each to the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionLead {
    /// Longitudinal distance from the camera frame (m)
    pub x: f64,
    /// Lateral position, positive right in the model frame (m)
    pub y: f64,
    /// Absolute lead speed (m/s)
    pub v: f64,
    /// Lead acceleration (m/s^2)
    pub a: f64,
    /// Model confidence in [0, 1]
    pub prob: f64,
    /// Reported distance uncertainty (m)
    pub x_std: f64,
    /// Reported lateral uncertainty (m)
    pub y_std: f64,
    /// Reported velocity uncertainty (m/s)
    pub v_std: f64,
}

/// Ego kinematics for the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    /// Ego speed (m/s)
    pub v_ego: f64,
    /// Ego acceleration (m/s^2)
    pub a_ego: f64,
}

/// Planned ego path, sampled as lateral offset over longitudinal distance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathEstimate {
    /// Longitudinal sample distances (m), ascending
    pub x: Vec<f64>,
    /// Lateral path offset at each sample (m)
    pub y: Vec<f64>,
}

impl PathEstimate {
    /// Create a path estimate from matching sample arrays.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Whether the path carries enough samples to interpolate against.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.x.len() >= 2 && self.x.len() == self.y.len()
    }

    /// Lateral path offset at longitudinal distance `d`, clamped to the
    /// sampled range.
    pub fn offset_at(&self, d: f64) -> f64 {
        interp(d, &self.x, &self.y)
    }
}

/// One vision-model frame: lead candidates plus the planned path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFrame {
    /// Lead candidates, primary first; the core consumes the first two
    pub leads: Vec<VisionLead>,
    /// Planned ego path
    pub path: PathEstimate,
    /// Model's own ego-speed estimate, if available this frame
    pub v_ego: Option<f64>,
}

/// Everything one orchestrator cycle consumes.
///
/// `None` fields mean the corresponding upstream did not deliver this
/// cycle; the cycle still runs (missing radar counts as zero detections)
/// but the published validity flag clears.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleInput {
    /// Radar scan, if the interface produced one this cycle
    pub radar: Option<RadarScan>,
    /// Fresh ego kinematics, if delivered this cycle
    pub car_state: Option<CarState>,
    /// Fresh vision-model frame, if delivered this cycle
    pub model: Option<ModelFrame>,
    /// Assumed lane width from the lateral planner (m)
    pub lane_width: f64,
}

/// Published per-lead record, produced fresh each cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Whether a lead is present at all; remaining fields are zeroed when
    /// false
    pub status: bool,
    /// Relative distance (m)
    pub d_rel: f64,
    /// Lateral offset, positive left (m)
    pub y_rel: f64,
    /// Relative velocity (m/s)
    pub v_rel: f64,
    /// Absolute lead speed (m/s)
    pub v_lead: f64,
    /// Kalman-filtered lead speed (m/s)
    pub v_lead_k: f64,
    /// Kalman-filtered lead acceleration (m/s^2)
    pub a_lead_k: f64,
    /// Decay time-constant for the constant-acceleration assumption (s)
    pub a_lead_tau: f64,
    /// Forward-collision-warning qualification
    pub fcw: bool,
    /// Vision model confidence backing this record
    pub model_prob: f64,
    /// Whether a radar track backs this record (false: vision-only)
    pub radar: bool,
    /// Backing radar track identifier, if any
    pub radar_track_id: Option<TrackId>,
    /// Relative acceleration as reported by the radar (m/s^2)
    pub a_rel: f64,
    /// Filtered lateral velocity (m/s)
    pub v_lat: f64,
}

/// Raw per-track diagnostic snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    /// Radar-assigned identifier
    pub track_id: TrackId,
    /// Relative distance (m)
    pub d_rel: f64,
    /// Lateral offset (m)
    pub y_rel: f64,
    /// Relative velocity (m/s)
    pub v_rel: f64,
    /// Relative acceleration (m/s^2)
    pub a_rel: f64,
    /// Filtered lateral velocity (m/s)
    pub v_lat: f64,
}

/// Full published output of one fusion cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadarState {
    /// Primary lead
    pub lead_one: LeadRecord,
    /// Secondary lead
    pub lead_two: LeadRecord,
    /// Nearest adjacent-lane lead to the left
    pub lead_left: LeadRecord,
    /// Nearest adjacent-lane lead to the right
    pub lead_right: LeadRecord,
    /// All left-corridor records
    pub leads_left: Vec<LeadRecord>,
    /// Nearest center-corridor record
    pub leads_center: Vec<LeadRecord>,
    /// All right-corridor records
    pub leads_right: Vec<LeadRecord>,
    /// Raw track diagnostics, sorted by identifier
    pub tracks: Vec<TrackSnapshot>,
    /// All upstream inputs fresh this cycle and no radar-interface errors
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_path_estimate_usability() {
        assert!(!PathEstimate::default().is_usable());
        assert!(!PathEstimate::new(vec![0.0], vec![0.0]).is_usable());
        assert!(!PathEstimate::new(vec![0.0, 1.0], vec![0.0]).is_usable());
        assert!(PathEstimate::new(vec![0.0, 50.0], vec![0.0, 1.0]).is_usable());
    }

    #[test]
    fn test_path_estimate_offset_lookup() {
        let path = PathEstimate::new(vec![0.0, 50.0, 100.0], vec![0.0, 1.0, 1.0]);
        assert_relative_eq!(path.offset_at(25.0), 0.5);
        assert_relative_eq!(path.offset_at(75.0), 1.0);
        // clamped outside the sampled range
        assert_relative_eq!(path.offset_at(-10.0), 0.0);
        assert_relative_eq!(path.offset_at(500.0), 1.0);
    }

    #[test]
    fn test_lead_record_default_is_no_lead() {
        let record = LeadRecord::default();
        assert!(!record.status);
        assert!(!record.radar);
        assert_eq!(record.radar_track_id, None);
    }
}
