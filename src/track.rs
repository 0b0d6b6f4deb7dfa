//! Per-identifier radar track state.
//!
//! A `Track` exists for exactly as long as its radar identifier keeps
//! appearing in the scan: created the first cycle the id shows up, updated
//! every cycle it reappears, removed (never coasted) the first cycle it is
//! absent. Once created its filters are always seeded, never empty.

use std::collections::BTreeMap;

use crate::config::DEFAULT_LEAD_ACCEL_TAU;
use crate::kalman::{KalmanParams, Kf1d};
use crate::types::{LeadRecord, TrackId, VisionLead};

/// Kalman state indices for the speed filter.
const SPEED: usize = 0;
const ACCEL: usize = 1;

/// No stationary-object qualification above this ego speed (m/s).
pub const V_EGO_STATIONARY: f64 = 4.0;

/// Live track set, keyed by radar identifier.
///
/// Ordered map so diagnostics and tie-breaking are deterministic across
/// cycles.
pub type TrackMap = BTreeMap<TrackId, Track>;

/// Coarse lane position of a track relative to the ego heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanePosition {
    /// Moving target offset to the left
    Left,
    /// Moving target offset to the right
    Right,
    /// Directly ahead, or too slow to classify
    Front,
}

/// Kinematic estimate for one radar identifier.
///
/// Raw fields mirror the latest measurement verbatim; `v_lead_k`,
/// `a_lead_k` and `v_lat` come from the two fixed-gain filters.
#[derive(Debug, Clone)]
pub struct Track {
    /// Radar-assigned identifier
    pub identifier: TrackId,
    /// Filter updates applied since creation or the last reseed
    pub cnt: u32,
    /// Decay time-constant for the constant-acceleration assumption (s)
    pub a_lead_tau: f64,
    /// Relative distance (m), raw
    pub d_rel: f64,
    /// Lateral offset (m), raw
    pub y_rel: f64,
    /// Relative velocity (m/s), raw
    pub v_rel: f64,
    /// Relative acceleration (m/s^2), raw
    pub a_rel: f64,
    /// Absolute lead speed (m/s), raw
    pub v_lead: f64,
    /// Sensor-reported measurement vs. estimated return
    pub measured: bool,
    /// Filtered lead speed (m/s)
    pub v_lead_k: f64,
    /// Filtered lead acceleration (m/s^2)
    pub a_lead_k: f64,
    /// Filtered lateral velocity (m/s)
    pub v_lat: f64,
    /// Score from the last vision association pass
    pub vision_prob: f64,
    params: KalmanParams,
    radar_ts: f64,
    kf: Kf1d,
    kf_y: Kf1d,
}

impl Track {
    /// Create a track from its first measurement, seeding both filters.
    pub fn new(
        identifier: TrackId,
        v_lead: f64,
        y_rel: f64,
        params: &KalmanParams,
        radar_ts: f64,
    ) -> Self {
        Self {
            identifier,
            cnt: 0,
            a_lead_tau: DEFAULT_LEAD_ACCEL_TAU,
            d_rel: 0.0,
            y_rel,
            v_rel: 0.0,
            a_rel: 0.0,
            v_lead,
            measured: false,
            v_lead_k: v_lead,
            a_lead_k: 0.0,
            v_lat: 0.0,
            vision_prob: 0.0,
            params: *params,
            radar_ts,
            kf: Kf1d::new(v_lead, 0.0, params),
            kf_y: Kf1d::new(y_rel, 0.0, params),
        }
    }

    /// Fold one radar measurement into the track.
    ///
    /// A jump of more than 3 m in distance or 20*dt m/s in relative
    /// velocity means the radar reassigned this identifier to a different
    /// target; both filters reseed from the raw measurement instead of
    /// smoothing across the glitch.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        d_rel: f64,
        y_rel: f64,
        v_rel: f64,
        v_lead: f64,
        measured: bool,
        a_rel: f64,
        a_lead_tau: f64,
        a_lead_tau_start: f64,
        _a_ego: f64,
    ) {
        if (self.d_rel - d_rel).abs() > 3.0 || (self.v_rel - v_rel).abs() > 20.0 * self.radar_ts {
            self.cnt = 0;
            self.kf = Kf1d::new(v_lead, 0.0, &self.params);
            self.kf_y = Kf1d::new(y_rel, 0.0, &self.params);
        }

        // raw fields, copied verbatim
        self.d_rel = d_rel;
        self.y_rel = y_rel;
        self.v_rel = v_rel;
        self.a_rel = a_rel;
        self.v_lead = v_lead;
        self.measured = measured;

        // filtered velocity and acceleration; the very first sample after
        // creation or reseed stands as-is
        if self.cnt > 0 {
            self.kf.update(self.v_lead);
            self.kf_y.update(self.y_rel);
        }

        self.v_lat = self.kf_y.x()[1];
        self.v_lead_k = self.kf.x()[SPEED];
        self.a_lead_k = self.kf.x()[ACCEL];

        // large observed acceleration shortens how long the downstream
        // constant-acceleration prediction stays trusted
        if self.a_lead_k.abs() < a_lead_tau_start {
            self.a_lead_tau = a_lead_tau;
        } else {
            self.a_lead_tau *= 0.9;
        }

        self.cnt += 1;
    }

    /// Reseed the speed filter's acceleration state.
    pub fn reset_a_lead(&mut self, a_lead_k: f64, a_lead_tau: f64) {
        self.kf = Kf1d::new(self.v_lead, a_lead_k, &self.params);
        self.a_lead_k = a_lead_k;
        self.a_lead_tau = a_lead_tau;
    }

    /// Feature key for clustering nearby returns.
    ///
    /// Lateral offset weighted 2x since radar is much less accurate in
    /// that dimension than longitudinally.
    pub fn cluster_key(&self) -> [f64; 3] {
        [self.d_rel, self.y_rel * 2.0, self.v_rel]
    }

    /// Lane position by lateral offset sign, for moving targets only.
    pub fn lane_position(&self) -> LanePosition {
        if self.y_rel > 0.0 && self.v_rel > 5.0 {
            LanePosition::Left
        } else if self.y_rel < 0.0 && self.v_rel > 5.0 {
            LanePosition::Right
        } else {
            LanePosition::Front
        }
    }

    /// Close, centered return at crawling ego speed.
    ///
    /// Radar-only safety net for the regime where vision is unreliable.
    /// Points closer than 0.75 m are almost always sensor glitches.
    pub fn potential_low_speed_lead(&self, v_ego: f64) -> bool {
        self.y_rel.abs() < 1.0
            && v_ego < V_EGO_STATIONARY
            && 0.75 < self.d_rel
            && self.d_rel < 25.0
    }

    /// Forward-collision-warning qualification from vision confidence.
    pub fn is_potential_fcw(&self, model_prob: f64) -> bool {
        model_prob > 0.9
    }

    /// Project the track into a published lead record.
    pub fn lead_record(&self, model_prob: f64) -> LeadRecord {
        LeadRecord {
            status: true,
            d_rel: self.d_rel,
            y_rel: self.y_rel,
            v_rel: self.v_rel,
            v_lead: self.v_lead,
            v_lead_k: self.v_lead_k,
            a_lead_k: self.a_lead_k,
            a_lead_tau: self.a_lead_tau,
            fcw: self.is_potential_fcw(model_prob),
            model_prob,
            radar: true,
            radar_track_id: Some(self.identifier),
            a_rel: self.a_rel,
            v_lat: self.v_lat,
        }
    }

    /// Project the track into a lead record, falling back to the vision
    /// lateral position when the radar reports none.
    pub fn lead_record_with_vision(&self, lead: &VisionLead) -> LeadRecord {
        let mut record = self.lead_record(lead.prob);
        if self.y_rel == 0.0 {
            record.y_rel = -lead.y;
        }
        record
    }
}
