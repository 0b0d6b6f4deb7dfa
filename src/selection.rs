//! Lead and side-lead selection.
//!
//! Turns association output into the published lead records: a matched
//! radar track projects directly, an unmatched but confident vision lead
//! synthesizes a vision-only record, and a low-speed radar safety net
//! overrides both. Side-lead selection partitions the track set into
//! path-relative corridors and reports the nearest adjacent-lane
//! candidates.

use smallvec::SmallVec;

use crate::association::{AssociationContext, Associator, RADAR_TO_CAMERA};
use crate::track::TrackMap;
use crate::types::{LeadRecord, VisionLead};

/// Floor for the vision-only acceleration-confidence decay (s).
const VISION_TAU_FLOOR: f64 = 0.3;

/// Cross-cycle decay of trust in vision-only acceleration estimates.
///
/// Owned by the orchestrator and threaded into selection as a plain
/// value; reset to the base tau whenever a radar track takes over so the
/// later handoff back to vision does not jolt the planner.
#[derive(Debug, Clone, Copy)]
pub struct VisionDecay {
    value: f64,
}

impl VisionDecay {
    /// Start at the base decay constant.
    pub fn new(base: f64) -> Self {
        Self { value: base }
    }

    /// Current tau assigned to vision-only records.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Restart the decay at the base constant.
    pub fn reset(&mut self, base: f64) {
        self.value = base;
    }

    /// One cycle of decay toward the floor.
    pub fn step(&mut self) {
        if self.value > VISION_TAU_FLOOR {
            self.value *= 0.9;
        }
    }
}

/// How the primary lead record was produced this cycle.
///
/// Drives the orchestrator's decay bookkeeping: a radar match restarts
/// the vision tau, a vision-only lead decays it, no lead leaves it alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOutcome {
    /// Association resolved a radar track
    RadarMatch,
    /// Synthesized purely from vision kinematics
    VisionOnly,
    /// Nothing qualified
    NoLead,
}

/// Per-cycle inputs shared by lead and side-lead selection.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    /// Vision model's own ego-speed estimate
    pub model_v_ego: f64,
    /// Vision model has delivered at least one frame
    pub ready: bool,
    /// Tau for vision-only records this cycle
    pub vision_tau: f64,
    /// Association environment (ego speed, path, lane width, fallback)
    pub assoc: AssociationContext<'a>,
}

/// Synthesize a lead record purely from vision kinematics.
///
/// The relative velocity is predicted against the model's own ego-speed
/// estimate, then re-anchored onto the measured ego speed.
pub fn vision_record(
    lead: &VisionLead,
    v_ego: f64,
    model_v_ego: f64,
    a_lead_tau: f64,
) -> LeadRecord {
    let v_rel_pred = lead.v - model_v_ego;
    LeadRecord {
        status: true,
        d_rel: lead.x - RADAR_TO_CAMERA,
        y_rel: -lead.y,
        v_rel: v_rel_pred,
        v_lead: v_ego + v_rel_pred,
        v_lead_k: v_ego + v_rel_pred,
        a_lead_k: lead.a,
        a_lead_tau,
        fcw: false,
        model_prob: lead.prob,
        radar: false,
        radar_track_id: None,
        a_rel: 0.0,
        v_lat: 0.0,
    }
}

/// Select the published lead for one vision candidate.
///
/// Association first, vision-only fallback second, and the low-speed
/// override always last: among all tracks qualifying as potential
/// low-speed leads, the closest one replaces the record whenever it is
/// nearer (or nothing else qualified). Vision is unreliable in exactly
/// that regime, so the override outranks any vision signal.
pub fn select_lead(
    tracks: &mut TrackMap,
    lead: &VisionLead,
    ctx: &SelectionContext<'_>,
    associator: &dyn Associator,
) -> (LeadRecord, LeadOutcome) {
    let selected = if !tracks.is_empty() && ctx.ready {
        associator.select(lead, tracks, &ctx.assoc)
    } else {
        None
    };

    let mut record = LeadRecord::default();
    let mut outcome = LeadOutcome::NoLead;
    if let Some(id) = selected {
        record = tracks[&id].lead_record_with_vision(lead);
        outcome = LeadOutcome::RadarMatch;
    } else if ctx.ready && lead.prob > 0.5 {
        record = vision_record(lead, ctx.assoc.v_ego, ctx.model_v_ego, ctx.vision_tau);
        outcome = LeadOutcome::VisionOnly;
    }

    let low_speed = tracks
        .values()
        .filter(|t| t.potential_low_speed_lead(ctx.assoc.v_ego))
        .min_by(|a, b| a.d_rel.total_cmp(&b.d_rel));
    if let Some(track) = low_speed {
        // only take over when actually closer than the current pick
        if !record.status || track.d_rel < record.d_rel {
            record = track.lead_record_with_vision(lead);
            outcome = LeadOutcome::RadarMatch;
        }
    }

    (record, outcome)
}

/// Side-lead selection output.
#[derive(Debug, Clone, Default)]
pub struct SideLeads {
    /// Nearest adjacent-lane lead to the left
    pub lead_left: LeadRecord,
    /// Nearest adjacent-lane lead to the right
    pub lead_right: LeadRecord,
    /// All left-corridor records
    pub left: Vec<LeadRecord>,
    /// Nearest center-corridor record
    pub center: Vec<LeadRecord>,
    /// All right-corridor records
    pub right: Vec<LeadRecord>,
}

/// Partition tracks into path-relative corridors and pick side leads.
///
/// Center tracks (within half a lane of the path) merge with a confident
/// vision candidate; tracks out to `lane_width/2 + 0.8*lane_width` on
/// either side become side candidates. Side leads closer than 5 m are
/// excluded as host-vehicle structure or blind-zone noise.
pub fn select_side_leads(
    tracks: &TrackMap,
    lead: &VisionLead,
    ctx: &SelectionContext<'_>,
) -> SideLeads {
    let mut out = SideLeads::default();

    let path = match ctx.assoc.path.filter(|p| p.is_usable()) {
        Some(p) => p,
        None => return out,
    };

    let lane_width = ctx.assoc.lane_width;
    let next_lane_y = lane_width / 2.0 + lane_width * 0.8;

    let mut center: SmallVec<[LeadRecord; 8]> = SmallVec::new();
    for track in tracks.values() {
        let d_y = -track.y_rel - path.offset_at(track.d_rel);
        if d_y.abs() < lane_width / 2.0 {
            center.push(track.lead_record_with_vision(lead));
        } else if -next_lane_y < d_y && d_y < 0.0 {
            out.left.push(track.lead_record(0.0));
        } else if 0.0 < d_y && d_y < next_lane_y {
            out.right.push(track.lead_record(0.0));
        }
    }

    if lead.prob > 0.5 {
        center.push(vision_record(
            lead,
            ctx.assoc.v_ego,
            ctx.model_v_ego,
            ctx.vision_tau,
        ));
    }

    // only the nearest center candidate is published
    if let Some(nearest) = center
        .iter()
        .min_by(|a, b| a.d_rel.total_cmp(&b.d_rel))
    {
        out.center.push(nearest.clone());
    }

    out.lead_left = nearest_beyond_blind_zone(&out.left);
    out.lead_right = nearest_beyond_blind_zone(&out.right);

    out
}

/// Nearest record farther than 5 m, or a status-false record.
fn nearest_beyond_blind_zone(records: &[LeadRecord]) -> LeadRecord {
    records
        .iter()
        .filter(|r| r.d_rel > 5.0)
        .min_by(|a, b| a.d_rel.total_cmp(&b.d_rel))
        .cloned()
        .unwrap_or_default()
}
