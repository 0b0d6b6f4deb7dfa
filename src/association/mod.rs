//! Vision-to-radar association strategies.
//!
//! Two interchangeable algorithms resolve each vision-reported lead onto
//! the best-matching radar track (or none), behind one `Associator`
//! contract:
//!
//! - [`LikelihoodAssociator`] - joint Laplace-likelihood scoring with a
//!   hard sanity gate
//! - [`CorridorAssociator`] - path-relative corridor bucketing with
//!   distance-adaptive widths
//!
//! The active strategy is a live tunable ([`AssociationMethod`]), not an
//! inline branch. Both strategies honor an optional legacy "primary
//! forward sensor" track passed explicitly in the context rather than as
//! a magic identifier in the track map.

pub mod corridor;
pub mod likelihood;

pub use corridor::CorridorAssociator;
pub use likelihood::LikelihoodAssociator;

use serde::{Deserialize, Serialize};

use crate::track::TrackMap;
use crate::types::{PathEstimate, TrackId, VisionLead};

/// Longitudinal offset between the radar mount and the camera mesh frame
/// (m). Vision distances are camera-relative; tracks are radar-relative.
pub const RADAR_TO_CAMERA: f64 = 1.52;

/// Which strategy resolves vision leads onto radar tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationMethod {
    /// Laplace-likelihood scoring over all tracks
    #[default]
    Likelihood,
    /// Path-relative corridor bucketing
    Corridor,
}

impl AssociationMethod {
    /// Resolve the method to its strategy implementation.
    pub fn associator(self) -> &'static dyn Associator {
        match self {
            AssociationMethod::Likelihood => &LikelihoodAssociator,
            AssociationMethod::Corridor => &CorridorAssociator,
        }
    }
}

/// Per-cycle environment shared by both strategies.
#[derive(Debug, Clone, Copy)]
pub struct AssociationContext<'a> {
    /// Ego speed (m/s)
    pub v_ego: f64,
    /// Assumed lane width (m)
    pub lane_width: f64,
    /// Planned ego path, if the model delivered one
    pub path: Option<&'a PathEstimate>,
    /// Legacy dedicated forward sensor track, kept as a fallback candidate
    pub primary_track: Option<TrackId>,
}

/// Strategy contract: pick the best-matching track for one vision lead.
pub trait Associator {
    /// Select a track for `lead`, or `None` when no plausible match
    /// exists. Implementations may record per-track scores on the tracks.
    fn select(
        &self,
        lead: &VisionLead,
        tracks: &mut TrackMap,
        ctx: &AssociationContext<'_>,
    ) -> Option<TrackId>;

    /// Strategy name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Distance sanity gate shared by both strategies.
///
/// Stationary radar points are frequent false positives; a match is only
/// plausible within 35% of the vision distance (5 m minimum).
pub(crate) fn distance_gate(d_rel: f64, vision_dist: f64) -> bool {
    (d_rel - vision_dist).abs() < (vision_dist * 0.35).max(5.0)
}

/// The primary-sensor track, if configured and currently alive.
pub(crate) fn primary_of(tracks: &TrackMap, ctx: &AssociationContext<'_>) -> Option<TrackId> {
    ctx.primary_track.filter(|id| tracks.contains_key(id))
}

/// Primary-sensor fallback with the cut-in rule: a confident vision
/// detection 5 m closer than the fixed sensor's target means a vehicle
/// the sensor has not picked up yet, so the fallback is discarded.
pub(crate) fn primary_fallback(
    lead: &VisionLead,
    tracks: &TrackMap,
    ctx: &AssociationContext<'_>,
    vision_dist: f64,
) -> Option<TrackId> {
    let id = primary_of(tracks, ctx)?;
    if lead.prob > 0.5 && vision_dist < tracks[&id].d_rel - 5.0 {
        return None;
    }
    Some(id)
}
