//! Path-relative corridor association.
//!
//! Instead of scoring likelihoods, this strategy projects every track's
//! lateral deviation from the planned ego path and keeps only the ones
//! inside a distance-adaptive center corridor: tight right at the bumper,
//! one full lane at 10 m, narrowing to 60% of a lane in the far field.
//! Within the corridor the vision lead picks the nearest gated track,
//! with staged relaxations for stopped traffic and a legacy fixed
//! forward sensor as the last resort.

use smallvec::SmallVec;

use super::{
    distance_gate, primary_fallback, primary_of, AssociationContext, Associator,
    RADAR_TO_CAMERA,
};
use crate::common::interp;
use crate::track::TrackMap;
use crate::types::{TrackId, VisionLead};

/// Corridor-width breakpoints over track distance (m).
const CORRIDOR_DIST_BP: [f64; 3] = [0.0, 10.0, 100.0];

/// Full corridor width at track distance `d_rel` (m).
fn corridor_width(d_rel: f64, lane_width: f64) -> f64 {
    interp(
        d_rel,
        &CORRIDOR_DIST_BP,
        &[1.5, lane_width, lane_width * 0.6],
    )
}

/// Path-relative corridor strategy.
pub struct CorridorAssociator;

impl Associator for CorridorAssociator {
    fn select(
        &self,
        lead: &VisionLead,
        tracks: &mut TrackMap,
        ctx: &AssociationContext<'_>,
    ) -> Option<TrackId> {
        let vision_dist = lead.x - RADAR_TO_CAMERA;

        if !tracks.is_empty() {
            let path = match ctx.path.filter(|p| p.is_usable()) {
                Some(p) => p,
                // no usable path to project against: trust the fixed sensor
                None => return primary_of(tracks, ctx),
            };

            // center-corridor candidates
            let mut center: SmallVec<[TrackId; 8]> = SmallVec::new();
            for (&id, track) in tracks.iter() {
                let lane_y = path.offset_at(track.d_rel + track.v_lat);
                let d_y = -track.y_rel - lane_y;
                if d_y.abs() < corridor_width(track.d_rel, ctx.lane_width) / 2.0 {
                    center.push(id);
                }
            }

            if lead.prob > 0.5 {
                // nearest track agreeing with vision on distance and speed
                if let Some(id) = center
                    .iter()
                    .copied()
                    .filter(|id| {
                        let t = &tracks[id];
                        distance_gate(t.d_rel, vision_dist)
                            && (t.v_rel + ctx.v_ego - lead.v).abs() < 10.0
                    })
                    .min_by(|a, b| tracks[a].d_rel.total_cmp(&tracks[b].d_rel))
                {
                    return Some(id);
                }

                // distance agrees but speed does not (stopped car seen as
                // moving by vision): take the fastest-closing candidate
                if let Some(id) = center
                    .iter()
                    .copied()
                    .filter(|id| {
                        let t = &tracks[id];
                        distance_gate(t.d_rel, vision_dist) && t.v_rel + ctx.v_ego > -0.5
                    })
                    .max_by(|a, b| tracks[a].v_rel.total_cmp(&tracks[b].v_rel))
                {
                    return Some(id);
                }

                return primary_fallback(lead, tracks, ctx, vision_dist);
            }

            // no confident vision: moving targets only, since static
            // clutter is indistinguishable to radar alone
            if let Some(id) = center
                .iter()
                .copied()
                .filter(|id| tracks[id].v_rel + ctx.v_ego > 3.0)
                .min_by(|a, b| tracks[a].d_rel.total_cmp(&tracks[b].d_rel))
            {
                return Some(id);
            }
        }

        primary_of(tracks, ctx)
    }

    fn name(&self) -> &'static str {
        "corridor"
    }
}
