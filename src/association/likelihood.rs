//! Laplace-likelihood association.
//!
//! Scores every track against the vision lead with a product of three
//! Laplace density terms (distance, lateral, velocity), each scaled by the
//! uncertainty the vision model reports for that axis, and weighted down
//! for near-stationary targets. The best score wins, but only if it also
//! passes a hard sanity gate: under sparse data the soft likelihood can
//! still rank an implausible track highest, and the gate is the required
//! backstop.

use super::{
    distance_gate, primary_fallback, AssociationContext, Associator, RADAR_TO_CAMERA,
};
use crate::common::interp;
use crate::track::TrackMap;
use crate::types::{TrackId, VisionLead};

/// Lane width assumed by the lateral sanity gate (m).
const ASSUMED_LANE_WIDTH: f64 = 3.2;

/// Laplace density without normalization, floored scale for stability.
pub(crate) fn laplacian_pdf(x: f64, mu: f64, b: f64) -> f64 {
    let b = b.max(1e-4);
    (-(x - mu).abs() / b).exp()
}

/// Joint Laplace-likelihood strategy.
pub struct LikelihoodAssociator;

impl Associator for LikelihoodAssociator {
    fn select(
        &self,
        lead: &VisionLead,
        tracks: &mut TrackMap,
        ctx: &AssociationContext<'_>,
    ) -> Option<TrackId> {
        let vision_dist = lead.x - RADAR_TO_CAMERA;

        let mut selected = None;
        if lead.prob > 0.5 && !tracks.is_empty() {
            let mut best: Option<(TrackId, f64)> = None;
            for (&id, track) in tracks.iter_mut() {
                let prob_d = laplacian_pdf(track.d_rel, vision_dist, lead.x_std);
                // lateral position extrapolated 2s ahead with the filtered
                // lateral velocity; camera lateral sign is flipped
                let prob_y =
                    laplacian_pdf(track.y_rel + track.v_lat * 2.0, -lead.y, lead.y_std);
                let prob_v = laplacian_pdf(track.v_rel + ctx.v_ego, lead.v, lead.v_std);

                // suppress matches to near-stationary clutter
                let weight_v = interp(track.v_rel + ctx.v_ego, &[0.0, 10.0], &[0.3, 1.0]);

                let score = prob_d * prob_y * prob_v * weight_v;
                track.vision_prob = score;

                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((id, score));
                }
            }

            if let Some((id, _)) = best {
                let track = &tracks[&id];

                // hard sanity gate
                let dist_sane = distance_gate(track.d_rel, vision_dist);
                // high vision confidence widens the tolerance, for stopped cars
                let vel_tolerance = if lead.prob > 0.85 { 20.0 } else { 10.0 };
                let vel_sane = (track.v_rel + ctx.v_ego - lead.v).abs() < vel_tolerance
                    || ctx.v_ego + track.v_rel > 3.0;
                let y_sane = (-lead.y - track.y_rel).abs() < ASSUMED_LANE_WIDTH / 2.0;

                if dist_sane && vel_sane && y_sane {
                    selected = Some(id);
                }
            }
        }

        selected.or_else(|| primary_fallback(lead, tracks, ctx, vision_dist))
    }

    fn name(&self) -> &'static str {
        "likelihood"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kalman::KalmanParams;
    use crate::track::Track;

    const DT: f64 = 0.05;

    fn ctx(v_ego: f64) -> AssociationContext<'static> {
        AssociationContext {
            v_ego,
            lane_width: 3.6,
            path: None,
            primary_track: None,
        }
    }

    fn track_at(id: u32, d_rel: f64, y_rel: f64, v_rel: f64, v_ego: f64) -> Track {
        let params = KalmanParams::new(DT).unwrap();
        let mut track = Track::new(id, v_rel + v_ego, y_rel, &params, DT);
        track.update(d_rel, y_rel, v_rel, v_rel + v_ego, true, 0.0, 1.5, 0.5, 0.0);
        track
    }

    fn lead_at(x: f64, v: f64, prob: f64) -> VisionLead {
        VisionLead {
            x,
            y: 0.0,
            v,
            a: 0.0,
            prob,
            x_std: 2.0,
            y_std: 0.5,
            v_std: 2.0,
        }
    }

    #[test]
    fn test_selects_best_matching_track() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        tracks.insert(1, track_at(1, 30.0, 0.0, 3.0, v_ego));
        tracks.insert(2, track_at(2, 50.0, 0.0, 3.0, v_ego));

        // vision sees a target near 30m (camera frame: 30 + 1.52)
        let lead = lead_at(31.52, 18.0, 0.9);
        let selected = LikelihoodAssociator.select(&lead, &mut tracks, &ctx(v_ego));
        assert_eq!(selected, Some(1));
    }

    #[test]
    fn test_scores_recorded_on_tracks() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        tracks.insert(1, track_at(1, 30.0, 0.0, 3.0, v_ego));
        tracks.insert(2, track_at(2, 50.0, 0.0, 3.0, v_ego));

        let lead = lead_at(31.52, 18.0, 0.9);
        LikelihoodAssociator.select(&lead, &mut tracks, &ctx(v_ego));

        assert!(tracks[&1].vision_prob > tracks[&2].vision_prob);
        assert!(tracks[&1].vision_prob > 0.0);
    }

    /// The gate must reject even a sole candidate whose distance error
    /// exceeds max(0.35 * vision_dist, 5.0).
    #[test]
    fn test_distance_gate_rejects_sole_track() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        tracks.insert(1, track_at(1, 30.0, 0.0, 3.0, v_ego));

        // vision distance 50m, track at 30m: 20m error > max(17.5, 5)
        let lead = lead_at(51.52, 18.0, 0.9);
        let selected = LikelihoodAssociator.select(&lead, &mut tracks, &ctx(v_ego));
        assert_eq!(selected, None);
    }

    #[test]
    fn test_lateral_gate_rejects_adjacent_lane() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        // 2m to the left of the vision target: outside half a lane
        tracks.insert(1, track_at(1, 30.0, 2.0, 3.0, v_ego));

        let lead = lead_at(31.52, 18.0, 0.9);
        let selected = LikelihoodAssociator.select(&lead, &mut tracks, &ctx(v_ego));
        assert_eq!(selected, None);
    }

    #[test]
    fn test_velocity_tolerance_widens_with_confidence() {
        // stopped track, moving vision estimate: 15 m/s of velocity error,
        // combined closing speed 0 so only the tolerance can admit it
        let v_ego = 0.0;
        let mut tracks = TrackMap::new();
        tracks.insert(1, track_at(1, 30.0, 0.0, 0.0, v_ego));

        let confident = lead_at(31.52, 15.0, 0.9);
        assert_eq!(
            LikelihoodAssociator.select(&confident, &mut tracks, &ctx(v_ego)),
            Some(1)
        );

        let hesitant = lead_at(31.52, 15.0, 0.7);
        assert_eq!(
            LikelihoodAssociator.select(&hesitant, &mut tracks, &ctx(v_ego)),
            None
        );
    }

    #[test]
    fn test_low_confidence_lead_matches_nothing() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        tracks.insert(1, track_at(1, 30.0, 0.0, 3.0, v_ego));

        let lead = lead_at(31.52, 18.0, 0.3);
        assert_eq!(
            LikelihoodAssociator.select(&lead, &mut tracks, &ctx(v_ego)),
            None
        );
    }

    #[test]
    fn test_empty_track_map_returns_none() {
        let mut tracks = TrackMap::new();
        let lead = lead_at(31.52, 18.0, 0.9);
        assert_eq!(
            LikelihoodAssociator.select(&lead, &mut tracks, &ctx(15.0)),
            None
        );
    }

    #[test]
    fn test_moving_target_outranks_stationary_clutter() {
        let v_ego = 0.0;
        let mut tracks = TrackMap::new();
        // stationary return and a moving vehicle at the same spot
        tracks.insert(1, track_at(1, 30.0, 0.0, 0.0, v_ego));
        tracks.insert(2, track_at(2, 30.0, 0.0, 8.0, v_ego));

        let lead = lead_at(31.52, 4.0, 0.9);
        let selected = LikelihoodAssociator.select(&lead, &mut tracks, &ctx(v_ego));
        // both miss the vision speed by 4 m/s, but the stationary one is
        // weighted down to 0.3
        assert_eq!(selected, Some(2));
    }

    #[test]
    fn test_primary_fallback_when_gate_rejects() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        tracks.insert(0, track_at(0, 30.0, 0.0, 3.0, v_ego));

        let mut context = ctx(v_ego);
        context.primary_track = Some(0);

        // vision target far beyond the track: gate rejects the match, but
        // the dedicated forward sensor remains a trusted fallback
        let lead = lead_at(80.0, 18.0, 0.9);
        assert_eq!(
            LikelihoodAssociator.select(&lead, &mut tracks, &context),
            Some(0)
        );
    }

    #[test]
    fn test_primary_fallback_discarded_on_cut_in() {
        let v_ego = 15.0;
        let mut tracks = TrackMap::new();
        tracks.insert(0, track_at(0, 80.0, 0.0, 3.0, v_ego));

        let mut context = ctx(v_ego);
        context.primary_track = Some(0);

        // confident vision detection 50m closer than the sensor's target:
        // a cut-in the fixed sensor has not acquired yet
        let lead = lead_at(30.0, 18.0, 0.9);
        assert_eq!(
            LikelihoodAssociator.select(&lead, &mut tracks, &context),
            None
        );
    }
}
