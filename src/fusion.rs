//! Per-cycle fusion orchestration.
//!
//! [`RadarFusion`] runs one pass per incoming radar sample: refresh the
//! track set from the scan, associate the vision leads, select the
//! published leads and assemble the output record set. Single-threaded
//! and soft-real-time; a cycle never blocks on consumers and never
//! retries, the next sample starts clean.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info, trace};

use crate::association::AssociationContext;
use crate::config::{FusionConfig, StaticTunables, TunableProvider, Tunables};
use crate::errors::FusionError;
use crate::kalman::KalmanParams;
use crate::selection::{
    select_lead, select_side_leads, LeadOutcome, SelectionContext, VisionDecay,
};
use crate::track::{Track, TrackMap};
use crate::types::{
    CycleInput, ModelFrame, RadarPoint, RadarState, TrackId, TrackSnapshot, VisionLead,
};

/// Radar/vision lead fusion orchestrator.
///
/// The only state carried across cycles is the track map, the vision
/// decay scalar, the retained model frame and the short ego-speed
/// history; all of it is owned here and mutated from one execution
/// context only.
pub struct RadarFusion<P: TunableProvider = StaticTunables> {
    config: FusionConfig,
    params: KalmanParams,
    provider: P,
    tracks: TrackMap,
    v_ego: f64,
    a_ego: f64,
    /// Ego speed delayed by the radar pipeline latency, front is oldest
    v_ego_hist: VecDeque<f64>,
    ready: bool,
    last_model: Option<ModelFrame>,
    decay: VisionDecay,
}

impl RadarFusion<StaticTunables> {
    /// Build an orchestrator with fixed default tunables.
    pub fn new(config: FusionConfig) -> Result<Self, FusionError> {
        Self::with_provider(config, StaticTunables::default())
    }
}

impl<P: TunableProvider> RadarFusion<P> {
    /// Build an orchestrator reading live tunables from `provider`.
    pub fn with_provider(config: FusionConfig, provider: P) -> Result<Self, FusionError> {
        let params = KalmanParams::new(config.radar_ts)?;
        let base_tau = provider.read()?.a_lead_tau;

        info!(
            "radar fusion configured: dt={}s delay={} samples",
            config.radar_ts, config.delay
        );

        let mut v_ego_hist = VecDeque::with_capacity(config.delay + 1);
        v_ego_hist.push_back(0.0);

        Ok(Self {
            config,
            params,
            provider,
            tracks: TrackMap::new(),
            v_ego: 0.0,
            a_ego: 0.0,
            v_ego_hist,
            ready: false,
            last_model: None,
            decay: VisionDecay::new(base_tau),
        })
    }

    /// Run one fusion cycle.
    ///
    /// Missing radar input counts as zero detections and missing car or
    /// model input reuses the retained values; both only clear the
    /// published validity flag. A tunable read failure is the one hard
    /// error, and the next cycle is unaffected by it.
    pub fn step(&mut self, input: &CycleInput) -> Result<RadarState, FusionError> {
        let tunables = self.provider.read()?;
        tunables.validate()?;

        if let Some(car) = &input.car_state {
            self.v_ego = car.v_ego;
            self.a_ego = car.a_ego;
            self.v_ego_hist.push_back(self.v_ego);
            while self.v_ego_hist.len() > self.config.delay + 1 {
                self.v_ego_hist.pop_front();
            }
        }
        if let Some(model) = &input.model {
            self.ready = true;
            self.last_model = Some(model.clone());
        }

        self.refresh_tracks(input, &tunables);

        let model = self.last_model.as_ref();
        let model_v_ego = model.and_then(|m| m.v_ego).unwrap_or(self.v_ego);
        let lead_one_msg = lead_candidate(model, 0);
        let lead_two_msg = lead_candidate(model, 1);

        let ctx = SelectionContext {
            model_v_ego,
            ready: self.ready,
            vision_tau: self.decay.value(),
            assoc: AssociationContext {
                v_ego: self.v_ego,
                lane_width: input.lane_width,
                path: model.map(|m| &m.path),
                primary_track: self.config.primary_track,
            },
        };

        let associator = tunables.association.associator();
        let (lead_one, outcome) = select_lead(&mut self.tracks, &lead_one_msg, &ctx, associator);
        let (lead_two, _) = select_lead(&mut self.tracks, &lead_two_msg, &ctx, associator);
        let side = select_side_leads(&self.tracks, &lead_one_msg, &ctx);

        // the primary lead drives the vision handoff decay, at most one
        // mutation per cycle
        match outcome {
            LeadOutcome::RadarMatch => self.decay.reset(tunables.a_lead_tau),
            LeadOutcome::VisionOnly => self.decay.step(),
            LeadOutcome::NoLead => {}
        }

        if lead_one.status {
            trace!(
                "lead: d={:.1}m v={:.1}m/s radar={} strategy={}",
                lead_one.d_rel,
                lead_one.v_rel,
                lead_one.radar,
                associator.name()
            );
        }

        let tracks: Vec<TrackSnapshot> = self
            .tracks
            .values()
            .map(|t| TrackSnapshot {
                track_id: t.identifier,
                d_rel: t.d_rel,
                y_rel: t.y_rel,
                v_rel: t.v_rel,
                a_rel: t.a_rel,
                v_lat: t.v_lat,
            })
            .collect();

        let radar_ok = input
            .radar
            .as_ref()
            .map_or(false, |scan| scan.errors.is_empty());
        let valid = radar_ok && input.car_state.is_some() && input.model.is_some();

        Ok(RadarState {
            lead_one,
            lead_two,
            lead_left: side.lead_left,
            lead_right: side.lead_right,
            leads_left: side.left,
            leads_center: side.center,
            leads_right: side.right,
            tracks,
            valid,
        })
    }

    /// Drop tracks whose identifier is absent from this scan, create and
    /// update the rest.
    fn refresh_tracks(&mut self, input: &CycleInput, tunables: &Tunables) {
        let mut points: BTreeMap<TrackId, &RadarPoint> = BTreeMap::new();
        if let Some(scan) = &input.radar {
            for pt in &scan.points {
                points.insert(pt.track_id, pt);
            }
        }

        let before = self.tracks.len();
        self.tracks.retain(|id, _| points.contains_key(id));
        if self.tracks.len() != before {
            debug!("dropped {} stale tracks", before - self.tracks.len());
        }

        // ego speed aligned back by the radar pipeline latency
        let v_ego_aligned = self.v_ego_hist.front().copied().unwrap_or(0.0);

        for (&id, pt) in &points {
            let v_lead = pt.v_rel + v_ego_aligned;
            let track = self
                .tracks
                .entry(id)
                .or_insert_with(|| Track::new(id, v_lead, pt.y_rel, &self.params, self.config.radar_ts));
            track.update(
                pt.d_rel,
                pt.y_rel,
                pt.v_rel,
                v_lead,
                pt.measured,
                pt.a_rel,
                tunables.a_lead_tau,
                tunables.a_lead_tau_start,
                self.a_ego,
            );
        }
    }

    /// Live track set, keyed by radar identifier.
    pub fn tracks(&self) -> &TrackMap {
        &self.tracks
    }

    /// Whether a vision-model frame has been seen yet.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current vision-only decay constant.
    pub fn vision_tau(&self) -> f64 {
        self.decay.value()
    }
}

/// The `idx`-th vision lead candidate, or an empty (zero-confidence) one.
fn lead_candidate(model: Option<&ModelFrame>, idx: usize) -> VisionLead {
    model
        .and_then(|m| m.leads.get(idx))
        .copied()
        .unwrap_or_default()
}
