//! Configuration types for the fusion cycle.
//!
//! Static configuration (`FusionConfig`) is fixed for the life of the
//! process; live tunables (`Tunables`) are re-read from a
//! [`TunableProvider`] at the top of every cycle so an operator can
//! retune the decay constants or swap the association strategy without a
//! restart. Provider read failures propagate instead of being silently
//! defaulted.

use serde::{Deserialize, Serialize};

use crate::association::AssociationMethod;
use crate::errors::FusionError;
use crate::types::TrackId;

/// Default lead acceleration decay: 50% trust remaining at 1 s.
pub const DEFAULT_LEAD_ACCEL_TAU: f64 = 1.5;

/// Default filtered-acceleration magnitude above which the tau decay
/// engages (m/s^2).
pub const DEFAULT_LEAD_ACCEL_TAU_START: f64 = 0.5;

/// Static per-process configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Radar sample interval (s); must lie in the gain table's range
    pub radar_ts: f64,
    /// Radar pipeline latency in samples; ego speed is aligned back by
    /// this many cycles when deriving absolute lead speed
    pub delay: usize,
    /// Track identifier of a dedicated legacy forward sensor, if the
    /// platform has one; used as an association fallback
    pub primary_track: Option<TrackId>,
}

impl FusionConfig {
    /// Configuration for the given sample interval, no delay, no
    /// dedicated forward sensor.
    pub fn new(radar_ts: f64) -> Self {
        Self {
            radar_ts,
            delay: 0,
            primary_track: None,
        }
    }

    /// Set the radar pipeline latency in samples.
    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }

    /// Designate a dedicated forward sensor track.
    pub fn with_primary_track(mut self, id: TrackId) -> Self {
        self.primary_track = Some(id);
        self
    }
}

/// Live tunables, re-read every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    /// Base lead acceleration decay time-constant (s)
    pub a_lead_tau: f64,
    /// Filtered-acceleration threshold activating the tau decay (m/s^2)
    pub a_lead_tau_start: f64,
    /// Active association strategy
    pub association: AssociationMethod,
}

impl Tunables {
    /// Reject values the filters cannot run with.
    pub fn validate(&self) -> Result<(), FusionError> {
        if self.a_lead_tau <= 0.0 || self.a_lead_tau_start < 0.0 {
            return Err(FusionError::Configuration {
                description: format!(
                    "acceleration decay constants must be positive, got tau={} start={}",
                    self.a_lead_tau, self.a_lead_tau_start
                ),
            });
        }
        Ok(())
    }
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            a_lead_tau: DEFAULT_LEAD_ACCEL_TAU,
            a_lead_tau_start: DEFAULT_LEAD_ACCEL_TAU_START,
            association: AssociationMethod::default(),
        }
    }
}

/// Source of live tunables, polled once per cycle.
///
/// Implementations wrap whatever parameter store the platform provides.
/// A failing read is a hard error for the cycle; the next cycle re-reads.
pub trait TunableProvider {
    /// Current tunable values.
    fn read(&self) -> Result<Tunables, FusionError>;
}

/// Fixed tunables for tests and platforms without a live parameter store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTunables(pub Tunables);

impl TunableProvider for StaticTunables {
    fn read(&self) -> Result<Tunables, FusionError> {
        Ok(self.0)
    }
}
