//! Fixed-gain Kalman filtering for per-track estimation.
//!
//! Each radar track runs two independent 2-state filters (constant-velocity
//! model): one on the absolute lead speed, one on the lateral offset. The
//! Kalman gain is time-invariant and taken from a lookup table indexed by
//! the radar sample interval, so the per-cycle update needs no covariance
//! propagation or matrix inversion while staying deterministic.

use nalgebra::{Matrix2, RowVector2, Vector2};

use crate::common::interp;
use crate::errors::FusionError;

/// Lower bound of the tabulated sample-interval range (s), exclusive.
pub const MIN_RADAR_TS: f64 = 0.01;

/// Upper bound of the tabulated sample-interval range (s), exclusive.
pub const MAX_RADAR_TS: f64 = 0.2;

/// Sample intervals the steady-state gain was precomputed for (s).
#[rustfmt::skip]
const GAIN_DT: [f64; 20] = [
    0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09, 0.10,
    0.11, 0.12, 0.13, 0.14, 0.15, 0.16, 0.17, 0.18, 0.19, 0.20,
];

/// First gain component, solved offline from the discrete Riccati equation
/// with Q = diag(10, 100), R = 1e3.
#[rustfmt::skip]
const GAIN_K0: [f64; 20] = [
    0.12287673, 0.14556536, 0.16522756, 0.18281627, 0.1988689,  0.21372394,
    0.22761098, 0.24069424, 0.253096,   0.26491023, 0.27621103, 0.28705801,
    0.29750003, 0.30757767, 0.31732515, 0.32677158, 0.33594201, 0.34485814,
    0.35353899, 0.36200124,
];

/// Second gain component, same offline solve.
#[rustfmt::skip]
const GAIN_K1: [f64; 20] = [
    0.29666309, 0.29330885, 0.29042818, 0.28787125, 0.28555364, 0.28342219,
    0.28144091, 0.27958406, 0.27783249, 0.27617149, 0.27458948, 0.27307714,
    0.27162685, 0.27023228, 0.26888809, 0.26758976, 0.26633338, 0.26511557,
    0.26393339, 0.26278425,
];

/// Constant-velocity filter matrices and steady-state gain for one sample
/// interval.
///
/// Built once per configured interval and shared by every track's filters.
#[derive(Debug, Clone, Copy)]
pub struct KalmanParams {
    /// State transition matrix (A)
    pub a: Matrix2<f64>,
    /// Observation matrix (C); only the first state is measured
    pub c: RowVector2<f64>,
    /// Steady-state Kalman gain (K), interpolated from the lookup table
    pub k: Vector2<f64>,
}

impl KalmanParams {
    /// Build filter parameters for the given radar sample interval.
    ///
    /// # Errors
    /// `FusionError::Configuration` if `dt` falls outside (0.01, 0.2) s,
    /// the range the gain table is valid for.
    pub fn new(dt: f64) -> Result<Self, FusionError> {
        if !(dt > MIN_RADAR_TS && dt < MAX_RADAR_TS) {
            return Err(FusionError::Configuration {
                description: format!(
                    "radar sample interval {}s must be between {}s and {}s",
                    dt, MIN_RADAR_TS, MAX_RADAR_TS
                ),
            });
        }

        let a = Matrix2::new(1.0, dt, 0.0, 1.0);
        let c = RowVector2::new(1.0, 0.0);
        let k = Vector2::new(
            interp(dt, &GAIN_DT, &GAIN_K0),
            interp(dt, &GAIN_DT, &GAIN_K1),
        );

        Ok(Self { a, c, k })
    }
}

/// Steady-state 2-state Kalman filter over a scalar measurement.
///
/// With a precomputed gain the predict-correct step collapses to one affine
/// map: `x' = (A - K C) x + K z`. The closed-loop matrix is computed once at
/// construction.
#[derive(Debug, Clone)]
pub struct Kf1d {
    x: Vector2<f64>,
    a_k: Matrix2<f64>,
    k: Vector2<f64>,
}

impl Kf1d {
    /// Create a filter seeded at `(x0, x1)`.
    pub fn new(x0: f64, x1: f64, params: &KalmanParams) -> Self {
        Self {
            x: Vector2::new(x0, x1),
            a_k: params.a - params.k * params.c,
            k: params.k,
        }
    }

    /// Apply one correction step with measurement `z`.
    pub fn update(&mut self, z: f64) -> &Vector2<f64> {
        self.x = self.a_k * self.x + self.k * z;
        &self.x
    }

    /// Current state estimate.
    #[inline]
    pub fn x(&self) -> &Vector2<f64> {
        &self.x
    }
}
