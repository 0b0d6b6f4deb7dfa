/*!
# radar-fusion-rs — radar/vision lead fusion

Fuses sparse, noisy radar point returns with camera-derived lead
detections into stable per-object kinematic estimates (relative distance,
velocity, acceleration, lateral offset) for a downstream longitudinal
planner. One fusion cycle runs per radar sample at a fixed cadence and
never blocks the control loop.

## Features

- Per-identifier tracks driven by fixed-gain Kalman filters (no runtime
  covariance propagation, deterministic and cheap)
- Two interchangeable vision-to-radar association strategies behind one
  trait, selected via live tunables
- Lead selection with a low-speed radar override and a vision-only
  fallback, plus adjacent-lane side leads

## Modules

- [`fusion`] - per-cycle orchestration
- [`track`] - per-radar-identifier Kalman tracks
- [`association`] - likelihood and corridor matching strategies
- [`selection`] - lead / side-lead selection
- [`kalman`] - filter parameters and the fixed-gain filter core
- [`config`] - static configuration and live tunables
- [`types`] - boundary data model

## Example

```rust
use radar_fusion_rs::{
    CarState, CycleInput, FusionConfig, ModelFrame, RadarFusion, RadarPoint, RadarScan,
};

let mut fusion = RadarFusion::new(FusionConfig::new(0.05)).expect("valid interval");

let input = CycleInput {
    radar: Some(RadarScan {
        points: vec![RadarPoint {
            track_id: 4,
            d_rel: 32.0,
            y_rel: 0.2,
            v_rel: -1.5,
            a_rel: 0.0,
            measured: true,
        }],
        errors: vec![],
    }),
    car_state: Some(CarState { v_ego: 22.0, a_ego: 0.0 }),
    model: Some(ModelFrame::default()),
    lane_width: 3.6,
};

let state = fusion.step(&input).expect("cycle runs");
assert_eq!(state.tracks.len(), 1);
assert!(state.valid);
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Per-cycle fusion orchestration
pub mod fusion;

/// Per-radar-identifier Kalman tracks
pub mod track;

/// Vision-to-radar association strategies
pub mod association;

/// Lead and side-lead selection
pub mod selection;

/// Filter parameters and the fixed-gain filter core
pub mod kalman;

/// Static configuration and live tunables
pub mod config;

/// Boundary data model
pub mod types;

/// Error types
pub mod errors;

/// Low-level utilities
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use types::{
    CarState, CycleInput, LeadRecord, ModelFrame, PathEstimate, RadarError, RadarPoint,
    RadarScan, RadarState, TrackId, TrackSnapshot, VisionLead,
};

// Errors
pub use errors::FusionError;

// Filtering
pub use kalman::{KalmanParams, Kf1d};

// Tracks
pub use track::{LanePosition, Track, TrackMap};

// Association
pub use association::{
    AssociationContext, AssociationMethod, Associator, CorridorAssociator,
    LikelihoodAssociator,
};

// Selection
pub use selection::{
    select_lead, select_side_leads, LeadOutcome, SelectionContext, SideLeads, VisionDecay,
};

// Configuration
pub use config::{FusionConfig, StaticTunables, TunableProvider, Tunables};

// Orchestration
pub use fusion::RadarFusion;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
