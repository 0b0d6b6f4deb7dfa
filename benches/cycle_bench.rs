//! Benchmark of one full fusion cycle.
//!
//! The loop is soft-real-time: a cycle must complete well within the
//! radar sample interval (20ms at 20Hz), so track the full-step cost
//! over a realistically populated track set.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use radar_fusion_rs::{
    CarState, CycleInput, FusionConfig, ModelFrame, PathEstimate, RadarFusion, RadarPoint,
    RadarScan, VisionLead,
};

fn busy_input(num_tracks: u32) -> CycleInput {
    let points = (0..num_tracks)
        .map(|i| RadarPoint {
            track_id: i,
            d_rel: 10.0 + 5.0 * i as f64,
            y_rel: if i % 3 == 0 { 0.0 } else { 2.5 },
            v_rel: -2.0 + 0.5 * (i % 5) as f64,
            a_rel: 0.0,
            measured: true,
        })
        .collect();

    CycleInput {
        radar: Some(RadarScan {
            points,
            errors: vec![],
        }),
        car_state: Some(CarState {
            v_ego: 25.0,
            a_ego: 0.1,
        }),
        model: Some(ModelFrame {
            leads: vec![
                VisionLead {
                    x: 31.52,
                    y: 0.1,
                    v: 23.0,
                    a: -0.2,
                    prob: 0.92,
                    x_std: 2.0,
                    y_std: 0.5,
                    v_std: 2.0,
                },
                VisionLead {
                    x: 61.52,
                    y: 0.3,
                    v: 26.0,
                    a: 0.0,
                    prob: 0.6,
                    x_std: 4.0,
                    y_std: 0.8,
                    v_std: 3.0,
                },
            ],
            path: PathEstimate::new(
                vec![0.0, 25.0, 50.0, 100.0, 150.0],
                vec![0.0, 0.05, 0.2, 0.6, 1.2],
            ),
            v_ego: Some(24.8),
        }),
        lane_width: 3.6,
    }
}

fn bench_fusion_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion_cycle");

    for &num_tracks in &[4u32, 16, 64] {
        group.bench_function(format!("{}_tracks", num_tracks), |b| {
            let mut fusion = RadarFusion::new(FusionConfig::new(0.05)).unwrap();
            let input = busy_input(num_tracks);
            // warm the track set so the steady state is measured
            fusion.step(&input).unwrap();

            b.iter(|| {
                let state = fusion.step(black_box(&input)).unwrap();
                black_box(state)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fusion_cycle);
criterion_main!(benches);
