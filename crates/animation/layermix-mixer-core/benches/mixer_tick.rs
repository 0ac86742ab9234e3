use criterion::{black_box, criterion_group, criterion_main, Criterion};

use layermix_mixer_core::{AnimationTarget, BaseLayerSpec, ClipRef, OverlayAnimationMixer};
use layermix_test_fixtures::{base_layers, clips};

fn bench_tick(c: &mut Criterion) {
    let base: BaseLayerSpec = base_layers::load("locomotion").expect("base layer fixture");
    let wave: ClipRef = clips::load("wave").expect("clip fixture");
    let jump: ClipRef = clips::load("jump").expect("clip fixture");

    c.bench_function("tick_idle", |b| {
        let mut m =
            OverlayAnimationMixer::with_defaults(&AnimationTarget::new("hero"), &base).unwrap();
        b.iter(|| black_box(m.tick(black_box(1.0 / 60.0)).unwrap()));
    });

    c.bench_function("overlay_full_cycle_130_frames", |b| {
        let mut m =
            OverlayAnimationMixer::with_defaults(&AnimationTarget::new("hero"), &base).unwrap();
        b.iter(|| {
            m.play_one_shot(&wave).unwrap();
            for _ in 0..130 {
                black_box(m.tick(1.0 / 60.0).unwrap());
            }
        });
    });

    c.bench_function("interrupt_storm", |b| {
        let mut m =
            OverlayAnimationMixer::with_defaults(&AnimationTarget::new("hero"), &base).unwrap();
        b.iter(|| {
            m.play_one_shot(&wave).unwrap();
            m.tick(1.0 / 60.0).unwrap();
            m.play_one_shot(&jump).unwrap();
            m.tick(1.0 / 60.0).unwrap();
        });
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
