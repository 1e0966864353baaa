use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spine_stage_core::{
    CameraFit, FrameDriver, FrameRenderer, PlayerConfig, RigAnimation, RigEvaluator, Skeleton,
    SkeletonData, ViewportEstimator,
};

struct NullRenderer;

impl FrameRenderer<Skeleton> for NullRenderer {
    fn canvas_size(&mut self) -> (f32, f32) {
        (1280.0, 720.0)
    }

    fn clear(&mut self) {}

    fn draw(&mut self, camera: &CameraFit, skeleton: &Skeleton, _premultiplied_alpha: bool) {
        black_box((camera, skeleton.bones().len()));
    }
}

fn hero() -> Arc<SkeletonData> {
    let json = spine_test_fixtures::skeletons::json("hero").expect("hero fixture");
    Arc::new(SkeletonData::from_json(&json).expect("hero parses"))
}

fn bench_estimate(c: &mut Criterion) {
    let data = hero();
    let mut skeleton = Skeleton::new(Arc::clone(&data)).expect("hero skeleton");
    skeleton.set_skin_by_name("default");
    let walk = RigAnimation::find(&data, "walk").expect("walk animation");
    let mut evaluator = RigEvaluator::new(0.0);
    let estimator = ViewportEstimator::default();

    c.bench_function("estimate_walk_100_steps", |b| {
        b.iter(|| black_box(estimator.estimate(&mut evaluator, &mut skeleton, &walk)));
    });
}

fn bench_frame(c: &mut Criterion) {
    let cfg = PlayerConfig {
        animation: Some("walk".into()),
        ..Default::default()
    };
    let mut driver = FrameDriver::new(cfg, RigEvaluator::new(0.25)).expect("config");
    driver
        .setup(Skeleton::new(hero()).expect("hero skeleton"), 0.0)
        .expect("hero sets up");
    driver.start();
    let mut renderer = NullRenderer;
    let mut now = 0.0;

    c.bench_function("frame_60hz", |b| {
        b.iter(|| {
            now += 1000.0 / 60.0;
            black_box(driver.frame(now, &mut renderer));
        });
    });
}

criterion_group!(benches, bench_estimate, bench_frame);
criterion_main!(benches);
