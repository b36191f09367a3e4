mod common;

use common::test_utils::{FRAME, rng, seeded_engine};
use lily_ngin::{
    animation::flower::GrowingFlower,
    config::{GrowthTuning, SceneConfig},
    factory::{BloomKind, create_flower},
    resources::registry::SceneHandles,
};

fn flower(total_height: f32, start_delay: f32) -> GrowingFlower {
    create_flower(
        total_height,
        start_delay,
        0.0,
        0.0,
        BloomKind::Closed,
        &SceneHandles::sequential(),
        &GrowthTuning::default(),
        &mut rng(),
    )
}

#[test]
fn sprout_is_closed_at_the_floor() {
    let tuning = GrowthTuning::default();
    let pose = flower(12.0, 0.0).pose_at(0.0, &tuning);
    assert_eq!(pose.stem_height, tuning.min_height);
    assert_eq!(pose.head_height, 0.0);
    assert_eq!(pose.bloom_angle, tuning.closed_angle);
    assert_eq!(pose.sway, (0.0, 0.0));
}

#[test]
fn bloom_begins_at_a_fifth_of_the_growth() {
    let tuning = GrowthTuning::default();
    let height = 10.0;
    let pose = flower(height, 0.0).pose_at(tuning.grow_duration * tuning.bloom_threshold, &tuning);
    assert!((pose.bloom_angle - tuning.closed_angle).abs() < 1e-3);
    // 1 - 0.8^3
    assert!((pose.head_height - 0.488 * height).abs() < 1e-3);
    assert_eq!(pose.sway, (0.0, 0.0));
}

#[test]
fn fully_grown_and_open_once_both_phases_end() {
    let tuning = GrowthTuning::default();
    let height = 13.5;
    let t = tuning.grow_duration + tuning.bloom_duration;
    let pose = flower(height, 0.0).pose_at(t, &tuning);
    assert_eq!(pose.head_height, height);
    assert_eq!(pose.stem_height, height);
    assert!((pose.bloom_angle - tuning.open_angle).abs() < 1e-5);
}

#[test]
fn delay_holds_the_flower_back() {
    let tuning = GrowthTuning::default();
    let late = flower(9.0, 2.5);
    let early = flower(9.0, 0.0);
    for t in [0.0, 1.0, 2.5] {
        assert_eq!(late.pose_at(t, &tuning).head_height, 0.0, "t = {}", t);
    }
    let shifted = late.pose_at(2.5 + 1.3, &tuning);
    let reference = early.pose_at(1.3, &tuning);
    assert!((shifted.head_height - reference.head_height).abs() < 1e-4);
    assert!((shifted.bloom_angle - reference.bloom_angle).abs() < 1e-4);
}

#[test]
fn growth_and_bloom_never_go_back() {
    let tuning = GrowthTuning::default();
    let f = flower(14.0, 0.75);
    let mut previous = f.pose_at(0.0, &tuning);
    for frame in 1..=600 {
        let pose = f.pose_at(frame as f32 * FRAME, &tuning);
        assert!(pose.stem_height >= previous.stem_height, "frame {}", frame);
        assert!(pose.head_height >= previous.head_height, "frame {}", frame);
        assert!(pose.bloom_angle >= previous.bloom_angle, "frame {}", frame);
        assert!(pose.bloom_angle >= tuning.closed_angle);
        assert!(pose.bloom_angle <= tuning.open_angle + 1e-6);
        assert!(pose.head_height <= 14.0);
        previous = pose;
    }
}

#[test]
fn sway_waits_for_most_of_the_growth() {
    let tuning = GrowthTuning::default();
    let f = flower(10.0, 0.0);
    let before = f.pose_at(tuning.grow_duration * 0.7, &tuning);
    assert_eq!(before.sway, (0.0, 0.0));

    let limit = tuning.sway_amplitude + tuning.turbulence_amplitude;
    for frame in 0..300 {
        let t = tuning.grow_duration + frame as f32 * FRAME;
        let (x, z) = f.pose_at(t, &tuning).sway;
        assert!(x.abs() <= tuning.turbulence_amplitude + 1e-6);
        assert!(z.abs() <= limit + 1e-6);
    }
}

#[test]
fn invalid_heights_and_delays_become_zero() {
    let tuning = GrowthTuning::default();
    for (height, delay) in [(f32::NAN, 1.0), (-4.0, f32::INFINITY), (f32::NEG_INFINITY, -0.5)] {
        let f = flower(height, delay);
        assert_eq!(f.total_height, 0.0);
        assert!(f.start_delay >= 0.0 && f.start_delay.is_finite());
        for t in [0.0, 1.0, 10.0] {
            let pose = f.pose_at(t, &tuning);
            assert!(pose.stem_height.is_finite());
            assert!(pose.head_height.is_finite());
            assert!(pose.bloom_angle.is_finite());
            assert!(pose.stem_height >= tuning.min_height);
        }
    }
    let zero = flower(-1.0, -1.0);
    assert_eq!(zero.total_height, 0.0);
    assert_eq!(zero.start_delay, 0.0);
}

#[test]
fn whole_bouquet_ends_open_and_at_full_height() {
    let config = SceneConfig::stargazer();
    let mut engine = seeded_engine(&config);
    let tuning = *engine.tuning();
    let end = config.population.delay.1 + tuning.grow_duration + tuning.bloom_duration + 0.5;

    engine.tick(0.0);
    assert!(engine.flowers().iter().all(|f| f.pose().head_height == 0.0));

    engine.tick(end);
    for f in engine.flowers() {
        let pose = f.pose();
        assert_eq!(pose.head_height, f.total_height);
        assert!((pose.bloom_angle - tuning.open_angle).abs() < 1e-5);
        assert!(f.total_height >= config.population.height.0);
        assert!(f.total_height <= config.population.height.1);
    }
}
