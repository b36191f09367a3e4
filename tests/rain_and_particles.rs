mod common;

use common::test_utils::{FRAME, rng, seeded_engine};
use lily_ngin::{
    config::{FallBounds, GrowthTuning, Population, SceneConfig},
    data_structures::instance::InstanceSets,
    factory::{RadialBias, create_falling_entity, create_particle_field, radial_sample},
    resources::registry::SceneHandles,
};

fn inside(bounds: &FallBounds, p: [f32; 3]) -> bool {
    (bounds.x.0..=bounds.x.1).contains(&p[0])
        && (bounds.y.0..=bounds.y.1).contains(&p[1])
        && (bounds.z.0..=bounds.z.1).contains(&p[2])
}

#[test]
fn falling_height_is_a_sawtooth() {
    let bounds = FallBounds::default();
    let mut rng = rng();
    let mut lily = create_falling_entity(
        &bounds,
        &GrowthTuning::default(),
        &SceneHandles::sequential(),
        &mut rng,
    );
    assert!(inside(&bounds, lily.position));

    let mut recycles = 0;
    for step in 0..5000 {
        let before = lily.position;
        if lily.step(&bounds, &mut rng) {
            recycles += 1;
            assert!(before[1] - lily.fall_speed < bounds.floor, "step {}", step);
            assert!(inside(&bounds, lily.position), "respawned at {:?}", lily.position);
        } else {
            assert!(lily.position[1] < before[1], "step {}", step);
            assert!(lily.position[1] >= bounds.floor);
            assert_eq!(lily.position[0], before[0]);
            assert_eq!(lily.position[2], before[2]);
        }
    }
    assert!(recycles >= 1);
}

#[test]
fn squared_bias_crowds_the_centre() {
    let mut rng = rng();
    let r_max = 12.0;
    let samples = 10_000;
    let mut near = 0;
    for _ in 0..samples {
        let (x, z) = radial_sample(&mut rng, r_max, RadialBias::Squared);
        let r = x.hypot(z);
        assert!(r <= r_max + 1e-4);
        if r < r_max / 2.0 {
            near += 1;
        }
    }
    // P(R u^2 < R / 2) = 1 / sqrt(2)
    let share = near as f32 / samples as f32;
    assert!((share - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "share {}", share);
}

#[test]
fn sqrt_bias_is_uniform_over_the_disc() {
    let mut rng = rng();
    let r_max = 12.0;
    let samples = 10_000;
    let near = (0..samples)
        .map(|_| radial_sample(&mut rng, r_max, RadialBias::Sqrt))
        .filter(|(x, z)| x.hypot(*z) < r_max / 2.0)
        .count();
    let share = near as f32 / samples as f32;
    assert!((share - 0.25).abs() < 0.02, "share {}", share);
}

#[test]
fn rain_never_thins_out() {
    let config = SceneConfig::default();
    let mut engine = seeded_engine(&config);
    for frame in 0..3000 {
        engine.tick(frame as f32 * FRAME);
        assert_eq!(engine.rain().len(), config.population.rain);
    }
    assert!(engine.recycled() > 0);
    for lily in engine.rain() {
        assert!(lily.position[1] >= config.fall.floor);
        assert!(lily.position[1] <= config.fall.y.1);
    }
}

#[test]
fn particle_count_is_fixed_and_drift_wraps() {
    let population = Population {
        particles: 64,
        particle_drift: 0.5,
        ..Population::default()
    };
    let ceiling = population.particle_extent[1];
    let mut field = create_particle_field(&population, &SceneHandles::sequential(), &mut rng());
    let mut wrapped = false;
    for frame in 0..200 {
        let before: Vec<f32> = field.points().iter().map(|p| p[1]).collect();
        field.update(frame as f32 * FRAME);
        assert_eq!(field.points().len(), 64);
        for (p, y) in field.points().iter().zip(before) {
            assert!((0.0..=ceiling).contains(&p[1]));
            if p[1] < y {
                wrapped = true;
                assert_eq!(p[1], 0.0);
            }
        }
    }
    assert!(wrapped);
}

#[test]
fn one_instance_per_visible_part() {
    let config = SceneConfig::default();
    let mut engine = seeded_engine(&config);
    let mut sets = InstanceSets::new();
    let population = &config.population;
    let expected = 1 + 10 * population.bouquet + 9 * population.rain + population.particles;

    for t in [0.0, 1.0, 4.0, 12.0] {
        engine.tick(t);
        engine.collect(&mut sets);
        assert_eq!(sets.total(), expected, "t = {}", t);
    }

    let handles = SceneHandles::sequential();
    assert_eq!(sets.get(handles.ground).len(), 1);
    assert_eq!(sets.get(handles.stem).len(), population.bouquet);
    assert_eq!(sets.get(handles.particle).len(), population.particles);
}
