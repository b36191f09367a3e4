//! Builds the garden's entities from shared resource handles.
//!
//! All randomness comes from the caller's [`Rng`], so a seeded [`StdRng`]
//! reproduces the same garden every time.
//!
//! [`StdRng`]: rand::rngs::StdRng

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::{
    animation::{
        falling::{FallingLily, spawn_point},
        flower::{GrowingFlower, LilyHead, PISTIL_COUNT},
        particles::ParticleField,
    },
    config::{FallBounds, GrowthTuning, Population},
    resources::registry::SceneHandles,
};

/// How a uniform sample is turned into a distance from the bouquet centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadialBias {
    /// `r = R * u^2`, crowds flowers around the centre.
    Squared,
    /// `r = R * sqrt(u)`, uniform density over the disc.
    Sqrt,
}

impl RadialBias {
    pub fn radius(self, u: f32, r_max: f32) -> f32 {
        match self {
            RadialBias::Squared => r_max * u * u,
            RadialBias::Sqrt => r_max * u.sqrt(),
        }
    }
}

/// Initial petal pose of a lily head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BloomKind {
    Closed,
    Open,
}

impl BloomKind {
    pub fn angle(self, tuning: &GrowthTuning) -> f32 {
        match self {
            BloomKind::Closed => tuning.closed_angle,
            BloomKind::Open => tuning.open_angle,
        }
    }
}

/// Uniform sample in `[lo, hi)`.
pub fn uniform<R: Rng>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    lo + (hi - lo) * rng.r#gen::<f32>()
}

/// Random `(x, z)` on a disc of radius `r_max` around the origin.
pub fn radial_sample<R: Rng>(rng: &mut R, r_max: f32, bias: RadialBias) -> (f32, f32) {
    let angle = uniform(rng, (0.0, TAU));
    let radius = bias.radius(rng.r#gen::<f32>(), r_max);
    (angle.cos() * radius, angle.sin() * radius)
}

pub fn create_lily_head<R: Rng>(handles: &SceneHandles, rng: &mut R) -> LilyHead {
    let mut pistil_tilts = [(0.0, 0.0); PISTIL_COUNT];
    for tilt in pistil_tilts.iter_mut() {
        *tilt = (uniform(rng, (-0.2, 0.2)), uniform(rng, (-0.2, 0.2)));
    }
    LilyHead {
        petal: handles.petal,
        pistil: handles.pistil,
        pistil_tilts,
    }
}

/// A lily that grows at `(x, z)` to `total_height` once `start_delay` has
/// passed.
///
/// Non-finite or negative heights and delays are clamped to `0`, non-finite
/// coordinates to the origin.
#[allow(clippy::too_many_arguments)]
pub fn create_flower<R: Rng>(
    total_height: f32,
    start_delay: f32,
    x: f32,
    z: f32,
    kind: BloomKind,
    handles: &SceneHandles,
    tuning: &GrowthTuning,
    rng: &mut R,
) -> GrowingFlower {
    let total_height = non_negative("total height", total_height);
    let start_delay = non_negative("start delay", start_delay);
    let position = (finite_or_zero(x), finite_or_zero(z));
    let head = create_lily_head(handles, rng);
    let sway_speed = uniform(rng, (0.5, 1.0));
    let sway_phase = uniform(rng, (0.0, PI));
    GrowingFlower::new(
        total_height,
        start_delay,
        position,
        (sway_speed, sway_phase),
        kind.angle(tuning),
        handles.stem,
        head,
        tuning,
    )
}

/// An open lily somewhere in the spawn volume, tumbling in a random direction.
pub fn create_falling_entity<R: Rng>(
    bounds: &FallBounds,
    tuning: &GrowthTuning,
    handles: &SceneHandles,
    rng: &mut R,
) -> FallingLily {
    let head = create_lily_head(handles, rng);
    let position = spawn_point(bounds, rng);
    let rotation = [
        uniform(rng, (0.0, PI)),
        uniform(rng, (0.0, PI)),
        uniform(rng, (0.0, PI)),
    ];
    let scale = uniform(rng, bounds.scale);
    let fall_speed = uniform(rng, bounds.fall_speed);
    let spin_range = (-bounds.max_spin, bounds.max_spin);
    let spin = [
        uniform(rng, spin_range),
        uniform(rng, spin_range),
        uniform(rng, spin_range),
    ];
    FallingLily {
        fall_speed,
        spin,
        position,
        rotation,
        scale,
        bloom: BloomKind::Open.angle(tuning),
        head,
    }
}

pub fn create_particle_field<R: Rng>(
    population: &Population,
    handles: &SceneHandles,
    rng: &mut R,
) -> ParticleField {
    let [ex, ey, ez] = population.particle_extent;
    let points = (0..population.particles)
        .map(|_| {
            [
                uniform(rng, (-ex, ex)),
                uniform(rng, (0.0, ey)),
                uniform(rng, (-ez, ez)),
            ]
        })
        .collect();
    ParticleField::new(
        handles.particle,
        points,
        ey,
        population.particle_drift,
        population.particle_spin,
    )
}

/// The bouquet: closed lilies spread over a disc with the configured bias.
pub fn populate_bouquet<R: Rng>(
    population: &Population,
    tuning: &GrowthTuning,
    handles: &SceneHandles,
    rng: &mut R,
) -> Vec<GrowingFlower> {
    (0..population.bouquet)
        .map(|_| {
            let (x, z) = radial_sample(rng, population.bouquet_radius, population.radial_bias);
            let height = uniform(rng, population.height);
            let delay = uniform(rng, population.delay);
            create_flower(height, delay, x, z, BloomKind::Closed, handles, tuning, rng)
        })
        .collect()
}

pub fn populate_rain<R: Rng>(
    population: &Population,
    bounds: &FallBounds,
    tuning: &GrowthTuning,
    handles: &SceneHandles,
    rng: &mut R,
) -> Vec<FallingLily> {
    (0..population.rain)
        .map(|_| create_falling_entity(bounds, tuning, handles, rng))
        .collect()
}

fn non_negative(what: &str, value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("Clamping {} of {} to 0", what, value);
        0.0
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn degenerate_flower_input_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let tuning = GrowthTuning::default();
        let handles = SceneHandles::sequential();
        let f = create_flower(
            f32::NAN,
            -2.0,
            f32::INFINITY,
            1.0,
            BloomKind::Closed,
            &handles,
            &tuning,
            &mut rng,
        );
        assert_eq!(f.total_height, 0.0);
        assert_eq!(f.start_delay, 0.0);
        assert_eq!(f.position, (0.0, 1.0));
        assert_eq!(f.pose_at(10.0, &tuning).stem_height, tuning.min_height);
    }

    #[test]
    fn flower_randomness_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(4);
        let tuning = GrowthTuning::default();
        let handles = SceneHandles::sequential();
        for _ in 0..200 {
            let f = create_flower(10.0, 1.0, 0.0, 0.0, BloomKind::Closed, &handles, &tuning, &mut rng);
            assert!((0.5..=1.0).contains(&f.sway_speed));
            assert!((0.0..=PI).contains(&f.sway_phase));
            for (tx, tz) in f.head.pistil_tilts {
                assert!(tx.abs() <= 0.2 && tz.abs() <= 0.2);
            }
            assert_eq!(f.rest_bloom, tuning.closed_angle);
        }
    }

    #[test]
    fn falling_entities_start_open_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = FallBounds::default();
        let tuning = GrowthTuning::default();
        let handles = SceneHandles::sequential();
        for _ in 0..200 {
            let l = create_falling_entity(&bounds, &tuning, &handles, &mut rng);
            assert!((bounds.fall_speed.0..=bounds.fall_speed.1).contains(&l.fall_speed));
            assert!((bounds.scale.0..=bounds.scale.1).contains(&l.scale));
            assert!(l.spin.iter().all(|s| s.abs() <= bounds.max_spin));
            assert!(l.rotation.iter().all(|r| (0.0..=PI).contains(r)));
            assert!((bounds.y.0..=bounds.y.1).contains(&l.position[1]));
            assert_eq!(l.bloom, tuning.open_angle);
        }
    }

    #[test]
    fn radial_samples_stay_on_the_disc() {
        let mut rng = StdRng::seed_from_u64(6);
        for bias in [RadialBias::Squared, RadialBias::Sqrt] {
            for _ in 0..1000 {
                let (x, z) = radial_sample(&mut rng, 12.0, bias);
                assert!((x * x + z * z).sqrt() <= 12.0 + 1e-4);
            }
        }
    }

    #[test]
    fn same_seed_same_garden() {
        let population = Population::default();
        let tuning = GrowthTuning::default();
        let handles = SceneHandles::sequential();
        let a = populate_bouquet(&population, &tuning, &handles, &mut StdRng::seed_from_u64(9));
        let b = populate_bouquet(&population, &tuning, &handles, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.len(), population.bouquet);
        assert_eq!(a, b);
    }

    #[test]
    fn particle_field_fills_its_box() {
        let population = Population::default();
        let field = create_particle_field(
            &population,
            &SceneHandles::sequential(),
            &mut StdRng::seed_from_u64(7),
        );
        assert_eq!(field.points().len(), 300);
        for [x, y, z] in field.points() {
            assert!(x.abs() <= 40.0 && z.abs() <= 30.0);
            assert!((0.0..=40.0).contains(y));
        }
    }
}
