use rand::rngs::StdRng;

use crate::{
    animation::{falling::FallingLily, flower::GrowingFlower, particles::ParticleField},
    config::{FallBounds, GrowthTuning, SceneConfig},
    data_structures::instance::{Instance, InstanceSets},
    factory,
    resources::registry::{ResourceHandle, SceneHandles},
};

/// Owns every animated entity of a garden and advances them together.
#[derive(Debug)]
pub struct AnimationEngine {
    tuning: GrowthTuning,
    fall: FallBounds,
    flowers: Vec<GrowingFlower>,
    rain: Vec<FallingLily>,
    particles: ParticleField,
    ground: ResourceHandle,
    rng: StdRng,
    recycled: u64,
}

impl AnimationEngine {
    /// Builds the bouquet, the rain and the particle cloud for `config`.
    pub fn populate(config: &SceneConfig, handles: SceneHandles, mut rng: StdRng) -> Self {
        let population = &config.population;
        let flowers = factory::populate_bouquet(population, &config.growth, &handles, &mut rng);
        let rain = factory::populate_rain(population, &config.fall, &config.growth, &handles, &mut rng);
        let particles = factory::create_particle_field(population, &handles, &mut rng);
        log::info!(
            "Planted {} lilies, {} falling, {} particles",
            flowers.len(),
            rain.len(),
            particles.points().len()
        );
        Self {
            tuning: config.growth,
            fall: config.fall,
            flowers,
            rain,
            particles,
            ground: handles.ground,
            rng,
            recycled: 0,
        }
    }

    /// Advances all entities to scene time `t` (seconds).
    ///
    /// Flowers and particles are pure functions of `t`; the rain moves one
    /// step per call.
    pub fn tick(&mut self, t: f32) {
        for flower in self.flowers.iter_mut() {
            flower.update(t, &self.tuning);
        }
        for lily in self.rain.iter_mut() {
            if lily.step(&self.fall, &mut self.rng) {
                self.recycled += 1;
            }
        }
        self.particles.update(t);
    }

    /// Replaces the content of `out` with the world transforms of this frame.
    pub fn collect(&self, out: &mut InstanceSets) {
        out.clear();
        out.push(self.ground, Instance::new());
        for flower in &self.flowers {
            flower.collect(out);
        }
        for lily in &self.rain {
            lily.collect(out);
        }
        self.particles.collect(out);
    }

    pub fn flowers(&self) -> &[GrowingFlower] {
        &self.flowers
    }

    pub fn rain(&self) -> &[FallingLily] {
        &self.rain
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// How many times a falling lily went back to the sky.
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    pub fn tuning(&self) -> &GrowthTuning {
        &self.tuning
    }
}
