use cgmath::Vector3;
use rand::Rng;

use crate::{
    animation::flower::LilyHead,
    config::FallBounds,
    data_structures::instance::{Instance, InstanceSets, euler_xyz},
    factory::uniform,
};

/// An open lily head tumbling down from the sky.
///
/// Never destroyed: once it drops below the floor it is moved back to a
/// fresh random point inside the spawn volume and keeps falling.
#[derive(Clone, Debug, PartialEq)]
pub struct FallingLily {
    pub fall_speed: f32,
    /// Radians added to each rotation axis per frame.
    pub spin: [f32; 3],
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
    pub bloom: f32,
    pub head: LilyHead,
}

impl FallingLily {
    /// Advances one frame, returns `true` if the lily was recycled.
    pub fn step<R: Rng>(&mut self, bounds: &FallBounds, rng: &mut R) -> bool {
        self.position[1] -= self.fall_speed;
        for (angle, spin) in self.rotation.iter_mut().zip(self.spin) {
            *angle += spin;
        }
        if self.position[1] < bounds.floor {
            self.position = spawn_point(bounds, rng);
            true
        } else {
            false
        }
    }

    pub fn collect(&self, out: &mut InstanceSets) {
        let [x, y, z] = self.position;
        let [rx, ry, rz] = self.rotation;
        let group = Instance {
            position: Vector3::new(x, y, z),
            rotation: euler_xyz(rx, ry, rz),
            scale: Vector3::new(self.scale, self.scale, self.scale),
        };
        self.head.collect(&group, self.bloom, out);
    }
}

/// Uniform random point inside the spawn volume.
pub fn spawn_point<R: Rng>(bounds: &FallBounds, rng: &mut R) -> [f32; 3] {
    [
        uniform(rng, bounds.x),
        uniform(rng, bounds.y),
        uniform(rng, bounds.z),
    ]
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{animation::flower::PETAL_COUNT, resources::registry::SceneHandles};

    fn lily(y: f32) -> FallingLily {
        let handles = SceneHandles::sequential();
        FallingLily {
            fall_speed: 0.1,
            spin: [0.01, -0.005, 0.0],
            position: [0.0, y, 0.0],
            rotation: [0.0; 3],
            scale: 0.8,
            bloom: std::f32::consts::PI / 3.2,
            head: LilyHead {
                petal: handles.petal,
                pistil: handles.pistil,
                pistil_tilts: [(0.0, 0.0); 3],
            },
        }
    }

    #[test]
    fn falls_and_spins_every_frame() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = FallBounds::default();
        let mut l = lily(10.0);
        assert!(!l.step(&bounds, &mut rng));
        assert!((l.position[1] - 9.9).abs() < 1e-5);
        assert!((l.rotation[0] - 0.01).abs() < 1e-7);
        assert!((l.rotation[1] + 0.005).abs() < 1e-7);
    }

    #[test]
    fn recycles_into_the_spawn_volume_below_the_floor() {
        let mut rng = StdRng::seed_from_u64(2);
        let bounds = FallBounds::default();
        let mut l = lily(bounds.floor + 0.05);
        let spin_before = l.spin;
        assert!(l.step(&bounds, &mut rng));
        let [x, y, z] = l.position;
        assert!((bounds.x.0..=bounds.x.1).contains(&x));
        assert!((bounds.y.0..=bounds.y.1).contains(&y));
        assert!((bounds.z.0..=bounds.z.1).contains(&z));
        assert_eq!(l.spin, spin_before);
    }

    #[test]
    fn collect_scales_the_whole_head() {
        let l = lily(30.0);
        let mut sets = InstanceSets::new();
        l.collect(&mut sets);
        let petals = sets.get(SceneHandles::sequential().petal);
        assert_eq!(petals.len(), PETAL_COUNT);
        assert!(petals.iter().all(|p| (p.scale.x - 0.8).abs() < 1e-6));
        assert!(petals.iter().all(|p| (p.position.y - 30.0).abs() < 1e-6));
    }
}
