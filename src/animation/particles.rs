use cgmath::{Rad, Rotation3, Vector3};

use crate::{
    data_structures::instance::{Instance, InstanceSets},
    resources::registry::ResourceHandle,
};

/// Slowly turning cloud of glowing specks.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    pub handle: ResourceHandle,
    points: Vec<[f32; 3]>,
    /// Points drifting above this height wrap back to the ground.
    ceiling: f32,
    drift: f32,
    spin: f32,
    rotation_y: f32,
}

impl ParticleField {
    pub fn new(
        handle: ResourceHandle,
        points: Vec<[f32; 3]>,
        ceiling: f32,
        drift: f32,
        spin: f32,
    ) -> Self {
        Self {
            handle,
            points,
            ceiling,
            drift,
            spin,
            rotation_y: 0.0,
        }
    }

    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn update(&mut self, t: f32) {
        self.rotation_y = t * self.spin;
        if self.drift == 0.0 {
            return;
        }
        for p in self.points.iter_mut() {
            p[1] += self.drift;
            if p[1] > self.ceiling {
                p[1] = 0.0;
            }
        }
    }

    pub fn collect(&self, out: &mut InstanceSets) {
        let cloud = Instance::from_rotation(cgmath::Quaternion::from_angle_y(Rad(self.rotation_y)));
        for [x, y, z] in self.points.iter().copied() {
            out.push(self.handle, &cloud * &Instance::from(Vector3::new(x, y, z)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_a_function_of_time() {
        let mut field = ParticleField::new(ResourceHandle::new(4), vec![[1.0, 2.0, 3.0]], 40.0, 0.0, 0.03);
        field.update(10.0);
        assert!((field.rotation_y() - 0.3).abs() < 1e-6);
        field.update(10.0);
        assert!((field.rotation_y() - 0.3).abs() < 1e-6);
        // no drift, no movement
        assert_eq!(field.points(), &[[1.0, 2.0, 3.0]]);
    }

    #[test]
    fn drifting_points_wrap_above_the_ceiling() {
        let mut field = ParticleField::new(
            ResourceHandle::new(4),
            vec![[0.0, 39.99, 0.0], [0.0, 5.0, 0.0]],
            40.0,
            0.02,
            0.03,
        );
        field.update(0.0);
        assert_eq!(field.points()[0][1], 0.0);
        assert!((field.points()[1][1] - 5.02).abs() < 1e-6);
    }

    #[test]
    fn collect_keeps_point_count_and_height() {
        let mut field = ParticleField::new(
            ResourceHandle::new(0),
            vec![[10.0, 4.0, 0.0]; 300],
            40.0,
            0.0,
            0.03,
        );
        field.update(50.0);
        let mut sets = InstanceSets::new();
        field.collect(&mut sets);
        let points = sets.get(ResourceHandle::new(0));
        assert_eq!(points.len(), 300);
        // turning about y moves points on a circle at constant height
        let p = points[0].position;
        assert!((p.y - 4.0).abs() < 1e-5);
        assert!(((p.x * p.x + p.z * p.z).sqrt() - 10.0).abs() < 1e-4);
    }
}
