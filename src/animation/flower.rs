use std::f32::consts::TAU;

use cgmath::{Rad, Rotation3, Vector3};

use crate::{
    animation::easing::{ease_out_cubic, lerp},
    config::GrowthTuning,
    data_structures::instance::{Instance, InstanceSets, euler_xyz},
    resources::registry::ResourceHandle,
};

pub const PETAL_COUNT: usize = 6;
pub const PISTIL_COUNT: usize = 3;

/// Six petals around three pistils, shared by bouquet flowers and the rain.
#[derive(Clone, Debug, PartialEq)]
pub struct LilyHead {
    pub petal: ResourceHandle,
    pub pistil: ResourceHandle,
    /// Fixed `(x, z)` tilt of each pistil.
    pub pistil_tilts: [(f32, f32); PISTIL_COUNT],
}

impl LilyHead {
    /// Pushes petals and pistils relative to `head`, petals opened by `bloom` radians.
    pub fn collect(&self, head: &Instance, bloom: f32, out: &mut InstanceSets) {
        for i in 0..PETAL_COUNT {
            let around = i as f32 * TAU / PETAL_COUNT as f32;
            let local = Instance::from_rotation(
                cgmath::Quaternion::from_angle_y(Rad(around))
                    * cgmath::Quaternion::from_angle_z(Rad(bloom)),
            );
            out.push(self.petal, head * &local);
        }
        for (tx, tz) in self.pistil_tilts {
            let local = Instance::from_rotation(euler_xyz(tx, 0.0, tz));
            out.push(self.pistil, head * &local);
        }
    }
}

/// Everything that changes about a flower from frame to frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowerPose {
    pub stem_height: f32,
    pub head_height: f32,
    pub bloom_angle: f32,
    /// Rotation of the whole flower about `x` and `z`.
    pub sway: (f32, f32),
}

/// A lily that grows out of the ground, blooms and sways in the wind.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowingFlower {
    pub total_height: f32,
    pub start_delay: f32,
    pub position: (f32, f32),
    pub sway_speed: f32,
    pub sway_phase: f32,
    /// Petal angle the flower was built with, kept until it starts blooming.
    pub rest_bloom: f32,
    pub stem: ResourceHandle,
    pub head: LilyHead,
    pose: FlowerPose,
}

impl GrowingFlower {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        total_height: f32,
        start_delay: f32,
        position: (f32, f32),
        sway: (f32, f32),
        rest_bloom: f32,
        stem: ResourceHandle,
        head: LilyHead,
        tuning: &GrowthTuning,
    ) -> Self {
        Self {
            total_height,
            start_delay,
            position,
            sway_speed: sway.0,
            sway_phase: sway.1,
            rest_bloom,
            stem,
            head,
            pose: FlowerPose {
                stem_height: tuning.min_height,
                head_height: 0.0,
                bloom_angle: rest_bloom,
                sway: (0.0, 0.0),
            },
        }
    }

    pub fn pose(&self) -> FlowerPose {
        self.pose
    }

    /// Pose at scene time `t`; depends on nothing but `t` and the flower's
    /// construction parameters.
    pub fn pose_at(&self, t: f32, tuning: &GrowthTuning) -> FlowerPose {
        let rest = FlowerPose {
            stem_height: tuning.min_height,
            head_height: 0.0,
            bloom_angle: self.rest_bloom,
            sway: (0.0, 0.0),
        };
        if t <= self.start_delay {
            return rest;
        }

        let age = t - self.start_delay;
        let progress = fraction(age, tuning.grow_duration);
        let growth = ease_out_cubic(progress);
        let grown = growth * self.total_height;

        let bloom_angle = if progress > tuning.bloom_threshold {
            let bloom_start = tuning.grow_duration * tuning.bloom_threshold;
            let bloom = ease_out_cubic(fraction(age - bloom_start, tuning.bloom_duration));
            lerp(tuning.closed_angle, tuning.open_angle, bloom).max(self.rest_bloom)
        } else {
            self.rest_bloom
        };

        let sway = if progress > tuning.sway_threshold {
            let wind = (t * self.sway_speed + self.sway_phase).sin() * tuning.sway_amplitude;
            let turbulence = (t * self.sway_speed * tuning.turbulence_frequency).cos()
                * tuning.turbulence_amplitude;
            (turbulence, wind + turbulence)
        } else {
            (0.0, 0.0)
        };

        FlowerPose {
            stem_height: grown.max(tuning.min_height),
            head_height: grown,
            bloom_angle,
            sway,
        }
    }

    pub fn update(&mut self, t: f32, tuning: &GrowthTuning) {
        self.pose = self.pose_at(t, tuning);
    }

    pub fn collect(&self, out: &mut InstanceSets) {
        let pose = self.pose;
        let group = Instance {
            position: Vector3::new(self.position.0, 0.0, self.position.1),
            rotation: euler_xyz(pose.sway.0, 0.0, pose.sway.1),
            ..Instance::new()
        };
        let stem = Instance {
            scale: Vector3::new(1.0, pose.stem_height, 1.0),
            ..Instance::new()
        };
        out.push(self.stem, &group * &stem);

        let head = &group * &Instance::from(Vector3::new(0.0, pose.head_height, 0.0));
        self.head.collect(&head, pose.bloom_angle, out);
    }
}

/// `elapsed / duration` clamped to `[0, 1]`; a non-positive duration is
/// finished immediately.
fn fraction(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}
