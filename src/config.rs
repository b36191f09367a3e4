//! Scene tuning and presets.
//!
//! Everything that shapes the look of a garden lives in [`SceneConfig`]: how
//! fast lilies grow and bloom, how the bouquet is spread, where the rain
//! falls, and the colour palette. Two presets are provided:
//!
//! - [`SceneConfig::stargazer`] is the default: a dense bouquet of 45 lilies
//!   clustered with a squared radial bias.
//! - [`SceneConfig::meadow`] is a wider field of 145 lilies spread with a
//!   square-root bias, faster growth and a later, narrower bloom.
//!
//! The preset and the random seed can be picked at start-up through the
//! `LILY_VARIANT` and `LILY_SEED` environment variables (native only).

use std::f32::consts::PI;

use crate::factory::RadialBias;

/// Timing and amplitude constants for the growth/bloom/sway animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthTuning {
    /// Seconds from `start_delay` until the stem reaches its full height.
    pub grow_duration: f32,
    /// Fraction of the growth after which petals start opening.
    pub bloom_threshold: f32,
    /// Seconds the petals need to open fully.
    pub bloom_duration: f32,
    /// Petal tilt (radians) of a closed bud.
    pub closed_angle: f32,
    /// Petal tilt (radians) of a fully opened lily.
    pub open_angle: f32,
    /// Fraction of the growth after which the wind starts to sway the stem.
    pub sway_threshold: f32,
    pub sway_amplitude: f32,
    pub turbulence_amplitude: f32,
    /// Frequency multiplier of the turbulence relative to the main sway.
    pub turbulence_frequency: f32,
    /// Smallest stem scale, keeps the stem mesh from collapsing to zero.
    pub min_height: f32,
}

impl Default for GrowthTuning {
    fn default() -> Self {
        Self {
            grow_duration: 3.5,
            bloom_threshold: 0.2,
            bloom_duration: 2.0,
            closed_angle: 0.1,
            open_angle: PI / 3.2,
            sway_threshold: 0.8,
            sway_amplitude: 0.05,
            turbulence_amplitude: 0.02,
            turbulence_frequency: 1.3,
            min_height: 0.01,
        }
    }
}

/// Spawn volume and floor of the falling lily rain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallBounds {
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub z: (f32, f32),
    /// Lilies below this height are recycled to the top.
    pub floor: f32,
    pub fall_speed: (f32, f32),
    /// Maximum absolute tumble per frame on each axis.
    pub max_spin: f32,
    pub scale: (f32, f32),
}

impl Default for FallBounds {
    fn default() -> Self {
        Self {
            x: (-40.0, 40.0),
            y: (20.0, 80.0),
            z: (-30.0, 10.0),
            floor: -5.0,
            fall_speed: (0.05, 0.15),
            max_spin: 0.01,
            scale: (0.6, 1.0),
        }
    }
}

/// How many entities of each kind a scene holds and how they are spread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Population {
    pub bouquet: usize,
    pub bouquet_radius: f32,
    pub radial_bias: RadialBias,
    pub height: (f32, f32),
    pub delay: (f32, f32),
    pub rain: usize,
    pub particles: usize,
    /// Half extents of the particle box on x and z, height on y.
    pub particle_extent: [f32; 3],
    /// Upward drift of every particle per frame, `0.0` disables it.
    pub particle_drift: f32,
    /// Radians per second the particle cloud turns around the y axis.
    pub particle_spin: f32,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            bouquet: 45,
            bouquet_radius: 12.0,
            radial_bias: RadialBias::Squared,
            height: (9.0, 15.0),
            delay: (0.0, 3.0),
            rain: 100,
            particles: 300,
            particle_extent: [40.0, 40.0, 30.0],
            particle_drift: 0.0,
            particle_spin: 0.03,
        }
    }
}

/// Linear RGB colours of every material plus the sky.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: [f32; 3],
    pub ground: [f32; 3],
    pub stem: [f32; 3],
    pub petal: [f32; 3],
    pub petal_emissive: [f32; 3],
    pub pistil: [f32; 3],
    pub particle: [f32; 3],
}

impl Palette {
    /// Deep purple night with stargazer pink lilies.
    pub fn stargazer() -> Self {
        Self {
            background: hex_to_linear(0x1a0b2e),
            ground: hex_to_linear(0x1f1033),
            stem: hex_to_linear(0x15803d),
            petal: hex_to_linear(0xe879f9),
            petal_emissive: hex_to_linear(0xbe185d),
            pistil: hex_to_linear(0xfde047),
            particle: hex_to_linear(0xffaaff),
        }
    }

    /// Softer hot pink tones.
    pub fn meadow() -> Self {
        Self {
            background: hex_to_linear(0x1a0b2e),
            ground: hex_to_linear(0x1f1033),
            stem: hex_to_linear(0x166534),
            petal: hex_to_linear(0xf472b6),
            petal_emissive: hex_to_linear(0x9d174d),
            pistil: hex_to_linear(0xfde047),
            particle: hex_to_linear(0xfbcfe8),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::stargazer()
    }
}

/// Complete description of a garden scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub growth: GrowthTuning,
    pub fall: FallBounds,
    pub population: Population,
    pub palette: Palette,
    /// Fixed seed for reproducible gardens, `None` draws one from the OS.
    pub seed: Option<u64>,
    pub initial_text: String,
}

impl SceneConfig {
    pub fn stargazer() -> Self {
        Self {
            growth: GrowthTuning::default(),
            fall: FallBounds::default(),
            population: Population::default(),
            palette: Palette::stargazer(),
            seed: None,
            initial_text: "Para la Gumynola :p".to_string(),
        }
    }

    pub fn meadow() -> Self {
        Self {
            growth: GrowthTuning {
                grow_duration: 3.0,
                bloom_threshold: 0.3,
                open_angle: PI / 3.5,
                ..GrowthTuning::default()
            },
            population: Population {
                bouquet: 145,
                bouquet_radius: 14.0,
                radial_bias: RadialBias::Sqrt,
                height: (8.0, 14.0),
                delay: (0.0, 4.0),
                particle_drift: 0.02,
                ..Population::default()
            },
            palette: Palette::meadow(),
            ..Self::stargazer()
        }
    }

    /// Look up a preset by name, unknown names yield `None`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "stargazer" => Some(Self::stargazer()),
            "meadow" => Some(Self::meadow()),
            _ => None,
        }
    }

    /// Reads `LILY_VARIANT` and `LILY_SEED` on top of the default preset.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("LILY_VARIANT").ok().as_deref(),
            std::env::var("LILY_SEED").ok().as_deref(),
        )
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::default()
    }

    fn from_vars(variant: Option<&str>, seed: Option<&str>) -> Self {
        let mut config = match variant {
            Some(name) => Self::preset(name).unwrap_or_else(|| {
                log::warn!("Unknown scene variant '{}', using stargazer", name);
                Self::stargazer()
            }),
            None => Self::stargazer(),
        };
        if let Some(seed) = seed {
            match seed.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => log::warn!("Ignoring LILY_SEED '{}': {}", seed, e),
            }
        }
        config
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::stargazer()
    }
}

/// Converts an sRGB hex colour (`0xRRGGBB`) into linear RGB.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
