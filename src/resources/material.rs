use crate::config::Palette;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    Opaque,
    /// Colours are added onto what is already drawn, depth is not written.
    Additive,
}

/// Surface description of one resource kind, colours in linear RGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialDesc {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub unlit: bool,
    pub blend: Blend,
}

impl MaterialDesc {
    /// Lit, opaque, non-emissive surface.
    pub fn standard(color: [f32; 3], roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            roughness,
            metalness,
            opacity: 1.0,
            unlit: false,
            blend: Blend::Opaque,
        }
    }

    pub fn stem(palette: &Palette) -> Self {
        Self::standard(palette.stem, 0.8, 0.0)
    }

    pub fn petal(palette: &Palette) -> Self {
        Self {
            emissive: palette.petal_emissive,
            emissive_intensity: 0.3,
            ..Self::standard(palette.petal, 0.4, 0.1)
        }
    }

    pub fn pistil(palette: &Palette) -> Self {
        Self {
            unlit: true,
            ..Self::standard(palette.pistil, 1.0, 0.0)
        }
    }

    pub fn ground(palette: &Palette) -> Self {
        Self::standard(palette.ground, 0.7, 0.2)
    }

    pub fn particle(palette: &Palette) -> Self {
        Self {
            opacity: 0.6,
            unlit: true,
            blend: Blend::Additive,
            ..Self::standard(palette.particle, 1.0, 0.0)
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let e = self.emissive_intensity;
        MaterialUniform {
            color: [self.color[0], self.color[1], self.color[2], self.opacity],
            emissive: [self.emissive[0] * e, self.emissive[1] * e, self.emissive[2] * e],
            unlit: if self.unlit { 1.0 } else { 0.0 },
            roughness: self.roughness,
            metalness: self.metalness,
            _padding: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Base colour, alpha carries the opacity.
    color: [f32; 4],
    /// Emissive colour already multiplied by its intensity.
    emissive: [f32; 3],
    unlit: f32,
    roughness: f32,
    metalness: f32,
    // Uniforms are padded to 16 bytes
    _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_packs_emissive_intensity_and_flags() {
        let palette = Palette::stargazer();
        let petal = MaterialDesc::petal(&palette).to_uniform();
        assert!((petal.emissive[0] - palette.petal_emissive[0] * 0.3).abs() < 1e-6);
        assert_eq!(petal.unlit, 0.0);
        assert_eq!(petal.color[3], 1.0);

        let pistil = MaterialDesc::pistil(&palette).to_uniform();
        assert_eq!(pistil.unlit, 1.0);
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }

    #[test]
    fn particles_blend_additively_at_reduced_opacity() {
        let particle = MaterialDesc::particle(&Palette::stargazer());
        assert_eq!(particle.blend, Blend::Additive);
        assert_eq!(particle.to_uniform().color[3], 0.6);
    }
}
