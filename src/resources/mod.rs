//! Shared scene resources: procedural meshes, materials and the registry
//! that owns their GPU counterparts.

pub mod geometry;
pub mod material;
pub mod registry;

use crate::{
    config::Palette,
    data_structures::model::{Material, Mesh},
    resources::{
        geometry::MeshData,
        material::{Blend, MaterialDesc},
        registry::{ResourceKind, ResourceRegistry, Template},
    },
};

/// CPU-side description of one scene resource.
#[derive(Clone, Debug)]
pub struct ResourceTemplate {
    pub kind: ResourceKind,
    pub geometry: MeshData,
    pub material: MaterialDesc,
}

impl Template for ResourceTemplate {
    fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// The five resources a lily garden is drawn with.
pub fn garden_templates(palette: &Palette) -> Vec<ResourceTemplate> {
    vec![
        ResourceTemplate {
            kind: ResourceKind::Stem,
            geometry: geometry::cylinder(0.08, 0.12, 1.0, 8),
            material: MaterialDesc::stem(palette),
        },
        ResourceTemplate {
            kind: ResourceKind::Petal,
            geometry: geometry::cone(0.6, 2.5, 8).scale(1.0, 1.0, 0.15),
            material: MaterialDesc::petal(palette),
        },
        ResourceTemplate {
            kind: ResourceKind::Pistil,
            geometry: geometry::cylinder(0.03, 0.03, 1.8, 5),
            material: MaterialDesc::pistil(palette),
        },
        ResourceTemplate {
            kind: ResourceKind::Ground,
            geometry: geometry::plane(200.0, 200.0),
            material: MaterialDesc::ground(palette),
        },
        ResourceTemplate {
            kind: ResourceKind::Particle,
            geometry: geometry::octahedron(0.15),
            material: MaterialDesc::particle(palette),
        },
    ]
}

/// Immutable mesh + material pair shared by every entity of one kind.
#[derive(Debug)]
pub struct SceneResource {
    pub mesh: Mesh,
    pub material: Material,
    pub blend: Blend,
}

impl SceneResource {
    pub fn upload(
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
        template: &ResourceTemplate,
    ) -> anyhow::Result<Self> {
        template.geometry.validate()?;
        let name = format!("{:?}", template.kind);
        Ok(Self {
            mesh: Mesh::new(device, &name, &template.geometry),
            material: Material::new(device, &name, template.material.to_uniform(), material_layout),
            blend: template.material.blend,
        })
    }

    /// Frees the GPU buffers right away instead of waiting for the last
    /// reference to drop.
    pub fn destroy(self) {
        log::debug!("Releasing {}", self.mesh.name);
        self.mesh.destroy();
        self.material.destroy();
    }
}

pub type SceneRegistry = ResourceRegistry<SceneResource>;

pub fn build_scene_registry(
    device: &wgpu::Device,
    material_layout: &wgpu::BindGroupLayout,
    palette: &Palette,
) -> anyhow::Result<SceneRegistry> {
    ResourceRegistry::build(&garden_templates(palette), |template| {
        SceneResource::upload(device, material_layout, template)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garden_templates_cover_every_kind_once() {
        let templates = garden_templates(&Palette::stargazer());
        assert_eq!(templates.len(), ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            assert_eq!(templates.iter().filter(|t| t.kind == kind).count(), 1);
        }
        for t in &templates {
            t.geometry.validate().unwrap();
        }
    }

    #[test]
    fn only_particles_blend_additively() {
        let templates = garden_templates(&Palette::stargazer());
        for t in templates {
            let additive = t.material.blend == Blend::Additive;
            assert_eq!(additive, t.kind == ResourceKind::Particle);
        }
    }
}
