//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which flows return from
//! `on_render` to describe what they want drawn. The engine sorts the
//! requests into batches per pipeline so every pipeline is bound once per
//! frame, whatever the number of flows.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (mesh, material + instance buffer)
//!
//! Lit surfaces are drawn first, additive ones on top of them and custom
//! closures (text overlays) last.

use crate::{
    context::Context,
    data_structures::model::{Material, Mesh},
};

/// Data for instanced object rendering: a mesh, its material and an instance buffer.
///
/// The instance buffer holds one [`InstanceRaw`](crate::data_structures::instance::InstanceRaw)
/// per copy of the mesh; `amount` of them are drawn.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub material: &'a Material,
    pub amount: usize,
}

pub type CustomRender<'a> = Box<dyn FnOnce(&Context, &mut wgpu::RenderPass<'_>) + 'a>;

/// Specifies how a flow should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Lit(Instanced)` renders a single opaque, lit instanced object
/// - `Lits(Vec<Instanced>)` renders a batch of opaque, lit objects
/// - `Additive(Instanced)` renders a single glowing object blended onto the frame
/// - `Additives(Vec<Instanced>)` renders a batch of glowing objects
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
/// - `Custom(...)` invokes a user-defined closure after all batches
///
pub enum Render<'a> {
    None,
    Lit(Instanced<'a>),
    Lits(Vec<Instanced<'a>>),
    Additive(Instanced<'a>),
    Additives(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
    Custom(CustomRender<'a>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(
        self,
        lits: &mut Vec<Instanced<'a>>,
        additives: &mut Vec<Instanced<'a>>,
        customs: &mut Vec<CustomRender<'a>>,
    ) {
        match self {
            Render::Lit(instanced) => lits.push(instanced),
            Render::Lits(mut vec) => lits.append(&mut vec),
            Render::Additive(instanced) => additives.push(instanced),
            Render::Additives(mut vec) => additives.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(lits, additives, customs)),
            Render::Custom(f) => customs.push(f),
            Render::None => (),
        }
    }
}
