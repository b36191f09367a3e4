//! lily-ngin
//!
//! An animated lily garden: a bouquet that grows and blooms, lilies raining
//! from the sky and a cloud of glowing specks, under a dedication that can
//! be swapped for a freshly generated phrase. Runs natively and in the
//! browser on top of a small instancing-oriented flow engine.
//!
//! High-level modules
//! - `animation`: growth, bloom, sway and fall of every entity, plus the frame loop
//! - `factory`: seeded construction of flowers, falling lilies and particles
//! - `resources`: procedural meshes, materials and the registry that owns them
//! - `config`: scene presets and tuning constants
//! - `camera`, `context`, `pipelines`: GPU context, camera, lighting and shaders
//! - `flow`: the event loop and the `GraphicsFlow` abstraction
//! - `render`: render composition for efficient pipeline reuse
//! - `garden`, `banner`, `message`: the flows of the application and the phrase provider
//!

pub mod animation;
pub mod banner;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod factory;
pub mod flow;
pub mod garden;
pub mod message;
pub mod pipelines;
pub mod render;
pub mod resources;

use std::sync::Arc;

use crate::{
    banner::{Banner, Dedication, GardenEvent},
    config::SceneConfig,
    flow::{FlowConstructor, GraphicsFlow},
    garden::Garden,
    message::{GeminiProvider, PhraseProvider},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// The garden scene followed by the banner drawn over it.
pub fn flows(
    config: SceneConfig,
    provider: Arc<dyn PhraseProvider>,
) -> Vec<FlowConstructor<Dedication, GardenEvent>> {
    let garden: FlowConstructor<Dedication, GardenEvent> = Box::new(move |ctx| {
        Box::pin(async move {
            let garden = Garden::new(ctx, config).await?;
            Ok::<_, anyhow::Error>(Box::new(garden) as Box<dyn GraphicsFlow<_, _>>)
        })
    });
    let banner: FlowConstructor<Dedication, GardenEvent> = Box::new(move |ctx| {
        Box::pin(async move {
            let banner = Banner::new(&ctx, provider);
            Ok::<_, anyhow::Error>(Box::new(banner) as Box<dyn GraphicsFlow<_, _>>)
        })
    });
    vec![garden, banner]
}

/// Opens the garden with the configuration from the environment.
pub fn run() -> anyhow::Result<()> {
    let config = SceneConfig::from_env();
    let provider = Arc::new(GeminiProvider::from_env());
    flow::run(flows(config, provider))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
