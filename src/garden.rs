//! The garden scene: shared resources, animated entities and their
//! instance buffers, driven frame by frame.

use instant::Duration;
use rand::{SeedableRng, rngs::StdRng};
use winit::event::WindowEvent;

use crate::{
    animation::{clock::AnimationClock, driver::AnimationDriver, engine::AnimationEngine},
    banner::{Dedication, GardenEvent},
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{batch::InstanceBatch, instance::InstanceSets},
    flow::{GraphicsFlow, Out},
    render::{Instanced, Render},
    resources::{SceneRegistry, build_scene_registry, material::Blend, registry::SceneHandles},
};

pub struct Garden {
    config: SceneConfig,
    registry: SceneRegistry,
    driver: AnimationDriver,
    clock: AnimationClock,
    sets: InstanceSets,
    batches: Vec<InstanceBatch>,
}

impl Garden {
    /// Allocates the scene resources and plants every entity. The animation
    /// starts with [`GraphicsFlow::on_init`].
    pub async fn new(ctx: InitContext, config: SceneConfig) -> anyhow::Result<Self> {
        let registry = build_scene_registry(&ctx.device, &ctx.material_layout, &config.palette)?;
        let handles = SceneHandles::from_registry(&registry)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let driver = AnimationDriver::new(AnimationEngine::populate(&config, handles, rng));

        let mut sets = InstanceSets::new();
        driver.collect(&mut sets);
        let batches = registry
            .iter()
            .map(|(handle, _)| InstanceBatch::new(&ctx.device, handle, sets.get(handle)))
            .collect();

        Ok(Self {
            config,
            registry,
            driver,
            clock: AnimationClock::start(),
            sets,
            batches,
        })
    }
}

impl GraphicsFlow<Dedication, GardenEvent> for Garden {
    fn on_init(&mut self, _ctx: &mut Context, _state: &mut Dedication) -> Out<Dedication, GardenEvent> {
        self.clock = AnimationClock::start();
        self.driver.start();
        let background = self.config.palette.background;
        let text = self.config.initial_text.clone();
        Out::Configure(Box::new(move |ctx: &mut Context, state: &mut Dedication| {
            ctx.set_background(background);
            state.set_text(text);
        }))
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        _state: &mut Dedication,
        _dt: Duration,
    ) -> Out<Dedication, GardenEvent> {
        if self.driver.frame(self.clock.elapsed_secs()) {
            self.driver.collect(&mut self.sets);
            for batch in self.batches.iter_mut() {
                batch.write(&ctx.device, &ctx.queue, self.sets.get(batch.handle));
            }
        }
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        _state: &mut Dedication,
        _event: &WindowEvent,
    ) -> Out<Dedication, GardenEvent> {
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _ctx: &Context,
        _state: &mut Dedication,
        event: GardenEvent,
    ) -> Option<GardenEvent> {
        Some(event)
    }

    fn on_render(&self) -> Render<'_> {
        let mut lits = Vec::new();
        let mut additives = Vec::new();
        for batch in &self.batches {
            // Released resources are gone after teardown.
            let Some(resource) = self.registry.get(batch.handle) else {
                continue;
            };
            let instanced = Instanced {
                instance: &batch.buffer,
                mesh: &resource.mesh,
                material: &resource.material,
                amount: batch.amount(),
            };
            match resource.blend {
                Blend::Opaque => lits.push(instanced),
                Blend::Additive => additives.push(instanced),
            }
        }
        Render::Composed(vec![Render::Lits(lits), Render::Additives(additives)])
    }

    fn on_teardown(&mut self, _ctx: &Context, _state: &mut Dedication) {
        self.driver.cancel();
        let released = self.registry.release(|resource| resource.destroy());
        for batch in self.batches.drain(..) {
            batch.destroy();
        }
        log::info!(
            "Garden torn down after {} frames, {} resources released",
            self.driver.frame_loop().frames(),
            released
        );
    }
}
