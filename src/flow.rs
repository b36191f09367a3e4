//! Flow control and application event loop.
//!
//! This module provides the main event loop and the flow abstraction. A
//! "flow" is a self-contained part of the application that reacts to input,
//! updates its state every frame and describes what it wants drawn. The
//! engine drives any number of flows side by side and composes their renders.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait for scenes and overlays
//! - [`Out<S, E>`] is the output type for async event handling and context configuration
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Distribute window events through `on_window_events`
//! 2. Drain resolved futures and hand them to `on_custom_events`
//! 3. Update flow state via `on_update`
//! 4. Collect each flow's `on_render()` into pipeline batches
//! 5. Render the batches and present the frame
//!
//! When the window closes every flow is torn down exactly once through
//! `on_teardown`, after which no further hook is called.

use std::{
    fmt::Debug,
    iter,
    pin::Pin,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::model::DrawModel,
    render::Render,
};

/// Values that can cross into the async runtime: `Send` natively, anything
/// on the single threaded web. [`MaybeSync`] is the same for `Sync`.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSync: Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Sync> MaybeSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSync {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSync for T {}

#[cfg(not(target_arch = "wasm32"))]
pub type EventFuture<E> = Pin<Box<dyn Future<Output = E> + Send>>;
#[cfg(target_arch = "wasm32")]
pub type EventFuture<E> = Pin<Box<dyn Future<Output = E>>>;

/// What a lifecycle hook hands back to the event loop.
///
/// `Out::FutEvent` resolves futures off the frame loop (a tokio task natively, `spawn_local` on
/// the web). Each resolved event is queued and handed to `on_custom_events` at the start of a
/// later frame; the frame loop never waits for it.
///
/// `Out::Configure` modifies the Context and the shared state right away, for instance to
/// change the clear colour or the dedication.
///
/// `Out::Empty` means there is nothing to do.
pub enum Out<S, E> {
    FutEvent(Vec<EventFuture<E>>),
    Configure(Box<dyn FnOnce(&mut Context, &mut S)>),
    Empty,
}

impl<S, E> Default for Out<S, E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable scene or overlay.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure context (clear color, etc.)
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_custom_events()` is called for every resolved `Out::FutEvent`
/// 4. `on_update()` is called every frame
/// 5. `on_render()` is called each frame and specifies how to render `self`
/// 6. `on_teardown()` is called once when the application exits
///
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S, E>;

    /// Update state every frame.
    ///
    /// Called every frame with the elapsed time `dt` since the previous one.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<S, E>;

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<S, E>;

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;

    /// Release everything the flow allocated. Called exactly once.
    fn on_teardown(&mut self, ctx: &Context, state: &mut S);
}

// Needed for the Debug bound on `FlowEvent`
impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`. A failing constructor aborts the application.
pub type FlowConstructor<S, E> = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow<S, E>>>>>>,
>;

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }
}

impl<State> AppState<State> {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx
                .depth_texture
                .resize(&self.ctx.device, (self.ctx.config.width, self.ctx.config.height));
        }
    }

    fn render<Event>(
        &self,
        graphics_flows: &[Box<dyn GraphicsFlow<State, Event>>],
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut lits = Vec::new();
            let mut additives = Vec::new();
            let mut customs = Vec::new();
            graphics_flows.iter().for_each(|flow| {
                flow.on_render()
                    .set_pipelines(&mut lits, &mut additives, &mut customs);
            });

            for (pipeline, batch) in [
                (&self.ctx.pipelines.lit, lits),
                (&self.ctx.pipelines.particle, additives),
            ] {
                render_pass.set_pipeline(pipeline);
                for instanced in batch {
                    if instanced.amount == 0 {
                        continue;
                    }
                    render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    render_pass.draw_mesh_instanced(
                        instanced.mesh,
                        instanced.material,
                        0..instanced.amount as u32,
                        &self.ctx.camera.bind_group,
                        &self.ctx.light.bind_group,
                    );
                }
            }

            for custom in customs {
                custom(&self.ctx, &mut render_pass);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Runs `Out::FutEvent` futures and queues their results for the frame loop.
struct Spawner<Event> {
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Runtime,
    sender: Sender<Event>,
}

impl<Event: MaybeSend + 'static> Spawner<Event> {
    fn spawn(&self, future: EventFuture<Event>) {
        let sender = self.sender.clone();
        let task = async move {
            if sender.send(future.await).is_err() {
                log::warn!("An event resolved after the event loop was closed");
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = self.runtime.spawn(task);
        }
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }
    }

    fn handle<State>(&self, ctx: &mut Context, state: &mut State, out: Out<State, Event>) {
        match out {
            Out::FutEvent(futures) => futures.into_iter().for_each(|f| self.spawn(f)),
            Out::Configure(f) => f(ctx, state),
            Out::Empty => (),
        }
    }
}

pub struct App<State: 'static, Event: 'static> {
    spawner: Spawner<Event>,
    events: Receiver<Event>,
    // Only the web initializes asynchronously.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State, Event>>,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // We use Option to `take()` it after use.
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    last_time: Instant,
    torn_down: bool,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: MaybeSend + 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<State, Event>>,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> anyhow::Result<Self> {
        let (sender, events) = mpsc::channel();
        let spawner = Spawner {
            #[cfg(not(target_arch = "wasm32"))]
            runtime: tokio::runtime::Runtime::new()?,
            sender,
        };
        Ok(Self {
            spawner,
            events,
            proxy: event_loop.create_proxy(),
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
            torn_down: false,
        })
    }

    fn initialized(&mut self, mut app_state: AppState<State>, flows: Vec<Box<dyn GraphicsFlow<State, Event>>>) {
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        self.graphics_flows = flows;
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            self.spawner.handle(&mut app_state.ctx, &mut app_state.state, out);
        }
        app_state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(app_state);
    }

    /// Hands every event resolved since the last frame to the flows.
    fn drain_events(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        while let Ok(event) = self.events.try_recv() {
            let result = self
                .graphics_flows
                .iter_mut()
                .fold(Some(event), |event, flow| {
                    flow.on_custom_events(&state.ctx, &mut state.state, event?)
                });
            if result.is_some() {
                log::warn!("Warning! Custom event was not consumed this cycle");
            }
        }
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        // No frame runs from here on.
        self.torn_down = true;
        if let Some(state) = &mut self.state {
            state.ctx.detach();
            log::info!("Tearing down {} flows", self.graphics_flows.len());
            for flow in self.graphics_flows.iter_mut() {
                flow.on_teardown(&state.ctx, &mut state.state);
            }
        }
    }
}

pub(crate) enum FlowEvent<State: 'static, Event: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    },
    #[allow(dead_code)]
    Exit,
}

impl<State: 'static, Event: 'static> Debug for FlowEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Exit => f.write_str("Exit"),
        }
    }
}

async fn init<State: Default, Event>(
    window: Arc<Window>,
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<(AppState<State>, Vec<Box<dyn GraphicsFlow<State, Event>>>)> {
    let app_state = AppState::new(window).await?;
    let flow_futures: Vec<_> = constructors
        .into_iter()
        // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
        .map(|constructor| constructor((&app_state.ctx).into()))
        .collect();
    let flows = futures::future::join_all(flow_futures)
        .await
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((app_state, flows))
}

impl<State: 'static + Default, Event: MaybeSend + 'static> ApplicationHandler<FlowEvent<State, Event>>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            // Already initialized, e.g. resumed again on mobile
            return;
        };

        let window_attributes = Window::default_attributes().with_title("Lily Garden");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(target_arch = "wasm32")]
        if let Err(e) = crate::context::attach_canvas(&window, crate::context::CONTAINER_ID) {
            log::error!("{:#}", e);
            event_loop.exit();
            return;
        }

        let init_future = init(window, constructors);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.spawner.runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.initialized(app_state, flows),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => {
                        log::error!("App initialization failed: {:#}", e);
                        FlowEvent::Exit
                    }
                };
                if proxy.send_event(event).is_err() {
                    log::error!("The event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State, Event>) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized { state, flows } => self.initialized(state, flows),
            FlowEvent::Exit => {
                self.teardown();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.torn_down {
            return;
        }
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        self.graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_window_events(&state.ctx, &mut state.state, &event);
            self.spawner.handle(&mut state.ctx, &mut state.state, out);
        });

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                self.drain_events();
                let Some(state) = &mut self.state else {
                    return;
                };

                self.graphics_flows.iter_mut().for_each(|f| {
                    let out = f.on_update(&state.ctx, &mut state.state, dt);
                    self.spawner.handle(&mut state.ctx, &mut state.state, out);
                });
                state.ctx.camera.write(&state.ctx.queue, &state.ctx.projection);

                match state.render(&self.graphics_flows) {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Builds the event loop, initializes logging and drives the flows until
/// the window is closed.
pub fn run<State: 'static + Default, Event: MaybeSend + 'static>(
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::warn!("A logger was already installed");
        }
    }

    let event_loop: EventLoop<FlowEvent<State, Event>> = EventLoop::with_user_event().build()?;

    let mut app: App<State, Event> = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
