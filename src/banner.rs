//! The dedication shown over the garden and the trigger asking for a new one.

use std::sync::Arc;

use instant::Duration;
use winit::{
    event::{MouseButton, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::{
    context::{Context, InitContext},
    flow::{EventFuture, GraphicsFlow, Out},
    message::{PhraseProvider, request_phrase},
    render::Render,
};

#[cfg(feature = "ui")]
use crate::pipelines::text::TextOverlay;

pub const INITIAL_TEXT: &str = "Para la Gumynola :p";
pub const HINT_IDLE: &str = "Nueva Dedicatoria";
pub const HINT_PENDING: &str = "Creando...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GardenEvent {
    /// A requested phrase arrived.
    Phrase(String),
}

/// Text on display plus whether a new one is being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dedication {
    text: String,
    pending: bool,
}

impl Dedication {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pending: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Marks a request as started. `false` if one is already in flight.
    pub fn begin_request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub fn finish(&mut self, phrase: String) {
        self.text = phrase;
        self.pending = false;
    }

    pub fn hint(&self) -> &'static str {
        if self.pending { HINT_PENDING } else { HINT_IDLE }
    }
}

impl Default for Dedication {
    fn default() -> Self {
        Self::new(INITIAL_TEXT)
    }
}

/// Space, Enter or a left click.
pub fn is_trigger(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            event.state.is_pressed()
                && !event.repeat
                && matches!(event.logical_key, Key::Named(NamedKey::Space | NamedKey::Enter))
        }
        WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } => state.is_pressed(),
        _ => false,
    }
}

pub struct Banner {
    provider: Arc<dyn PhraseProvider>,
    /// Last text written to the window title.
    title: Option<String>,
    #[cfg(feature = "ui")]
    overlay: Option<TextOverlay>,
}

impl Banner {
    #[cfg_attr(not(feature = "ui"), allow(unused_variables))]
    pub fn new(ctx: &InitContext, provider: Arc<dyn PhraseProvider>) -> Self {
        Self {
            provider,
            title: None,
            #[cfg(feature = "ui")]
            overlay: Some(TextOverlay::new(&ctx.device, &ctx.queue, ctx.format)),
        }
    }

    /// Starts a phrase request unless one is already in flight.
    pub fn request(&self, state: &mut Dedication) -> Out<Dedication, GardenEvent> {
        if !state.begin_request() {
            log::debug!("A phrase is already on its way");
            return Out::Empty;
        }
        let provider = Arc::clone(&self.provider);
        let future: EventFuture<GardenEvent> =
            Box::pin(async move { GardenEvent::Phrase(request_phrase(provider.as_ref()).await) });
        Out::FutEvent(vec![future])
    }

    fn sync_title(&mut self, ctx: &Context, state: &Dedication) {
        if self.title.as_deref() != Some(state.text()) {
            ctx.window().set_title(state.text());
            self.title = Some(state.text().to_string());
        }
    }
}

impl GraphicsFlow<Dedication, GardenEvent> for Banner {
    fn on_init(&mut self, ctx: &mut Context, state: &mut Dedication) -> Out<Dedication, GardenEvent> {
        self.sync_title(ctx, state);
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut Dedication,
        _dt: Duration,
    ) -> Out<Dedication, GardenEvent> {
        self.sync_title(ctx, state);
        #[cfg(feature = "ui")]
        if let Some(overlay) = &mut self.overlay {
            overlay.trim();
            if let Err(e) = overlay.prepare(&ctx.device, &ctx.queue, ctx.size(), state.text(), state.hint()) {
                log::error!("Unable to lay out the banner: {:#}", e);
            }
        }
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        state: &mut Dedication,
        event: &WindowEvent,
    ) -> Out<Dedication, GardenEvent> {
        if is_trigger(event) {
            self.request(state)
        } else {
            Out::Empty
        }
    }

    fn on_custom_events(
        &mut self,
        _ctx: &Context,
        state: &mut Dedication,
        event: GardenEvent,
    ) -> Option<GardenEvent> {
        match event {
            GardenEvent::Phrase(phrase) => {
                log::info!("New dedication: {}", phrase);
                state.finish(phrase);
                None
            }
        }
    }

    fn on_render(&self) -> Render<'_> {
        #[cfg(feature = "ui")]
        if let Some(overlay) = &self.overlay {
            return Render::Custom(Box::new(
                move |_ctx: &Context, pass: &mut wgpu::RenderPass<'_>| overlay.render(pass),
            ));
        }
        Render::None
    }

    fn on_teardown(&mut self, _ctx: &Context, _state: &mut Dedication) {
        #[cfg(feature = "ui")]
        {
            self.overlay = None;
        }
        log::debug!("Banner torn down");
    }
}
