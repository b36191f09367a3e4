//! Text overlay drawn on top of the scene.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::data_structures::texture::DEPTH_FORMAT;

/// Font size and line height in pixels.
const TITLE_METRICS: (f32, f32) = (48.0, 60.0);
const HINT_METRICS: (f32, f32) = (20.0, 26.0);
const TITLE_COLOR: Color = Color::rgb(255, 228, 250);
const HINT_COLOR: Color = Color::rgba(255, 200, 240, 170);
/// Distance of the title from the top, as a share of the viewport height.
const TITLE_TOP: f32 = 0.15;
const HINT_GAP: f32 = 12.0;

/// A title line with a smaller hint line below it, both centered.
pub struct TextOverlay {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    title: Buffer,
    hint: Buffer,
    shown: Option<(String, String)>,
}

impl TextOverlay {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let mut font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        // The overlay shares the scene pass, so it must accept its depth buffer.
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let title = Buffer::new(&mut font_system, Metrics::new(TITLE_METRICS.0, TITLE_METRICS.1));
        let hint = Buffer::new(&mut font_system, Metrics::new(HINT_METRICS.0, HINT_METRICS.1));
        Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            renderer,
            title,
            hint,
            shown: None,
        }
    }

    /// Lays the lines out for a `width`×`height` surface and uploads the glyphs.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        (width, height): (u32, u32),
        title: &str,
        hint: &str,
    ) -> anyhow::Result<()> {
        let (w, h) = (width as f32, height as f32);
        let changed = self
            .shown
            .as_ref()
            .is_none_or(|(t, hi)| t != title || hi != hint);
        if changed {
            let attrs = Attrs::new().family(Family::SansSerif);
            self.title
                .set_text(&mut self.font_system, title, &attrs, Shaping::Advanced);
            self.hint
                .set_text(&mut self.font_system, hint, &attrs, Shaping::Advanced);
            self.shown = Some((title.to_string(), hint.to_string()));
        }
        self.title.set_size(&mut self.font_system, Some(w), Some(h));
        self.hint.set_size(&mut self.font_system, Some(w), Some(h));
        self.title.shape_until_scroll(&mut self.font_system, false);
        self.hint.shape_until_scroll(&mut self.font_system, false);

        self.viewport.update(queue, Resolution { width, height });

        let title_top = h * TITLE_TOP;
        let hint_top = title_top + text_height(&self.title) + HINT_GAP;
        let bounds = TextBounds {
            left: 0,
            top: 0,
            right: width as i32,
            bottom: height as i32,
        };
        let areas = [
            TextArea {
                buffer: &self.title,
                left: centered_left(&self.title, w),
                top: title_top,
                scale: 1.0,
                bounds,
                default_color: TITLE_COLOR,
                custom_glyphs: &[],
            },
            TextArea {
                buffer: &self.hint,
                left: centered_left(&self.hint, w),
                top: hint_top,
                scale: 1.0,
                bounds,
                default_color: HINT_COLOR,
                custom_glyphs: &[],
            },
        ];
        self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        )?;
        Ok(())
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Err(e) = self.renderer.render(&self.atlas, &self.viewport, pass) {
            log::error!("Unable to draw the text overlay: {}", e);
        }
    }

    /// Drops glyphs that were not used by the last prepared frame.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

fn line_width(buffer: &Buffer) -> f32 {
    buffer
        .layout_runs()
        .map(|run| run.line_w)
        .fold(0.0, f32::max)
}

fn text_height(buffer: &Buffer) -> f32 {
    buffer.layout_runs().map(|run| run.line_height).sum()
}

fn centered_left(buffer: &Buffer, width: f32) -> f32 {
    ((width - line_width(buffer)) * 0.5).max(0.0)
}
