//! Debug text overlay drawn with egui

/// Text already projected to window pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub text: String,
    /// Center of the text in physical pixels, origin top-left
    pub position: [f32; 2],
    pub color: [f32; 3],
    /// Font height in physical pixels
    pub size: f32,
}

/// Paints screen labels on top of an already rendered frame
pub struct TextOverlay {
    context: egui::Context,
    renderer: egui_wgpu::Renderer,
}

impl TextOverlay {
    /// Create an overlay targeting `format` (no depth, no multisampling)
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            context: egui::Context::default(),
            renderer: egui_wgpu::Renderer::new(device, format, None, 1),
        }
    }

    /// Record the overlay pass into `encoder`.
    ///
    /// Returns extra command buffers egui prepared; submit them before the
    /// encoder.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        labels: &[ScreenLabel],
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(size_in_pixels[0] as f32, size_in_pixels[1] as f32),
            )),
            ..Default::default()
        };

        let full_output = self.context.run(raw_input, |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            for label in labels {
                painter.text(
                    egui::pos2(label.position[0], label.position[1]),
                    egui::Align2::CENTER_CENTER,
                    &label.text,
                    egui::FontId::proportional(label.size),
                    to_color32(label.color),
                );
            }
        });

        let paint_jobs = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let prepared = self
            .renderer
            .update_buffers(device, queue, encoder, &paint_jobs, &screen);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Text Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut pass, &paint_jobs, &screen);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        prepared
    }
}

fn to_color32(rgb: [f32; 3]) -> egui::Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
}
