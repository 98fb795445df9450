use bytemuck::{Pod, Zeroable};
use oldskool_common::Canvas;
use oldskool_kernel::CrtBand;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::shaders;

/// Errors from the presentation backend.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("CRT shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("surface error: {0}")]
    Surface(String),
}

impl From<wgpu::SurfaceError> for PresentError {
    fn from(e: wgpu::SurfaceError) -> Self {
        Self::Surface(e.to_string())
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Params {
    band: [f32; 4],
}

impl Params {
    fn for_band(band: Option<CrtBand>, frame_height: u32) -> Self {
        let h = frame_height.max(1) as f32;
        match band {
            Some(b) => Self {
                band: [b.y as f32 / h, (b.y + b.height) as f32 / h, b.time as f32, 0.0],
            },
            None => Self {
                band: [0.0, 0.0, 0.0, 0.0],
            },
        }
    }
}

/// Largest aspect-preserving rectangle for the frame, centred in the
/// surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub fn fit_viewport(surface: (u32, u32), frame: (u32, u32)) -> Viewport {
    let (sw, sh) = (surface.0.max(1) as f32, surface.1.max(1) as f32);
    let (fw, fh) = (frame.0.max(1) as f32, frame.1.max(1) as f32);
    let scale = (sw / fw).min(sh / fh);
    let width = fw * scale;
    let height = fh * scale;
    Viewport {
        x: (sw - width) / 2.0,
        y: (sh - height) / 2.0,
        width,
        height,
    }
}

const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Uploads CPU frames and draws them to a surface, with the CRT pass over
/// the marked band when available.
pub struct FramePresenter {
    frame_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    blit_pipeline: wgpu::RenderPipeline,
    crt_pipeline: Option<wgpu::RenderPipeline>,
    frame_size: (u32, u32),
    surface_format: wgpu::TextureFormat,
}

impl FramePresenter {
    /// A CRT compile failure is logged and leaves the plain blit in place.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let frame_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame_texture"),
            size: wgpu::Extent3d {
                width: frame_width.max(1),
                height: frame_height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let frame_view = frame_texture.create_view(&Default::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_params"),
            contents: bytemuck::bytes_of(&Params::for_band(None, frame_height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&frame_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("frame_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let blit_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::blit_shader().into()),
        });
        let blit_pipeline = build_pipeline(
            device,
            &pipeline_layout,
            &blit_module,
            ("vs_blit", "fs_blit"),
            surface_format,
            "blit_pipeline",
        );

        let crt_pipeline = match compile_crt(device, &pipeline_layout, surface_format) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "CRT post-process unavailable; using plain blit");
                None
            }
        };

        debug!(
            frame_width,
            frame_height,
            crt = crt_pipeline.is_some(),
            "frame presenter ready"
        );
        Self {
            frame_texture,
            bind_group,
            uniform_buffer,
            blit_pipeline,
            crt_pipeline,
            frame_size: (frame_width.max(1), frame_height.max(1)),
            surface_format,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn crt_available(&self) -> bool {
        self.crt_pipeline.is_some()
    }

    /// Copy a CPU frame into the frame texture. Frames of the wrong size are
    /// skipped.
    pub fn upload(&self, queue: &wgpu::Queue, canvas: &Canvas) {
        let (w, h) = self.frame_size;
        if (canvas.width(), canvas.height()) != (w, h) {
            warn!(
                width = canvas.width(),
                height = canvas.height(),
                "frame size mismatch; upload skipped"
            );
            return;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Draw the last uploaded frame letterboxed into `view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        surface_size: (u32, u32),
        crt_band: Option<CrtBand>,
    ) {
        let params = Params::for_band(crt_band, self.frame_size.1);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&params));

        let vp = fit_viewport(surface_size, self.frame_size);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("present_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_pipeline(&self.blit_pipeline);
            pass.draw(0..6, 0..1);

            if let (Some(crt), Some(_)) = (&self.crt_pipeline, crt_band) {
                pass.set_pipeline(crt);
                pass.draw(0..6, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Release the CRT pipeline. Later frames use the plain blit. Safe to
    /// call more than once.
    pub fn dispose(&mut self) {
        if self.crt_pipeline.take().is_some() {
            debug!("CRT pipeline released");
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    (vs, fs): (&str, &str),
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// Compile the CRT pipeline inside a validation error scope.
fn compile_crt(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, PresentError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("crt_shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::crt_shader().into()),
    });
    let pipeline = build_pipeline(device, layout, &module, ("vs_crt", "fs_crt"), format, "crt_pipeline");
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(PresentError::ShaderCompile(err.to_string())),
        None => Ok(pipeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_matches_exact_surface() {
        let vp = fit_viewport((768, 540), (768, 540));
        assert_eq!(
            vp,
            Viewport {
                x: 0.0,
                y: 0.0,
                width: 768.0,
                height: 540.0
            }
        );
    }

    #[test]
    fn viewport_pillarboxes_wide_surfaces() {
        let vp = fit_viewport((1920, 1080), (768, 540));
        assert_eq!(vp.height, 1080.0);
        assert!((vp.width - 1536.0).abs() < 1e-3);
        assert!((vp.x - 192.0).abs() < 1e-3);
        assert_eq!(vp.y, 0.0);
    }

    #[test]
    fn viewport_letterboxes_tall_surfaces() {
        let vp = fit_viewport((768, 1080), (768, 540));
        assert_eq!(vp.width, 768.0);
        assert_eq!(vp.height, 540.0);
        assert_eq!(vp.y, 270.0);
    }

    #[test]
    fn viewport_survives_zero_surface() {
        let vp = fit_viewport((0, 0), (768, 540));
        assert!(vp.width > 0.0 && vp.height > 0.0);
    }

    #[test]
    fn band_params_are_normalized() {
        let band = CrtBand {
            y: 234,
            height: 72,
            time: 1.5,
        };
        let p = Params::for_band(Some(band), 540);
        assert!((p.band[0] - 234.0 / 540.0).abs() < 1e-6);
        assert!((p.band[1] - 306.0 / 540.0).abs() < 1e-6);
        assert_eq!(p.band[2], 1.5);
        assert_eq!(Params::for_band(None, 540).band, [0.0; 4]);
    }

    #[test]
    fn surface_errors_convert() {
        let e: PresentError = wgpu::SurfaceError::Timeout.into();
        assert!(matches!(e, PresentError::Surface(_)));
    }
}
