use std::borrow::Cow;

use glam::{Affine2, Mat3};
use log::{debug, warn};
use wgpu::util::DeviceExt;

use crate::graphics::{RenderStates, RenderTarget, Vertex};
use crate::view::View;

const VERTEX_SIZE: u64 = std::mem::size_of::<Vertex>() as u64;

/// Draws one batch of points per frame.
pub struct RenderModule {
    transform_buffer: wgpu::Buffer,
    vertices_buffer: wgpu::Buffer,
    vertices_capacity: usize,
    num_vertices: u32,

    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl RenderModule {
    pub fn new(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        vertices_capacity: usize,
    ) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: None,
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("render.wgsl"))),
        });

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&mat3_columns(Affine2::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let vertices_capacity = vertices_capacity.max(1);
        let vertices_buffer = create_vertices_buffer(device, vertices_capacity);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("render"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: None,
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vertex",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_SIZE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Unorm8x4],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fragment",
                targets: &[Some(wgpu::ColorTargetState {
                    format: swapchain_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            transform_buffer,
            vertices_buffer,
            vertices_capacity,
            num_vertices: 0,

            bind_group,
            pipeline,
        }
    }

    /// A render target that uploads its points for the next [`RenderModule::begin_pass`].
    pub fn batch<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        view: &'a View,
    ) -> PointBatch<'a> {
        PointBatch {
            module: self,
            device,
            queue,
            view,
        }
    }

    pub fn begin_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: None,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertices_buffer.slice(..));
        rpass.draw(0..self.num_vertices, 0..1);

        rpass
    }
}

pub struct PointBatch<'a> {
    module: &'a mut RenderModule,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a View,
}

impl RenderTarget for PointBatch<'_> {
    fn draw_points(&mut self, vertices: &[Vertex], states: &RenderStates<'_>) {
        if states.texture.is_some() {
            warn!("Points are drawn untextured, ignoring the texture");
        }

        if vertices.len() > self.module.vertices_capacity {
            debug!(
                "Growing vertex buffer from {} to {} vertices",
                self.module.vertices_capacity,
                vertices.len()
            );
            self.module.vertices_buffer = create_vertices_buffer(self.device, vertices.len());
            self.module.vertices_capacity = vertices.len();
        }

        let transform = self.view.projection() * states.transform;
        self.queue.write_buffer(
            &self.module.transform_buffer,
            0,
            bytemuck::cast_slice(&mat3_columns(transform)),
        );
        self.queue.write_buffer(
            &self.module.vertices_buffer,
            0,
            bytemuck::cast_slice(vertices),
        );
        self.module.num_vertices = vertices.len() as u32;
    }
}

fn create_vertices_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Vertex Buffer"),
        size: VERTEX_SIZE * capacity as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// `mat3x3<f32>` columns padded to 16 bytes for the uniform layout.
fn mat3_columns(transform: Affine2) -> [[f32; 4]; 3] {
    let matrix = Mat3::from(transform);
    [
        matrix.x_axis.extend(0.0).to_array(),
        matrix.y_axis.extend(0.0).to_array(),
        matrix.z_axis.extend(0.0).to_array(),
    ]
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn vertices_are_tightly_packed() {
        assert_eq!(VERTEX_SIZE, 12);
    }

    #[test]
    fn uniform_columns_are_padded() {
        let columns = mat3_columns(Affine2::from_translation(Vec2::new(3.0, -4.0)));

        assert_eq!(columns[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(columns[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(columns[2], [3.0, -4.0, 1.0, 0.0]);
    }
}
