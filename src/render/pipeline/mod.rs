//! Render pipelines for the four passes

pub mod particle;
pub mod scene;
pub mod shadow;
pub mod sky;
pub mod water;

pub use particle::ParticlePipeline;
pub use scene::ScenePipeline;
pub use shadow::ShadowPipeline;
pub use sky::SkyPipeline;
pub use water::WaterPipeline;

/// Bind group layouts shared across pipelines: per-pass globals (group 0)
/// and per-object uniforms
pub struct SharedLayouts {
    pub globals: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
}

impl SharedLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        Self { globals, object }
    }
}
