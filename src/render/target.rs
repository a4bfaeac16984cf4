//! Off-screen render targets

/// Shadow map resolution
pub const SHADOW_SIZE: u32 = 4096;
/// Reflection target resolution (deliberately low, the water blurs it)
pub const REFLECTION_SIZE: (u32, u32) = (320, 180);
/// Refraction target resolution
pub const REFRACTION_SIZE: (u32, u32) = (1280, 720);

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn make_depth(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Depth-only target for the shadow pass, sampled with a comparison sampler
pub struct ShadowTarget {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl ShadowTarget {
    pub fn new(device: &wgpu::Device) -> Self {
        let view = make_depth(device, "shadow_map", SHADOW_SIZE, SHADOW_SIZE);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self { view, sampler }
    }
}

/// Color + depth target for the reflection and refraction passes
pub struct OffscreenTarget {
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, label: &str, (width, height): (u32, u32)) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = make_depth(device, label, width, height);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            color_view,
            depth_view,
            sampler,
            width,
            height,
        }
    }
}

/// Depth buffer for the composite pass, recreated on resize
pub struct MainDepth {
    pub view: wgpu::TextureView,
}

impl MainDepth {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            view: make_depth(device, "main_depth", width, height),
        }
    }
}
