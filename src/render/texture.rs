//! Sampled texture upload

use std::path::Path;

use crate::core::types::Result;
use crate::terrain::HeightField;

/// A sampled 2D texture with its view and sampler
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Upload RGBA8 pixel data
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Load an image file
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let img = image::open(path.as_ref())?.to_rgba8();
        let (width, height) = img.dimensions();
        let label = path.as_ref().to_string_lossy();
        Ok(Self::from_rgba(device, queue, &label, width, height, &img))
    }

    /// Single-pixel white texture, bound when an object has no diffuse map
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, "white", 1, 1, &[255, 255, 255, 255])
    }

    /// Upload a height field (values in `[0, 255]`) as a grayscale texture
    /// with full alpha; used for the scrolling cloud coverage map.
    pub fn from_field(device: &wgpu::Device, queue: &wgpu::Queue, field: &HeightField) -> Self {
        let pixels: Vec<u8> = field
            .samples()
            .iter()
            .flat_map(|&v| {
                let g = v.clamp(0.0, 255.0) as u8;
                [g, g, g, g]
            })
            .collect();
        Self::from_rgba(
            device,
            queue,
            "cloud_map",
            field.width() as u32,
            field.height() as u32,
            &pixels,
        )
    }
}
