//! Elevation sample grid

use std::path::Path;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::types::Result;

/// A 2D grid of elevation samples. Immutable once built.
#[derive(Clone, Debug)]
pub struct HeightField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl HeightField {
    /// Wrap an existing sample buffer; `data.len()` must equal `width * height`
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), width * height, "sample count mismatch");
        Self {
            width,
            height,
            data,
        }
    }

    /// A grid where every sample is `value`
    pub fn flat(width: usize, height: usize, value: f32) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    /// Build from a per-sample function of grid coordinates
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for z in 0..height {
            for x in 0..width {
                data.push(f(x, z));
            }
        }
        Self::new(width, height, data)
    }

    /// Load a grayscale heightmap image, remapping luminance linearly to
    /// `[min_height, max_height]`
    pub fn from_image(path: impl AsRef<Path>, min_height: f32, max_height: f32) -> Result<Self> {
        let img = image::open(path)?.to_luma8();
        let (width, height) = img.dimensions();
        let span = max_height - min_height;
        let data = img
            .pixels()
            .map(|p| min_height + p.0[0] as f32 / 255.0 * span)
            .collect();
        Ok(Self::new(width as usize, height as usize, data))
    }

    /// Generate from fractal Brownian motion noise
    pub fn from_fbm(
        width: usize,
        height: usize,
        seed: u32,
        scale: f32,
        min_height: f32,
        max_height: f32,
    ) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(4)
            .set_persistence(0.5);
        let span = max_height - min_height;
        Self::from_fn(width, height, |x, z| {
            let nx = x as f64 / scale as f64;
            let nz = z as f64 / scale as f64;
            // noise is in [-1, 1]
            let normalized = (fbm.get([nx, nz]) as f32 + 1.0) / 2.0;
            min_height + normalized * span
        })
    }

    /// Grid width in samples
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in samples
    pub fn height(&self) -> usize {
        self.height
    }

    /// Elevation at grid coordinates; panics outside `[0, width) x [0, height)`
    pub fn get(&self, x: usize, z: usize) -> f32 {
        assert!(x < self.width && z < self.height);
        self.data[x + z * self.width]
    }

    /// Raw samples in row-major order
    pub fn samples(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field() {
        let field = HeightField::flat(4, 4, 2.5);
        assert_eq!(field.width(), 4);
        assert_eq!(field.height(), 4);
        for z in 0..4 {
            for x in 0..4 {
                assert_eq!(field.get(x, z), 2.5);
            }
        }
    }

    #[test]
    fn test_from_fn_indexing() {
        let field = HeightField::from_fn(3, 2, |x, z| (x + z * 3) as f32);
        assert_eq!(field.get(0, 0), 0.0);
        assert_eq!(field.get(2, 0), 2.0);
        assert_eq!(field.get(0, 1), 3.0);
        assert_eq!(field.get(2, 1), 5.0);
    }

    #[test]
    fn test_fbm_in_range() {
        let field = HeightField::from_fbm(16, 16, 7, 10.0, -40.0, 60.0);
        for &v in field.samples() {
            assert!((-40.0..=60.0).contains(&v));
        }
    }

    #[test]
    fn test_fbm_deterministic() {
        let a = HeightField::from_fbm(8, 8, 99, 5.0, 0.0, 1.0);
        let b = HeightField::from_fbm(8, 8, 99, 5.0, 0.0, 1.0);
        assert_eq!(a.samples(), b.samples());
    }
}
