//! Band-limited cloud noise: coarse hash field, octave upsampling, and an
//! exponential contrast filter carving the cloud coverage shape.

use crate::terrain::HeightField;

/// Side length of the coarse noise field
pub const COARSE_SIZE: usize = 32;
/// Side length of the generated map
pub const MAP_SIZE: usize = 256;

/// Cloud-coverage noise generator.
///
/// Deterministic: the same coordinate hash always produces the same map,
/// so terrain variants are reproducible.
#[derive(Clone, Copy, Debug)]
pub struct CloudNoise {
    /// Coverage constant for the contrast filter
    pub cover: f32,
    /// Sharpness base for the contrast filter, in (0, 1)
    pub sharpness: f32,
}

impl Default for CloudNoise {
    fn default() -> Self {
        Self {
            cover: 20.0,
            sharpness: 0.95,
        }
    }
}

impl CloudNoise {
    /// Generate a `256x256` field with samples in `[0, 255]`.
    ///
    /// `hash` maps integer coordinates to a value in `[-1, 1]`.
    pub fn generate(&self, hash: impl Fn(i32, i32) -> f32) -> HeightField {
        let coarse = coarse_field(hash);
        let mut map = overlap_octaves(&coarse);
        self.exp_filter(&mut map);
        HeightField::new(MAP_SIZE, MAP_SIZE, map)
    }

    /// Contrast shaping: compress everything below the coverage threshold
    /// toward 0 and push values above it toward 255, preserving peaks.
    fn exp_filter(&self, map: &mut [f32]) {
        for v in map.iter_mut() {
            let c = (*v - (255.0 - self.cover)).max(0.0);
            *v = 255.0 - self.sharpness.powf(c) * 255.0;
        }
    }
}

/// Build the smoothed `32x32` coarse field from the coordinate hash.
///
/// Raw values in `[0, 256)` fill a `34x34` buffer whose one-cell border
/// wraps toroidally, making the field tileable. Each output cell is a
/// 3x3 smoothing stencil over the padded buffer: the center weighted 1/4,
/// the four direct neighbors 1/2 in total, the four diagonals the rest,
/// so a constant field passes through unchanged.
pub fn coarse_field(hash: impl Fn(i32, i32) -> f32) -> Vec<f32> {
    const N: usize = COARSE_SIZE + 2;
    let mut temp = [[0.0f32; N]; N];

    for i in 1..=COARSE_SIZE {
        for j in 1..=COARSE_SIZE {
            temp[i][j] = 128.0 + hash(i as i32, j as i32) * 128.0;
        }
    }

    // toroidal border: rows/cols 0 and 33 mirror 32 and 1
    for i in 1..=COARSE_SIZE {
        temp[0][i] = temp[COARSE_SIZE][i];
        temp[N - 1][i] = temp[1][i];
        temp[i][0] = temp[i][COARSE_SIZE];
        temp[i][N - 1] = temp[i][1];
    }
    temp[0][0] = temp[COARSE_SIZE][COARSE_SIZE];
    temp[N - 1][N - 1] = temp[1][1];
    temp[0][N - 1] = temp[COARSE_SIZE][1];
    temp[N - 1][0] = temp[1][COARSE_SIZE];

    let mut coarse = vec![0.0f32; COARSE_SIZE * COARSE_SIZE];
    for i in 1..=COARSE_SIZE {
        for j in 1..=COARSE_SIZE {
            let center = temp[i][j] / 4.0;
            let sides = (temp[i + 1][j] + temp[i - 1][j] + temp[i][j + 1] + temp[i][j - 1]) / 8.0;
            let corners = (temp[i + 1][j + 1]
                + temp[i + 1][j - 1]
                + temp[i - 1][j + 1]
                + temp[i - 1][j - 1])
                / 16.0;
            coarse[(i - 1) * COARSE_SIZE + (j - 1)] = center + sides + corners;
        }
    }
    coarse
}

/// Sum four octaves of toroidally wrapped bilinear upsampling: octave `k`
/// samples the coarse field at `coordinate * 2^(k-3)` and contributes with
/// amplitude `1 / 2^k`.
fn overlap_octaves(coarse: &[f32]) -> Vec<f32> {
    let mut map = vec![0.0f32; MAP_SIZE * MAP_SIZE];
    for octave in 0..4 {
        let scale = 1.0 / 2.0f32.powi(3 - octave);
        let amplitude = 2.0f32.powi(octave);
        for y in 0..MAP_SIZE {
            for x in 0..MAP_SIZE {
                let noise = interpolate(coarse, x as f32 * scale, y as f32 * scale);
                map[y * MAP_SIZE + x] += noise / amplitude;
            }
        }
    }
    map
}

/// Bilinear interpolation with indices wrapped modulo the coarse size
fn interpolate(coarse: &[f32], x: f32, y: f32) -> f32 {
    let xi = x as usize;
    let yi = y as usize;
    let x_frac = x - xi as f32;
    let y_frac = y - yi as f32;

    let x0 = xi % COARSE_SIZE;
    let y0 = yi % COARSE_SIZE;
    let x1 = (xi + 1) % COARSE_SIZE;
    let y1 = (yi + 1) % COARSE_SIZE;

    let at = |x: usize, y: usize| coarse[x * COARSE_SIZE + y];

    let bot = at(x0, y0) + x_frac * (at(x1, y0) - at(x0, y0));
    let top = at(x0, y1) + x_frac * (at(x1, y1) - at(x0, y1));
    bot + y_frac * (top - bot)
}

/// Default coordinate hash, mapping integer coordinates to `[-1, 1]`.
/// Same coordinates always produce the same value.
pub fn coordinate_hash(x: i32, y: i32) -> f32 {
    let mut h = (x as u32)
        .wrapping_mul(374761393)
        .wrapping_add((y as u32).wrapping_mul(668265263));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h ^= h >> 16;
    (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32 * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let noise = CloudNoise::default();
        let a = noise.generate(coordinate_hash);
        let b = noise.generate(coordinate_hash);
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn test_output_range() {
        let map = CloudNoise::default().generate(coordinate_hash);
        for &v in map.samples() {
            assert!((0.0..=255.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_zero_hash_coarse_is_uniform() {
        let coarse = coarse_field(|_, _| 0.0);
        for &v in &coarse {
            assert!((v - 128.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_zero_hash_closed_form() {
        // coarse uniformly 128 => octave sum 128 * (1 + 1/2 + 1/4 + 1/8) = 240,
        // then v = 255 - 0.95^(240 - 235) * 255
        let map = CloudNoise::default().generate(|_, _| 0.0);
        let expected = 255.0 - 0.95f32.powf(5.0) * 255.0;
        for &v in map.samples() {
            assert!((v - expected).abs() < 1e-2, "{} vs {}", v, expected);
        }
    }

    #[test]
    fn test_hash_is_stable_and_bounded() {
        for x in -20..20 {
            for y in -20..20 {
                let v = coordinate_hash(x, y);
                assert!((-1.0..=1.0).contains(&v));
                assert_eq!(v, coordinate_hash(x, y));
            }
        }
    }
}
