//! Fractal noise jitter of atlas column selection

use noise::{NoiseFn, Value};

use super::config::NoiseJitterConfig;

/// Per-cell atlas column offset from multi-octave value noise.
///
/// Offsets are whole atlas columns so a jittered face still samples a
/// single texel column.
#[derive(Clone, Debug)]
pub struct UvJitter {
    noise: Value,
    scale: f64,
    octaves: u32,
    lacunarity: f64,
    persistence: f64,
    /// `factor * step`, the largest shift in columns
    strength: f32,
    du: f32,
}

impl UvJitter {
    /// Jitter for an atlas whose columns are `du` wide in UV space
    pub fn new(config: &NoiseJitterConfig, du: f32) -> Self {
        Self {
            noise: Value::new(config.seed),
            scale: config.scale as f64,
            octaves: config.octaves,
            lacunarity: config.lacunarity as f64,
            persistence: config.persistence as f64,
            strength: config.factor * config.step as f32,
            du,
        }
    }

    /// Whether any cell can receive a non-zero offset
    pub fn is_active(&self) -> bool {
        self.octaves > 0 && self.strength != 0.0
    }

    /// Normalized fractal noise in [-1, 1] at global cell `(gx, gy)`
    pub fn fractal(&self, gx: u32, gy: u32) -> f64 {
        let mut point = [gx as f64 * self.scale, gy as f64 * self.scale];
        let mut amplitude = 1.0;
        let mut total_amplitude = 0.0;
        let mut sum = 0.0;

        for _ in 0..self.octaves {
            sum += self.noise.get(point) * amplitude;
            total_amplitude += amplitude;
            point[0] *= self.lacunarity;
            point[1] *= self.lacunarity;
            amplitude *= self.persistence;
        }

        if total_amplitude == 0.0 {
            return 0.0;
        }
        sum / total_amplitude
    }

    /// Whole atlas columns to shift cell `(gx, gy)` by
    pub fn column_offset(&self, gx: u32, gy: u32) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        (self.fractal(gx, gy) as f32 * self.strength).round_ties_even()
    }

    /// Column offset converted to a U offset
    pub fn u_offset(&self, gx: u32, gy: u32) -> f32 {
        self.column_offset(gx, gy) * self.du
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jitter(factor: f32, step: i32) -> UvJitter {
        let config = NoiseJitterConfig {
            factor,
            step,
            ..Default::default()
        };
        UvJitter::new(&config, 1.0 / 64.0)
    }

    #[test]
    fn test_inactive_by_default() {
        let j = UvJitter::new(&NoiseJitterConfig::default(), 1.0 / 64.0);
        assert!(!j.is_active());
        assert_eq!(j.u_offset(3, 7), 0.0);
    }

    #[test]
    fn test_zero_octaves_is_inactive() {
        let config = NoiseJitterConfig {
            octaves: 0,
            factor: 1.0,
            step: 4,
            ..Default::default()
        };
        let j = UvJitter::new(&config, 0.5);
        assert_eq!(j.fractal(1, 1), 0.0);
        assert_eq!(j.column_offset(1, 1), 0.0);
    }

    #[test]
    fn test_fractal_in_range() {
        let j = jitter(1.0, 8);
        for gy in 0..16 {
            for gx in 0..16 {
                let n = j.fractal(gx, gy);
                assert!((-1.0..=1.0).contains(&n), "noise {} out of range at ({}, {})", n, gx, gy);
            }
        }
    }

    #[test]
    fn test_offset_is_whole_columns_within_strength() {
        let j = jitter(0.5, 8);
        for gy in 0..16 {
            for gx in 0..16 {
                let cols = j.column_offset(gx, gy);
                assert_eq!(cols, cols.round());
                assert!(cols.abs() <= 4.0);
                assert_eq!(j.u_offset(gx, gy), cols / 64.0);
            }
        }
    }

    #[test]
    fn test_offset_varies_between_cells() {
        let j = jitter(1.0, 8);
        let first = j.column_offset(0, 0);
        let varied = (0..8)
            .flat_map(|gy| (0..8).map(move |gx| (gx, gy)))
            .any(|(gx, gy)| j.column_offset(gx, gy) != first);
        assert!(varied);
    }

    #[test]
    fn test_deterministic() {
        let a = jitter(1.0, 8);
        let b = jitter(1.0, 8);
        for i in 0..32 {
            assert_eq!(a.column_offset(i, i * 3), b.column_offset(i, i * 3));
        }
    }
}
