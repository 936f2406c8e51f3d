// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Seeded weight initialisation helpers. Every builder threads an explicit
//! seed so that constructing the same module twice yields identical weights.

use crate::{MlpError, MlpResult, Tensor};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Normal;

/// Xavier/Glorot uniform initialisation over a `(rows, cols)` matrix.
pub fn xavier_uniform(rows: usize, cols: usize, seed: u64) -> MlpResult<Tensor> {
    if rows == 0 || cols == 0 {
        return Err(MlpError::InvalidDimensions { rows, cols });
    }
    let limit = (6.0f32 / (rows + cols) as f32).sqrt();
    let dist = Uniform::new_inclusive(-limit, limit);
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Tensor::from_shape_fn((rows, cols), |_| dist.sample(&mut rng)))
}

/// He-normal initialisation, scaled for ReLU stacks.
pub fn he_normal(rows: usize, cols: usize, seed: u64) -> MlpResult<Tensor> {
    if rows == 0 || cols == 0 {
        return Err(MlpError::InvalidDimensions { rows, cols });
    }
    let std_dev = (2.0f32 / rows as f32).sqrt();
    let dist = Normal::new(0.0f32, std_dev).map_err(|_| MlpError::InvalidValue {
        label: "he_normal std deviation",
    })?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Tensor::from_shape_fn((rows, cols), |_| dist.sample(&mut rng)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xavier_is_deterministic_per_seed() {
        let a = xavier_uniform(4, 3, 7).unwrap();
        let b = xavier_uniform(4, 3, 7).unwrap();
        let c = xavier_uniform(4, 3, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn xavier_respects_fan_bound() {
        let w = xavier_uniform(10, 10, 1).unwrap();
        let limit = (6.0f32 / 20.0).sqrt();
        assert!(w.iter().all(|v| v.abs() <= limit));
    }

    #[test]
    fn he_is_deterministic_per_seed() {
        let a = he_normal(6, 4, 13).unwrap();
        let b = he_normal(6, 4, 13).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_axis_is_rejected() {
        assert!(matches!(
            xavier_uniform(0, 3, 1),
            Err(MlpError::InvalidDimensions { rows: 0, cols: 3 })
        ));
        assert!(matches!(
            he_normal(3, 0, 1),
            Err(MlpError::InvalidDimensions { rows: 3, cols: 0 })
        ));
    }
}
