// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::layers::linear::Linear;
use crate::module::{Module, Parameter};
use crate::{MlpResult, Tensor};

/// Affine projection from the shared trunk representation into one latent
/// subspace. Kept linear so latent coordinates stay unbounded.
#[derive(Debug)]
pub struct Compressor {
    linear: Linear,
}

impl Compressor {
    /// Creates a compressor projecting `input_dim -> latent_dim`.
    pub fn new(
        name: impl Into<String>,
        input_dim: usize,
        latent_dim: usize,
        seed: u64,
    ) -> MlpResult<Self> {
        Ok(Self {
            linear: Linear::new(name, input_dim, latent_dim, seed)?,
        })
    }

    /// Width of the latent subspace this unit produces.
    pub fn latent_dim(&self) -> usize {
        self.linear.output_dim()
    }
}

impl Module for Compressor {
    fn forward(&self, input: &Tensor) -> MlpResult<Tensor> {
        self.linear.forward(input)
    }

    fn backward(&mut self, input: &Tensor, grad_output: &Tensor) -> MlpResult<Tensor> {
        self.linear.backward(input, grad_output)
    }

    fn visit_parameters(
        &self,
        visitor: &mut dyn FnMut(&Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        self.linear.visit_parameters(visitor)
    }

    fn visit_parameters_mut(
        &mut self,
        visitor: &mut dyn FnMut(&mut Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        self.linear.visit_parameters_mut(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressor_narrows_to_latent_width() {
        let unit = Compressor::new("lat", 8, 2, 4).unwrap();
        let out = unit.forward(&Tensor::ones((5, 8))).unwrap();
        assert_eq!(out.dim(), (5, 2));
        assert_eq!(unit.latent_dim(), 2);
    }
}
