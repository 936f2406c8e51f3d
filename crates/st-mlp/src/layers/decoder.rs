// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::layers::linear::Linear;
use crate::layers::sequential::Sequential;
use crate::layers::Relu;
use crate::module::{Module, Parameter};
use crate::{MlpResult, Tensor};

/// Reconstruction trunk mapping a concatenated latent vector back to the
/// original feature space. The output layer stays linear; reconstruction
/// targets are unbounded.
pub struct Decoder {
    net: Sequential,
    input_dim: usize,
    output_dim: usize,
}

impl core::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Decoder({} -> {}, layers={})",
            self.input_dim,
            self.output_dim,
            self.net.len()
        )
    }
}

impl Decoder {
    /// Builds `input_dim -> hidden_neurons -> output_dim` with a ReLU on
    /// the hidden layer only.
    pub fn new(
        name: impl Into<String>,
        input_dim: usize,
        output_dim: usize,
        hidden_neurons: usize,
        seed: u64,
    ) -> MlpResult<Self> {
        let name = name.into();
        let mut net = Sequential::new();
        net.push(Linear::he(
            format!("{name}::fc1"),
            input_dim,
            hidden_neurons,
            seed,
        )?);
        net.push(Relu::new());
        net.push(Linear::he(
            format!("{name}::fc2"),
            hidden_neurons,
            output_dim,
            seed.wrapping_add(1),
        )?);
        Ok(Self {
            net,
            input_dim,
            output_dim,
        })
    }

    /// Latent width the decoder was built against.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Feature width of the reconstruction.
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }
}

impl Module for Decoder {
    fn forward(&self, input: &Tensor) -> MlpResult<Tensor> {
        self.net.forward(input)
    }

    fn backward(&mut self, input: &Tensor, grad_output: &Tensor) -> MlpResult<Tensor> {
        self.net.backward(input, grad_output)
    }

    fn visit_parameters(
        &self,
        visitor: &mut dyn FnMut(&Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        self.net.visit_parameters(visitor)
    }

    fn visit_parameters_mut(
        &mut self,
        visitor: &mut dyn FnMut(&mut Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        self.net.visit_parameters_mut(visitor)
    }
}
