// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::layers::linear::Linear;
use crate::layers::sequential::Sequential;
use crate::layers::Relu;
use crate::module::{Module, Parameter};
use crate::{MlpResult, Tensor};

/// Two-layer ReLU trunk that turns raw feature vectors into the shared
/// representation every downstream compressor consumes.
pub struct PreEncoder {
    net: Sequential,
    input_dim: usize,
    output_dim: usize,
}

impl core::fmt::Debug for PreEncoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "PreEncoder({} -> {}, layers={})",
            self.input_dim,
            self.output_dim,
            self.net.len()
        )
    }
}

impl PreEncoder {
    /// Builds `input_dim -> hidden_neurons -> output_dim` with ReLU after
    /// each affine map.
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
        net.push(Relu::new());
        Ok(Self {
            net,
            input_dim,
            output_dim,
        })
    }

    /// Feature width accepted by the trunk.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Width of the shared representation.
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }
}

impl Module for PreEncoder {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_maps_to_configured_width() {
        let trunk = PreEncoder::new("pre", 10, 4, 6, 42).unwrap();
        let batch = Tensor::ones((3, 10));
        let out = trunk.forward(&batch).unwrap();
        assert_eq!(out.dim(), (3, 4));
        assert!(out.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn trunk_construction_is_deterministic() {
        let a = PreEncoder::new("pre", 5, 3, 4, 9).unwrap();
        let b = PreEncoder::new("pre", 5, 3, 4, 9).unwrap();
        assert_eq!(a.state_dict().unwrap(), b.state_dict().unwrap());
    }
}
