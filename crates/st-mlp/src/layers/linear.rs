// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::init::{he_normal, xavier_uniform};
use crate::module::{Module, Parameter};
use crate::{MlpError, MlpResult, Tensor};
use ndarray::Axis;

/// Fully-connected layer over row-major batches: `y = x · W + b`.
#[derive(Debug)]
pub struct Linear {
    weight: Parameter,
    bias: Parameter,
}

impl Linear {
    /// Creates a new linear layer with seeded Xavier-uniform weights and a
    /// zero bias.
    pub fn new(
        name: impl Into<String>,
        input_dim: usize,
        output_dim: usize,
        seed: u64,
    ) -> MlpResult<Self> {
        if input_dim == 0 || output_dim == 0 {
            return Err(MlpError::InvalidDimensions {
                rows: input_dim,
                cols: output_dim,
            });
        }
        let weights = xavier_uniform(input_dim, output_dim, seed)?;
        Ok(Self::with_weights(name.into(), weights))
    }

    /// Creates a linear layer with seeded He-normal weights, the scaling
    /// that keeps ReLU stacks from starving.
    pub fn he(
        name: impl Into<String>,
        input_dim: usize,
        output_dim: usize,
        seed: u64,
    ) -> MlpResult<Self> {
        let weights = he_normal(input_dim, output_dim, seed)?;
        Ok(Self::with_weights(name.into(), weights))
    }

    fn with_weights(name: String, weights: Tensor) -> Self {
        let bias = Tensor::zeros((1, weights.dim().1));
        Self {
            weight: Parameter::new(format!("{name}::weight"), weights),
            bias: Parameter::new(format!("{name}::bias"), bias),
        }
    }

    /// Returns a reference to the weight parameter.
    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    /// Returns a reference to the bias parameter.
    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    /// Feature width accepted by the layer.
    pub fn input_dim(&self) -> usize {
        self.weight.value().dim().0
    }

    /// Feature width produced by the layer.
    pub fn output_dim(&self) -> usize {
        self.weight.value().dim().1
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> MlpResult<Tensor> {
        if input.dim().1 != self.weight.value().dim().0 {
            return Err(MlpError::ShapeMismatch {
                left: input.dim(),
                right: self.weight.value().dim(),
            });
        }
        let out = input.dot(self.weight.value());
        Ok(out + self.bias.value())
    }

    fn backward(&mut self, input: &Tensor, grad_output: &Tensor) -> MlpResult<Tensor> {
        if input.dim().0 != grad_output.dim().0 {
            return Err(MlpError::ShapeMismatch {
                left: input.dim(),
                right: grad_output.dim(),
            });
        }
        if input.dim().1 != self.weight.value().dim().0
            || grad_output.dim().1 != self.weight.value().dim().1
        {
            return Err(MlpError::ShapeMismatch {
                left: input.dim(),
                right: grad_output.dim(),
            });
        }
        let batch = input.dim().0 as f32;
        let grad_w = input.t().dot(grad_output) / batch;
        self.weight.accumulate(&grad_w)?;

        let grad_b = grad_output.sum_axis(Axis(0)).insert_axis(Axis(0)) / batch;
        self.bias.accumulate(&grad_b)?;

        Ok(grad_output.dot(&self.weight.value().t()))
    }

    fn visit_parameters(
        &self,
        visitor: &mut dyn FnMut(&Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        visitor(&self.weight)?;
        visitor(&self.bias)?;
        Ok(())
    }

    fn visit_parameters_mut(
        &mut self,
        visitor: &mut dyn FnMut(&mut Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        visitor(&mut self.weight)?;
        visitor(&mut self.bias)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn linear_forward_matches_manual() {
        let layer = Linear::new("fc", 3, 2, 11).unwrap();
        let input = array![[1.0f32, -2.0, 0.5]];
        let output = layer.forward(&input).unwrap();
        let expected = input.dot(layer.weight.value()) + layer.bias.value();
        assert_eq!(output, expected);
    }

    #[test]
    fn linear_rejects_wrong_width() {
        let layer = Linear::new("fc", 3, 2, 11).unwrap();
        let input = Tensor::zeros((1, 4));
        assert!(matches!(
            layer.forward(&input),
            Err(MlpError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn linear_backward_matches_analytic_gradients() {
        let mut layer = Linear::new("fc", 2, 1, 3).unwrap();
        let input = array![[1.0f32, 2.0], [3.0, 4.0]];
        let grad_out = array![[1.0f32], [1.0]];
        let grad_in = layer.backward(&input, &grad_out).unwrap();

        // dL/dW = xᵀ·g / batch
        let grad_w = layer.weight().gradient().unwrap();
        assert_abs_diff_eq!(grad_w[[0, 0]], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grad_w[[1, 0]], 3.0, epsilon = 1e-6);

        let grad_b = layer.bias().gradient().unwrap();
        assert_abs_diff_eq!(grad_b[[0, 0]], 1.0, epsilon = 1e-6);

        // dL/dx = g·Wᵀ
        let expected = grad_out.dot(&layer.weight().value().t());
        assert_eq!(grad_in, expected);
    }

    #[test]
    fn apply_step_moves_outputs() {
        let mut layer = Linear::new("fc", 4, 3, 5).unwrap();
        let input = Tensor::ones((2, 4));
        let before = layer.forward(&input).unwrap();
        let grad = Tensor::ones((2, 3));
        let _ = layer.backward(&input, &grad).unwrap();
        layer.apply_step(0.1).unwrap();
        let after = layer.forward(&input).unwrap();
        assert_ne!(before, after);
    }
}
