// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::module::{Module, Parameter};
use crate::{MlpError, MlpResult, Tensor};

/// Lightweight ReLU activation. The layer is stateless and therefore does
/// not participate in parameter visits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Relu;

impl Relu {
    /// Creates a new ReLU layer.
    pub fn new() -> Self {
        Self
    }
}

impl Module for Relu {
    fn forward(&self, input: &Tensor) -> MlpResult<Tensor> {
        Ok(input.mapv(|value| value.max(0.0)))
    }

    fn backward(&mut self, input: &Tensor, grad_output: &Tensor) -> MlpResult<Tensor> {
        if input.dim() != grad_output.dim() {
            return Err(MlpError::ShapeMismatch {
                left: input.dim(),
                right: grad_output.dim(),
            });
        }
        let mut grad = grad_output.clone();
        grad.zip_mut_with(input, |g, &x| {
            if x <= 0.0 {
                *g = 0.0;
            }
        });
        Ok(grad)
    }

    fn visit_parameters(
        &self,
        _visitor: &mut dyn FnMut(&Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        Ok(())
    }

    fn visit_parameters_mut(
        &mut self,
        _visitor: &mut dyn FnMut(&mut Parameter) -> MlpResult<()>,
    ) -> MlpResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn relu_clamps_negatives() {
        let layer = Relu::new();
        let input = array![[-1.0f32, 0.0, 2.5]];
        assert_eq!(layer.forward(&input).unwrap(), array![[0.0f32, 0.0, 2.5]]);
    }

    #[test]
    fn relu_masks_gradients_by_input_sign() {
        let mut layer = Relu::new();
        let input = array![[-1.0f32, 3.0]];
        let grad_out = array![[5.0f32, 5.0]];
        let grad = layer.backward(&input, &grad_out).unwrap();
        assert_eq!(grad, array![[0.0f32, 5.0]]);
    }
}
