// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Supervision heads attached to individual latent subspaces. Both are
//! single affine maps; whatever loss interprets their outputs lives in the
//! training loop, not here.

use crate::layers::linear::Linear;
use crate::module::{Module, Parameter};
use crate::{MlpResult, Tensor};

/// Linear head predicting continuous targets from a latent subspace.
#[derive(Debug)]
pub struct Regressor {
    linear: Linear,
}

impl Regressor {
    /// Creates a regressor mapping `latent_dim -> output_dim`.
    pub fn new(
        name: impl Into<String>,
        latent_dim: usize,
        output_dim: usize,
        seed: u64,
    ) -> MlpResult<Self> {
        Ok(Self {
            linear: Linear::new(name, latent_dim, output_dim, seed)?,
        })
    }

    /// Width of the predicted target vector.
    pub fn output_dim(&self) -> usize {
        self.linear.output_dim()
    }
}

impl Module for Regressor {
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

/// Linear head producing unnormalised class logits from a latent subspace.
#[derive(Debug)]
pub struct Classifier {
    linear: Linear,
}

impl Classifier {
    /// Creates a classifier mapping `latent_dim -> num_classes`.
    pub fn new(
        name: impl Into<String>,
        latent_dim: usize,
        num_classes: usize,
        seed: u64,
    ) -> MlpResult<Self> {
        Ok(Self {
            linear: Linear::new(name, latent_dim, num_classes, seed)?,
        })
    }

    /// Number of classes scored by the head.
    pub fn num_classes(&self) -> usize {
        self.linear.output_dim()
    }
}

impl Module for Classifier {
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
