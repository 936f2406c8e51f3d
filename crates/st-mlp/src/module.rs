// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::{MlpError, MlpResult, Tensor};
use std::collections::HashMap;

/// Trainable tensor with a canonical name and a Euclidean gradient
/// accumulator. Gradients are populated by `Module::backward` and consumed
/// by whichever optimizer drives `apply_step` between forward passes.
pub struct Parameter {
    name: String,
    value: Tensor,
    gradient: Option<Tensor>,
}

impl core::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (rows, cols) = self.value.dim();
        write!(
            f,
            "Parameter(name={},shape=({},{}),has_grad={})",
            self.name,
            rows,
            cols,
            self.gradient.is_some()
        )
    }
}

impl Parameter {
    /// Creates a new parameter with the provided tensor value.
    pub fn new(name: impl Into<String>, value: Tensor) -> Self {
        Self {
            name: name.into(),
            value,
            gradient: None,
        }
    }

    /// Returns the identifier assigned to the parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provides an immutable view into the underlying tensor value.
    pub fn value(&self) -> &Tensor {
        &self.value
    }

    /// Provides a mutable view into the underlying tensor value.
    pub fn value_mut(&mut self) -> &mut Tensor {
        &mut self.value
    }

    /// Returns the currently accumulated gradient, if any.
    pub fn gradient(&self) -> Option<&Tensor> {
        self.gradient.as_ref()
    }

    /// Adds `grad` into the accumulator, allocating it on first use.
    pub fn accumulate(&mut self, grad: &Tensor) -> MlpResult<()> {
        if grad.dim() != self.value.dim() {
            return Err(MlpError::ShapeMismatch {
                left: self.value.dim(),
                right: grad.dim(),
            });
        }
        match self.gradient.as_mut() {
            Some(existing) => *existing += grad,
            None => self.gradient = Some(grad.clone()),
        }
        Ok(())
    }

    /// Drops any accumulated gradient.
    pub fn zero_gradient(&mut self) {
        self.gradient = None;
    }

    /// Applies one plain gradient-descent step and clears the accumulator.
    pub fn apply_step(&mut self, learning_rate: f32) -> MlpResult<()> {
        if let Some(grad) = self.gradient.take() {
            self.value.scaled_add(-learning_rate, &grad);
        }
        Ok(())
    }

    /// Replaces the parameter value with the provided tensor.
    pub fn load_value(&mut self, value: &Tensor) -> MlpResult<()> {
        if value.dim() != self.value.dim() {
            return Err(MlpError::ShapeMismatch {
                left: self.value.dim(),
                right: value.dim(),
            });
        }
        self.value = value.clone();
        Ok(())
    }
}

/// High-level module trait inspired by PyTorch's `nn.Module` but expressed
/// in pure Rust. Forward passes are shared-reference calls; backward passes
/// populate parameter accumulators for an external optimizer.
pub trait Module {
    /// Runs a forward pass.
    fn forward(&self, input: &Tensor) -> MlpResult<Tensor>;

    /// Propagates a gradient backwards. Implementations should populate the
    /// relevant parameter accumulators before returning the gradient with
    /// respect to `input`.
    fn backward(&mut self, input: &Tensor, grad_output: &Tensor) -> MlpResult<Tensor>;

    /// Visits immutable parameters.
    fn visit_parameters(
        &self,
        visitor: &mut dyn FnMut(&Parameter) -> MlpResult<()>,
    ) -> MlpResult<()>;

    /// Visits mutable parameters.
    fn visit_parameters_mut(
        &mut self,
        visitor: &mut dyn FnMut(&mut Parameter) -> MlpResult<()>,
    ) -> MlpResult<()>;

    /// Applies every pending parameter update.
    fn apply_step(&mut self, learning_rate: f32) -> MlpResult<()> {
        self.visit_parameters_mut(&mut |param| param.apply_step(learning_rate))
    }

    /// Clears accumulators across every parameter.
    fn zero_accumulators(&mut self) -> MlpResult<()> {
        self.visit_parameters_mut(&mut |param| {
            param.zero_gradient();
            Ok(())
        })
    }

    /// Captures a copy of every parameter tensor keyed by its canonical name.
    fn state_dict(&self) -> MlpResult<HashMap<String, Tensor>> {
        let mut state = HashMap::new();
        self.visit_parameters(&mut |param| {
            state.insert(param.name().to_string(), param.value().clone());
            Ok(())
        })?;
        Ok(state)
    }

    /// Restores parameters from a state dictionary produced by
    /// [`Module::state_dict`].
    fn load_state_dict(&mut self, state: &HashMap<String, Tensor>) -> MlpResult<()> {
        self.visit_parameters_mut(&mut |param| {
            let Some(value) = state.get(param.name()) else {
                return Err(MlpError::MissingParameter {
                    name: param.name().to_string(),
                });
            };
            param.load_value(value)
        })
    }

    /// Total number of scalar weights reachable through parameter visits.
    fn parameter_count(&self) -> MlpResult<usize> {
        let mut total = 0usize;
        self.visit_parameters(&mut |param| {
            total += param.value().len();
            Ok(())
        })?;
        Ok(total)
    }
}
