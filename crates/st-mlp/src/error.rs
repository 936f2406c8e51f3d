// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type MlpResult<T> = Result<T, MlpError>;

/// Errors emitted by module constructors, forward/backward passes, and io.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MlpError {
    /// A constructor received a zero-width axis.
    #[error("invalid layer dimensions ({rows} x {cols}); both axes must be non-zero")]
    InvalidDimensions { rows: usize, cols: usize },
    /// An operator was asked to combine tensors of incompatible shapes.
    #[error("shape mismatch: left={left:?}, right={right:?} cannot be combined")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// Raw data handed to a tensor builder does not match the declared shape.
    #[error("data length mismatch: expected {expected}, got {got}")]
    DataLength { expected: usize, got: usize },
    /// A state dict was missing one of the parameters a module declares.
    #[error("missing parameter `{name}` in state dict")]
    MissingParameter { name: String },
    /// Generic configuration violation for construction helpers.
    #[error("invalid value for {label}")]
    InvalidValue { label: &'static str },
    /// Wrapper around I/O failures when persisting or restoring parameters.
    #[error("io failure: {message}")]
    Io { message: String },
    /// Wrapper around serde failures when (de)serialising snapshots.
    #[error("serialization failure: {message}")]
    Serialization { message: String },
}
