// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Fully-connected module library built on `ndarray` matrices.
//!
//! This crate offers a lightweight `nn.Module` style surface: a [`Module`]
//! trait with forward/backward passes and parameter visitation, named
//! [`Parameter`]s with Euclidean gradient accumulators, elementary layers
//! (`Linear`, `Relu`, `Sequential`), and the composite units consumed by
//! model crates — trunk encoders, latent compressors, supervision heads,
//! and reconstruction decoders. Losses and optimization policy are the
//! caller's business; modules only expose gradients and `apply_step`.

pub mod error;
pub mod init;
pub mod io;
pub mod layers;
pub mod module;

pub use error::{MlpError, MlpResult};
pub use io::{load_json, save_json};
pub use layers::{Classifier, Compressor, Decoder, Linear, PreEncoder, Regressor, Relu, Sequential};
pub use module::{Module, Parameter};

/// Dense row-major batch of feature vectors: `(batch, features)`.
pub type Tensor = ndarray::Array2<f32>;
