// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

pub mod activation;
pub mod compressor;
pub mod decoder;
pub mod heads;
pub mod linear;
pub mod pre_encoder;
pub mod sequential;

pub use activation::Relu;
pub use compressor::Compressor;
pub use decoder::Decoder;
pub use heads::{Classifier, Regressor};
pub use linear::Linear;
pub use pre_encoder::PreEncoder;
pub use sequential::Sequential;
