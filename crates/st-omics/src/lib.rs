// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Multi-space auto-encoding extractor for gene-expression data.
//!
//! An input expression batch runs through a shared trunk, is compressed
//! into a main latent space plus one latent subspace per configured
//! biological *signature* (regressor-supervised) and *phenotype*
//! (classifier-supervised), and is reconstructed from the ordered
//! concatenation of the active latent vectors. Losses, optimization, and
//! data loading live with the caller; this crate owns assembly and the
//! conditional forward pass.

pub mod config;
pub mod error;
pub mod extractor;
pub mod trace;

pub use config::{ExtractorConfig, GroupConfig, GroupSpec};
pub use error::{GroupKind, OmicsError, OmicsResult};
pub use extractor::{Extractor, ForwardOutput, ForwardPlan};
pub use trace::init_tracing;

pub use st_mlp::Tensor;
