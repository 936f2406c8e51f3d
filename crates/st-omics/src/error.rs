// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use st_mlp::MlpError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type OmicsResult<T> = Result<T, OmicsError>;

/// Which family of auxiliary latent groups a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Signature,
    Phenotype,
}

impl core::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GroupKind::Signature => write!(f, "signature"),
            GroupKind::Phenotype => write!(f, "phenotype"),
        }
    }
}

/// Errors raised while assembling the extractor or executing a forward pass.
#[derive(Error, Debug)]
pub enum OmicsError {
    /// A configured width was zero.
    #[error("invalid dimension for `{field}`: must be strictly positive")]
    InvalidDimension { field: String },
    /// Two groups of the same kind share a name.
    #[error("duplicate {kind} group `{name}`")]
    DuplicateGroup { kind: GroupKind, name: String },
    /// An explicit selection referenced a group absent from configuration.
    #[error("unknown {kind} group `{name}`")]
    UnknownGroup { kind: GroupKind, name: String },
    /// Reconstruction was requested without the main latent pass that seeds
    /// the concatenated latent vector.
    #[error("reconstruction requires the main latent pass to seed the latent concatenation")]
    MainLatentRequired,
    /// The accumulated latent width disagrees with the decoder's fixed
    /// input width.
    #[error("latent concatenation is {got} wide but the decoder expects {expected}")]
    LatentWidthMismatch { expected: usize, got: usize },
    /// Failure bubbled up from the underlying module library.
    #[error(transparent)]
    Mlp(#[from] MlpError),
    /// Wrapper around I/O failures when reading or writing configuration.
    #[error("config io failure: {message}")]
    ConfigIo { message: String },
    /// Wrapper around serde failures when parsing configuration.
    #[error("config parse failure: {message}")]
    ConfigParse { message: String },
}
