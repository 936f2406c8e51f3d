// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! The extractor model: a shared trunk feeding a main latent space plus one
//! latent subspace per configured signature and phenotype group, each with
//! its own supervision head, and a decoder that reconstructs the input from
//! the ordered concatenation of the active latent vectors.

use crate::config::ExtractorConfig;
use crate::error::{GroupKind, OmicsError, OmicsResult};
use ndarray::s;
use st_mlp::{
    Classifier, Compressor, Decoder, Module, Parameter, PreEncoder, Regressor, Tensor,
};
use std::collections::HashMap;
use tracing::info;

/// Hands every unit its own initialisation stream. Composite units derive a
/// second stream internally, hence the stride of two.
struct SeedSequence {
    state: u64,
}

impl SeedSequence {
    fn new(state: u64) -> Self {
        Self { state }
    }

    fn next(&mut self) -> u64 {
        let seed = self.state;
        self.state = self.state.wrapping_add(2);
        seed
    }
}

/// Selects which parts of the extractor a forward call runs.
///
/// `signature` / `pheno` gate whether the corresponding latent vectors join
/// the concatenation consumed by the decoder; supervision outputs are
/// always produced for every active group. `selected_*` restricts the
/// active groups to an explicit subset; `None` means every configured
/// group, snapshotted at call time.
#[derive(Debug, Clone)]
pub struct ForwardPlan {
    pub main_latent: bool,
    pub signature: bool,
    pub selected_signatures: Option<Vec<String>>,
    pub pheno: bool,
    pub selected_phenos: Option<Vec<String>>,
    pub reconstruction: bool,
}

impl Default for ForwardPlan {
    fn default() -> Self {
        Self::full()
    }
}

impl ForwardPlan {
    /// Runs everything: main latent, all groups, reconstruction.
    pub fn full() -> Self {
        Self {
            main_latent: true,
            signature: true,
            selected_signatures: None,
            pheno: true,
            selected_phenos: None,
            reconstruction: true,
        }
    }

    /// Restricts the active signatures to an explicit subset.
    pub fn with_signatures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_signatures = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the active phenotypes to an explicit subset.
    pub fn with_phenos<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_phenos = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Everything one forward call produced. Entries are `None` (or empty maps)
/// when the corresponding part of the model was not requested; no entry is
/// ever partially populated.
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    /// The input batch, passed through untouched.
    pub input: Tensor,
    /// Main latent vectors, when `main_latent` was requested.
    pub latent_main: Option<Tensor>,
    /// Latent vectors per active signature group.
    pub latent_signatures: HashMap<String, Tensor>,
    /// Regressor outputs per active signature group.
    pub signature_outputs: HashMap<String, Tensor>,
    /// Latent vectors per active phenotype group.
    pub latent_phenos: HashMap<String, Tensor>,
    /// Classifier logits per active phenotype group.
    pub pheno_outputs: HashMap<String, Tensor>,
    /// Decoded expression profiles, when `reconstruction` was requested.
    pub reconstruction: Option<Tensor>,
    /// Ordered concatenation of every accumulated latent vector.
    pub latent_all: Option<Tensor>,
}

/// Multi-space auto-encoding extractor over gene-expression batches.
///
/// Assembled once from an [`ExtractorConfig`]; the unit registry and every
/// width are fixed from then on. Parameters only change through the
/// visitation API between forward calls.
pub struct Extractor {
    config: ExtractorConfig,
    total_latent_dim: usize,
    pre_encoder: PreEncoder,
    main_compressor: Compressor,
    signature_compressors: HashMap<String, Compressor>,
    signature_regressors: HashMap<String, Regressor>,
    pheno_compressors: HashMap<String, Compressor>,
    pheno_classifiers: HashMap<String, Classifier>,
    decoder: Decoder,
}

impl core::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Extractor(input_dim={}, trunk={:?}, main_latent_dim={}, signatures=[{}], phenotypes=[{}], decoder={:?})",
            self.config.input_dim,
            self.pre_encoder,
            self.config.main_latent_dim,
            self.config
                .signatures
                .names()
                .collect::<Vec<_>>()
                .join(", "),
            self.config
                .phenotypes
                .names()
                .collect::<Vec<_>>()
                .join(", "),
            self.decoder,
        )
    }
}

impl Extractor {
    /// Assembles the full unit registry from a validated config.
    pub fn new(config: ExtractorConfig) -> OmicsResult<Self> {
        config.validate()?;
        let mut seeds = SeedSequence::new(config.seed);

        let pre_encoder = PreEncoder::new(
            "pre_encoder",
            config.input_dim,
            config.encoder_neurons,
            config.encoder_neurons,
            seeds.next(),
        )?;

        let main_compressor = Compressor::new(
            "main_latent",
            config.encoder_neurons,
            config.main_latent_dim,
            seeds.next(),
        )?;

        let mut total_latent_dim = config.main_latent_dim;

        let mut signature_compressors = HashMap::new();
        for (name, spec) in config.signatures.iter() {
            total_latent_dim += spec.latent_dim;
            signature_compressors.insert(
                name.to_string(),
                Compressor::new(
                    format!("signature::{name}::compressor"),
                    config.encoder_neurons,
                    spec.latent_dim,
                    seeds.next(),
                )?,
            );
        }
        let mut signature_regressors = HashMap::new();
        for (name, spec) in config.signatures.iter() {
            signature_regressors.insert(
                name.to_string(),
                Regressor::new(
                    format!("signature::{name}::regressor"),
                    spec.latent_dim,
                    spec.output_dim,
                    seeds.next(),
                )?,
            );
        }

        let mut pheno_compressors = HashMap::new();
        for (name, spec) in config.phenotypes.iter() {
            total_latent_dim += spec.latent_dim;
            pheno_compressors.insert(
                name.to_string(),
                Compressor::new(
                    format!("pheno::{name}::compressor"),
                    config.encoder_neurons,
                    spec.latent_dim,
                    seeds.next(),
                )?,
            );
        }
        let mut pheno_classifiers = HashMap::new();
        for (name, spec) in config.phenotypes.iter() {
            pheno_classifiers.insert(
                name.to_string(),
                Classifier::new(
                    format!("pheno::{name}::classifier"),
                    spec.latent_dim,
                    spec.output_dim,
                    seeds.next(),
                )?,
            );
        }

        let decoder = Decoder::new(
            "decoder",
            total_latent_dim,
            config.input_dim,
            config.decoder_neurons,
            seeds.next(),
        )?;

        let extractor = Self {
            config,
            total_latent_dim,
            pre_encoder,
            main_compressor,
            signature_compressors,
            signature_regressors,
            pheno_compressors,
            pheno_classifiers,
            decoder,
        };

        if extractor.config.verbose {
            info!("model built: {:?}", extractor);
        }

        Ok(extractor)
    }

    /// The configuration the model was assembled from.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Combined width of every latent space; also the decoder input width.
    pub fn total_latent_dim(&self) -> usize {
        self.total_latent_dim
    }

    fn resolve_selection(
        &self,
        kind: GroupKind,
        selected: Option<&[String]>,
    ) -> OmicsResult<Vec<String>> {
        let groups = match kind {
            GroupKind::Signature => &self.config.signatures,
            GroupKind::Phenotype => &self.config.phenotypes,
        };
        match selected {
            Some(names) => {
                let mut resolved = Vec::with_capacity(names.len());
                for name in names {
                    if !groups.contains(name) {
                        return Err(OmicsError::UnknownGroup {
                            kind,
                            name: name.clone(),
                        });
                    }
                    resolved.push(name.clone());
                }
                Ok(resolved)
            }
            None => Ok(groups.names().map(str::to_string).collect()),
        }
    }

    fn group_unit<'a, M: Module>(
        units: &'a HashMap<String, M>,
        kind: GroupKind,
        name: &str,
    ) -> OmicsResult<&'a M> {
        units.get(name).ok_or_else(|| OmicsError::UnknownGroup {
            kind,
            name: name.to_string(),
        })
    }

    /// Runs the conditional forward pass.
    ///
    /// The trunk always runs. The main compressor, per-group compressors
    /// and heads, and the decoder run according to `plan`. Latent vectors
    /// join the concatenation in a fixed order — main first, then
    /// signatures, then phenotypes, each family in its active-set order —
    /// matching the width the decoder was built against.
    pub fn forward(&self, batch: &Tensor, plan: &ForwardPlan) -> OmicsResult<ForwardOutput> {
        // Resolve selections before any tensor work so an unknown name
        // aborts without a partial result.
        let active_signatures =
            self.resolve_selection(GroupKind::Signature, plan.selected_signatures.as_deref())?;
        let active_phenos =
            self.resolve_selection(GroupKind::Phenotype, plan.selected_phenos.as_deref())?;
        if plan.reconstruction && !plan.main_latent {
            return Err(OmicsError::MainLatentRequired);
        }

        let x = self.pre_encoder.forward(batch)?;

        let mut latent_main = None;
        let mut parts: Vec<Tensor> = Vec::new();
        if plan.main_latent {
            let lat = self.main_compressor.forward(&x)?;
            parts.push(lat.clone());
            latent_main = Some(lat);
        }

        let mut latent_signatures = HashMap::new();
        let mut signature_outputs = HashMap::new();
        for name in &active_signatures {
            let compressor =
                Self::group_unit(&self.signature_compressors, GroupKind::Signature, name)?;
            let lat = compressor.forward(&x)?;
            if plan.reconstruction || plan.signature {
                parts.push(lat.clone());
            }
            let regressor =
                Self::group_unit(&self.signature_regressors, GroupKind::Signature, name)?;
            signature_outputs.insert(name.clone(), regressor.forward(&lat)?);
            latent_signatures.insert(name.clone(), lat);
        }

        let mut latent_phenos = HashMap::new();
        let mut pheno_outputs = HashMap::new();
        for name in &active_phenos {
            let compressor =
                Self::group_unit(&self.pheno_compressors, GroupKind::Phenotype, name)?;
            let lat = compressor.forward(&x)?;
            if plan.reconstruction || plan.pheno {
                parts.push(lat.clone());
            }
            let classifier =
                Self::group_unit(&self.pheno_classifiers, GroupKind::Phenotype, name)?;
            pheno_outputs.insert(name.clone(), classifier.forward(&lat)?);
            latent_phenos.insert(name.clone(), lat);
        }

        let latent_all = if parts.is_empty() {
            None
        } else {
            Some(concat_columns(&parts))
        };

        let reconstruction = if plan.reconstruction {
            // `main_latent` is enforced above, so the concatenation exists;
            // it can still be narrower than the decoder when an explicit
            // subset skipped groups.
            let all = latent_all.as_ref().ok_or(OmicsError::MainLatentRequired)?;
            if all.dim().1 != self.decoder.input_dim() {
                return Err(OmicsError::LatentWidthMismatch {
                    expected: self.decoder.input_dim(),
                    got: all.dim().1,
                });
            }
            Some(self.decoder.forward(all)?)
        } else {
            None
        };

        Ok(ForwardOutput {
            input: batch.clone(),
            latent_main,
            latent_signatures,
            signature_outputs,
            latent_phenos,
            pheno_outputs,
            reconstruction,
            latent_all,
        })
    }

    /// Visits every parameter in deterministic (config) order: trunk, main
    /// compressor, signature units, phenotype units, decoder.
    pub fn visit_parameters(
        &self,
        visitor: &mut dyn FnMut(&Parameter) -> st_mlp::MlpResult<()>,
    ) -> OmicsResult<()> {
        self.pre_encoder.visit_parameters(visitor)?;
        self.main_compressor.visit_parameters(visitor)?;
        for name in self.config.signatures.names() {
            if let Some(unit) = self.signature_compressors.get(name) {
                unit.visit_parameters(visitor)?;
            }
            if let Some(unit) = self.signature_regressors.get(name) {
                unit.visit_parameters(visitor)?;
            }
        }
        for name in self.config.phenotypes.names() {
            if let Some(unit) = self.pheno_compressors.get(name) {
                unit.visit_parameters(visitor)?;
            }
            if let Some(unit) = self.pheno_classifiers.get(name) {
                unit.visit_parameters(visitor)?;
            }
        }
        self.decoder.visit_parameters(visitor)?;
        Ok(())
    }

    /// Mutable counterpart of [`Extractor::visit_parameters`], used by the
    /// external optimizer between forward calls.
    pub fn visit_parameters_mut(
        &mut self,
        visitor: &mut dyn FnMut(&mut Parameter) -> st_mlp::MlpResult<()>,
    ) -> OmicsResult<()> {
        self.pre_encoder.visit_parameters_mut(visitor)?;
        self.main_compressor.visit_parameters_mut(visitor)?;
        let signature_names: Vec<String> =
            self.config.signatures.names().map(str::to_string).collect();
        for name in &signature_names {
            if let Some(unit) = self.signature_compressors.get_mut(name) {
                unit.visit_parameters_mut(visitor)?;
            }
            if let Some(unit) = self.signature_regressors.get_mut(name) {
                unit.visit_parameters_mut(visitor)?;
            }
        }
        let pheno_names: Vec<String> =
            self.config.phenotypes.names().map(str::to_string).collect();
        for name in &pheno_names {
            if let Some(unit) = self.pheno_compressors.get_mut(name) {
                unit.visit_parameters_mut(visitor)?;
            }
            if let Some(unit) = self.pheno_classifiers.get_mut(name) {
                unit.visit_parameters_mut(visitor)?;
            }
        }
        self.decoder.visit_parameters_mut(visitor)?;
        Ok(())
    }

    /// Captures every parameter tensor keyed by canonical name.
    pub fn state_dict(&self) -> OmicsResult<HashMap<String, Tensor>> {
        let mut state = HashMap::new();
        self.visit_parameters(&mut |param| {
            state.insert(param.name().to_string(), param.value().clone());
            Ok(())
        })?;
        Ok(state)
    }

    /// Restores every parameter from a captured state dict.
    pub fn load_state_dict(&mut self, state: &HashMap<String, Tensor>) -> OmicsResult<()> {
        self.visit_parameters_mut(&mut |param| {
            let Some(value) = state.get(param.name()) else {
                return Err(st_mlp::MlpError::MissingParameter {
                    name: param.name().to_string(),
                });
            };
            param.load_value(value)
        })
    }

    /// Applies one pending update on every parameter.
    pub fn apply_step(&mut self, learning_rate: f32) -> OmicsResult<()> {
        self.visit_parameters_mut(&mut |param| param.apply_step(learning_rate))
    }

    /// Clears every gradient accumulator.
    pub fn zero_accumulators(&mut self) -> OmicsResult<()> {
        self.visit_parameters_mut(&mut |param| {
            param.zero_gradient();
            Ok(())
        })
    }
}

/// Column-wise concatenation of same-height matrices.
fn concat_columns(parts: &[Tensor]) -> Tensor {
    let rows = parts[0].dim().0;
    let width = parts.iter().map(|part| part.dim().1).sum();
    let mut all = Tensor::zeros((rows, width));
    let mut offset = 0;
    for part in parts {
        let cols = part.dim().1;
        all.slice_mut(s![.., offset..offset + cols]).assign(part);
        offset += cols;
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ExtractorConfig {
        ExtractorConfig {
            input_dim: 10,
            encoder_neurons: 4,
            decoder_neurons: 4,
            main_latent_dim: 2,
            ..ExtractorConfig::new(10)
        }
        .with_signature("sig1", 1, 3)
        .unwrap()
        .with_phenotype("pheno1", 1, 2)
        .unwrap()
    }

    #[test]
    fn total_latent_dim_matches_decoder_width() {
        let model = Extractor::new(small_config()).unwrap();
        assert_eq!(model.total_latent_dim(), 4);
        assert_eq!(model.total_latent_dim(), model.config().total_latent_dim());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let mut config = small_config();
        config.input_dim = 0;
        assert!(matches!(
            Extractor::new(config),
            Err(OmicsError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn construction_is_deterministic() {
        let a = Extractor::new(small_config()).unwrap();
        let b = Extractor::new(small_config()).unwrap();
        assert_eq!(a.state_dict().unwrap(), b.state_dict().unwrap());
    }

    #[test]
    fn reconstruction_without_main_latent_is_rejected() {
        let model = Extractor::new(small_config()).unwrap();
        let batch = Tensor::zeros((5, 10));
        let plan = ForwardPlan {
            main_latent: false,
            ..ForwardPlan::full()
        };
        assert!(matches!(
            model.forward(&batch, &plan),
            Err(OmicsError::MainLatentRequired)
        ));
    }

    #[test]
    fn unknown_signature_name_is_rejected_before_any_work() {
        let model = Extractor::new(small_config()).unwrap();
        let batch = Tensor::zeros((5, 10));
        let plan = ForwardPlan::full().with_signatures(["nope"]);
        match model.forward(&batch, &plan) {
            Err(OmicsError::UnknownGroup { kind, name }) => {
                assert_eq!(kind, GroupKind::Signature);
                assert_eq!(name, "nope");
            }
            other => panic!("expected UnknownGroup, got {other:?}"),
        }
    }

    #[test]
    fn concat_columns_keeps_order() {
        let left = Tensor::from_shape_vec((2, 2), vec![1.0, 2.0, 5.0, 6.0]).unwrap();
        let right = Tensor::from_shape_vec((2, 1), vec![3.0, 7.0]).unwrap();
        let all = concat_columns(&[left, right]);
        assert_eq!(
            all,
            Tensor::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 5.0, 6.0, 7.0]).unwrap()
        );
    }
}
