// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use st_mlp::MlpError;
use st_omics::{Extractor, ExtractorConfig, ForwardPlan, OmicsError, Tensor};

fn small_config() -> ExtractorConfig {
    let mut config = ExtractorConfig::new(10);
    config.encoder_neurons = 4;
    config.decoder_neurons = 4;
    config.main_latent_dim = 2;
    config
        .with_signature("sig1", 1, 3)
        .unwrap()
        .with_phenotype("pheno1", 1, 2)
        .unwrap()
}

fn batch(rows: usize, cols: usize) -> Tensor {
    Tensor::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32 * 0.1)
}

#[test]
fn full_forward_produces_every_entry_with_expected_shapes() {
    let model = Extractor::new(small_config()).unwrap();
    let input = batch(5, 10);
    let out = model.forward(&input, &ForwardPlan::full()).unwrap();

    assert_eq!(out.input, input);
    assert_eq!(out.latent_main.as_ref().unwrap().dim(), (5, 2));
    assert_eq!(out.latent_signatures["sig1"].dim(), (5, 1));
    assert_eq!(out.signature_outputs["sig1"].dim(), (5, 3));
    assert_eq!(out.latent_phenos["pheno1"].dim(), (5, 1));
    assert_eq!(out.pheno_outputs["pheno1"].dim(), (5, 2));
    assert_eq!(out.latent_all.as_ref().unwrap().dim(), (5, 4));
    assert_eq!(out.reconstruction.as_ref().unwrap().dim(), (5, 10));
}

#[test]
fn latent_concat_is_main_then_signatures_then_phenotypes() {
    let model = Extractor::new(small_config()).unwrap();
    let input = batch(3, 10);
    let out = model.forward(&input, &ForwardPlan::full()).unwrap();

    let all = out.latent_all.unwrap();
    let main = out.latent_main.unwrap();
    let sig = &out.latent_signatures["sig1"];
    let pheno = &out.latent_phenos["pheno1"];
    for row in 0..3 {
        assert_eq!(all[[row, 0]], main[[row, 0]]);
        assert_eq!(all[[row, 1]], main[[row, 1]]);
        assert_eq!(all[[row, 2]], sig[[row, 0]]);
        assert_eq!(all[[row, 3]], pheno[[row, 0]]);
    }
}

#[test]
fn supervision_runs_independently_of_accumulation() {
    let config = small_config().with_signature("sig2", 2, 1).unwrap();
    let model = Extractor::new(config).unwrap();
    let input = batch(4, 10);

    let plan = ForwardPlan {
        signature: false,
        reconstruction: false,
        ..ForwardPlan::full()
    }
    .with_signatures(["sig2"]);
    let out = model.forward(&input, &plan).unwrap();

    // Exactly the selected signature got its regressor output.
    assert_eq!(out.signature_outputs.len(), 1);
    assert_eq!(out.signature_outputs["sig2"].dim(), (4, 1));
    assert_eq!(out.latent_signatures["sig2"].dim(), (4, 2));

    // Nothing signature-shaped joined the concatenation: main (2) plus the
    // still-accumulating phenotype (1).
    assert_eq!(out.latent_all.as_ref().unwrap().dim(), (4, 3));
    assert!(out.reconstruction.is_none());
}

#[test]
fn latents_only_plan_skips_heads_accumulation_but_not_heads() {
    let model = Extractor::new(small_config()).unwrap();
    let input = batch(2, 10);
    let plan = ForwardPlan {
        signature: false,
        pheno: false,
        reconstruction: false,
        ..ForwardPlan::full()
    };
    let out = model.forward(&input, &plan).unwrap();

    // Supervision still covers every configured group.
    assert_eq!(out.signature_outputs.len(), 1);
    assert_eq!(out.pheno_outputs.len(), 1);
    // But only the main latent accumulated.
    assert_eq!(out.latent_all.as_ref().unwrap().dim(), (2, 2));
    assert_eq!(
        out.latent_all.as_ref().unwrap(),
        out.latent_main.as_ref().unwrap()
    );
}

#[test]
fn unknown_group_name_yields_no_partial_bag() {
    let model = Extractor::new(small_config()).unwrap();
    let input = batch(2, 10);

    let plan = ForwardPlan::full().with_signatures(["sig1", "missing"]);
    assert!(matches!(
        model.forward(&input, &plan),
        Err(OmicsError::UnknownGroup { .. })
    ));

    let plan = ForwardPlan::full().with_phenos(["missing"]);
    assert!(matches!(
        model.forward(&input, &plan),
        Err(OmicsError::UnknownGroup { .. })
    ));
}

#[test]
fn reconstruction_with_narrowed_subset_reports_width_mismatch() {
    let config = small_config().with_signature("sig2", 2, 1).unwrap();
    let model = Extractor::new(config).unwrap();
    let input = batch(2, 10);

    // sig2 (width 2) left out: accumulation is 4 wide, decoder expects 6.
    let plan = ForwardPlan::full().with_signatures(["sig1"]);
    match model.forward(&input, &plan) {
        Err(OmicsError::LatentWidthMismatch { expected, got }) => {
            assert_eq!(expected, 6);
            assert_eq!(got, 4);
        }
        other => panic!("expected LatentWidthMismatch, got {other:?}"),
    }
}

#[test]
fn wrong_batch_width_surfaces_shape_mismatch() {
    let model = Extractor::new(small_config()).unwrap();
    let input = batch(2, 11);
    assert!(matches!(
        model.forward(&input, &ForwardPlan::full()),
        Err(OmicsError::Mlp(MlpError::ShapeMismatch { .. }))
    ));
}

#[test]
fn forward_is_idempotent_without_parameter_updates() {
    let model = Extractor::new(small_config()).unwrap();
    let input = batch(5, 10);
    let first = model.forward(&input, &ForwardPlan::full()).unwrap();
    let second = model.forward(&input, &ForwardPlan::full()).unwrap();

    assert_eq!(first.latent_main, second.latent_main);
    assert_eq!(first.latent_all, second.latent_all);
    assert_eq!(first.reconstruction, second.reconstruction);
    assert_eq!(first.signature_outputs, second.signature_outputs);
    assert_eq!(first.pheno_outputs, second.pheno_outputs);
}

#[test]
fn state_dict_round_trip_restores_outputs() {
    let source = Extractor::new(small_config()).unwrap();
    let input = batch(3, 10);
    let expected = source.forward(&input, &ForwardPlan::full()).unwrap();

    let mut other_config = small_config();
    other_config.seed = 7;
    let mut restored = Extractor::new(other_config).unwrap();
    let diverged = restored.forward(&input, &ForwardPlan::full()).unwrap();
    assert_ne!(expected.reconstruction, diverged.reconstruction);

    restored.load_state_dict(&source.state_dict().unwrap()).unwrap();
    let recovered = restored.forward(&input, &ForwardPlan::full()).unwrap();
    assert_eq!(expected.reconstruction, recovered.reconstruction);
}

#[test]
fn config_from_file_drives_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extractor.json");
    std::fs::write(
        &path,
        r#"{
            "input_dim": 10,
            "encoder_neurons": 4,
            "main_latent_dim": 2,
            "signatures": {"sig1": {"latent_dim": 1, "output_dim": 3}},
            "phenotypes": {"pheno1": {"latent_dim": 1, "output_dim": 2}}
        }"#,
    )
    .unwrap();

    let config = ExtractorConfig::from_path(&path).unwrap();
    let model = Extractor::new(config).unwrap();
    assert_eq!(model.total_latent_dim(), 4);
    let out = model.forward(&batch(5, 10), &ForwardPlan::full()).unwrap();
    assert_eq!(out.reconstruction.unwrap().dim(), (5, 10));
}
