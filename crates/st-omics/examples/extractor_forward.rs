// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.

//! Omics model-zoo: assemble an extractor and run the conditional forward
//! pass over a synthetic expression batch.

use st_omics::{Extractor, ExtractorConfig, ForwardPlan, OmicsResult, Tensor};

fn main() -> OmicsResult<()> {
    let _ = st_omics::init_tracing();

    let mut config = ExtractorConfig::new(32);
    config.encoder_neurons = 16;
    config.decoder_neurons = 16;
    config.main_latent_dim = 4;
    config.verbose = true;
    let config = config
        .with_signature("cell_cycle", 2, 3)?
        .with_signature("stress", 1, 1)?
        .with_phenotype("disease_state", 2, 4)?;

    let model = Extractor::new(config)?;
    println!(
        "total_latent_dim={} parameters across trunk, compressors, heads, decoder",
        model.total_latent_dim()
    );

    let batch = Tensor::from_shape_fn((8, 32), |(r, c)| ((r + 1) * (c + 1)) as f32 * 0.01);

    let full = model.forward(&batch, &ForwardPlan::full())?;
    println!(
        "full pass: lat_main={:?} lat_all={:?} reconstruction={:?}",
        full.latent_main.as_ref().map(|t| t.dim()),
        full.latent_all.as_ref().map(|t| t.dim()),
        full.reconstruction.as_ref().map(|t| t.dim()),
    );
    for (name, out) in &full.signature_outputs {
        println!("signature `{name}` supervision output {:?}", out.dim());
    }
    for (name, out) in &full.pheno_outputs {
        println!("phenotype `{name}` logits {:?}", out.dim());
    }

    // Supervision-only pass over one signature: nothing accumulates beyond
    // the main latent, and no reconstruction is attempted.
    let plan = ForwardPlan {
        signature: false,
        pheno: false,
        reconstruction: false,
        ..ForwardPlan::full()
    }
    .with_signatures(["stress"])
    .with_phenos(["disease_state"]);
    let partial = model.forward(&batch, &plan)?;
    println!(
        "supervision pass: stress_out={:?} lat_all={:?} reconstruction={}",
        partial.signature_outputs["stress"].dim(),
        partial.latent_all.as_ref().map(|t| t.dim()),
        partial.reconstruction.is_some(),
    );

    Ok(())
}
