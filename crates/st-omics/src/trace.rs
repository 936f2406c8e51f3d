// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Configures the global tracing subscriber. Honours `RUST_LOG`, defaulting
/// to `info`.
pub fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|_| InitError::AlreadyInitialised)?;

    let ansi = std::io::stdout().is_terminal();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(ansi);
    Registry::default().with(filter).with(fmt_layer).init();

    Ok(())
}

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
}
