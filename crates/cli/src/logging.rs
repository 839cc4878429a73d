// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! stderr logging

use knoa_core::LogLevel;

/// `RUST_LOG` wins; otherwise the configured level, else warnings only
pub fn setup_logging(level: Option<LogLevel>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fallback = level.map_or("warn", |l| l.as_filter());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
