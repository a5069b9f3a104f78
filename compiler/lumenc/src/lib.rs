//! Lumen shader compiler CLI.
//!
//! Library half of the `lumenc` binary: option parsing and command
//! handlers, kept here so they can be tested without spawning a process.

pub mod commands;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber for the CLI.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=lumen_session=debug`.
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}
