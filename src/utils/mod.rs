pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber. Logs go to stderr so script output
/// on stdout stays clean; `RUST_LOG` overrides the default `splitledger=info`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

        let directive = "splitledger=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into());
        let filter = EnvFilter::from_default_env().add_directive(directive);

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
