//! Log output on stderr via tracing-subscriber

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

/// Default level when neither a flag nor RUST_LOG asks for more
const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber
///
/// `--info`/`--debug` set this crate's level; otherwise `RUST_LOG` is
/// honored, falling back to warnings only.
pub fn init(global: &GlobalOpts) {
    let filter = match global.log_level() {
        Some(level) => EnvFilter::new(format!("{DEFAULT_LEVEL},pft={level}")),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
