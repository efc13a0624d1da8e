// Logging setup. Everything goes to stderr so stdout only carries the
// server responses.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a level for this crate.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity` when set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Target prefix; matches both the `quickpin` binary and `quickpin_cli`.
        EnvFilter::new(format!("quickpin={}", level_for(verbosity)))
    });

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
