// Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity flags.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "poisonproof=warn"
    } else if verbose {
        "poisonproof=debug"
    } else {
        "poisonproof=info"
    }
}

/// Initialize logging based on CLI flags.
///
/// `RUST_LOG` wins over the flags. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "poisonproof=info");
        assert_eq!(default_directive(true, false), "poisonproof=debug");
        assert_eq!(default_directive(false, true), "poisonproof=warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(false, true);
        init_logging(true, false);
    }
}
