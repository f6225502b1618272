//! Logging setup for the `atoz-e2e` binary.
//!
//! Scenario progress is logged with `tracing`; the final report is printed
//! separately by [`crate::report`], so logs can be silenced with `--quiet`
//! without losing the summary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "atoz_e2e=debug,atoz_browser=debug";
const QUIET_FILTER: &str = "atoz_e2e=error,atoz_browser=error";
const DEFAULT_FILTER: &str = "atoz_e2e=info,atoz_browser=warn";

/// Initialize the tracing subscriber.
///
/// Precedence: `verbose`, then `quiet`, then `RUST_LOG`, then the default
/// filter. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Whether colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
#[must_use]
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stdout().features().colors_supported()
}
