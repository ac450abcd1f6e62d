//! Logging for the node host.
//!
//! Lifecycle events are emitted through [`log_event!`](crate::log_event) and
//! [`debug_event!`](crate::debug_event) under the target `nodehost::<component>`
//! (`host`, `scan`, `node`, `capability`, `watcher`), so each component can be
//! tuned on its own. Output goes to stderr; stdout stays free for command
//! output such as `nodehost scan --json`.
//!
//! ```toml
//! [logging]
//! default = "info"
//!
//! [logging.modules]
//! host = "debug"              # same as "nodehost::host"
//! "nodehost::watcher" = "warn"
//! ```
//!
//! `RUST_LOG` replaces the configured directives entirely:
//! ```bash
//! RUST_LOG=nodehost::scan=trace nodehost run
//! ```

use std::sync::Once;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

const TARGET_PREFIX: &str = "nodehost::";

/// Expand a configured module key into a target directive.
///
/// Bare component names are qualified with the crate prefix.
fn target_for(module: &str) -> String {
    if module == "nodehost" || module.contains("::") {
        module.to_string()
    } else {
        format!("{TARGET_PREFIX}{module}")
    }
}

/// Build the filter directive string from config.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut modules: Vec<_> = config
        .modules
        .iter()
        .map(|(module, level)| (target_for(module), level))
        .collect();
    modules.sort();

    let mut directives = config.default.clone();
    for (target, level) in modules {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Install the stderr subscriber. Only the first call has any effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::new(filter_directives(config)),
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
            .with_target(true)
            .with_filter(filter);

        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Info-level lifecycle event for one component.
///
/// ```ignore
/// log_event!("host", "admitted", "'{name}' from {}", folder.display());
/// log_event!("host", "shutdown");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:literal, $event:expr) => {
        tracing::info!(target: concat!("nodehost::", $component), "{}", $event)
    };
    ($component:literal, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: concat!("nodehost::", $component), "{}: {}", $event, format!($($arg)*))
    };
}

/// Debug-level counterpart of [`log_event!`](crate::log_event).
#[macro_export]
macro_rules! debug_event {
    ($component:literal, $event:expr) => {
        tracing::debug!(target: concat!("nodehost::", $component), "{}", $event)
    };
    ($component:literal, $event:expr, $($arg:tt)*) => {
        tracing::debug!(target: concat!("nodehost::", $component), "{}: {}", $event, format!($($arg)*))
    };
}
