//=========================================================================
// Logging
//=========================================================================
//
// One-shot `env_logger` installation for binaries and embedding hosts.
//
// Subsystem targets: "surface", "gesture", "location", "render",
// "platform". Filter them with the usual syntax, e.g.
// `RUST_LOG=info,location=debug,render=warn`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `env_filter` overrides `RUST_LOG` when set; with neither, the level
/// defaults to `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

//=== Initialization ======================================================

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
///
/// If the process already installed another logger (FFI hosts sometimes
/// do), that logger is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
            }
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("Logging initialized");
        }
    });
}

//=========================================================================
// Unit Tests
//=========================================================================
