use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "superstellar_client=debug,wgpu=warn").
///
/// `write_style` controls ANSI coloring behavior.
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

static INIT: Once = Once::new();

/// Crates that log per-call detail at `info`.
const NOISY_CRATES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Builds the logger for `filter`, or `info` when absent.
///
/// Noisy crates are capped at `warn` first, so a plain level such as `debug`
/// leaves them capped while a directive naming one of them overrides the cap.
fn builder(filter: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    for module in NOISY_CRATES {
        builder.filter_module(module, log::LevelFilter::Warn);
    }

    match filter {
        Some(filter) => {
            builder.parse_filters(filter);
        }
        None => {
            builder.filter_level(log::LevelFilter::Info);
        }
    }

    builder
}

/// Initializes the global logger once.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info`.
/// Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());
        let mut builder = builder(filter.as_deref());
        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig {
            env_filter: Some("debug".into()),
            ..LoggingConfig::default()
        });
        init_logging(LoggingConfig::default());
        log::debug!("still alive");
    }

    fn enabled(logger: &env_logger::Logger, target: &str, level: log::Level) -> bool {
        use log::Log;
        logger.enabled(&log::Metadata::builder().target(target).level(level).build())
    }

    #[test]
    fn noisy_crates_stay_capped_under_any_filter() {
        for filter in [None, Some("debug"), Some("trace")] {
            let logger = builder(filter).build();
            assert!(!enabled(&logger, "wgpu_core::device", log::Level::Info), "{filter:?}");
            assert!(!enabled(&logger, "naga::front", log::Level::Info), "{filter:?}");
            assert!(enabled(&logger, "wgpu_hal::vulkan", log::Level::Warn), "{filter:?}");
            assert!(enabled(&logger, "superstellar_client", log::Level::Info), "{filter:?}");
        }
    }

    #[test]
    fn explicit_directive_lifts_the_cap() {
        let logger = builder(Some("info,wgpu_core=debug")).build();
        assert!(enabled(&logger, "wgpu_core::device", log::Level::Debug));
        assert!(!enabled(&logger, "wgpu_hal", log::Level::Info));
    }
}
