use env_logger::Builder;
use log::LevelFilter;

use crate::constants::LOG_ENV_VAR;

/// Initialize logging, given a verbosity level.
///
/// The level is usually `verbose - quiet`, as counted by [`crate::cli::Cli`]:
/// `0` maps to `WARN`, positive values increase verbosity, negative values decrease it.
///
/// If [`LOG_ENV_VAR`] is set, its value takes precedence.
pub fn init(verbosity_level: i8) {
    let default_level = match verbosity_level {
        i8::MIN..=-2 => LevelFilter::Off,
        -1 => LevelFilter::Error,
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        3..=i8::MAX => LevelFilter::Trace,
    };

    Builder::new().filter_level(default_level).parse_env(LOG_ENV_VAR).init();

    info!("Logging initialized at '{}' (override via '{LOG_ENV_VAR}')", log::max_level());
}
