mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{BrokerSettings, LogSettings, Settings};

/// Prefix for environment overrides, e.g. `SIGNALBUS__BROKER__ISOLATE_HANDLERS=true`.
pub const ENV_PREFIX: &str = "SIGNALBUS";

/// Loads the configuration from `config/default` and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Loads the configuration from the file at `base` (any format the `config`
/// crate recognizes, extension optional) and environment variables.
/// Merges the result with default values; the file is optional.
pub fn load_config_from(base: &str) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = Config::builder()
        .add_source(File::with_name(base).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge())
}
