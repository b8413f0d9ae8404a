use serde::Deserialize;

/// Top-level configuration settings for the bus.
///
/// Includes settings for both the broker and logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Configuration settings for the broker.
///
/// Controls how handlers are invoked and when dead subscriptions are pruned.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BrokerSettings {
    /// Run every handler under `catch_unwind` so one panicking subscriber
    /// does not abort delivery to the rest.
    pub isolate_handlers: bool,
    /// Drop subscriptions whose subscriber is gone as soon as a publish
    /// notices them, instead of waiting for the next unsubscribe.
    pub prune_on_publish: bool,
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub isolate_handlers: Option<bool>,
    pub prune_on_publish: Option<bool>,
}

/// Partial log settings.
#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            isolate_handlers: false,
            prune_on_publish: true,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PartialSettings {
    /// Merges the loaded values over `Settings::default()`.
    pub fn merge(self) -> Settings {
        let default = Settings::default();

        Settings {
            broker: BrokerSettings {
                isolate_handlers: self
                    .broker
                    .as_ref()
                    .and_then(|b| b.isolate_handlers)
                    .unwrap_or(default.broker.isolate_handlers),
                prune_on_publish: self
                    .broker
                    .as_ref()
                    .and_then(|b| b.prune_on_publish)
                    .unwrap_or(default.broker.prune_on_publish),
            },
            log: LogSettings {
                level: self
                    .log
                    .and_then(|l| l.level)
                    .unwrap_or(default.log.level),
            },
        }
    }
}
