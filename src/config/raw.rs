use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{
    default_atomic, default_duration, default_element_id, default_enter_delay,
    default_event_buffer, default_exit_duration, default_host_classes, default_politeness,
};
use super::env::{duration, lookup, parsed};
use super::{Config, HostSpec, HumantimeDuration, Politeness, ToastSettings};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .add_source(
            ::config::Environment::with_prefix("TOASTS")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) toasts: RawToasts,
    #[serde(default)]
    pub(super) host: RawHost,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawToasts {
    #[serde(default = "default_duration")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) default_duration: Duration,
    #[serde(default = "default_enter_delay")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) enter_delay: Duration,
    #[serde(default = "default_exit_duration")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) exit_duration: Duration,
    #[serde(default = "default_event_buffer")]
    pub(super) event_buffer: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawHost {
    #[serde(default = "default_element_id")]
    pub(super) element_id: String,
    #[serde(default = "default_host_classes")]
    pub(super) classes: String,
    #[serde(default = "default_politeness")]
    pub(super) politeness: String,
    #[serde(default = "default_atomic")]
    pub(super) atomic: bool,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(value) = duration("DEFAULT_DURATION")? {
            self.toasts.default_duration = value;
        }
        if let Some(value) = duration("ENTER_DELAY")? {
            self.toasts.enter_delay = value;
        }
        if let Some(value) = duration("EXIT_DURATION")? {
            self.toasts.exit_duration = value;
        }
        if let Some(value) = parsed::<usize>("EVENT_BUFFER")? {
            self.toasts.event_buffer = value;
        }
        if let Some(value) = lookup("HOST_ID")? {
            self.host.element_id = value;
        }
        if let Some(value) = lookup("HOST_CLASSES")? {
            self.host.classes = value;
        }
        if let Some(value) = lookup("POLITENESS")? {
            self.host.politeness = value;
        }
        if let Some(value) = parsed::<bool>("ATOMIC")? {
            self.host.atomic = value;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        if self.toasts.enter_delay.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "toasts.enter_delay",
                message: "entry must be deferred by at least one tick".to_string(),
            }
            .into());
        }
        if self.toasts.exit_duration.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "toasts.exit_duration",
                message: "exit animation duration must be greater than zero".to_string(),
            }
            .into());
        }
        if self.toasts.event_buffer == 0 {
            return Err(ConfigError::InvalidField {
                field: "toasts.event_buffer",
                message: "event buffer must be greater than zero".to_string(),
            }
            .into());
        }
        let element_id = self.host.element_id.trim().to_string();
        if element_id.is_empty() || element_id.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidField {
                field: "host.element_id",
                message: format!("not a usable element id: {:?}", self.host.element_id),
            }
            .into());
        }
        let politeness = Politeness::from_str(&self.host.politeness).map_err(|message| {
            ConfigError::InvalidField {
                field: "host.politeness",
                message,
            }
        })?;

        Ok(Config {
            toasts: ToastSettings {
                default_duration: self.toasts.default_duration,
                enter_delay: self.toasts.enter_delay,
                exit_duration: self.toasts.exit_duration,
                event_buffer: self.toasts.event_buffer,
            },
            host: HostSpec {
                element_id,
                classes: self.host.classes.trim().to_string(),
                politeness,
                atomic: self.host.atomic,
            },
        })
    }
}

impl Default for RawToasts {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            enter_delay: default_enter_delay(),
            exit_duration: default_exit_duration(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for RawHost {
    fn default() -> Self {
        Self {
            element_id: default_element_id(),
            classes: default_host_classes(),
            politeness: default_politeness(),
            atomic: default_atomic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RawConfig;
    use crate::config::{Config, Politeness};
    use crate::error::{ConfigError, Error};
    use std::time::Duration;

    #[test]
    fn empty_raw_config_builds_defaults() {
        let built = match RawConfig::default().validate_and_build() {
            Ok(config) => config,
            Err(err) => panic!("defaults should validate: {err}"),
        };
        let expected = Config::default();
        assert_eq!(built.toasts, expected.toasts);
        assert_eq!(built.host, expected.host);
    }

    #[test]
    fn zero_enter_delay_is_rejected() {
        let mut raw = RawConfig::default();
        raw.toasts.enter_delay = Duration::ZERO;
        let err = raw.validate_and_build().err();
        assert!(matches!(
            err,
            Some(Error::Config(ConfigError::InvalidField {
                field: "toasts.enter_delay",
                ..
            }))
        ));
    }

    #[test]
    fn zero_exit_duration_is_rejected() {
        let mut raw = RawConfig::default();
        raw.toasts.exit_duration = Duration::ZERO;
        assert!(raw.validate_and_build().is_err());
    }

    #[test]
    fn blank_element_id_is_rejected() {
        let mut raw = RawConfig::default();
        raw.host.element_id = "   ".to_string();
        assert!(raw.validate_and_build().is_err());
    }

    #[test]
    fn politeness_is_parsed() {
        let mut raw = RawConfig::default();
        raw.host.politeness = "Assertive".to_string();
        let built = match raw.validate_and_build() {
            Ok(config) => config,
            Err(err) => panic!("assertive should validate: {err}"),
        };
        assert_eq!(built.host.politeness, Politeness::Assertive);
    }

    #[test]
    fn unknown_politeness_is_rejected() {
        let mut raw = RawConfig::default();
        raw.host.politeness = "loud".to_string();
        assert!(raw.validate_and_build().is_err());
    }
}
