use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::Result;
use crate::error::Error as ToastError;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

/// Auto-dismiss delay used when a caller does not pick one.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5_000);
/// Deferral between `show` and the entry transition.
pub const DEFAULT_ENTER_DELAY: Duration = Duration::from_millis(10);
/// Length of the exit animation, independent of the display duration.
pub const DEFAULT_EXIT_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub toasts: ToastSettings,
    pub host: HostSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSettings {
    pub default_duration: Duration,
    pub enter_delay: Duration,
    pub exit_duration: Duration,
    pub event_buffer: usize,
}

/// Attributes of the fixed-position element every notification attaches under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub element_id: String,
    pub classes: String,
    pub politeness: Politeness,
    pub atomic: bool,
}

/// `aria-live` value of the host region.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(ToastError::from)?;
        raw.apply_env_overrides().map_err(ToastError::from)?;
        raw.validate_and_build()
    }
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION,
            enter_delay: DEFAULT_ENTER_DELAY,
            exit_duration: DEFAULT_EXIT_DURATION,
            event_buffer: defaults::default_event_buffer(),
        }
    }
}

impl Default for HostSpec {
    fn default() -> Self {
        Self {
            element_id: defaults::default_element_id(),
            classes: defaults::default_host_classes(),
            politeness: Politeness::Polite,
            atomic: true,
        }
    }
}

impl Politeness {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

impl Display for Politeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Politeness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polite" => Ok(Self::Polite),
            "assertive" => Ok(Self::Assertive),
            other => Err(format!("unknown live region politeness: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Politeness};
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn defaults_match_page_constants() {
        let config = Config::default();
        assert_eq!(config.toasts.default_duration, Duration::from_secs(5));
        assert_eq!(config.toasts.enter_delay, Duration::from_millis(10));
        assert_eq!(config.toasts.exit_duration, Duration::from_millis(300));
        assert_eq!(config.host.element_id, "notification-container");
        assert_eq!(config.host.politeness, Politeness::Polite);
        assert!(config.host.atomic);
    }

    #[test]
    fn politeness_from_str_accepts_variants() {
        assert_eq!(Politeness::from_str("POLITE"), Ok(Politeness::Polite));
        assert_eq!(Politeness::from_str("assertive"), Ok(Politeness::Assertive));
        assert!(Politeness::from_str("off").is_err());
    }
}
