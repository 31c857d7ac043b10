use std::time::Duration;

use humantime::parse_duration;

use crate::error::ConfigError;

const PREFIX: &str = "TOASTS_";

/// Reads `TOASTS_<key>`, treating blank values as unset.
pub(super) fn lookup(key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
    match std::env::var(format!("{PREFIX}{key}")) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::Other(format!("{PREFIX}{key}: {err}"))),
    }
}

pub(super) fn parsed<T>(key: &'static str) -> std::result::Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)?
        .map(|value| {
            value.parse::<T>().map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            })
        })
        .transpose()
}

pub(super) fn duration(key: &'static str) -> std::result::Result<Option<Duration>, ConfigError> {
    lookup(key)?
        .map(|value| {
            parse_duration(&value).map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            })
        })
        .transpose()
}
