use std::time::Duration;

use humantime::parse_duration;
use serde::Deserialize;
use serde_with::DeserializeAs;

/// Reads durations written as `"5s"`, `"300ms"` or `"1m 30s"`.
pub(crate) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize)]
    struct Timing {
        #[serde_as(as = "HumantimeDuration")]
        exit: Duration,
    }

    #[test]
    fn humantime_duration_parses_milliseconds() {
        let timing: Timing = match serde_json::from_str(r#"{"exit":"300ms"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse timing json: {err}"),
        };
        assert_eq!(timing.exit, Duration::from_millis(300));
    }

    #[test]
    fn humantime_duration_rejects_bare_numbers() {
        let parsed = serde_json::from_str::<Timing>(r#"{"exit":"300"}"#);
        assert!(parsed.is_err());
    }
}
