//! Serde helpers shared by the configuration types

/// `Duration` stored as whole seconds, so config files read `command_timeout = 30`
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Limits {
///     #[serde(with = "sb_core::config::serde_utils::duration_secs")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize a Duration as seconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize a Duration from seconds (u64)
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Limits {
        #[serde(with = "duration_secs")]
        timeout: Duration,
    }

    #[test]
    fn test_duration_written_as_seconds() {
        let limits = Limits {
            timeout: Duration::from_millis(30_900),
        };
        assert_eq!(toml::to_string(&limits).unwrap().trim(), "timeout = 30");
    }

    #[test]
    fn test_duration_read_from_seconds() {
        let limits: Limits = toml::from_str("timeout = 45").unwrap();
        assert_eq!(limits.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_negative_seconds_rejected() {
        assert!(toml::from_str::<Limits>("timeout = -1").is_err());
    }
}
