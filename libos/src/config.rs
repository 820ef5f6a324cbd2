use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which preallocation path the layer uses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PreallocPolicy {
    /// Whatever the target platform needs: the capacity check on FreeBSD,
    /// a straight pass-through elsewhere.
    #[default]
    Auto,
    /// Always call `posix_fallocate` directly.
    Native,
    /// Always run the capacity check before `posix_fallocate`.
    Preflight,
}

impl FromStr for PreallocPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "native" => Ok(Self::Native),
            "preflight" => Ok(Self::Preflight),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PreallocPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Native => "native",
            Self::Preflight => "preflight",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SalConfig {
    #[serde(rename = "preallocate")]
    pub preallocate: PreallocPolicy,
}

impl SalConfig {
    pub const ENV_PREALLOCATE: &'static str = "LIBOS_PREALLOCATE";

    /// Build the configuration from the environment. Unset variables keep
    /// their defaults. The lookup is privilege-aware, so a setuid process
    /// never picks up the invoking user's overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = crate::getenv_secure(Self::ENV_PREALLOCATE) {
            let value = value
                .into_string()
                .map_err(|_| ConfigError::NotUnicode(Self::ENV_PREALLOCATE))?;
            config.preallocate = value.parse()?;
        }
        Ok(config)
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("auto".parse::<PreallocPolicy>().unwrap(), PreallocPolicy::Auto);
        assert_eq!(" Native ".parse::<PreallocPolicy>().unwrap(), PreallocPolicy::Native);
        assert_eq!(
            "PREFLIGHT".parse::<PreallocPolicy>().unwrap(),
            PreallocPolicy::Preflight
        );
        assert!(matches!(
            "zero-fill".parse::<PreallocPolicy>(),
            Err(ConfigError::UnknownPolicy(s)) if s == "zero-fill"
        ));
    }

    #[test]
    fn test_parse_json() {
        let config = SalConfig::from_json(r#"{ "preallocate": "preflight" }"#).unwrap();
        assert_eq!(config.preallocate, PreallocPolicy::Preflight);

        // missing fields fall back to defaults
        let config = SalConfig::from_json("{}").unwrap();
        assert_eq!(config, SalConfig::default());

        assert!(matches!(
            SalConfig::from_json(r#"{ "preallocate": "fast" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_load_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("libos.json");
        std::fs::write(&path, r#"{ "preallocate": "native" }"#)?;
        assert_eq!(SalConfig::load(&path)?.preallocate, PreallocPolicy::Native);

        assert!(matches!(
            SalConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
        Ok(())
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [
            PreallocPolicy::Auto,
            PreallocPolicy::Native,
            PreallocPolicy::Preflight,
        ] {
            assert_eq!(policy.to_string().parse::<PreallocPolicy>().unwrap(), policy);
        }
    }
}
