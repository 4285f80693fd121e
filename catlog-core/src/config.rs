use std::{str::FromStr, sync::LazyLock, time::Duration};

use derive_from_env::FromEnv;

use crate::{error::Error, priority::Priority};

/// Raw `CATLOG_*` environment variables.
#[derive(FromEnv)]
#[from_env(prefix = "CATLOG")]
#[allow(non_snake_case)]
pub struct CatlogEnv {
    #[from_env(default = "100")]
    pub FLUSH_INTERVAL_MS: u64,
    #[from_env(default = "NOTICE")]
    pub ROOT_PRIORITY: String,
    #[from_env(default = "stdout")]
    pub APPENDER: String,
}

/// Default appender installed on the root category by the facade builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAppender {
    Stdout,
    Stderr,
    None,
}

impl FromStr for DefaultAppender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(DefaultAppender::Stdout),
            "stderr" => Ok(DefaultAppender::Stderr),
            "none" | "" => Ok(DefaultAppender::None),
            _ => Err(Error::UnknownAppender(s.to_string())),
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct CatlogConfig {
    pub flush_interval: Duration,
    pub root_priority: Priority,
    pub appender: DefaultAppender,
}

impl CatlogConfig {
    pub fn from_env() -> Result<Self, Error> {
        let env = CatlogEnv::from_env().map_err(|e| Error::Env(format!("{e:?}")))?;
        Self::try_from(env)
    }
}

impl TryFrom<CatlogEnv> for CatlogConfig {
    type Error = Error;

    fn try_from(env: CatlogEnv) -> Result<Self, Self::Error> {
        let root_priority: Priority = env.ROOT_PRIORITY.parse()?;
        if !root_priority.is_set() {
            return Err(Error::Env(
                "CATLOG_ROOT_PRIORITY cannot be NOTSET".to_string(),
            ));
        }
        Ok(Self {
            flush_interval: Duration::from_millis(env.FLUSH_INTERVAL_MS),
            root_priority,
            appender: env.APPENDER.parse()?,
        })
    }
}

pub static CATLOG_CONFIG: LazyLock<CatlogConfig> =
    LazyLock::new(|| CatlogConfig::from_env().unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    fn env(root_priority: &str, appender: &str) -> CatlogEnv {
        CatlogEnv {
            FLUSH_INTERVAL_MS: 25,
            ROOT_PRIORITY: root_priority.into(),
            APPENDER: appender.into(),
        }
    }

    #[test]
    fn test_valid_env() {
        let config = CatlogConfig::try_from(env("debug", "STDERR")).unwrap();
        assert_eq!(config.flush_interval, Duration::from_millis(25));
        assert_eq!(config.root_priority, Priority::Debug);
        assert_eq!(config.appender, DefaultAppender::Stderr);
    }

    #[test]
    fn test_invalid_env() {
        assert!(matches!(
            CatlogConfig::try_from(env("loud", "stdout")),
            Err(Error::UnknownPriority(_))
        ));
        assert!(matches!(
            CatlogConfig::try_from(env("notset", "stdout")),
            Err(Error::Env(_))
        ));
        assert!(matches!(
            CatlogConfig::try_from(env("info", "syslog")),
            Err(Error::UnknownAppender(_))
        ));
    }
}
