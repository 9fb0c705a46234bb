use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("LEADERBOARD_DEFAULT_LIMIT ({default}) exceeds LEADERBOARD_MAX_LIMIT ({max})")]
    LimitOutOfRange { default: usize, max: usize },
}

/// Page size bounds for leaderboard reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderboardLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for LeaderboardLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl LeaderboardLimits {
    /// Resolves a requested page size, falling back to the default and capping at the max.
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    /// `None` disables the background outcome resolver
    pub outcome_poll_interval: Option<Duration>,
    pub leaderboard_limits: LeaderboardLimits,
    pub seed_demo_data: bool,
    pub require_registered_users: bool,
}

impl AppConfig {
    /// Loads configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(&lookup, "PORT", 3000u16)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let poll_secs = parse_or(&lookup, "OUTCOME_POLL_INTERVAL_SECS", 60u64)?;
        let outcome_poll_interval = (poll_secs > 0).then(|| Duration::from_secs(poll_secs));

        let leaderboard_limits = LeaderboardLimits {
            default_limit: parse_or(&lookup, "LEADERBOARD_DEFAULT_LIMIT", 10usize)?,
            max_limit: parse_or(&lookup, "LEADERBOARD_MAX_LIMIT", 100usize)?,
        };
        if leaderboard_limits.default_limit > leaderboard_limits.max_limit {
            return Err(ConfigError::LimitOutOfRange {
                default: leaderboard_limits.default_limit,
                max: leaderboard_limits.max_limit,
            });
        }

        Ok(Self {
            host,
            port,
            database_url,
            outcome_poll_interval,
            leaderboard_limits,
            seed_demo_data: parse_or(&lookup, "SEED_DEMO_DATA", true)?,
            require_registered_users: parse_or(&lookup, "REQUIRE_REGISTERED_USERS", false)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(default),
    }
}
