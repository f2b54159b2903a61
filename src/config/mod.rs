use std::env;

use chrono::{FixedOffset, Offset, Utc};

/// Which store backs the daily rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitBackend {
    Postgres,
    Redis,
    Memory,
}

impl std::str::FromStr for RateLimitBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown rate limit backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub rate_limit_backend: RateLimitBackend,
    pub daily_request_limit: u32,
    pub rate_limit_utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let rate_limit_backend = env::var("RATE_LIMIT_BACKEND")
            .ok()
            .and_then(|v| match v.parse() {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::warn!("{}, falling back to postgres", e);
                    None
                }
            })
            .unwrap_or(RateLimitBackend::Postgres);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok(),
            jwt_secret: env::var("JWT_SECRET")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            rate_limit_backend,
            daily_request_limit: env::var("DAILY_REQUEST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(2),
            rate_limit_utc_offset_minutes: env::var("RATE_LIMIT_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        })
    }

    /// Offset in which calendar days are counted. Out-of-range values fall back to UTC.
    pub fn rate_limit_offset(&self) -> FixedOffset {
        self.rate_limit_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("postgres".parse::<RateLimitBackend>(), Ok(RateLimitBackend::Postgres));
        assert_eq!(" Redis ".parse::<RateLimitBackend>(), Ok(RateLimitBackend::Redis));
        assert_eq!("memory".parse::<RateLimitBackend>(), Ok(RateLimitBackend::Memory));
        assert!("mongo".parse::<RateLimitBackend>().is_err());
    }

    #[test]
    fn offset_out_of_range_falls_back_to_utc() {
        let mut config = Config {
            database_url: String::new(),
            redis_url: None,
            jwt_secret: "secret".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            rate_limit_backend: RateLimitBackend::Memory,
            daily_request_limit: 2,
            rate_limit_utc_offset_minutes: 120,
        };
        assert_eq!(config.rate_limit_offset().local_minus_utc(), 7200);

        config.rate_limit_utc_offset_minutes = -330;
        assert_eq!(config.rate_limit_offset().local_minus_utc(), -330 * 60);

        config.rate_limit_utc_offset_minutes = 24 * 60;
        assert_eq!(config.rate_limit_offset().local_minus_utc(), 0);

        // minutes * 60 would overflow i32
        config.rate_limit_utc_offset_minutes = i32::MAX;
        assert_eq!(config.rate_limit_offset().local_minus_utc(), 0);
        config.rate_limit_utc_offset_minutes = i32::MIN;
        assert_eq!(config.rate_limit_offset().local_minus_utc(), 0);
    }
}
