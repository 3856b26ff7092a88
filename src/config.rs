use crate::utils::error::AppError;
use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Token lifetime, one hour up to a year
const TOKEN_TTL_HOURS: RangeInclusive<i64> = 1..=8760;
/// Costs bcrypt accepts
const BCRYPT_COST: RangeInclusive<u32> = 4..=31;

/// Runtime settings, read once from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = required("DATABASE_URL")?;
        let database_name = env::var("DATABASE_NAME")
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| database_name_from_url(&database_url));

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 5000)?,
            database_url,
            database_name,
            jwt_secret: required("ACCESS_TOKEN_SECRET")?,
            token_ttl_hours: within("TOKEN_TTL_HOURS", parse_or("TOKEN_TTL_HOURS", 1)?, TOKEN_TTL_HOURS)?,
            bcrypt_cost: within("BCRYPT_COST", parse_or("BCRYPT_COST", 12)?, BCRYPT_COST)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| split_origins(&origins))
                .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Internal(format!("{} must be set", key)))
}

fn parse_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid {} value '{}': {}", key, raw, e))),
        Err(_) => {
            log::debug!("{} not set, using default", key);
            Ok(default)
        }
    }
}

fn within<T>(key: &str, value: T, range: RangeInclusive<T>) -> Result<T, AppError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(AppError::Internal(format!(
            "Invalid {} value '{}': expected {}..={}",
            key,
            value,
            range.start(),
            range.end()
        )))
    }
}

/// `mongodb://host:27017/social?replicaSet=rs0` -> `social`
fn database_name_from_url(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path.split('?').next().unwrap_or_default())
        .filter(|name| !name.is_empty())
        .unwrap_or("social")
        .to_string()
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    /// Fixed settings for tests that never touch the environment.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "mongodb://localhost:27017/social_test".to_string(),
            database_name: "social_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_url() {
        assert_eq!(database_name_from_url("mongodb://localhost:27017/posts_db"), "posts_db");
        assert_eq!(
            database_name_from_url("mongodb://a:1,b:2/social_prod?replicaSet=rs0"),
            "social_prod"
        );
        assert_eq!(database_name_from_url("mongodb://localhost:27017"), "social");
        assert_eq!(database_name_from_url("mongodb://localhost:27017/?retryWrites=true"), "social");
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins("http://localhost:3000, https://app.example.com,,"),
            vec!["http://localhost:3000".to_string(), "https://app.example.com".to_string()]
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert_eq!(within("TOKEN_TTL_HOURS", 1, TOKEN_TTL_HOURS), Ok(1));
        assert_eq!(within("TOKEN_TTL_HOURS", 8760, TOKEN_TTL_HOURS), Ok(8760));

        for hours in [0, -1, 8761, 10_000_000_000] {
            let err = within("TOKEN_TTL_HOURS", hours, TOKEN_TTL_HOURS).unwrap_err();
            assert!(err.message().starts_with("Invalid TOKEN_TTL_HOURS value"), "{}", err);
        }

        assert!(within("BCRYPT_COST", 3, BCRYPT_COST).is_err());
        assert!(within("BCRYPT_COST", 32, BCRYPT_COST).is_err());
        assert_eq!(within("BCRYPT_COST", 12, BCRYPT_COST), Ok(12));
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_tests();
        config.port = 5000;
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }
}
