// teamcal-service/src/config.rs
use log::warn;
use std::env;
use std::str::FromStr;

const DEFAULT_JWT_SECRET: &str = "teamcal_development_secret_key";

// Runtime settings read from the environment (and `.env` via dotenv)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub database_path: String,
    pub jwt_secret: String,
    pub session_days: i64,
    pub frontend_origin: String,
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9090".to_string(),
            database_path: "./storage/teamcal.sqlite3".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_days: 7,
            frontend_origin: "http://localhost:5173".to_string(),
            secure_cookies: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️ JWT_SECRET not set, using the development secret");
            defaults.jwt_secret.clone()
        });

        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            jwt_secret,
            session_days: parse_var("SESSION_DAYS", defaults.session_days),
            frontend_origin: env::var("FRONTEND_ORIGIN").unwrap_or(defaults.frontend_origin),
            secure_cookies: parse_var("SECURE_COOKIES", defaults.secure_cookies),
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost),
        }
    }

    pub fn uses_in_memory_database(&self) -> bool {
        self.database_path == ":memory:"
    }
}

fn parse_var<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("⚠️ Invalid value for {}: {:?}, falling back to {:?}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_numbers_fall_back_to_default() {
        env::set_var("TEAMCAL_TEST_SESSION_DAYS", "seven");
        assert_eq!(parse_var("TEAMCAL_TEST_SESSION_DAYS", 7i64), 7);
        env::set_var("TEAMCAL_TEST_SESSION_DAYS", " 14 ");
        assert_eq!(parse_var("TEAMCAL_TEST_SESSION_DAYS", 7i64), 14);
        env::remove_var("TEAMCAL_TEST_SESSION_DAYS");
    }

    #[test]
    fn missing_values_use_default() {
        assert!(!parse_var("TEAMCAL_TEST_UNSET_FLAG", false));
        assert!(Config::default().database_path.ends_with(".sqlite3"));
    }
}
