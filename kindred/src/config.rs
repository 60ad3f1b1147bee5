use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// Raw weight values for the overall match score. Read from the environment
/// here; validated (sum to 1.0) when `ScoringWeights` is constructed during
/// startup wiring, not at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub big_five_weight: f64,
    pub moral_foundations_weight: f64,
    pub proactive_weight: f64,
    pub reactive_weight: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("KINDRED_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("KINDRED_PORT", 8720),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:kindred.db".to_string()),
                auth_token: parse_env_opt("DATABASE_AUTH_TOKEN"),
                local_path: parse_env_opt("DATABASE_LOCAL_PATH"),
            },
            scoring: ScoringConfig {
                big_five_weight: parse_env_or("SCORING_BIG_FIVE_WEIGHT", 0.2),
                moral_foundations_weight: parse_env_or("SCORING_MORAL_FOUNDATIONS_WEIGHT", 0.1),
                proactive_weight: parse_env_or("SCORING_PROACTIVE_WEIGHT", 0.4),
                reactive_weight: parse_env_or("SCORING_REACTIVE_WEIGHT", 0.3),
            },
        }
    }
}
