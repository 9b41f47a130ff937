// src/config.rs

use std::{env, fmt::Display, ops::RangeInclusive, str::FromStr};

use dotenvy::dotenv;
use url::Url;

/// Default exam length: 10 minutes.
pub const DEFAULT_EXAM_DURATION_SECS: i64 = 10 * 60;

/// Longest exam the portal accepts: one day.
pub const MAX_EXAM_DURATION_SECS: i64 = 24 * 60 * 60;

/// Default timeout for calls to the remote exam service.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint of the remote exam service (login, questions, submissions).
    pub exam_service_url: Url,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub exam_duration_secs: i64,
    pub request_timeout_secs: u64,
    pub bind_addr: String,
    pub rust_log: String,

    /// Fixed seed for question/option shuffling. Unset in production so every
    /// attempt draws a fresh seed; set it to replay an attempt.
    pub shuffle_seed: Option<u64>,
}

impl Config {
    /// Reads the process environment (after `.env`).
    ///
    /// Also returns one warning per rejected value. Tracing is not set up yet
    /// when this runs, so the caller logs them.
    pub fn from_env() -> (Self, Vec<String>) {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source. Unset optional values take
    /// their defaults; unparsable or out-of-range values do too, with a warning.
    pub fn from_vars<F>(var: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let exam_service_url = var("EXAM_SERVICE_URL").expect("EXAM_SERVICE_URL must be set");
        let exam_service_url =
            Url::parse(&exam_service_url).expect("EXAM_SERVICE_URL must be a valid URL");

        let jwt_secret = var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let shuffle_seed = var("SHUFFLE_SEED").and_then(|raw| match raw.trim().parse() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warnings.push(format!("Invalid value for SHUFFLE_SEED: {:?}, ignoring it", raw));
                None
            }
        });

        let config = Self {
            exam_service_url,
            jwt_secret,
            jwt_expiration: parse_in(&var, "JWT_EXPIRATION", 3600, 1..=u64::MAX, &mut warnings),
            exam_duration_secs: parse_in(
                &var,
                "EXAM_DURATION_SECS",
                DEFAULT_EXAM_DURATION_SECS,
                1..=MAX_EXAM_DURATION_SECS,
                &mut warnings,
            ),
            request_timeout_secs: parse_in(
                &var,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
                1..=300,
                &mut warnings,
            ),
            bind_addr,
            rust_log,
            shuffle_seed,
        };

        (config, warnings)
    }
}

/// Reads a numeric variable, keeping `default` when it is unset, unparsable
/// or outside `range`.
fn parse_in<T, F>(
    var: &F,
    key: &str,
    default: T,
    range: RangeInclusive<T>,
    warnings: &mut Vec<String>,
) -> T
where
    T: FromStr + PartialOrd + Copy + Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if range.contains(&value) => value,
        _ => {
            warnings.push(format!("Invalid value for {}: {:?}, using {}", key, raw, default));
            default
        }
    }
}
