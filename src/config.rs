//! Configuration module
//!
//! Client settings come from the environment. Only the API base URL is
//! required; everything else has a default.

use crate::error::{AppError, AppResult};
use crate::http_config::HttpConfig;
use chrono_tz::Tz;
use log::{info, warn};
use std::env;
use std::time::Duration;
use url::Url;

pub const BASE_URL_VAR: &str = "ROOMBOOK_BASE_URL";
pub const TIMEZONE_VAR: &str = "ROOMBOOK_TIMEZONE";
pub const DEBOUNCE_VAR: &str = "ROOMBOOK_SEARCH_DEBOUNCE_MS";

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_SEARCH_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Viewer's booking timezone.
    pub timezone: Tz,
    pub search_debounce: Duration,
    pub min_search_len: usize,
    pub api: HttpConfig,
    pub reads: HttpConfig,
}

impl ClientConfig {
    pub fn new(base_url: Url, timezone: Tz) -> Self {
        Self {
            base_url,
            timezone,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            min_search_len: MIN_SEARCH_LEN,
            api: HttpConfig::api(),
            reads: HttpConfig::reads(),
        }
    }

    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::config(format!("{} is not set", BASE_URL_VAR)))?;
        let base_url = validate_base_url(&raw_url)?;

        let timezone = match lookup(TIMEZONE_VAR).filter(|v| !v.trim().is_empty()) {
            Some(name) => parse_timezone(&name)?,
            None => system_timezone(lookup("TZ")),
        };

        let search_debounce = match lookup(DEBOUNCE_VAR) {
            Some(ms) => ms
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| AppError::config(format!("{} must be a whole number of milliseconds", DEBOUNCE_VAR)))?,
            None => DEFAULT_SEARCH_DEBOUNCE,
        };

        info!("Using booking server {} in timezone {}", base_url, timezone.name());

        Ok(Self {
            search_debounce,
            ..Self::new(base_url, timezone)
        })
    }
}

/// Accepts absolute http(s) URLs with a host and no query or fragment.
pub fn validate_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| AppError::config(format!("Invalid base URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config(format!(
            "Base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::config("Base URL must include a host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(AppError::config("Base URL must not carry a query or fragment"));
    }
    if url.scheme() == "http" && !is_local(&url) {
        warn!("Booking server {} is not using TLS", url);
    }

    Ok(url)
}

pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::timezone(format!("Unknown timezone '{}'", name.trim())))
}

/// `TZ` as the C library reads it: an optional leading `:` and possibly a
/// zoneinfo path. Anything unusable means UTC.
fn system_timezone(raw: Option<String>) -> Tz {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Tz::UTC,
    };
    let name = raw.trim().trim_start_matches(':');
    let name = match name.rfind("zoneinfo/") {
        Some(at) => &name[at + "zoneinfo/".len()..],
        None => name,
    };
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("Ignoring TZ '{}': not a known timezone, using UTC", raw.trim());
            Tz::UTC
        }
    }
}

fn is_local(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_base_url_required() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(BASE_URL_VAR, "https://rooms.example.com")])).unwrap();
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.min_search_len, 3);
    }

    #[test]
    fn test_timezone_falls_back_to_tz() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://rooms.example.com"),
            ("TZ", "Asia/Kolkata"),
        ]))
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);

        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://rooms.example.com"),
            (TIMEZONE_VAR, "Europe/Berlin"),
            ("TZ", "Asia/Kolkata"),
        ]))
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_tz_in_libc_forms() {
        let base = (BASE_URL_VAR, "https://rooms.example.com");
        let config = ClientConfig::from_lookup(lookup(&[base, ("TZ", ":Europe/Berlin")])).unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);

        let config = ClientConfig::from_lookup(lookup(&[base, ("TZ", "/usr/share/zoneinfo/Asia/Kolkata")])).unwrap();
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);

        let config = ClientConfig::from_lookup(lookup(&[base, (TIMEZONE_VAR, "  "), ("TZ", "Asia/Kolkata")])).unwrap();
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn test_unknown_tz_uses_utc() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://rooms.example.com"),
            ("TZ", "EST5EDT,M3.2.0,M11.1.0"),
        ]))
        .unwrap();
        assert_eq!(config.timezone, Tz::UTC);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[
                (BASE_URL_VAR, "https://rooms.example.com"),
                (TIMEZONE_VAR, "Mars/Olympus"),
            ])),
            Err(AppError::Timezone(_))
        ));
        assert!(ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://rooms.example.com"),
            (DEBOUNCE_VAR, "soon"),
        ]))
        .is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://rooms.example.com/api-root/").is_ok());
        assert!(validate_base_url("http://localhost:5000").is_ok());
        assert!(validate_base_url("ftp://rooms.example.com").is_err());
        assert!(validate_base_url("https://rooms.example.com/?x=1").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(BASE_URL_VAR, "https://rooms.example.com");
        env::set_var(TIMEZONE_VAR, "America/New_York");
        env::set_var(DEBOUNCE_VAR, "150");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url.as_str(), "https://rooms.example.com/");
        assert_eq!(config.timezone, chrono_tz::America::New_York);
        assert_eq!(config.search_debounce, Duration::from_millis(150));

        env::remove_var(BASE_URL_VAR);
        env::remove_var(TIMEZONE_VAR);
        env::remove_var(DEBOUNCE_VAR);
    }

    #[test]
    #[serial]
    fn test_from_env_missing_url() {
        env::remove_var(BASE_URL_VAR);
        assert!(ClientConfig::from_env().is_err());
    }
}
