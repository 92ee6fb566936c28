use actix_web::cookie::Key;
use anyhow::{Context, Result, bail};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const SESSION_KEY_MIN_LEN: usize = 64;

/// Signing and encryption key of the session cookie.
#[derive(Clone)]
pub struct SessionKey(Key);

impl SessionKey {
    pub fn key(&self) -> Key {
        self.0.clone()
    }

    fn from_secret(secret: &str) -> Result<Self> {
        if secret.len() < SESSION_KEY_MIN_LEN {
            bail!(
                "SESSION_KEY is too short: need at least {SESSION_KEY_MIN_LEN} bytes, got {}",
                secret.len()
            );
        }
        Ok(Self(Key::derive_from(secret.as_bytes())))
    }

    pub fn generate() -> Self {
        Self(Key::generate())
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// Fallback values applied to omitted form fields before submission.
///
/// None of these are backend contracts; a fallback that is not configured
/// leaves the field absent so the backend's own validation decides.
#[derive(Clone, Debug)]
pub struct FormDefaults {
    pub fill_today_dates: bool,
    pub advance_installment_months: Option<u32>,
    pub penalty_type: Option<String>,
    pub allowance_type: Option<String>,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            fill_today_dates: true,
            advance_installment_months: None,
            penalty_type: None,
            allowance_type: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub backend_url: String,
    pub backend_timeout: Option<Duration>,
    pub session_ttl: Duration,
    pub session_key: SessionKey,
    pub cookie_secure: bool,

    // Rate limiting
    pub rate_login_per_min: u32,

    pub console_prefix: String,
    pub expiry_window_days: u32,
    pub currency_suffix: String,
    pub form_defaults: FormDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend_url = lookup("BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .context("BACKEND_URL must be set")?;

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            backend_url: backend_url.trim().trim_end_matches('/').to_string(),
            backend_timeout: parse::<u64>(&lookup, "BACKEND_TIMEOUT_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            session_ttl: session_ttl(&lookup)?,
            session_key: match text(&lookup, "SESSION_KEY") {
                Some(secret) => SessionKey::from_secret(&secret)?,
                None => {
                    warn!("SESSION_KEY not set; sessions will not survive a restart");
                    SessionKey::generate()
                }
            },
            cookie_secure: parse(&lookup, "SESSION_COOKIE_SECURE")?.unwrap_or(false),
            rate_login_per_min: parse(&lookup, "RATE_LOGIN_PER_MIN")?.unwrap_or(30),
            console_prefix: lookup("CONSOLE_PREFIX")
                .map(|p| format!("/{}", p.trim().trim_matches('/')))
                .unwrap_or_else(|| "/console".to_string()),
            expiry_window_days: parse(&lookup, "EXPIRY_WINDOW_DAYS")?.unwrap_or(30),
            currency_suffix: lookup("CURRENCY_SUFFIX").unwrap_or_else(|| "SAR".to_string()),
            form_defaults: FormDefaults {
                fill_today_dates: parse(&lookup, "FILL_TODAY_DATES")?.unwrap_or(true),
                advance_installment_months: parse(&lookup, "DEFAULT_ADVANCE_INSTALLMENTS")?,
                penalty_type: text(&lookup, "DEFAULT_PENALTY_TYPE"),
                allowance_type: text(&lookup, "DEFAULT_ALLOWANCE_TYPE"),
            },
        })
    }
}

fn session_ttl(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration> {
    let secs = parse(lookup, "SESSION_TTL_SECS")?.unwrap_or(DEFAULT_SESSION_TTL_SECS);
    if secs == 0 || secs > MAX_SESSION_TTL_SECS {
        bail!("SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}, got {secs}");
    }
    Ok(Duration::from_secs(secs))
}

fn text(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match text(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(None),
    }
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        backend_url: "http://backend.test/api".to_string(),
        backend_timeout: None,
        session_ttl: Duration::from_secs(60),
        session_key: SessionKey(Key::from(&[7u8; SESSION_KEY_MIN_LEN])),
        cookie_secure: false,
        rate_login_per_min: 1000,
        console_prefix: "/console".to_string(),
        expiry_window_days: 30,
        currency_suffix: "SAR".to_string(),
        form_defaults: FormDefaults::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn backend_url_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("BACKEND_URL"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[("BACKEND_URL", "https://hr.test/api/")]))
            .unwrap();
        assert_eq!(config.backend_url, "https://hr.test/api");
        assert_eq!(config.console_prefix, "/console");
        assert_eq!(config.expiry_window_days, 30);
        assert!(config.backend_timeout.is_none());
        assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
        assert!(config.form_defaults.fill_today_dates);
        assert!(config.form_defaults.advance_installment_months.is_none());
        assert!(config.form_defaults.penalty_type.is_none());
    }

    #[test]
    fn form_defaults_are_read_from_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("BACKEND_URL", "https://hr.test/api"),
            ("DEFAULT_ADVANCE_INSTALLMENTS", "3"),
            ("DEFAULT_PENALTY_TYPE", "late arrival"),
            ("FILL_TODAY_DATES", "false"),
            ("CONSOLE_PREFIX", "admin/"),
        ]))
        .unwrap();
        assert_eq!(config.form_defaults.advance_installment_months, Some(3));
        assert_eq!(config.form_defaults.penalty_type.as_deref(), Some("late arrival"));
        assert!(!config.form_defaults.fill_today_dates);
        assert_eq!(config.console_prefix, "/admin");
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = Config::from_lookup(lookup_from(&[
            ("BACKEND_URL", "https://hr.test/api"),
            ("SESSION_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECS"));
    }

    #[rstest]
    #[case("0")]
    #[case("31536000000")]
    fn session_ttl_out_of_range_is_rejected(#[case] ttl: &str) {
        let err = Config::from_lookup(lookup_from(&[
            ("BACKEND_URL", "https://hr.test/api"),
            ("SESSION_TTL_SECS", ttl),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("must be between"));
    }

    #[test]
    fn short_session_key_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("BACKEND_URL", "https://hr.test/api"),
            ("SESSION_KEY", "too-short"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SESSION_KEY"));

        let secret = "k".repeat(SESSION_KEY_MIN_LEN);
        let config = Config::from_lookup(lookup_from(&[
            ("BACKEND_URL", "https://hr.test/api"),
            ("SESSION_KEY", &secret),
        ]))
        .unwrap();
        assert_eq!(format!("{:?}", config.session_key), "SessionKey(<redacted>)");
    }
}
