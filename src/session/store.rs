use crate::config::Config;
use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{SameSite, time::Duration as CookieDuration};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const SESSION_COOKIE: &str = "hrm_session";

/// Bearer credential issued by the HR backend for one signed-in user.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    #[serde(default)]
    pub user: Option<Value>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Session middleware keeping the credential in a private (encrypted)
/// cookie that lives for the configured session TTL.
pub fn session_middleware(config: &Config) -> SessionMiddleware<CookieSessionStore> {
    let ttl = CookieDuration::try_from(config.session_ttl).unwrap_or(CookieDuration::hours(8));

    SessionMiddleware::builder(CookieSessionStore::default(), config.session_key.key())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(config.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Strict)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}
