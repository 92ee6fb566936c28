//! Thin wrapper over the actix session so handlers deal with the signed-in
//! credential instead of raw session keys.

use super::store::Credential;
use crate::errors::ConsoleError;
use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

pub(crate) const SIGNED_IN_KEY: &str = "signed_in";

/// The signed-in session: an opaque id, the backend credential and the
/// instant after which the session is no longer honoured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
    pub credential: Credential,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    /// Stores `credential` in a fresh session, replacing whatever the
    /// cookie carried before.
    pub fn open(
        session: &Session,
        credential: Credential,
        ttl: Duration,
    ) -> Result<Self, ConsoleError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| ConsoleError::Internal(format!("Invalid session TTL: {e}")))?;
        let context = Self {
            session_id: Uuid::new_v4().to_string(),
            credential,
            expires_at: Utc::now() + ttl,
        };

        session.renew();
        session
            .insert(SIGNED_IN_KEY, &context)
            .map_err(|e| ConsoleError::Internal(format!("Failed to persist session: {e}")))?;
        Ok(context)
    }

    /// The live session, if any. Unreadable or expired state is purged.
    pub fn current(session: &Session) -> Option<Self> {
        let context = match session.get::<SessionContext>(SIGNED_IN_KEY) {
            Ok(context) => context?,
            Err(e) => {
                warn!(error = %e, "Unreadable session state");
                session.purge();
                return None;
            }
        };

        if context.expires_at <= Utc::now() {
            session.purge();
            return None;
        }
        Some(context)
    }

    pub fn close(session: &Session) {
        session.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = ConsoleError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // the session gate has usually resolved it already
        let context = req
            .extensions()
            .get::<SessionContext>()
            .cloned()
            .or_else(|| Self::current(&req.get_session()));
        ready(context.ok_or(ConsoleError::Unauthorized))
    }
}
