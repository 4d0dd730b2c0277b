//! Bearer session state
//!
//! The backend issues a JWT at login; every subsequent request carries it as
//! a bearer header. The client never holds the signing key, so the token is
//! decoded with signature validation disabled purely to read the `exp`
//! claim: an expired token is reported as `SessionExpired` *before* a
//! request is sent, and a 401 response clears the session the same way.
//!
//! `SessionStore` is the single writer of session state. Readers take cheap
//! snapshots; there is no global mutable state.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::RwLock;

use core_kernel::PortError;

#[derive(Debug, Deserialize)]
struct BearerClaims {
    exp: Option<i64>,
}

/// An authenticated session snapshot
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Builds a session from a raw bearer token, reading its `exp` claim
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let expires_at = decode_expiry(&token);
        Self { token, expires_at }
    }

    /// The raw bearer token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// When the token expires, if it carried an `exp` claim
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token is expired at the given instant. Tokens without an
    /// `exp` claim never expire locally; the backend still rejects them.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(exp) if exp <= now)
    }
}

/// Reads the `exp` claim from a JWT without verifying its signature
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<BearerClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims.exp.and_then(|ts| DateTime::from_timestamp(ts, 0))
}

/// Holds the current session; init, refresh and clear are the only writes
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the session after login
    pub fn init(&self, token: impl Into<String>) {
        *self.write() = Some(Session::from_token(token));
    }

    /// Replaces the token after a backend-issued refresh
    pub fn refresh(&self, token: impl Into<String>) {
        self.init(token);
    }

    /// Drops the session; done on logout and on any 401 response
    pub fn clear(&self) {
        *self.write() = None;
    }

    /// A snapshot of the current session, if any
    pub fn snapshot(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The bearer token for the next request. Missing or locally expired
    /// sessions surface as `SessionExpired` so the caller can route the
    /// user to `login_path` without a doomed round trip.
    pub fn bearer_token(&self, login_path: &str) -> Result<String, PortError> {
        let session = self.snapshot().ok_or_else(|| PortError::SessionExpired {
            login_path: login_path.to_string(),
        })?;
        if session.is_expired(Utc::now()) {
            self.clear();
            return Err(PortError::SessionExpired {
                login_path: login_path.to_string(),
            });
        }
        Ok(session.token().to_string())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
