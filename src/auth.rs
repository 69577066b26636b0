//! Admin session: password login issuing a signed, expiring token.
//!
//! The token travels in the `admin-session` HttpOnly cookie or an
//! `Authorization: Bearer` header.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use bcrypt::DEFAULT_COST;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::settings::SettingsService;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin-session";
pub const ADMIN_SUBJECT: &str = "admin";
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Hash a password on the blocking pool; bcrypt is CPU bound.
pub async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(e) => {
            // A malformed stored hash can never match.
            tracing::error!(error = %e, "stored admin password hash is invalid");
            Ok(false)
        }
    }
}

/// Token from the session cookie, falling back to a bearer header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
    })
}

#[derive(Clone)]
pub struct SessionService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure_cookie: bool,
    bcrypt_cost: u32,
    settings: SettingsService,
}

impl SessionService {
    pub fn new(secret: &str, ttl_hours: i64, secure_cookie: bool, settings: SettingsService) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
            secure_cookie,
            bcrypt_cost: DEFAULT_COST,
            settings,
        }
    }

    /// Override the bcrypt work factor (tests use the minimum).
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    fn issue(&self) -> AppResult<Session> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign session: {}", e)))?;
        Ok(Session { token, expires_at })
    }

    pub async fn login(&self, password: Option<String>) -> AppResult<Session> {
        let Some(password) = password.filter(|p| !p.is_empty()) else {
            return Err(AppError::validation("Password is required"));
        };

        let Some(hash) = self.settings.password_hash().await? else {
            tracing::warn!("login attempted but no admin password is configured");
            return Err(AppError::Unauthorized);
        };

        if !verify_password(password, hash).await? {
            tracing::warn!("admin login failed: invalid password");
            return Err(AppError::Unauthorized);
        }

        let session = self.issue()?;
        tracing::info!(expires_at = %session.expires_at, "admin logged in");
        Ok(session)
    }

    /// Claims of a valid admin token: good signature, not expired, admin subject.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) if data.claims.sub == ADMIN_SUBJECT => Some(data.claims),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                None
            }
        }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Option<Claims> {
        token_from_headers(headers).and_then(|t| self.verify(&t))
    }

    pub fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        self.authenticate(headers).is_some()
    }

    pub async fn change_password(&self, current: &str, new: &str) -> AppResult<()> {
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "New password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }

        let hash = self
            .settings
            .password_hash()
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !verify_password(current.to_string(), hash).await? {
            tracing::warn!("password change rejected: current password does not match");
            return Err(AppError::Unauthorized);
        }

        let new_hash = hash_password(new.to_string(), self.bcrypt_cost).await?;
        self.settings.store_password_hash(new_hash).await?;
        tracing::info!("admin password changed");
        Ok(())
    }

    /// `Set-Cookie` value carrying a session.
    pub fn session_cookie(&self, session: &Session) -> String {
        self.cookie(&session.token, self.ttl.num_seconds())
    }

    /// `Set-Cookie` value that removes the session.
    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, value, max_age
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extractor guarding admin handlers. Rejects with 401 before the body is
/// read, so it must come before any body extractor.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .sessions()
            .authenticate(&parts.headers)
            .map(AdminSession)
            .ok_or(AppError::Unauthorized)
    }
}
