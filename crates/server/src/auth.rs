//! JWT sessions.
//!
//! Login issues an HS256 token carrying `sub` (the username), `iat` and
//! `exp`. The token travels either in the `token` cookie or in an
//! `Authorization: Bearer` header. Logout puts the token on a blacklist
//! until it expires.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use api_types::auth::{LoginRequest, LoginResponse, RegisterRequest, UserView};
use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::Utc;
use engine::EngineError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState};

pub const TOKEN_COOKIE: &str = "token";
const MIN_KEY_LEN: usize = 32;

/// Settings the session layer is built from.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_key: String,
    pub token_ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub username: String,
}

pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl_minutes: i64,
    secure_cookie: bool,
}

impl AuthKeys {
    pub fn new(config: &AuthConfig) -> Result<Self, ServerError> {
        if config.jwt_key.len() < MIN_KEY_LEN {
            return Err(ServerError::Generic(format!(
                "jwt key must be at least {MIN_KEY_LEN} bytes"
            )));
        }
        if config.token_ttl_minutes <= 0 {
            return Err(ServerError::Generic(
                "token ttl must be positive".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(config.jwt_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_key.as_bytes()),
            validation,
            token_ttl_minutes: config.token_ttl_minutes,
            secure_cookie: config.secure_cookie,
        })
    }

    fn issue(&self, username: &str) -> Result<String, ServerError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat,
            exp: iat + self.token_ttl_minutes * 60,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            tracing::error!("failed to sign token: {err}");
            ServerError::Generic("cannot issue token".to_string())
        })
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims)
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token))
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(time::Duration::minutes(self.token_ttl_minutes))
            .build()
    }
}

/// Revoked tokens with their expiry (unix seconds).
#[derive(Debug, Default)]
pub struct TokenBlacklist {
    revoked: Mutex<HashMap<String, i64>>,
}

impl TokenBlacklist {
    /// Revoke `token` until `exp`. Entries already past their expiry are
    /// purged on the way.
    pub fn revoke(&self, token: &str, exp: i64) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.lock().unwrap_or_else(PoisonError::into_inner);
        revoked.retain(|_, expiry| *expiry > now);
        revoked.insert(token.to_string(), exp);
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(token)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// An `Authorization` header that is absent, not Bearer or unparsable
/// counts as no header at all, so the cookie still applies.
type BearerHeader = Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>;

fn request_token(jar: &CookieJar, bearer: &BearerHeader) -> Option<String> {
    bearer
        .as_ref()
        .ok()
        .map(|header| header.0.token().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| jar.get(TOKEN_COOKIE).map(|cookie| cookie.value().to_string()))
        .filter(|token| !token.is_empty())
}

fn unauthorized(reason: &str) -> ServerError {
    EngineError::Unauthorized(reason.to_string()).into()
}

/// Reject requests without a valid, unrevoked token for an active user.
pub async fn require_auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    bearer: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = request_token(&jar, &bearer).ok_or_else(|| unauthorized("missing token"))?;
    if state.blacklist.is_revoked(&token) {
        return Err(unauthorized("token revoked"));
    }
    let claims = state
        .auth
        .verify(&token)
        .ok_or_else(|| unauthorized("invalid token"))?;

    let user = match state.engine.user(&claims.sub).await {
        Ok(user) if user.active_status => user,
        Ok(_) | Err(EngineError::KeyNotFound(_)) => return Err(unauthorized("unknown user")),
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(CurrentUser {
        username: user.username,
    });
    Ok(next.run(request).await)
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ServerError> {
    let user = match state
        .engine
        .verify_credentials(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(username = %payload.username, "login rejected");
            return Err(err.into());
        }
    };

    let token = state.auth.issue(&user.username)?;
    tracing::info!(username = %user.username, "login succeeded");
    let jar = jar.add(state.auth.session_cookie(token.clone()));
    Ok((
        jar,
        Json(LoginResponse {
            token,
            username: user.username,
        }),
    ))
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state.engine.register_user(payload).await?;
    tracing::info!(username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Revoke the presented token, if any, and clear the cookie.
pub async fn logout(
    State(state): State<ServerState>,
    jar: CookieJar,
    bearer: BearerHeader,
) -> impl IntoResponse {
    if let Some(token) = request_token(&jar, &bearer)
        && let Some(claims) = state.auth.verify(&token)
    {
        state.blacklist.revoke(&token, claims.exp);
        tracing::info!(username = %claims.sub, "logout");
    }
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(state.engine.user(&user.username).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AuthKeys {
        AuthKeys::new(&AuthConfig {
            jwt_key: "k".repeat(32),
            token_ttl_minutes: 60,
            secure_cookie: true,
        })
        .unwrap()
    }

    #[test]
    fn short_keys_are_rejected() {
        let config = AuthConfig {
            jwt_key: "short".to_string(),
            token_ttl_minutes: 60,
            secure_cookie: true,
        };
        assert!(AuthKeys::new(&config).is_err());
    }

    #[test]
    fn issued_tokens_verify() {
        let keys = keys();
        let token = keys.issue("brian").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "brian");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn foreign_and_expired_tokens_fail() {
        let keys = keys();
        let other = AuthKeys::new(&AuthConfig {
            jwt_key: "o".repeat(32),
            token_ttl_minutes: 60,
            secure_cookie: true,
        })
        .unwrap();
        assert!(keys.verify(&other.issue("brian").unwrap()).is_none());

        let now = Utc::now().timestamp();
        let expired = encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: "brian".to_string(),
                iat: now - 120,
                exp: now - 60,
            },
            &keys.encoding,
        )
        .unwrap();
        assert!(keys.verify(&expired).is_none());
        assert!(keys.verify("not-a-jwt").is_none());
    }

    #[test]
    fn session_cookie_is_locked_down() {
        let cookie = keys().session_cookie("abc".to_string());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(60)));
    }

    #[test]
    fn blacklist_purges_expired_entries() {
        let blacklist = TokenBlacklist::default();
        let now = Utc::now().timestamp();
        blacklist.revoke("old", now - 1);
        assert!(blacklist.is_revoked("old"));
        blacklist.revoke("new", now + 60);
        assert!(!blacklist.is_revoked("old"));
        assert!(blacklist.is_revoked("new"));
        assert_eq!(blacklist.len(), 1);
    }
}
