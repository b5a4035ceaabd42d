//! JWT bearer authentication: token issuance, verification and extractors.
//!
//! Access and refresh tokens are HS256 JWTs signed with separate secrets.
//! Both carry the user id (`sub`) and role; `kind` stops a refresh token from
//! being presented as an access token and vice versa.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shelf_core::{store::Store, user::Role};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Secrets and lifetimes for issued tokens.
#[derive(Clone)]
pub struct TokenConfig {
  pub access_secret:    String,
  pub refresh_secret:   String,
  pub access_ttl_secs:  i64,
  pub refresh_ttl_secs: i64,
}

// ─── Claims ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// The user id.
  pub sub:  Uuid,
  pub role: Role,
  /// Unique per token.
  pub jti:  Uuid,
  pub kind: TokenKind,
  /// Expiry, seconds since the Unix epoch.
  pub exp:  i64,
}

/// What a successful login or refresh hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
  pub access_token:  String,
  pub refresh_token: String,
  pub token_type:    String,
  /// Access token lifetime in seconds.
  pub expires_in:    i64,
}

// ─── Issuer ──────────────────────────────────────────────────────────────────

struct Keys {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl Keys {
  fn new(secret: &str, ttl_secs: i64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl:      Duration::seconds(ttl_secs),
    }
  }
}

/// Signs and verifies access and refresh tokens.
pub struct TokenIssuer {
  access:  Keys,
  refresh: Keys,
}

impl TokenIssuer {
  pub fn new(config: &TokenConfig) -> Self {
    Self {
      access:  Keys::new(&config.access_secret, config.access_ttl_secs),
      refresh: Keys::new(&config.refresh_secret, config.refresh_ttl_secs),
    }
  }

  fn keys(&self, kind: TokenKind) -> &Keys {
    match kind {
      TokenKind::Access => &self.access,
      TokenKind::Refresh => &self.refresh,
    }
  }

  fn sign(&self, user_id: Uuid, role: Role, kind: TokenKind) -> Result<String, ApiError> {
    let keys = self.keys(kind);
    let claims = Claims {
      sub: user_id,
      role,
      jti: Uuid::new_v4(),
      kind,
      exp: (Utc::now() + keys.ttl).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
      .map_err(ApiError::internal)
  }

  /// Issue a fresh access/refresh pair for `user_id`.
  pub fn issue(&self, user_id: Uuid, role: Role) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
      access_token:  self.sign(user_id, role, TokenKind::Access)?,
      refresh_token: self.sign(user_id, role, TokenKind::Refresh)?,
      token_type:    "Bearer".to_owned(),
      expires_in:    self.access.ttl.num_seconds(),
    })
  }

  /// Check signature, expiry and kind; return the claims.
  pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = jsonwebtoken::decode::<Claims>(token, &self.keys(kind).decoding, &validation)
      .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        ApiError::Unauthorized("invalid or expired token".to_owned())
      })?;
    if data.claims.kind != kind {
      return Err(ApiError::Unauthorized("wrong token type".to_owned()));
    }
    Ok(data.claims)
  }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_owned()))?;

  match value.split_once(' ') {
    Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
      Ok(token.trim())
    }
    _ => Err(ApiError::Unauthorized("malformed authorization header".to_owned())),
  }
}

/// Present in a handler's arguments: the request carried a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Authenticated {
  pub fn is_staff(&self) -> bool { self.role == Role::Staff }
}

impl<S: Store> FromRequestParts<AppState<S>> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let claims = state.tokens.verify(token, TokenKind::Access)?;
    Ok(Authenticated { user_id: claims.sub, role: claims.role })
  }
}

/// Like [`Authenticated`], but the token must also carry the staff role.
#[derive(Debug, Clone, Copy)]
pub struct Staff(pub Authenticated);

impl<S: Store> FromRequestParts<AppState<S>> for Staff {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let auth = Authenticated::from_request_parts(parts, state).await?;
    if !auth.is_staff() {
      return Err(ApiError::Forbidden);
    }
    Ok(Staff(auth))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn issuer(access_ttl_secs: i64) -> TokenIssuer {
    TokenIssuer::new(&TokenConfig {
      access_secret: "access-secret".into(),
      refresh_secret: "refresh-secret".into(),
      access_ttl_secs,
      refresh_ttl_secs: 3600,
    })
  }

  #[test]
  fn issued_tokens_verify() {
    let tokens = issuer(60);
    let user = Uuid::new_v4();
    let pair = tokens.issue(user, Role::Staff).unwrap();

    let claims = tokens.verify(&pair.access_token, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, user);
    assert_eq!(claims.role, Role::Staff);

    let claims = tokens.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();
    assert_eq!(claims.kind, TokenKind::Refresh);
  }

  #[test]
  fn refresh_token_is_not_an_access_token() {
    let tokens = issuer(60);
    let pair = tokens.issue(Uuid::new_v4(), Role::Default).unwrap();
    assert!(tokens.verify(&pair.refresh_token, TokenKind::Access).is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let tokens = issuer(-3600);
    let pair = tokens.issue(Uuid::new_v4(), Role::Default).unwrap();
    assert!(matches!(
      tokens.verify(&pair.access_token, TokenKind::Access),
      Err(ApiError::Unauthorized(_))
    ));
  }

  #[test]
  fn bearer_header_parsing() {
    let mut headers = HeaderMap::new();
    assert!(bearer_token(&headers).is_err());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
    assert_eq!(bearer_token(&headers).unwrap(), "abc.def");

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert!(bearer_token(&headers).is_err());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
    assert!(bearer_token(&headers).is_err());
  }
}
