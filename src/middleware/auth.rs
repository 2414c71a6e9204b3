use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::marker::PhantomData;
use std::ops::Deref;
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{AuthError, Claims, PolicyGuard, Role};
use crate::error::ApiError;

/// Authenticated caller extracted from a validated JWT
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and injects [`AuthUser`]
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let claims = state.jwt.validate(token)?;

    debug!("Authenticated {} as {}", claims.email, claims.role);
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

/// An [`AuthUser`] whose role is admitted by policy `P`.
///
/// Rejects with 401 when the request was never authenticated and with 403
/// when the role falls outside the policy.
#[derive(Debug, Clone)]
pub struct Authorized<P> {
    pub user: AuthUser,
    _policy: PhantomData<P>,
}

impl<P> Deref for Authorized<P> {
    type Target = AuthUser;

    fn deref(&self) -> &AuthUser {
        &self.user
    }
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: PolicyGuard,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !P::POLICY.admits(user.role) {
            debug!("{} denied by {}", user.email, P::POLICY.name());
            return Err(AuthError::Forbidden {
                role: user.role,
                policy: P::POLICY.name(),
            }
            .into());
        }
        Ok(Self {
            user,
            _policy: PhantomData,
        })
    }
}
