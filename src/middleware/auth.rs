use std::str::FromStr;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::error::{AuthFailure, Error};
use crate::models::user::Role;
use crate::utils::token::{SessionClaims, TokenError, TokenService};
use crate::AppState;

/// Who may call a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    Authenticated,
    Admin,
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" | "none" => Ok(Self::Public),
            "authenticated" | "auth" | "bearer" => Ok(Self::Authenticated),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown access policy '{}'", other)),
        }
    }
}

impl AccessPolicy {
    /// Wraps every route of `router` with the matching guard.
    pub fn guard(self, router: Router<AppState>, state: &AppState) -> Router<AppState> {
        match self {
            AccessPolicy::Public => router,
            AccessPolicy::Authenticated => {
                router.route_layer(from_fn_with_state(state.clone(), require_bearer_auth))
            }
            AccessPolicy::Admin => {
                router.route_layer(from_fn_with_state(state.clone(), require_admin))
            }
        }
    }
}

/// Missing or unreadable credentials are 401; a token that fails
/// verification is 403.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<SessionClaims, Error> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Err(Error::Unauthorized("Token d'accès requis".to_string()));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(Error::Unauthorized("En-tête d'autorisation invalide".to_string()));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    else {
        return Err(Error::Unauthorized("Token d'accès requis".to_string()));
    };

    tokens.verify(token).map_err(|e| {
        match &e {
            TokenError::Expired => tracing::debug!("rejected expired token"),
            other => tracing::debug!("rejected token: {}", other),
        }
        Error::Forbidden("Token invalide ou expiré".to_string())
    })
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate(req.headers(), &state.tokens) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => AuthFailure(err).into_response(),
    }
}

pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), &state.tokens) {
        Ok(claims) if claims.role == Role::Admin => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(claims) => {
            tracing::info!(user_id = claims.id, "non-admin request to an admin route");
            AuthFailure(Error::Forbidden("Accès réservé aux administrateurs".to_string()))
                .into_response()
        }
        Err(err) => AuthFailure(err).into_response(),
    }
}
