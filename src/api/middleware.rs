//! Admission middleware chain.
//!
//! Ordered gates in front of the handlers: the rate limiter runs first on
//! every API route, then authentication, then (on the execution route
//! only) the daily execution quota. A rejected request never reaches the
//! next stage, and neither check is re-validated inside the queue.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::domain::errors::{AdmissionScope, DomainError};
use crate::domain::models::Principal;
use crate::services::quota;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Request rate limiter, applied to every API route.
///
/// The counter identity is the authenticated subject when the presented
/// token resolves, else a synthetic network-origin identity. Applies the
/// system-wide fixed window and limit.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match bearer_token(&req) {
        Some(token) => match state.identities.authenticate(token).await {
            Some(principal) => principal.id,
            None => origin_identity(&req),
        },
        None => origin_identity(&req),
    };

    let admission = state
        .counters
        .check_and_increment(
            &format!("ratelimit:{identity}"),
            Duration::from_secs(state.admission.rate_limit_window_secs),
            state.admission.max_requests_per_window,
        )
        .await
        .map_err(ApiError::from)?;

    if !admission.admitted {
        debug!(%identity, count = admission.current_count, "rate limit exceeded");
        return Err(DomainError::AdmissionRejected {
            scope: AdmissionScope::RateLimit,
        }
        .into());
    }

    Ok(next.run(req).await)
}

fn origin_identity(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "ip:unknown".to_string(), |info| format!("ip:{}", info.0.ip()))
}

/// Authentication: resolves the bearer token to a `Principal` request
/// extension. 401 when the header is missing, malformed, or unknown.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&req) else {
        return Err(ApiError::Unauthorized(
            "Authorization header is required".to_string(),
        ));
    };

    let Some(principal) = state.identities.authenticate(token).await else {
        return Err(ApiError::Unauthorized("Invalid token".to_string()));
    };

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Daily execution quota gate, applied to the execution route only.
/// Requires `authenticate` to have run. The window key is the identity
/// plus the UTC calendar day; the limit merges the principal's quota blob
/// with the system default.
pub async fn execution_quota(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(principal) = req.extensions().get::<Principal>().cloned() else {
        return Err(ApiError::Internal("principal missing from request".to_string()));
    };

    let limit = quota::effective_limit(
        principal.quota.as_deref(),
        quota::MAX_EXECUTIONS_PER_DAY,
        state.admission.max_executions_per_day,
    );

    let day = Utc::now().format("%Y-%m-%d");
    let key = format!("execution_quota:{}:{day}", principal.id);

    let admission = state
        .counters
        .check_and_increment(&key, DAY, limit)
        .await
        .map_err(ApiError::from)?;

    if !admission.admitted {
        debug!(identity = %principal.id, %limit, "execution quota exceeded");
        return Err(DomainError::AdmissionRejected {
            scope: AdmissionScope::ExecutionQuota,
        }
        .into());
    }

    Ok(next.run(req).await)
}
