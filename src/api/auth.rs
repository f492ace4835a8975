use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::validation::{validate_email, validate_password, validate_required};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{AccountDto, LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use crate::entities::accounts::Role;

/// Name of the HTTP-only auth cookie.
const AUTH_COOKIE: &str = "token";

/// One message for every gate failure. Which check failed (missing token,
/// bad signature, expiry, unknown account) is never distinguishable from
/// the response.
const NOT_AUTHORIZED: &str = "Not authorized";

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// The verified identity attached to a request after the auth gate.
/// Built from the account record with the password hash stripped.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<crate::db::Account> for CurrentUser {
    fn from(account: crate::db::Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication gate: extract a token (cookie first, then bearer header),
/// verify it, load the account, and attach the identity to the request.
/// Every failure short-circuits with a uniform 401 before the handler — and
/// before any handler-side database work — runs.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let account_id = state
        .tokens
        .verify(&token)
        .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let account = state
        .store()
        .get_account(account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    tracing::Span::current().record("user_id", account.email.as_str());

    request.extensions_mut().insert(CurrentUser::from(account));
    Ok(next.run(request).await)
}

/// Role gate. Runs strictly after `authenticate`: it only inspects the
/// identity that middleware attached.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.role == Role::Admin => Ok(next.run(request).await),
        Some(user) => {
            warn!("Role gate refused {} (role {:?})", user.email, user.role);
            Err(ApiError::Forbidden(
                "Admin privileges are required for this operation".to_string(),
            ))
        }
        None => Err(ApiError::Unauthorized(NOT_AUTHORIZED.to_string())),
    }
}

/// Token sources in priority order: the HTTP-only cookie set at login, then
/// an `Authorization: Bearer` header. First match wins.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && name == AUTH_COOKIE
                && !value.is_empty()
            {
                return Some(value.to_string());
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Verify credentials, issue a token, and set it as an HTTP-only cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = validate_required("email", &payload.email)?;
    validate_required("password", &payload.password)?;

    let is_valid = state
        .store()
        .verify_account_password(email, &payload.password)
        .await?;

    if !is_valid {
        warn!("Failed login attempt for: {email}");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let account = state
        .store()
        .get_account_by_email(email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    // Best effort: a failed timestamp write must not block the login.
    if let Err(e) = state.store().record_account_login(account.id).await {
        warn!("Failed to record login time: {e:#}");
    }

    let token = state
        .tokens
        .issue(account.id)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e:#}")))?;

    info!("Successful login for: {}", account.email);

    let cookie = session_cookie(
        &token,
        state.tokens.expiry_seconds(),
        state.config.server.secure_cookies,
    );

    let body = Json(ApiResponse::success(LoginResponse {
        token,
        user: AccountDto::from(account),
    }));

    let mut response = body.into_response();
    append_cookie(&mut response, &cookie)?;
    Ok(response)
}

/// POST /api/auth/register
/// Public self-service registration. Always creates a `user` role account;
/// the admin account only ever comes from the seed command.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountDto>>), ApiError> {
    let name = validate_required("name", &payload.name)?;
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    if state.store().get_account_by_email(email).await?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let account = state
        .store()
        .create_account(
            email,
            name,
            &payload.password,
            Role::User,
            &state.config.security,
        )
        .await?;

    info!("Registered account: {}", account.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AccountDto::from(account))),
    ))
}

/// GET /api/auth/me
/// Identity echo for the authenticated caller; the hash never reaches this
/// type, so it cannot leak.
pub async fn current_account(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<CurrentUser>> {
    Json(ApiResponse::success(user))
}

/// POST /api/auth/logout
/// Clears the auth cookie. Tokens are stateless, so there is nothing to
/// revoke server-side; the bearer copy dies when the client drops it.
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let cookie = clear_cookie(state.config.server.secure_cookies);

    let body = Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }));

    let mut response = body.into_response();
    append_cookie(&mut response, &cookie)?;
    Ok(response)
}

// ============================================================================
// Helpers
// ============================================================================

fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_cookie(secure: bool) -> String {
    let mut cookie = format!("{AUTH_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn append_cookie(response: &mut Response, cookie: &str) -> Result<(), ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::internal(format!("Invalid cookie value: {e}")))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
