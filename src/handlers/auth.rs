/// Registration, login and session lifecycle endpoints.
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};

use super::session::{session_token, AuthUser, SESSION_COOKIE};
use super::{created, done, ok};
use crate::db::models::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, SessionResponse};
use crate::db::DbPool;
use crate::error::Result;
use crate::services::{AuthService, AuthSettings};

fn session_cookie(session: &SessionResponse, settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session.access_token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(settings.session_ttl.num_seconds()))
        .finish()
}

fn with_cookie(mut response: HttpResponse, cookie: Cookie<'static>) -> HttpResponse {
    if let Err(e) = response.add_cookie(&cookie) {
        log::error!("Failed to set session cookie: {}", e);
    }
    response
}

/// Register a student account
/// POST /auth/register
pub async fn register(
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let session = AuthService::register(&pool, &settings, &req).await?;
    let cookie = session_cookie(&session, &settings);
    Ok(with_cookie(created(session), cookie))
}

/// POST /auth/login
pub async fn login(
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let session = AuthService::login(&pool, &settings, &req).await?;
    let cookie = session_cookie(&session, &settings);
    Ok(with_cookie(ok(session), cookie))
}

/// POST /auth/refresh
pub async fn refresh(
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    req: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    let session = AuthService::refresh(&pool, &settings, &req.refresh_token).await?;
    let cookie = session_cookie(&session, &settings);
    Ok(with_cookie(ok(session), cookie))
}

/// End the current session. The body is optional.
/// POST /auth/logout
pub async fn logout(
    pool: web::Data<DbPool>,
    http: HttpRequest,
    req: Option<web::Json<LogoutRequest>>,
) -> Result<HttpResponse> {
    let access = session_token(&http);
    let refresh = req.and_then(|body| body.into_inner().refresh_token);
    AuthService::logout(&pool, access.as_deref(), refresh.as_deref()).await?;

    let mut expired = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    expired.make_removal();
    Ok(with_cookie(done(), expired))
}

/// GET /auth/me
pub async fn me(pool: web::Data<DbPool>, auth: AuthUser) -> Result<HttpResponse> {
    Ok(ok(AuthService::me(&pool, &auth.user).await?))
}
