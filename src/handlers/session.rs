/// Request extractors resolving the caller's session.
///
/// The access token is read from `Authorization: Bearer <token>` first and
/// from the `session` cookie otherwise.
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::db::models::User;
use crate::db::DbPool;
use crate::error::AppError;
use crate::services::{require_admin, AuthService};

pub const SESSION_COOKIE: &str = "session";

/// An authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// An authenticated caller with role ADMIN
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// The raw access token carried by a request, if any
pub fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let pool = pool.ok_or_else(|| AppError::Internal("Database pool not configured".to_string()))?;
            let token = token.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
            let user = AuthService::authenticate(&pool, &token).await?;
            Ok(AuthUser { user, token })
        })
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = AuthUser::from_request(req, payload);
        Box::pin(async move {
            let AuthUser { user, .. } = auth.await?;
            require_admin(&user)?;
            Ok(AdminUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_missing_or_malformed_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(session_token(&req), None);
        assert_eq!(session_token(&TestRequest::default().to_http_request()), None);
    }
}
