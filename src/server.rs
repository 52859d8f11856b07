/// HTTP server factory and configuration.
/// Provides reusable functions to build the route table and start the HTTP
/// server for use in both the main binary and tests.

use actix_web::{error, middleware, web, App, HttpRequest, HttpServer};
use crate::db::DbPool;
use crate::error::{AppError, FieldErrors};
use crate::handlers::{self, admin, auth, contacts, favorites, phones, reports, requests, skills, students};
use crate::services::AuthSettings;

/// Register every route of the API on `cfg`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        // Auth
        .route("/auth/register", web::post().to(auth::register))
        .route("/auth/login", web::post().to(auth::login))
        .route("/auth/refresh", web::post().to(auth::refresh))
        .route("/auth/logout", web::post().to(auth::logout))
        .route("/auth/me", web::get().to(auth::me))
        // Students; /students/me must precede /students/{id}
        .route("/students", web::get().to(students::browse))
        .route("/students/me", web::get().to(students::my_profile))
        .route("/students/me", web::put().to(students::update_profile))
        .route("/students/me/skills", web::put().to(students::update_skills))
        .route("/students/{id}", web::get().to(students::get_student))
        // Skills
        .route("/skills", web::get().to(skills::list_skills))
        .route("/skills", web::post().to(skills::create_skill))
        .route("/skills/{id}", web::put().to(skills::update_skill))
        .route("/skills/{id}", web::delete().to(skills::delete_skill))
        // Swap requests
        .route("/requests", web::post().to(requests::create_request))
        .route("/requests", web::get().to(requests::list_requests))
        .route("/requests/{id}", web::get().to(requests::get_request))
        .route("/requests/{id}", web::delete().to(requests::cancel_request))
        .route("/requests/{id}/status", web::put().to(requests::update_status))
        // Favorites
        .route("/favorites", web::get().to(favorites::list_favorites))
        .route("/favorites", web::post().to(favorites::add_favorite))
        .route("/favorites/{student_id}", web::delete().to(favorites::remove_favorite))
        // Reports and contact form
        .route("/reports", web::post().to(reports::create_report))
        .route("/contacts", web::post().to(contacts::submit_contact))
        // Phone numbers
        .route("/users/me/phones", web::get().to(phones::list_phones))
        .route("/users/me/phones", web::post().to(phones::add_phone))
        .route("/users/me/phones/{id}", web::delete().to(phones::remove_phone))
        // Admin dashboard
        .route("/admin/stats", web::get().to(admin::stats))
        .route("/admin/users", web::get().to(admin::list_users))
        .route("/admin/users/{id}", web::delete().to(admin::delete_user))
        .route("/admin/users/{id}/role", web::put().to(admin::set_role))
        .route("/admin/requests", web::get().to(admin::list_requests))
        .route("/admin/requests/{id}", web::delete().to(admin::delete_request))
        .route("/admin/reports", web::get().to(admin::list_reports))
        .route("/admin/reports/{id}", web::put().to(admin::update_report))
        .route("/admin/reports/{id}", web::delete().to(admin::delete_report))
        .route("/admin/contacts", web::get().to(admin::list_contacts))
        .route("/admin/contacts/{id}", web::delete().to(admin::delete_contact));
}

/// Malformed JSON bodies become 400 responses in the usual envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        FieldErrors::single("body", err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err: error::PathError, _req: &HttpRequest| {
        AppError::NotFound("Resource not found".to_string()).into()
    })
}

/// Create a configured HTTP server
///
/// Takes a database pool, token lifetimes and bind address, then returns a
/// fully configured `HttpServer` ready to be run.
///
/// # Example
/// ```ignore
/// let pool = web::Data::new(db::create_pool("skillswap.db")?);
/// let settings = web::Data::new(AuthSettings::default());
/// let server = server::create_http_server(pool, settings, "127.0.0.1:4000")?;
/// server.await?;
/// ```
pub fn create_http_server(
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(settings.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server with an in-memory database
///
/// Binds to a random available port.
///
/// # Returns
/// A tuple of (server, bind_address) where bind_address can be used to make requests
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let pool = web::Data::new(crate::db::create_test_pool());
    let settings = web::Data::new(AuthSettings::default());

    // Bind to 127.0.0.1:0 to get a random available port
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(settings.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind("127.0.0.1:0")?;

    let addr_str = server
        .addrs()
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    Ok((server.run(), addr_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    macro_rules! test_app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool))
                    .app_data(web::Data::new(AuthSettings::default()))
                    .app_data(json_config())
                    .app_data(query_config())
                    .app_data(path_config())
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[tokio::test]
    async fn test_create_http_server_with_test_pool() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let settings = web::Data::new(AuthSettings::default());

        let result = create_http_server(pool, settings, "127.0.0.1:0");
        assert!(result.is_ok(), "create_http_server should succeed");
    }

    #[tokio::test]
    async fn test_create_http_server_invalid_address() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let settings = web::Data::new(AuthSettings::default());

        let result = create_http_server(pool, settings, "invalid_address:99999");
        assert!(result.is_err(), "create_http_server should fail with invalid address");
    }

    #[tokio::test]
    async fn test_create_test_http_server() {
        let (_server, addr) = create_test_http_server().expect("Server creation should succeed");
        assert!(addr.starts_with("127.0.0.1:"));
        let port_part = addr.split(':').nth(1).unwrap_or("");
        assert!(!port_part.is_empty(), "Port should be assigned");
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test_app!(crate::db::create_test_pool());

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true, "data": { "status": "ok" } }));
    }

    #[actix_web::test]
    async fn test_malformed_json_is_enveloped() {
        let app = test_app!(crate::db::create_test_pool());

        let req = test::TestRequest::post()
            .uri("/contacts")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["fields"]["body"].is_string());
    }

    #[actix_web::test]
    async fn test_protected_route_requires_session() {
        let app = test_app!(crate::db::create_test_pool());

        let req = test::TestRequest::get().uri("/students").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authentication required");
    }

    #[actix_web::test]
    async fn test_register_sets_session_cookie() {
        let app = test_app!(crate::db::create_test_pool());

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": "alice@example.com",
                "name": "Alice",
                "password": "password123",
                "phone_numbers": ["5550001111"]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == crate::handlers::SESSION_COOKIE)
            .expect("Session cookie missing");
        assert_eq!(cookie.http_only(), Some(true));

        let token = cookie.value().to_string();
        let req = test::TestRequest::get()
            .uri("/auth/me")
            .cookie(actix_web::cookie::Cookie::new(crate::handlers::SESSION_COOKIE, token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["user"]["email"], "alice@example.com");
        assert_eq!(body["data"]["student"]["name"], "Alice");
    }

    #[actix_web::test]
    async fn test_unknown_student_id_is_404() {
        let app = test_app!(crate::db::create_test_pool());

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": "bob@example.com",
                "name": "Bob",
                "password": "password123",
                "phone_numbers": ["5550001111"]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let token = body["data"]["access_token"].as_str().expect("token").to_string();

        for uri in ["/students/999", "/students/not-a-number"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }
}
