/// Account registration, login and session management.
///
/// A session is an opaque access token plus a refresh token. Tokens are 32
/// random bytes, URL-safe base64 encoded; the database only ever sees their
/// SHA-256 digests. Refresh tokens rotate on every use and presenting a
/// rotated token revokes the whole family. Passwords are stored as Argon2id
/// PHC strings.
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::validation::{self, NAME_MAX, NAME_MIN};
use crate::db::models::{
    Credentials, ExperienceLevel, LoginRequest, MeResponse, RegisterRequest, Role,
    SessionResponse, User,
};
use crate::db::tokens::RefreshRotation;
use crate::db::users::{NewAccount, MAX_PHONE_NUMBERS};
use crate::db::{DbPool, StudentStore, TokenStore, UserStore};
use crate::error::{AppError, FieldErrors, Result};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_SESSION: &str = "Invalid or expired session";

/// Token lifetimes, shared with handlers through `web::Data`
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            session_ttl: Duration::minutes(60),
            refresh_ttl: Duration::days(30),
        }
    }
}

/// 32 random bytes from two v4 UUIDs, URL-safe base64 without padding
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Argon2id PHC string with a fresh 16-byte salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(format!("Failed to encode salt: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, credentials: &Credentials) -> bool {
    match PasswordHash::new(&credentials.password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Unreadable password hash for user {}: {}", credentials.user_id, e);
            false
        }
    }
}

fn rfc3339(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .to_rfc3339()
}

pub struct AuthService;

impl AuthService {
    /// Register a student account and open a session for it.
    pub async fn register(
        pool: &DbPool,
        settings: &AuthSettings,
        req: &RegisterRequest,
    ) -> Result<SessionResponse> {
        let mut errors = FieldErrors::new();
        let email = validation::email(&mut errors, "email", &req.email);
        let name = validation::required_text(&mut errors, "name", &req.name, NAME_MIN, NAME_MAX);
        validation::password(&mut errors, "password", &req.password);
        let phone_numbers = validate_phone_list(&mut errors, &req.phone_numbers);
        let experience_level = match req.experience_level.as_deref() {
            Some(level) => validation::parse_enum::<ExperienceLevel>(&mut errors, "experience_level", level)
                .unwrap_or_default(),
            None => ExperienceLevel::default(),
        };
        let availability =
            validation::optional_text(&mut errors, "availability", req.availability.as_deref(), 100);
        errors.into_result()?;

        if UserStore::get_user_by_email(pool, &email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&req.password)?;
        let account = NewAccount {
            email: &email,
            name: &name,
            password_hash: &password_hash,
            phone_numbers: &phone_numbers,
        };
        let (user, student) =
            UserStore::create_student(pool, &account, experience_level, availability.as_deref())
                .await?;
        log::info!("Registered user {} (student {})", user.id, student.id);

        Self::issue_session(pool, settings, user).await
    }

    pub async fn login(
        pool: &DbPool,
        settings: &AuthSettings,
        req: &LoginRequest,
    ) -> Result<SessionResponse> {
        let credentials = UserStore::get_credentials(pool, req.email.trim()).await?;
        let Some(credentials) = credentials.filter(|c| verify_password(&req.password, c)) else {
            log::warn!("Failed login attempt");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let user = UserStore::get_user(pool, credentials.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let purged = TokenStore::purge_expired(pool, Utc::now().timestamp()).await?;
        if purged > 0 {
            log::debug!("Purged {} expired tokens", purged);
        }

        Self::issue_session(pool, settings, user).await
    }

    /// Rotate a refresh token and open a fresh session.
    pub async fn refresh(
        pool: &DbPool,
        settings: &AuthSettings,
        refresh_token: &str,
    ) -> Result<SessionResponse> {
        let now = Utc::now();
        let replacement = generate_token();
        let replacement_expires = (now + settings.refresh_ttl).timestamp();

        let rotation = TokenStore::rotate_refresh_token(
            pool,
            &hash_token(refresh_token),
            &hash_token(&replacement),
            replacement_expires,
            now.timestamp(),
        )
        .await?;

        let user_id = match rotation {
            RefreshRotation::Rotated { user_id, .. } => user_id,
            RefreshRotation::Reused { user_id } => {
                log::warn!("Refresh token reuse for user {}; all sessions revoked", user_id);
                return Err(AppError::Unauthorized(INVALID_SESSION.to_string()));
            }
            RefreshRotation::Expired { .. } | RefreshRotation::Unknown => {
                return Err(AppError::Unauthorized(INVALID_SESSION.to_string()));
            }
        };

        let user = UserStore::get_user(pool, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_SESSION.to_string()))?;
        let (access_token, access_expires_at) = Self::open_access_session(pool, settings, user.id).await?;

        Ok(SessionResponse {
            access_token,
            access_expires_at: rfc3339(access_expires_at),
            refresh_token: replacement,
            refresh_expires_at: rfc3339(replacement_expires),
            user,
        })
    }

    pub async fn logout(
        pool: &DbPool,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<()> {
        if let Some(token) = access_token {
            TokenStore::delete_session(pool, &hash_token(token)).await?;
        }
        if let Some(token) = refresh_token {
            TokenStore::revoke_refresh_token(pool, &hash_token(token)).await?;
        }
        Ok(())
    }

    /// Resolve an access token to its user
    pub async fn authenticate(pool: &DbPool, access_token: &str) -> Result<User> {
        let user_id = TokenStore::session_user(pool, &hash_token(access_token), Utc::now().timestamp())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_SESSION.to_string()))?;
        UserStore::get_user(pool, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_SESSION.to_string()))
    }

    pub async fn me(pool: &DbPool, user: &User) -> Result<MeResponse> {
        let student = match StudentStore::get_by_user(pool, user.id).await? {
            Some(student) => StudentStore::profile(pool, student.id).await?,
            None => None,
        };
        Ok(MeResponse {
            user: user.clone(),
            student,
        })
    }

    /// Make sure an admin account exists for `email`, creating or promoting it.
    pub async fn ensure_admin(
        pool: &DbPool,
        email: &str,
        password: &str,
        name: &str,
        phone: &str,
    ) -> Result<User> {
        let mut errors = FieldErrors::new();
        let email = validation::email(&mut errors, "admin_email", email);
        let name = validation::required_text(&mut errors, "admin_name", name, NAME_MIN, NAME_MAX);
        validation::password(&mut errors, "admin_password", password);
        let phone = validation::phone(&mut errors, "admin_phone", phone);
        errors.into_result()?;

        if let Some(existing) = UserStore::get_user_by_email(pool, &email).await? {
            if existing.role == Role::Admin {
                return Ok(existing);
            }
            log::info!("Promoting existing user {} to admin", existing.id);
            return UserStore::set_role(pool, existing.id, Role::Admin)
                .await?
                .ok_or_else(|| AppError::not_found("User"));
        }

        let password_hash = hash_password(password)?;
        let phones = vec![phone];
        let account = NewAccount {
            email: &email,
            name: &name,
            password_hash: &password_hash,
            phone_numbers: &phones,
        };
        let user = UserStore::create_admin(pool, &account).await?;
        log::info!("Created admin account {}", user.id);
        Ok(user)
    }

    async fn issue_session(
        pool: &DbPool,
        settings: &AuthSettings,
        user: User,
    ) -> Result<SessionResponse> {
        let (access_token, access_expires_at) = Self::open_access_session(pool, settings, user.id).await?;

        let refresh_token = generate_token();
        let refresh_expires_at = (Utc::now() + settings.refresh_ttl).timestamp();
        TokenStore::create_refresh_token(pool, user.id, &hash_token(&refresh_token), refresh_expires_at)
            .await?;

        Ok(SessionResponse {
            access_token,
            access_expires_at: rfc3339(access_expires_at),
            refresh_token,
            refresh_expires_at: rfc3339(refresh_expires_at),
            user,
        })
    }

    async fn open_access_session(
        pool: &DbPool,
        settings: &AuthSettings,
        user_id: i64,
    ) -> Result<(String, i64)> {
        let token = generate_token();
        let expires_at = (Utc::now() + settings.session_ttl).timestamp();
        TokenStore::create_session(pool, user_id, &hash_token(&token), expires_at).await?;
        Ok((token, expires_at))
    }
}

/// 1 to 3 distinct, well-formed numbers, normalized
fn validate_phone_list(errors: &mut FieldErrors, numbers: &[String]) -> Vec<String> {
    if numbers.is_empty() {
        errors.add("phone_numbers", "at least one phone number is required");
        return Vec::new();
    }
    if numbers.len() as i64 > MAX_PHONE_NUMBERS {
        errors.add(
            "phone_numbers",
            format!("at most {} phone numbers are allowed", MAX_PHONE_NUMBERS),
        );
        return Vec::new();
    }

    let mut normalized: Vec<String> = Vec::with_capacity(numbers.len());
    for number in numbers {
        let phone = validation::phone(errors, "phone_numbers", number);
        if normalized.contains(&phone) {
            errors.add("phone_numbers", "phone numbers must be distinct");
        }
        normalized.push(phone);
    }
    normalized
}
