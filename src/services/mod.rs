/// Domain services sitting between the REST handlers and the stores.
///
/// Services validate input, enforce ownership and role rules, and turn store
/// outcomes into `AppError`s. Handlers never talk to the stores directly.
pub mod admin;
pub mod auth;
pub mod contacts;
pub mod favorites;
pub mod phones;
pub mod reports;
pub mod requests;
pub mod skills;
pub mod students;
pub mod validation;

pub use admin::AdminService;
pub use auth::{AuthService, AuthSettings};
pub use contacts::ContactService;
pub use favorites::FavoriteService;
pub use phones::PhoneService;
pub use reports::ReportService;
pub use requests::RequestService;
pub use skills::SkillService;
pub use students::{require_student, StudentService};

use crate::db::models::{Role, User};
use crate::error::{AppError, Result};

pub fn require_admin(user: &User) -> Result<()> {
    if user.role != Role::Admin {
        log::warn!("User {} attempted an admin action", user.id);
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}
