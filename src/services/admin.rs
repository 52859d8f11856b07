/// Admin dashboard: statistics and user management. Callers must have
/// passed `require_admin` already.
use crate::db::models::{DashboardStats, Role, User};
use crate::db::{Database, DbPool, UserStore};
use crate::error::{AppError, FieldErrors, Result};

pub struct AdminService;

impl AdminService {
    pub async fn stats(pool: &DbPool) -> Result<DashboardStats> {
        Ok(Database::dashboard_stats(pool).await?)
    }

    pub async fn list_users(pool: &DbPool) -> Result<Vec<User>> {
        Ok(UserStore::list_users(pool).await?)
    }

    pub async fn delete_user(pool: &DbPool, admin: &User, user_id: i64) -> Result<()> {
        if admin.id == user_id {
            return Err(AppError::BadRequest(
                "Admins cannot delete their own account".to_string(),
            ));
        }
        if !UserStore::delete_user(pool, user_id).await? {
            return Err(AppError::not_found("User"));
        }
        log::info!("Admin {} deleted user {}", admin.id, user_id);
        Ok(())
    }

    pub async fn set_role(pool: &DbPool, admin: &User, user_id: i64, role: &str) -> Result<User> {
        let role: Role = role
            .parse()
            .map_err(|message: String| FieldErrors::single("role", message))?;
        if admin.id == user_id && role != Role::Admin {
            return Err(AppError::BadRequest(
                "Admins cannot demote themselves".to_string(),
            ));
        }

        let user = UserStore::set_role(pool, user_id, role)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        log::info!("Admin {} set role of user {} to {}", admin.id, user.id, user.role);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StudentStore;
    use crate::services::testing::{register, register_admin};

    #[tokio::test]
    async fn test_stats_and_delete() {
        let pool = crate::db::create_test_pool();
        let admin = register_admin(&pool, "admin@example.com").await;
        let alice = register(&pool, "alice@example.com", "Alice").await;

        let stats = AdminService::stats(&pool).await.expect("Stats failed");
        assert_eq!(stats.users, 2);
        assert_eq!(stats.students, 1);
        assert_eq!(stats.admins, 1);

        assert!(matches!(
            AdminService::delete_user(&pool, &admin, admin.id).await,
            Err(AppError::BadRequest(_))
        ));
        AdminService::delete_user(&pool, &admin, alice.id)
            .await
            .expect("Delete failed");
        assert!(matches!(
            AdminService::delete_user(&pool, &admin, alice.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(AdminService::list_users(&pool).await.expect("List failed").len(), 1);
    }

    #[tokio::test]
    async fn test_role_changes() {
        let pool = crate::db::create_test_pool();
        let admin = register_admin(&pool, "admin@example.com").await;
        let alice = register(&pool, "alice@example.com", "Alice").await;

        let promoted = AdminService::set_role(&pool, &admin, alice.id, "admin")
            .await
            .expect("Promote failed");
        assert_eq!(promoted.role, Role::Admin);
        assert_eq!(AdminService::stats(&pool).await.expect("Stats failed").admins, 2);

        let demoted = AdminService::set_role(&pool, &admin, alice.id, "STUDENT")
            .await
            .expect("Demote failed");
        assert_eq!(demoted.role, Role::Student);
        assert!(StudentStore::get_by_user(&pool, alice.id)
            .await
            .expect("Query failed")
            .is_some());

        assert!(matches!(
            AdminService::set_role(&pool, &admin, alice.id, "owner").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            AdminService::set_role(&pool, &admin, admin.id, "STUDENT").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            AdminService::set_role(&pool, &admin, 999, "ADMIN").await,
            Err(AppError::NotFound(_))
        ));
    }
}
