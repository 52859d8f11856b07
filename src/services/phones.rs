/// Phone numbers attached to an account. Every user keeps between one and
/// `MAX_PHONE_NUMBERS` of them.
use super::validation;
use crate::db::models::{PhoneNumber, User};
use crate::db::users::{PhoneInsert, PhoneRemoval, MAX_PHONE_NUMBERS};
use crate::db::{DbPool, UserStore};
use crate::error::{AppError, FieldErrors, Result};

pub struct PhoneService;

impl PhoneService {
    pub async fn list(pool: &DbPool, caller: &User) -> Result<Vec<PhoneNumber>> {
        Ok(UserStore::list_phone_numbers(pool, caller.id).await?)
    }

    pub async fn add(pool: &DbPool, caller: &User, number: &str) -> Result<PhoneNumber> {
        let mut errors = FieldErrors::new();
        let number = validation::phone(&mut errors, "number", number);
        errors.into_result()?;

        let inserted = UserStore::add_phone_number(pool, caller.id, &number)
            .await
            .map_err(|err| match AppError::from(err) {
                AppError::Conflict(_) => {
                    AppError::Conflict("Phone number is already registered".to_string())
                }
                other => other,
            })?;

        match inserted {
            PhoneInsert::Added(phone) => {
                log::info!("User {} added phone number {}", caller.id, phone.id);
                Ok(phone)
            }
            PhoneInsert::LimitReached => Err(FieldErrors::single(
                "number",
                format!("at most {} phone numbers are allowed", MAX_PHONE_NUMBERS),
            )),
        }
    }

    pub async fn remove(pool: &DbPool, caller: &User, phone_id: i64) -> Result<()> {
        match UserStore::remove_phone_number(pool, caller.id, phone_id).await? {
            PhoneRemoval::Removed => Ok(()),
            PhoneRemoval::NotFound => Err(AppError::not_found("Phone number")),
            PhoneRemoval::LastNumber => Err(AppError::BadRequest(
                "At least one phone number is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::services::testing::register;

    #[tokio::test]
    async fn test_phone_limits() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;

        let second = PhoneService::add(&pool, &alice, "+1 555-000-2222")
            .await
            .expect("Add failed");
        assert_eq!(second.number, "+15550002222");
        assert!(matches!(
            PhoneService::add(&pool, &alice, "+15550002222").await,
            Err(AppError::Conflict(_))
        ));
        PhoneService::add(&pool, &alice, "5550003333").await.expect("Add failed");

        assert!(matches!(
            PhoneService::add(&pool, &alice, "5550004444").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PhoneService::add(&pool, &alice, "call me").await,
            Err(AppError::Validation(_))
        ));

        let phones = PhoneService::list(&pool, &alice).await.expect("List failed");
        assert_eq!(phones.len(), 3);
        for phone in &phones[1..] {
            PhoneService::remove(&pool, &alice, phone.id).await.expect("Remove failed");
        }
        assert!(matches!(
            PhoneService::remove(&pool, &alice, phones[0].id).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            PhoneService::remove(&pool, &alice, 999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cannot_remove_someone_elses_number() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;
        let bob = register(&pool, "bob@example.com", "Bob").await;
        let extra = PhoneService::add(&pool, &alice, "5550007777").await.expect("Add failed");

        assert!(matches!(
            PhoneService::remove(&pool, &bob, extra.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
