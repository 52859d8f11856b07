/// Public contact form submissions and their admin inbox.
use super::validation::{self, NAME_MAX, NAME_MIN};
use crate::db::models::{Contact, CreateContactRequest};
use crate::db::{ContactStore, DbPool};
use crate::error::{AppError, FieldErrors, Result};

const MESSAGE_MIN: usize = 10;
const MESSAGE_MAX: usize = 1000;

pub struct ContactService;

impl ContactService {
    pub async fn submit(pool: &DbPool, req: &CreateContactRequest) -> Result<Contact> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", &req.name, NAME_MIN, NAME_MAX);
        let email = validation::email(&mut errors, "email", &req.email);
        let message =
            validation::required_text(&mut errors, "message", &req.message, MESSAGE_MIN, MESSAGE_MAX);
        errors.into_result()?;

        let contact = ContactStore::create(pool, &name, &email, &message).await?;
        log::info!("Contact message {} received", contact.id);
        Ok(contact)
    }

    pub async fn list(pool: &DbPool) -> Result<Vec<Contact>> {
        Ok(ContactStore::list(pool).await?)
    }

    pub async fn delete(pool: &DbPool, contact_id: i64) -> Result<()> {
        if !ContactStore::delete(pool, contact_id).await? {
            return Err(AppError::not_found("Contact"));
        }
        Ok(())
    }
}
