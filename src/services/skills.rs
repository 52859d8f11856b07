/// Skill catalogue management.
use super::validation;
use crate::db::models::{Skill, SkillPayload};
use crate::db::skills::SkillDeletion;
use crate::db::{DbPool, SkillStore};
use crate::error::{AppError, FieldErrors, Result};

const SKILL_NAME_MAX: usize = 50;
const CATEGORY_MAX: usize = 50;

pub struct SkillService;

impl SkillService {
    pub async fn list(pool: &DbPool, category: Option<&str>) -> Result<Vec<Skill>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        Ok(SkillStore::list(pool, category).await?)
    }

    pub async fn create(pool: &DbPool, payload: &SkillPayload) -> Result<Skill> {
        let (name, category) = validate(payload)?;
        let skill = SkillStore::create(pool, &name, category.as_deref())
            .await
            .map_err(duplicate_name)?;
        log::info!("Created skill {} ({})", skill.id, skill.name);
        Ok(skill)
    }

    pub async fn update(pool: &DbPool, skill_id: i64, payload: &SkillPayload) -> Result<Skill> {
        let (name, category) = validate(payload)?;
        let skill = SkillStore::update(pool, skill_id, &name, category.as_deref())
            .await
            .map_err(duplicate_name)?
            .ok_or_else(|| AppError::not_found("Skill"))?;
        log::info!("Updated skill {}", skill.id);
        Ok(skill)
    }

    pub async fn delete(pool: &DbPool, skill_id: i64) -> Result<()> {
        match SkillStore::delete(pool, skill_id).await? {
            SkillDeletion::Deleted => {
                log::info!("Deleted skill {}", skill_id);
                Ok(())
            }
            SkillDeletion::NotFound => Err(AppError::not_found("Skill")),
            SkillDeletion::InUse(count) => Err(AppError::Conflict(format!(
                "Skill is used by {} accepted swap request(s)",
                count
            ))),
        }
    }
}

fn validate(payload: &SkillPayload) -> Result<(String, Option<String>)> {
    let mut errors = FieldErrors::new();
    let name = validation::required_text(&mut errors, "name", &payload.name, 1, SKILL_NAME_MAX);
    let category =
        validation::optional_text(&mut errors, "category", payload.category.as_deref(), CATEGORY_MAX);
    errors.into_result()?;
    Ok((name, category))
}

fn duplicate_name(err: rusqlite::Error) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => AppError::Conflict("A skill with this name already exists".to_string()),
        other => other,
    }
}
