/// Student profiles: browsing, viewing and editing.
use serde::Serialize;
use std::collections::HashSet;

use super::validation::{self, NAME_MAX, NAME_MIN};
use crate::db::models::{
    BrowseQuery, ExperienceLevel, Role, Student, StudentProfile, StudentSummary,
    UpdateProfileRequest, UpdateSkillsRequest, User,
};
use crate::db::students::{BrowseFilter, ProfileFields};
use crate::db::{DbPool, StudentStore};
use crate::error::{AppError, FieldErrors, Result};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;
pub const MAX_SKILLS_PER_LIST: usize = 20;
const SKILL_NAME_MAX: usize = 50;

#[derive(Debug, Serialize)]
pub struct BrowsePage {
    pub page: u32,
    pub per_page: u32,
    pub students: Vec<StudentSummary>,
}

/// The caller's student row, or 403 for accounts without one
pub async fn require_student(pool: &DbPool, user: &User) -> Result<Student> {
    StudentStore::get_by_user(pool, user.id)
        .await?
        .ok_or_else(|| AppError::Forbidden("A student profile is required".to_string()))
}

/// `student_id` as `caller` may see it. Private students exist only for
/// their owner and admins; everyone else gets 404 naming `what`.
pub async fn visible_student(
    pool: &DbPool,
    caller: &User,
    student_id: i64,
    what: &str,
) -> Result<Student> {
    StudentStore::get(pool, student_id)
        .await?
        .filter(|s| s.is_public || s.user_id == caller.id || caller.role == Role::Admin)
        .ok_or_else(|| AppError::not_found(what))
}

pub struct StudentService;

impl StudentService {
    pub async fn browse(pool: &DbPool, caller: &User, query: &BrowseQuery) -> Result<BrowsePage> {
        let mut errors = FieldErrors::new();
        let level = query
            .level
            .as_deref()
            .and_then(|level| validation::parse_enum::<ExperienceLevel>(&mut errors, "level", level));
        errors.into_result()?;

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        let caller_student = StudentStore::get_by_user(pool, caller.id).await?;
        let filter = BrowseFilter {
            skill: non_blank(query.skill.as_deref()),
            name_contains: non_blank(query.q.as_deref()),
            level,
            exclude_student: caller_student.map(|s| s.id),
            limit: i64::from(per_page),
            offset: i64::from(page - 1) * i64::from(per_page),
        };

        let students = StudentStore::browse(pool, &filter).await?;
        Ok(BrowsePage {
            page,
            per_page,
            students,
        })
    }

    /// A profile as seen by `caller`. Private profiles are visible only to
    /// their owner and to admins; everyone else gets 404.
    pub async fn profile(pool: &DbPool, caller: &User, student_id: i64) -> Result<StudentProfile> {
        let profile = StudentStore::profile(pool, student_id)
            .await?
            .ok_or_else(|| AppError::not_found("Student"))?;

        let visible = profile.is_public || profile.user_id == caller.id || caller.role == Role::Admin;
        if !visible {
            return Err(AppError::not_found("Student"));
        }
        Ok(profile)
    }

    pub async fn my_profile(pool: &DbPool, caller: &User) -> Result<StudentProfile> {
        let student = require_student(pool, caller).await?;
        StudentStore::profile(pool, student.id)
            .await?
            .ok_or_else(|| AppError::not_found("Student"))
    }

    /// Apply a partial profile update. Absent fields keep their value;
    /// blank optional fields are cleared.
    pub async fn update_profile(
        pool: &DbPool,
        caller: &User,
        req: &UpdateProfileRequest,
    ) -> Result<StudentProfile> {
        let current = Self::my_profile(pool, caller).await?;
        let mut fields = ProfileFields::from(&current);
        let mut errors = FieldErrors::new();

        if let Some(name) = &req.name {
            fields.name = validation::required_text(&mut errors, "name", name, NAME_MIN, NAME_MAX);
        }
        if let Some(bio) = &req.bio {
            fields.bio = validation::optional_text(&mut errors, "bio", Some(bio), 500);
        }
        if let Some(location) = &req.location {
            fields.location = validation::optional_text(&mut errors, "location", Some(location), 100);
        }
        if let Some(avatar_url) = &req.avatar_url {
            fields.avatar_url =
                validation::optional_text(&mut errors, "avatar_url", Some(avatar_url), 255);
            validation::url(&mut errors, "avatar_url", fields.avatar_url.as_deref());
        }
        if let Some(availability) = &req.availability {
            fields.availability =
                validation::optional_text(&mut errors, "availability", Some(availability), 100);
        }
        if let Some(level) = &req.experience_level {
            if let Some(level) = validation::parse_enum(&mut errors, "experience_level", level) {
                fields.experience_level = level;
            }
        }
        if let Some(is_public) = req.is_public {
            fields.is_public = is_public;
        }
        errors.into_result()?;

        let profile = StudentStore::update_profile(pool, current.student_id, &fields)
            .await?
            .ok_or_else(|| AppError::not_found("Student"))?;
        log::info!("Student {} updated their profile", profile.student_id);
        Ok(profile)
    }

    /// Replace the caller's offered and wanted skill lists.
    pub async fn update_skills(
        pool: &DbPool,
        caller: &User,
        req: &UpdateSkillsRequest,
    ) -> Result<StudentProfile> {
        let student = require_student(pool, caller).await?;

        let mut errors = FieldErrors::new();
        let offered = skill_list(&mut errors, "offered", &req.offered);
        let wanted = skill_list(&mut errors, "wanted", &req.wanted);

        let offered_keys: HashSet<String> = offered.iter().map(|s| s.to_lowercase()).collect();
        if wanted.iter().any(|s| offered_keys.contains(&s.to_lowercase())) {
            errors.add("wanted", "a skill cannot be both offered and wanted");
        }
        errors.into_result()?;

        let profile = StudentStore::replace_skills(pool, student.id, &offered, &wanted)
            .await?
            .ok_or_else(|| AppError::not_found("Student"))?;
        log::info!(
            "Student {} now offers {} and wants {} skills",
            student.id,
            profile.skills_offered.len(),
            profile.skills_wanted.len()
        );
        Ok(profile)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trimmed, de-duplicated (ignoring case) skill names
fn skill_list(errors: &mut FieldErrors, field: &str, names: &[String]) -> Vec<String> {
    if names.len() > MAX_SKILLS_PER_LIST {
        errors.add(
            field,
            format!("at most {} skills are allowed", MAX_SKILLS_PER_LIST),
        );
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(names.len());
    for name in names {
        let name = validation::required_text(errors, field, name, 1, SKILL_NAME_MAX);
        if !name.is_empty() && seen.insert(name.to_lowercase()) {
            cleaned.push(name);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::services::testing::{register, register_admin};

    #[tokio::test]
    async fn test_update_profile_partial() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;

        let profile = StudentService::update_profile(
            &pool,
            &alice,
            &UpdateProfileRequest {
                bio: Some("I teach Rust".to_string()),
                experience_level: Some("expert".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Update failed");
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.bio.as_deref(), Some("I teach Rust"));
        assert_eq!(profile.experience_level, ExperienceLevel::Expert);

        // Blank clears the field
        let cleared = StudentService::update_profile(
            &pool,
            &alice,
            &UpdateProfileRequest {
                bio: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Update failed");
        assert!(cleared.bio.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_validation() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;

        let result = StudentService::update_profile(
            &pool,
            &alice,
            &UpdateProfileRequest {
                name: Some("A".to_string()),
                avatar_url: Some("ftp://example.com/me.png".to_string()),
                experience_level: Some("guru".to_string()),
                ..Default::default()
            },
        )
        .await;
        match result {
            Err(AppError::Validation(fields)) => {
                assert!(fields.get("name").is_some());
                assert!(fields.get("avatar_url").is_some());
                assert!(fields.get("experience_level").is_some());
            }
            other => panic!("expected validation error, got {:?}", other.map(|p| p.name)),
        }
    }

    #[tokio::test]
    async fn test_update_skills_rules() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;

        let profile = StudentService::update_skills(
            &pool,
            &alice,
            &UpdateSkillsRequest {
                offered: vec!["Rust".to_string(), "rust ".to_string(), "SQL".to_string()],
                wanted: vec!["Guitar".to_string()],
            },
        )
        .await
        .expect("Update failed");
        assert_eq!(profile.skills_offered.len(), 2);

        let overlap = StudentService::update_skills(
            &pool,
            &alice,
            &UpdateSkillsRequest {
                offered: vec!["Rust".to_string()],
                wanted: vec!["RUST".to_string()],
            },
        )
        .await;
        assert!(matches!(overlap, Err(AppError::Validation(_))));

        let too_many = StudentService::update_skills(
            &pool,
            &alice,
            &UpdateSkillsRequest {
                offered: (0..21).map(|i| format!("Skill {}", i)).collect(),
                wanted: vec![],
            },
        )
        .await;
        assert!(matches!(too_many, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_private_profile_visibility() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;
        let bob = register(&pool, "bob@example.com", "Bob").await;
        let admin = register_admin(&pool, "admin@example.com").await;

        let alice_profile = StudentService::update_profile(
            &pool,
            &alice,
            &UpdateProfileRequest {
                is_public: Some(false),
                ..Default::default()
            },
        )
        .await
        .expect("Update failed");

        assert!(StudentService::profile(&pool, &alice, alice_profile.student_id).await.is_ok());
        assert!(StudentService::profile(&pool, &admin, alice_profile.student_id).await.is_ok());
        assert!(matches!(
            StudentService::profile(&pool, &bob, alice_profile.student_id).await,
            Err(AppError::NotFound(_))
        ));

        let page = StudentService::browse(&pool, &bob, &BrowseQuery::default())
            .await
            .expect("Browse failed");
        assert!(page.students.is_empty());
    }

    #[tokio::test]
    async fn test_browse_paging_defaults() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;
        register(&pool, "bob@example.com", "Bob").await;
        register(&pool, "carol@example.com", "Carol").await;

        let page = StudentService::browse(
            &pool,
            &alice,
            &BrowseQuery {
                page: Some(0),
                per_page: Some(500),
                ..Default::default()
            },
        )
        .await
        .expect("Browse failed");
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.students.len(), 2);

        let bad_level = StudentService::browse(
            &pool,
            &alice,
            &BrowseQuery {
                level: Some("wizard".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_level, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_admin_without_student_profile() {
        let pool = create_test_pool();
        let admin = register_admin(&pool, "admin@example.com").await;
        assert!(matches!(
            StudentService::my_profile(&pool, &admin).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
