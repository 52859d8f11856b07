/// Student profile storage: profile fields, offered/wanted skill sets and browsing.
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::models::{ExperienceLevel, Skill, Student, StudentProfile, StudentSummary};
use super::skills::{get_or_create_skill, skill_from_row};
use super::{now, DbPool};

const STUDENT_COLUMNS: &str =
    "id, user_id, availability, experience_level, is_public, skills_completed, created_at";

fn student_from_row(row: &Row) -> SqliteResult<Student> {
    Ok(Student {
        id: row.get(0)?,
        user_id: row.get(1)?,
        availability: row.get(2)?,
        experience_level: row.get(3)?,
        is_public: row.get(4)?,
        skills_completed: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Complete set of editable profile fields, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub availability: Option<String>,
    pub experience_level: ExperienceLevel,
    pub is_public: bool,
}

impl From<&StudentProfile> for ProfileFields {
    fn from(profile: &StudentProfile) -> Self {
        ProfileFields {
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            location: profile.location.clone(),
            avatar_url: profile.avatar_url.clone(),
            availability: profile.availability.clone(),
            experience_level: profile.experience_level,
            is_public: profile.is_public,
        }
    }
}

/// Browse filters; `exclude_student` hides the caller from their own results.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub skill: Option<String>,
    pub name_contains: Option<String>,
    pub level: Option<ExperienceLevel>,
    pub exclude_student: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

/// Which side of the skill exchange a skill list belongs to
#[derive(Debug, Clone, Copy)]
enum SkillSide {
    Offered,
    Wanted,
}

impl SkillSide {
    fn table(self) -> &'static str {
        match self {
            SkillSide::Offered => "skills_offered",
            SkillSide::Wanted => "skills_wanted",
        }
    }
}

pub struct StudentStore;

impl StudentStore {
    pub async fn get(pool: &DbPool, student_id: i64) -> SqliteResult<Option<Student>> {
        let conn = pool.lock().await;
        let sql = format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS);
        conn.query_row(&sql, params![student_id], student_from_row)
            .optional()
    }

    pub async fn get_by_user(pool: &DbPool, user_id: i64) -> SqliteResult<Option<Student>> {
        let conn = pool.lock().await;
        let sql = format!("SELECT {} FROM students WHERE user_id = ?1", STUDENT_COLUMNS);
        conn.query_row(&sql, params![user_id], student_from_row)
            .optional()
    }

    /// Load a student joined with its user row and both skill lists
    pub async fn profile(pool: &DbPool, student_id: i64) -> SqliteResult<Option<StudentProfile>> {
        let conn = pool.lock().await;
        load_profile(&conn, student_id)
    }

    pub async fn update_profile(
        pool: &DbPool,
        student_id: i64,
        fields: &ProfileFields,
    ) -> SqliteResult<Option<StudentProfile>> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let user_id: Option<i64> = tx
            .query_row(
                "SELECT user_id FROM students WHERE id = ?1",
                params![student_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        tx.execute(
            "UPDATE users SET name = ?1, bio = ?2, location = ?3, avatar_url = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                fields.name,
                fields.bio,
                fields.location,
                fields.avatar_url,
                now(),
                user_id
            ],
        )?;
        tx.execute(
            "UPDATE students SET availability = ?1, experience_level = ?2, is_public = ?3 WHERE id = ?4",
            params![
                fields.availability,
                fields.experience_level,
                fields.is_public,
                student_id
            ],
        )?;

        let profile = load_profile(&tx, student_id)?;
        tx.commit()?;
        Ok(profile)
    }

    /// Replace both skill sets. Skills are matched by name ignoring case and
    /// created when missing.
    pub async fn replace_skills(
        pool: &DbPool,
        student_id: i64,
        offered: &[String],
        wanted: &[String],
    ) -> SqliteResult<Option<StudentProfile>> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        for (side, names) in [(SkillSide::Offered, offered), (SkillSide::Wanted, wanted)] {
            let table = side.table();
            tx.execute(
                &format!("DELETE FROM {} WHERE student_id = ?1", table),
                params![student_id],
            )?;
            for name in names {
                let skill = get_or_create_skill(&tx, name)?;
                tx.execute(
                    &format!(
                        "INSERT OR IGNORE INTO {} (student_id, skill_id) VALUES (?1, ?2)",
                        table
                    ),
                    params![student_id, skill.id],
                )?;
            }
        }

        let profile = load_profile(&tx, student_id)?;
        tx.commit()?;
        Ok(profile)
    }

    pub async fn offers_skill(pool: &DbPool, student_id: i64, skill_id: i64) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM skills_offered WHERE student_id = ?1 AND skill_id = ?2)",
            params![student_id, skill_id],
            |row| row.get(0),
        )
    }

    /// Public students matching the filter, most experienced swappers first.
    pub async fn browse(pool: &DbPool, filter: &BrowseFilter) -> SqliteResult<Vec<StudentSummary>> {
        let conn = pool.lock().await;

        let mut sql = String::from(
            "SELECT s.id, u.name, u.avatar_url, u.location, s.experience_level, s.skills_completed
             FROM students s JOIN users u ON u.id = s.user_id
             WHERE s.is_public = 1",
        );
        let mut args: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(skill) = &filter.skill {
            args.push(skill.clone().into());
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM skills_offered so JOIN skills k ON k.id = so.skill_id
                   WHERE so.student_id = s.id AND k.name = ?{} COLLATE NOCASE)",
                args.len()
            ));
        }
        if let Some(fragment) = &filter.name_contains {
            args.push(like_contains(fragment).into());
            sql.push_str(&format!(" AND u.name LIKE ?{} ESCAPE '\\'", args.len()));
        }
        if let Some(level) = filter.level {
            args.push(level.as_str().to_string().into());
            sql.push_str(&format!(" AND s.experience_level = ?{}", args.len()));
        }
        if let Some(excluded) = filter.exclude_student {
            args.push(excluded.into());
            sql.push_str(&format!(" AND s.id <> ?{}", args.len()));
        }

        args.push(filter.limit.into());
        sql.push_str(&format!(
            " ORDER BY s.skills_completed DESC, s.id ASC LIMIT ?{}",
            args.len()
        ));
        args.push(filter.offset.into());
        sql.push_str(&format!(" OFFSET ?{}", args.len()));

        let mut stmt = conn.prepare(&sql)?;
        let mut summaries = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(StudentSummary {
                    student_id: row.get(0)?,
                    name: row.get(1)?,
                    avatar_url: row.get(2)?,
                    location: row.get(3)?,
                    experience_level: row.get(4)?,
                    skills_completed: row.get(5)?,
                    skills_offered: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for summary in &mut summaries {
            summary.skills_offered = skill_names(&conn, summary.student_id, SkillSide::Offered)?;
        }

        Ok(summaries)
    }

    /// Summaries for specific public students, in the given order.
    /// Private or missing students are skipped.
    pub async fn summaries(pool: &DbPool, student_ids: &[i64]) -> SqliteResult<Vec<StudentSummary>> {
        let conn = pool.lock().await;
        let mut summaries = Vec::with_capacity(student_ids.len());
        for &student_id in student_ids {
            let summary = conn
                .query_row(
                    "SELECT s.id, u.name, u.avatar_url, u.location, s.experience_level, s.skills_completed
                     FROM students s JOIN users u ON u.id = s.user_id
                     WHERE s.id = ?1 AND s.is_public = 1",
                    params![student_id],
                    |row| {
                        Ok(StudentSummary {
                            student_id: row.get(0)?,
                            name: row.get(1)?,
                            avatar_url: row.get(2)?,
                            location: row.get(3)?,
                            experience_level: row.get(4)?,
                            skills_completed: row.get(5)?,
                            skills_offered: Vec::new(),
                        })
                    },
                )
                .optional()?;
            if let Some(mut summary) = summary {
                summary.skills_offered = skill_names(&conn, student_id, SkillSide::Offered)?;
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}

/// `%fragment%` with LIKE metacharacters in `fragment` matched literally
fn like_contains(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn load_profile(conn: &Connection, student_id: i64) -> SqliteResult<Option<StudentProfile>> {
    let profile = conn
        .query_row(
            "SELECT s.id, s.user_id, u.name, u.bio, u.location, u.avatar_url,
                    s.availability, s.experience_level, s.is_public, s.skills_completed
             FROM students s JOIN users u ON u.id = s.user_id
             WHERE s.id = ?1",
            params![student_id],
            |row| {
                Ok(StudentProfile {
                    student_id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    bio: row.get(3)?,
                    location: row.get(4)?,
                    avatar_url: row.get(5)?,
                    availability: row.get(6)?,
                    experience_level: row.get(7)?,
                    is_public: row.get(8)?,
                    skills_completed: row.get(9)?,
                    skills_offered: Vec::new(),
                    skills_wanted: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut profile) = profile else {
        return Ok(None);
    };
    profile.skills_offered = skills_for(conn, student_id, SkillSide::Offered)?;
    profile.skills_wanted = skills_for(conn, student_id, SkillSide::Wanted)?;
    Ok(Some(profile))
}

fn skills_for(conn: &Connection, student_id: i64, side: SkillSide) -> SqliteResult<Vec<Skill>> {
    let sql = format!(
        "SELECT k.id, k.name, k.category, k.created_at
         FROM {} x JOIN skills k ON k.id = x.skill_id
         WHERE x.student_id = ?1 ORDER BY k.name",
        side.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let skills = stmt
        .query_map(params![student_id], skill_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(skills)
}

fn skill_names(conn: &Connection, student_id: i64, side: SkillSide) -> SqliteResult<Vec<String>> {
    Ok(skills_for(conn, student_id, side)?
        .into_iter()
        .map(|skill| skill.name)
        .collect())
}
