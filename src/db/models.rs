/// Data models for database operations.
/// Records for users, students, skills, swap requests, reports, favorites,
/// contacts, phone numbers and session tokens, plus the request/response
/// DTOs the REST layer exchanges.
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements string conversion and SQLite mapping for a status-like enum.
macro_rules! sql_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of {}",
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                text.parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Admin,
}

sql_enum!(Role {
    Student => "STUDENT",
    Admin => "ADMIN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

sql_enum!(ExperienceLevel {
    Beginner => "BEGINNER",
    Intermediate => "INTERMEDIATE",
    Advanced => "ADVANCED",
    Expert => "EXPERT",
});

/// Swap request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

sql_enum!(RequestStatus {
    Pending => "PENDING",
    Accepted => "ACCEPTED",
    Rejected => "REJECTED",
    Completed => "COMPLETED",
});

impl RequestStatus {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Accepted, RequestStatus::Completed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Open,
    Resolved,
    Dismissed,
}

sql_enum!(ReportStatus {
    Open => "OPEN",
    Resolved => "RESOLVED",
    Dismissed => "DISMISSED",
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Stored password material, never serialized
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: i64,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: i64,
    pub user_id: i64,
    pub availability: Option<String>,
    pub experience_level: ExperienceLevel,
    pub is_public: bool,
    pub skills_completed: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub created_at: String,
}

/// Full student profile joined with its user and skill sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: i64,
    pub user_id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub availability: Option<String>,
    pub experience_level: ExperienceLevel,
    pub is_public: bool,
    pub skills_completed: i64,
    pub skills_offered: Vec<Skill>,
    pub skills_wanted: Vec<Skill>,
}

/// Compact row used when browsing and listing favorites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub student_id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub experience_level: ExperienceLevel,
    pub skills_completed: i64,
    pub skills_offered: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapRequest {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub requested_skill_id: i64,
    pub offered_skill_id: i64,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl SwapRequest {
    pub fn involves(&self, student_id: i64) -> bool {
        self.sender_id == student_id || self.receiver_id == student_id
    }
}

/// Swap request with participant and skill names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub sender_name: String,
    pub receiver_name: String,
    pub requested_skill_name: String,
    pub offered_skill_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: i64,
    pub reporter_id: i64,
    pub reported_id: i64,
    pub reason: String,
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub student_id: i64,
    pub favorite_student_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoneNumber {
    pub id: i64,
    pub user_id: i64,
    pub number: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: i64,
    pub revoked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestCounts {
    pub pending: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub users: i64,
    pub students: i64,
    pub admins: i64,
    pub skills: i64,
    pub contacts: i64,
    pub open_reports: i64,
    pub requests: RequestCounts,
}

// Request/Response DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    pub experience_level: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub access_expires_at: String,
    pub refresh_token: String,
    pub refresh_expires_at: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
    pub student: Option<StudentProfile>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub availability: Option<String>,
    pub experience_level: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateSkillsRequest {
    #[serde(default)]
    pub offered: Vec<String>,
    #[serde(default)]
    pub wanted: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillPayload {
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSwapRequest {
    pub receiver_id: i64,
    pub requested_skill_id: i64,
    pub offered_skill_id: i64,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRequestStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFavoriteRequest {
    pub student_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReportRequest {
    pub reported_id: i64,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateReportRequest {
    pub status: String,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddPhoneRequest {
    pub number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BrowseQuery {
    pub skill: Option<String>,
    pub q: Option<String>,
    pub level: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RequestListQuery {
    #[serde(rename = "box")]
    pub mailbox: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("pending".parse::<RequestStatus>(), Ok(RequestStatus::Pending));
        assert_eq!(" Accepted ".parse::<RequestStatus>(), Ok(RequestStatus::Accepted));
        assert!("DONE".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_request_status_transitions() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Accepted.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!Completed.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Rejected));
    }

    #[test]
    fn test_enum_wire_format() {
        let json = serde_json::to_string(&ExperienceLevel::Intermediate).expect("Serialization failed");
        assert_eq!(json, "\"INTERMEDIATE\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").expect("Deserialization failed");
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_request_detail_flattens_request() {
        let detail = RequestDetail {
            request: SwapRequest {
                id: 7,
                sender_id: 1,
                receiver_id: 2,
                requested_skill_id: 3,
                offered_skill_id: 4,
                message: None,
                status: RequestStatus::Pending,
                created_at: "2025-10-20T10:00:00Z".to_string(),
                updated_at: "2025-10-20T10:00:00Z".to_string(),
            },
            sender_name: "Alice".to_string(),
            receiver_name: "Bob".to_string(),
            requested_skill_name: "Guitar".to_string(),
            offered_skill_name: "Rust".to_string(),
        };

        let value = serde_json::to_value(&detail).expect("Serialization failed");
        assert_eq!(value["id"], 7);
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["offered_skill_name"], "Rust");
    }

    #[test]
    fn test_request_list_query_box_rename() {
        let query: RequestListQuery =
            serde_json::from_str(r#"{"box": "incoming"}"#).expect("Deserialization failed");
        assert_eq!(query.mailbox.as_deref(), Some("incoming"));
    }
}
