/// Field-level validation helpers shared by the services.
///
/// Each helper records a message in `FieldErrors` instead of failing fast, so a
/// single response can report every bad field at once.
use std::str::FromStr;

use crate::error::FieldErrors;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 254;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

/// Trim `value` and require `min..=max` characters.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> String {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        errors.add(field, "is required");
    } else if len < min {
        errors.add(field, format!("must be at least {} characters", min));
    } else if len > max {
        errors.add(field, format!("must be at most {} characters", max));
    }
    trimmed.to_string()
}

/// Trim an optional value; blank becomes `None`.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
    if trimmed.chars().count() > max {
        errors.add(field, format!("must be at most {} characters", max));
    }
    Some(trimmed.to_string())
}

/// Lowercased, trimmed email address
pub fn email(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        errors.add(field, "is required");
    } else if normalized.len() > EMAIL_MAX || !is_valid_email(&normalized) {
        errors.add(field, "must be a valid email address");
    }
    normalized
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// At least `PASSWORD_MIN` characters with one letter and one digit.
pub fn password(errors: &mut FieldErrors, field: &str, value: &str) {
    let len = value.chars().count();
    if len < PASSWORD_MIN {
        errors.add(field, format!("must be at least {} characters", PASSWORD_MIN));
    } else if len > PASSWORD_MAX {
        errors.add(field, format!("must be at most {} characters", PASSWORD_MAX));
    } else if !value.chars().any(char::is_alphabetic) || !value.chars().any(|c| c.is_ascii_digit()) {
        errors.add(field, "must contain a letter and a digit");
    }
}

/// Strip spaces and dashes; accept an optional leading `+` and 7 to 15 digits.
pub fn normalize_phone(value: &str) -> Option<String> {
    let compact: String = value
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    let valid = (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    valid.then_some(compact)
}

pub fn phone(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    match normalize_phone(value) {
        Some(number) => number,
        None => {
            errors.add(field, "must be 7 to 15 digits, optionally starting with +");
            value.trim().to_string()
        }
    }
}

/// Parse an enum-valued field, recording the allowed values on failure.
pub fn parse_enum<T>(errors: &mut FieldErrors, field: &str, value: &str) -> Option<T>
where
    T: FromStr<Err = String>,
{
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

pub fn url(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(url) = value {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.add(field, "must start with http:// or https://");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::RequestStatus;

    #[test]
    fn test_required_text_bounds() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "name", "  Ada  ", 2, 50), "Ada");
        assert!(errors.is_empty());

        required_text(&mut errors, "short", "A", 2, 50);
        required_text(&mut errors, "blank", "   ", 2, 50);
        required_text(&mut errors, "long", &"x".repeat(51), 2, 50);
        assert_eq!(errors.get("short"), Some("must be at least 2 characters"));
        assert_eq!(errors.get("blank"), Some("is required"));
        assert_eq!(errors.get("long"), Some("must be at most 50 characters"));
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "bio", Some("   "), 10), None);
        assert_eq!(optional_text(&mut errors, "bio", None, 10), None);
        assert_eq!(
            optional_text(&mut errors, "bio", Some(" hi "), 10),
            Some("hi".to_string())
        );
        assert!(errors.is_empty());

        optional_text(&mut errors, "bio", Some("this is too long"), 10);
        assert!(errors.get("bio").is_some());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@@c.de"));
        assert!(!is_valid_email("a@.de"));

        let mut errors = FieldErrors::new();
        assert_eq!(email(&mut errors, "email", " Ada@Example.COM "), "ada@example.com");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_password_rules() {
        let mut errors = FieldErrors::new();
        password(&mut errors, "ok", "hunter22x");
        password(&mut errors, "short", "a1");
        password(&mut errors, "letters", "abcdefghij");
        password(&mut errors, "digits", "1234567890");
        assert!(errors.get("ok").is_none());
        assert!(errors.get("short").is_some());
        assert!(errors.get("letters").is_some());
        assert!(errors.get("digits").is_some());
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone("+1 555-000-1111"), Some("+15550001111".to_string()));
        assert_eq!(normalize_phone("5550001"), Some("5550001".to_string()));
        assert_eq!(normalize_phone("123456"), None);
        assert_eq!(normalize_phone("1234567890123456"), None);
        assert_eq!(normalize_phone("555-CALL-NOW"), None);
        assert_eq!(normalize_phone("++5550001111"), None);
    }

    #[test]
    fn test_parse_enum_records_allowed_values() {
        let mut errors = FieldErrors::new();
        let parsed: Option<RequestStatus> = parse_enum(&mut errors, "status", "accepted");
        assert_eq!(parsed, Some(RequestStatus::Accepted));

        let bad: Option<RequestStatus> = parse_enum(&mut errors, "status2", "done");
        assert!(bad.is_none());
        assert!(errors.get("status2").unwrap().contains("PENDING"));
    }

    #[test]
    fn test_url_scheme() {
        let mut errors = FieldErrors::new();
        url(&mut errors, "avatar", Some("https://cdn.example.com/a.png"));
        assert!(errors.is_empty());
        url(&mut errors, "avatar", Some("javascript:alert(1)"));
        assert!(errors.get("avatar").is_some());
    }
}
