//! Sessions, credentials and the client-side checks that run before any
//! authentication request leaves the process.

pub mod model;

use crate::error::{MiaError, MiaResult};
use model::{Credentials, NewUser};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim and lowercase an email address.
pub fn normalize_email(raw: &str) -> MiaResult<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(MiaError::validation("email is required"));
    }
    if !normalized.contains('@') {
        return Err(MiaError::validation("email must contain '@'"));
    }
    Ok(normalized)
}

/// Validate a login form, returning the normalized credentials.
pub fn validate_credentials(credentials: &Credentials) -> MiaResult<Credentials> {
    let email = normalize_email(&credentials.email)?;
    if credentials.password.is_empty() {
        return Err(MiaError::validation("password is required"));
    }
    Ok(Credentials {
        email,
        password: credentials.password.clone(),
    })
}

/// Validate a registration form, returning the normalized user.
pub fn validate_new_user(user: &NewUser) -> MiaResult<NewUser> {
    let email = normalize_email(&user.email)?;
    if user.password.len() < MIN_PASSWORD_LEN {
        return Err(MiaError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let first_name = required("first name", &user.first_name)?;
    let last_name = required("last name", &user.last_name)?;

    Ok(NewUser {
        email,
        password: user.password.clone(),
        first_name,
        last_name,
        role: user.role,
        institution: user
            .institution
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

/// Trimmed value of a required field.
pub(crate) fn required(field: &str, value: &str) -> MiaResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MiaError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Session, UserProfile, UserRole};

    fn new_user() -> NewUser {
        NewUser {
            email: " Ada@Example.org ".to_string(),
            password: "secret1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: UserRole::Instructor,
            institution: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_credentials_normalize_email() {
        let creds = validate_credentials(&Credentials::new("  A@B.com ", "x")).unwrap();
        assert_eq!(creds.email, "a@b.com");
        assert_eq!(creds.password, "x");
    }

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(matches!(
            validate_credentials(&Credentials::new("", "x")),
            Err(MiaError::Validation(_))
        ));
        assert!(matches!(
            validate_credentials(&Credentials::new("a@b.com", "")),
            Err(MiaError::Validation(_))
        ));
    }

    #[test]
    fn test_new_user_password_length() {
        let mut user = new_user();
        user.password = "12345".to_string();
        let err = validate_new_user(&user).unwrap_err();
        assert!(err.to_string().contains("at least 6"));
    }

    #[test]
    fn test_new_user_normalized() {
        let user = validate_new_user(&new_user()).unwrap();
        assert_eq!(user.email, "ada@example.org");
        assert_eq!(user.institution, None);
        assert_eq!(user.role, UserRole::Instructor);
    }

    #[test]
    fn test_role_parsing_defaults_to_student() {
        assert_eq!(UserRole::from_str("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from_str("nurse"), UserRole::Student);
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new(
            "very-secret",
            UserProfile {
                id: "u1".to_string(),
                email: "a@b.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                role: UserRole::Student,
                institution: None,
            },
        );
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("very-secret"));
        assert_eq!(session.user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_profile_accepts_server_payload() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": "64f0",
            "email": "a@b.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "role": "instructor",
            "institution": null,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(profile.role, UserRole::Instructor);
        assert_eq!(profile.institution, None);
    }
}
