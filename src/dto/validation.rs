//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted display name length, in characters.
const NAME_MAX_CHARS: usize = 32;

/// Validates that a display name is non-blank and reasonably short.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > NAME_MAX_CHARS {
        let mut err = ValidationError::new("name_length");
        err.message =
            Some(format!("Display name must be at most {NAME_MAX_CHARS} characters").into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a session code is `GV` followed by exactly four digits.
pub fn validate_session_code(code: &str) -> Result<(), ValidationError> {
    let digits = code.strip_prefix("GV").unwrap_or("");
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("session_code_format");
        err.message = Some("Session code must be GV followed by four digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name_valid() {
        assert!(validate_display_name("Ada").is_ok());
        assert!(validate_display_name("Chef de mission").is_ok());
    }

    #[test]
    fn test_validate_display_name_invalid() {
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_session_code_valid() {
        assert!(validate_session_code("GV1234").is_ok());
        assert!(validate_session_code("GV0000").is_ok());
    }

    #[test]
    fn test_validate_session_code_invalid() {
        assert!(validate_session_code("gv1234").is_err()); // lowercase prefix
        assert!(validate_session_code("GV123").is_err()); // too short
        assert!(validate_session_code("GV12345").is_err()); // too long
        assert!(validate_session_code("XX1234").is_err()); // wrong prefix
        assert!(validate_session_code("GV12a4").is_err()); // non-digit
    }
}
