//! Input validation utilities

use crate::constants;

/// Validate a submitted flag string
pub fn validate_flag(flag: &str) -> Result<(), &'static str> {
    let trimmed = flag.trim();
    if trimmed.is_empty() {
        return Err("Flag cannot be empty");
    }
    if trimmed.len() > constants::MAX_FLAG_LENGTH as usize {
        return Err("Flag exceeds maximum length");
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err("Flag cannot contain control characters");
    }
    Ok(())
}

/// Validate mandatory rejection feedback
pub fn validate_feedback(feedback: &str) -> Result<(), &'static str> {
    if feedback.trim().is_empty() {
        return Err("Feedback cannot be empty");
    }
    if feedback.len() > constants::MAX_FEEDBACK_LENGTH as usize {
        return Err("Feedback exceeds maximum length");
    }
    Ok(())
}

/// Validate a security-review reason or note
pub fn validate_review_note(note: &str) -> Result<(), &'static str> {
    if note.trim().is_empty() {
        return Err("Note cannot be empty");
    }
    if note.len() > constants::MAX_REVIEW_NOTE_LENGTH as usize {
        return Err("Note exceeds maximum length");
    }
    Ok(())
}

/// Validate a difficulty tier
pub fn validate_difficulty(difficulty: &str) -> Result<(), &'static str> {
    if constants::difficulties::ALL.contains(&difficulty) {
        Ok(())
    } else {
        Err("Invalid difficulty tier")
    }
}

/// Validate a challenge category
pub fn validate_category(category: &str) -> Result<(), &'static str> {
    if constants::categories::ALL.contains(&category) {
        Ok(())
    } else {
        Err("Invalid challenge category")
    }
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Validate and sanitize a CTF title
pub fn validate_ctf_title(title: &str) -> Result<String, &'static str> {
    let sanitized = sanitize_string(title);
    if sanitized.is_empty() {
        return Err("CTF title cannot be empty");
    }
    if sanitized.len() > constants::MAX_CTF_TITLE_LENGTH as usize {
        return Err("CTF title must be at most 256 characters");
    }
    Ok(sanitized)
}

/// Validate an external challenge link
pub fn validate_ctf_link(link: &str) -> Result<(), &'static str> {
    if !(link.starts_with("https://") || link.starts_with("http://")) {
        return Err("CTF link must be an http(s) URL");
    }
    if link.len() > 2048 {
        return Err("CTF link exceeds maximum length");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flag() {
        assert!(validate_flag("flag{abc_123}").is_ok());
        assert!(validate_flag("   ").is_err());
        assert!(validate_flag("").is_err());
        assert!(validate_flag("bad\x07flag").is_err());
        assert!(validate_flag(&"x".repeat(513)).is_err());
    }

    #[test]
    fn test_validate_feedback_rejects_empty() {
        assert!(validate_feedback("Wrong flag, check the second stage").is_ok());
        assert!(validate_feedback("").is_err());
        assert!(validate_feedback("   \n ").is_err());
    }

    #[test]
    fn test_validate_difficulty() {
        assert!(validate_difficulty("easy").is_ok());
        assert!(validate_difficulty("insane").is_ok());
        assert!(validate_difficulty("nightmare").is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("web").is_ok());
        assert!(validate_category("osint").is_ok());
        assert!(validate_category("trivia").is_err());
    }

    #[test]
    fn test_validate_ctf_title() {
        assert_eq!(validate_ctf_title("  XSS Hunt  ").unwrap(), "XSS Hunt");
        assert!(validate_ctf_title("   ").is_err());
    }

    #[test]
    fn test_validate_ctf_link() {
        assert!(validate_ctf_link("https://ctf.example.com/chal/1").is_ok());
        assert!(validate_ctf_link("ftp://ctf.example.com").is_err());
    }
}
