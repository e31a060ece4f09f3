use regex::Regex;

pub mod logging;
pub mod retry;

lazy_static::lazy_static! {
    // Same shape browsers accept for <input type="email">: local@domain.tld,
    // no whitespace, exactly one @.
    static ref EMAIL_PATTERN: Option<Regex> = Regex::new(
        r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$"
    )
    .ok();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map_or(false, |pattern| pattern.is_match(email.trim()))
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_string()
}

/// Lowercased, trimmed form used when comparing identity references.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("first.last+rooms@corp.example.co.uk"));
        assert!(is_valid_email("  padded@example.com "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("al ice@example.com"));
        assert!(!is_valid_email("alice@@example.com"));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Team sync \n"), "Team sync");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }
}
