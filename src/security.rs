use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a presented access key against the configured one.
///
/// With no key configured every request is allowed.
pub fn is_authorized(expected: Option<&str>, presented: Option<&str>) -> bool {
    match (expected, presented) {
        (None, _) => true,
        (Some(expected), Some(presented)) => constant_time_compare(expected, presented),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_open_when_no_key_configured() {
        assert!(is_authorized(None, None));
        assert!(is_authorized(None, Some("anything")));
    }

    #[test]
    fn test_key_required_when_configured() {
        assert!(is_authorized(Some("k3y"), Some("k3y")));
        assert!(!is_authorized(Some("k3y"), Some("key")));
        assert!(!is_authorized(Some("k3y"), None));
        assert!(!is_authorized(Some("k3y"), Some("")));
    }
}
